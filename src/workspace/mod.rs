//! The authoring session behind both editing views.
//!
//! A [`Workspace`] owns the document being edited. The form view mutates it
//! through typed edits ([`Workspace::update`]), the textual view through
//! YAML ([`Workspace::update_from_yaml`]); both go through the same watch
//! channel, so every subscriber sees each change and the last write wins.

mod route;
mod schedule;

pub use route::RouteEdit;
pub use schedule::ScheduleEdit;

use serde::{Serialize, de::DeserializeOwned};
use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Instant,
};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    backend::{self, Backend, StopLookup},
    draft::{self, DraftStore},
    generate::{self, Generated},
    model::{Direction, Mode, RouteWorkspaceData, ScheduleWorkspaceData},
    validate::ValidationReport,
    yaml,
};

pub type RouteWorkspace<B> = Workspace<RouteWorkspaceData, B>;
pub type ScheduleWorkspace<B> = Workspace<ScheduleWorkspaceData, B>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("A submit is already in progress")]
    SubmitInFlight,
    #[error("A load is already in progress")]
    LoadInFlight,
    #[error("Found {} validation error(s)", .0.error_count())]
    Invalid(ValidationReport),
    #[error("Could not load: {0}")]
    Load(#[source] backend::Error),
    #[error("Workspace is already editing {0}")]
    AlreadyLoaded(String),
    #[error("Workspace was submitted as {0}")]
    Closed(String),
    #[error("Workspace was detached")]
    Detached,
    #[error("There is no {what} #{index}")]
    OutOfRange { what: &'static str, index: usize },
    #[error("Select a route first")]
    NoRouteSelected,
    #[error(transparent)]
    Yaml(#[from] yaml::Error),
    #[error("Submit failed: {0}")]
    Backend(#[from] backend::Error),
    #[error(transparent)]
    Draft(#[from] draft::Error),
}

/// A document kind the workspace can author.
pub trait Document:
    Clone + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Partial document produced by the YAML parser.
    type Patch: Send;
    /// Structural mutation issued by the form view.
    type Edit: Send;
    /// Payload of the create and update calls.
    type Request: Serialize + Send + Sync;

    /// Used in logs and as the draft key.
    const KIND: &'static str;
    const DRAFT_KEY: &'static str;

    fn to_yaml(&self) -> Result<String, yaml::Error>;
    fn parse_yaml(text: &str) -> Result<Self::Patch, yaml::Error>;
    fn merge(&mut self, patch: Self::Patch);
    fn apply(&mut self, edit: Self::Edit) -> Result<(), self::Error>;

    fn validate<L: StopLookup + Sync>(
        &self,
        lookup: &L,
    ) -> impl Future<Output = ValidationReport> + Send;

    fn to_request(&self) -> Self::Request;

    /// The empty document `reset` returns to.
    fn blank(&self) -> Self {
        Self::default()
    }
}

/// Everything subscribers get to see.
#[derive(Debug, Clone, Default, PartialEq, Serialize, serde::Deserialize)]
pub struct Session<D> {
    pub document: D,
    pub mode: Mode,
    /// Set when `load` failed; the page offers to start a new document instead.
    pub load_error: Option<String>,
}

/// Clears a busy flag when dropped, whichever way the call ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Workspace<D: Document, B> {
    backend: B,
    state: watch::Sender<Session<D>>,
    submitting: AtomicBool,
    loading: AtomicBool,
    detached: AtomicBool,
}

impl<D, B> Workspace<D, B>
where
    D: Document,
    B: Backend<D>,
{
    /// An empty workspace in create mode.
    pub fn new(backend: B) -> Self {
        Self::with_document(backend, D::default())
    }

    /// A workspace in create mode starting from `document`.
    pub fn with_document(backend: B, document: D) -> Self {
        Self {
            backend,
            state: watch::Sender::new(Session {
                document,
                ..Default::default()
            }),
            submitting: AtomicBool::new(false),
            loading: AtomicBool::new(false),
            detached: AtomicBool::new(false),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn subscribe(&self) -> watch::Receiver<Session<D>> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> Session<D> {
        self.state.borrow().clone()
    }

    pub fn document(&self) -> D {
        self.state.borrow().document.clone()
    }

    pub fn mode(&self) -> Mode {
        self.state.borrow().mode.clone()
    }

    pub fn load_error(&self) -> Option<String> {
        self.state.borrow().load_error.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<(), self::Error> {
        match &self.state.borrow().mode {
            Mode::Submitted { id } => Err(self::Error::Closed(id.clone())),
            _ => Ok(()),
        }
    }

    /// Fetches `id` and switches to edit mode. A failure is kept in
    /// [`Session::load_error`] as well as returned.
    pub async fn load(&self, id: &str) -> Result<(), self::Error> {
        match &self.state.borrow().mode {
            Mode::Create => (),
            Mode::Edit { id } => return Err(self::Error::AlreadyLoaded(id.clone())),
            Mode::Submitted { id } => return Err(self::Error::Closed(id.clone())),
        }
        let _guard = InFlight::acquire(&self.loading).ok_or(self::Error::LoadInFlight)?;

        let now = Instant::now();
        let loaded = self.backend.load(id).await;
        if self.detached.load(Ordering::Acquire) {
            debug!("Discarding {} {id} loaded after detach", D::KIND);
            return Err(self::Error::Detached);
        }

        match loaded {
            Ok(document) => {
                self.state.send_modify(|session| {
                    session.document = document;
                    session.mode = Mode::Edit { id: id.to_string() };
                    session.load_error = None;
                });
                info!("Loaded {} {id} in {:?}", D::KIND, now.elapsed());
                Ok(())
            }
            Err(err) => {
                warn!("Loading {} {id} failed: {err}", D::KIND);
                let message = err.to_string();
                self.state
                    .send_modify(|session| session.load_error = Some(message));
                Err(self::Error::Load(err))
            }
        }
    }

    /// Applies one form edit. Subscribers are only notified when it succeeded.
    pub fn update(&self, edit: D::Edit) -> Result<(), self::Error> {
        self.ensure_open()?;
        let mut result = Ok(());
        self.state.send_if_modified(|session| {
            let mut document = session.document.clone();
            result = document.apply(edit);
            let changed = result.is_ok() && document != session.document;
            if changed {
                session.document = document;
            }
            changed
        });
        result
    }

    /// Merges the keys present in `text` into the document; absent keys
    /// keep their current values.
    pub fn update_from_yaml(&self, text: &str) -> Result<(), self::Error> {
        self.ensure_open()?;
        let patch = D::parse_yaml(text)?;
        self.state.send_if_modified(|session| {
            let before = session.document.clone();
            session.document.merge(patch);
            session.document != before
        });
        Ok(())
    }

    /// Textual mode while typing: text that does not parse is logged and
    /// leaves the document untouched. Returns whether the text was applied.
    pub fn apply_yaml(&self, text: &str) -> bool {
        match self.update_from_yaml(text) {
            Ok(()) => true,
            Err(err) => {
                warn!("Ignoring {} text: {err}", D::KIND);
                false
            }
        }
    }

    pub fn yaml(&self) -> Result<String, self::Error> {
        let document = self.document();
        Ok(document.to_yaml()?)
    }

    pub async fn validate(&self) -> ValidationReport {
        let document = self.document();
        document.validate(&self.backend).await
    }

    /// Validates, then creates or updates the document. Only one submit runs
    /// at a time; a second call while one is in flight fails immediately.
    pub async fn submit(&self) -> Result<String, self::Error> {
        self.ensure_open()?;
        let _guard = InFlight::acquire(&self.submitting).ok_or(self::Error::SubmitInFlight)?;

        let now = Instant::now();
        let Session { document, mode, .. } = self.snapshot();
        let report = document.validate(&self.backend).await;
        if !report.is_valid() {
            debug!(
                "Refusing to submit {} with {} error(s)",
                D::KIND,
                report.error_count()
            );
            return Err(self::Error::Invalid(report));
        }

        let request = document.to_request();
        let id = match mode {
            Mode::Edit { id } => {
                self.backend.update(&id, &request).await?;
                id
            }
            Mode::Create => self.backend.create(&request).await?,
            Mode::Submitted { id } => return Err(self::Error::Closed(id)),
        };

        self.state
            .send_modify(|session| session.mode = Mode::Submitted { id: id.clone() });
        info!("Submitted {} {id} in {:?}", D::KIND, now.elapsed());
        Ok(id)
    }

    /// Drops the document and returns to create mode.
    pub fn reset(&self) {
        self.state.send_modify(|session| {
            *session = Session {
                document: session.document.blank(),
                ..Default::default()
            }
        });
        debug!("Reset {} workspace", D::KIND);
    }

    /// Marks the session abandoned; a `load` still running will discard its result.
    pub fn detach(&self) {
        self.detached.store(true, Ordering::Release);
    }

    /// Stores the session under the document's draft key. A submitted session
    /// is finished work and is not saved.
    pub fn save_draft<S: DraftStore>(&self, store: &S) -> Result<(), self::Error> {
        self.ensure_open()?;
        let session = self.snapshot();
        draft::save(store, D::DRAFT_KEY, &session)?;
        Ok(())
    }

    /// Replaces the session with the stored draft. Returns `false` when
    /// there is none.
    pub fn restore_draft<S: DraftStore>(&self, store: &S) -> Result<bool, self::Error> {
        self.ensure_open()?;
        let Some(mut session) = draft::load::<_, Session<D>>(store, D::DRAFT_KEY)? else {
            return Ok(false);
        };
        session.load_error = None;
        if let Mode::Submitted { id } = &session.mode {
            debug!("Draft of submitted {} {id} restored in create mode", D::KIND);
            session.mode = Mode::Create;
        }
        self.state.send_replace(session);
        Ok(true)
    }
}

impl<B: Backend<RouteWorkspaceData>> Workspace<RouteWorkspaceData, B> {
    /// Derives the return leg of route `index`. The result replaces the
    /// group's route running the other way, or is appended when there is none.
    pub fn generate_opposite(&self, index: usize) -> Result<Generated, self::Error> {
        self.ensure_open()?;
        let route = self
            .state
            .borrow()
            .document
            .route_group
            .routes
            .get(index)
            .cloned()
            .ok_or(self::Error::OutOfRange {
                what: "route",
                index,
            })?;

        let generated = generate::generate_opposite(&route);
        if let Generated::Opposite { route: opposite, .. } = &generated {
            let direction: Direction = opposite.direction;
            self.state.send_modify(|session| {
                let routes = &mut session.document.route_group.routes;
                match routes
                    .iter()
                    .enumerate()
                    .position(|(i, route)| i != index && route.direction == direction)
                {
                    Some(existing) => routes[existing] = opposite.clone(),
                    None => routes.push(opposite.clone()),
                }
            });
        }
        Ok(generated)
    }
}
