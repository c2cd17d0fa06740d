use routedesk::{
    Config,
    backend::HttpBackend,
    draft::FileDraftStore,
    model::{RouteWorkspaceData, ScheduleWorkspaceData},
    stops::StopDirectory,
    workspace::{Document, Workspace},
};
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tokio::sync::RwLock;

pub type SessionMap<D> = RwLock<HashMap<u64, Arc<Workspace<D, HttpBackend>>>>;

pub struct AppState {
    pub backend: HttpBackend,
    pub drafts: FileDraftStore,
    pub stops: RwLock<Option<Arc<StopDirectory>>>,
    route_sessions: SessionMap<RouteWorkspaceData>,
    schedule_sessions: SessionMap<ScheduleWorkspaceData>,
    next_session: AtomicU64,
}

impl AppState {
    pub fn new(config: &Config, backend: HttpBackend) -> Self {
        Self {
            drafts: FileDraftStore::from_config(config),
            backend,
            stops: RwLock::new(None),
            route_sessions: RwLock::new(HashMap::new()),
            schedule_sessions: RwLock::new(HashMap::new()),
            next_session: AtomicU64::new(1),
        }
    }

    pub fn next_session_id(&self) -> u64 {
        self.next_session.fetch_add(1, Ordering::Relaxed)
    }
}

/// A document kind served under `/workspaces/{path}`.
pub trait Hosted: Document {
    const PATH: &'static str;

    fn sessions(state: &AppState) -> &SessionMap<Self>;

    /// Starting document of a session opened without an id.
    fn initial(state: &AppState) -> impl Future<Output = Self> + Send;
}

impl Hosted for RouteWorkspaceData {
    const PATH: &'static str = "routes";

    fn sessions(state: &AppState) -> &SessionMap<Self> {
        &state.route_sessions
    }

    async fn initial(_state: &AppState) -> Self {
        Self::default()
    }
}

impl Hosted for ScheduleWorkspaceData {
    const PATH: &'static str = "schedules";

    fn sessions(state: &AppState) -> &SessionMap<Self> {
        &state.schedule_sessions
    }

    /// New schedules still need the routes they can be attached to.
    async fn initial(state: &AppState) -> Self {
        match state.backend.route_summaries().await {
            Ok(available_routes) => Self {
                available_routes,
                ..Default::default()
            },
            Err(err) => {
                tracing::warn!("Could not fetch routes for a new schedule session: {err}");
                Self::default()
            }
        }
    }
}
