use routedesk::{
    backend::Backend,
    generate::Generated,
    model::{Mode, Route},
    workspace::{Document, Workspace},
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SessionDto<D> {
    pub session: u64,
    pub mode: Mode,
    /// The document is still being fetched; poll until this is false.
    pub loading: bool,
    pub load_error: Option<String>,
    pub document: D,
}

impl<D: Document> SessionDto<D> {
    pub fn from<B: Backend<D>>(session: u64, workspace: &Workspace<D, B>) -> Self {
        let snapshot = workspace.snapshot();
        Self {
            session,
            mode: snapshot.mode,
            loading: workspace.is_loading(),
            load_error: snapshot.load_error,
            document: snapshot.document,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmittedDto {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OppositeDto {
    /// The route had fewer than two stops and was left as is.
    pub unchanged: bool,
    /// Names were copied unchanged and should be checked by hand.
    pub review_names: bool,
    pub route: Route,
}

impl OppositeDto {
    pub fn from(generated: Generated) -> Self {
        match generated {
            Generated::Opposite {
                route,
                review_names,
            } => Self {
                unchanged: false,
                review_names,
                route,
            },
            Generated::Unchanged(route) => Self {
                unchanged: true,
                review_names: false,
                route,
            },
        }
    }
}
