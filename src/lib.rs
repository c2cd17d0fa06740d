pub mod backend;
mod config;
pub mod draft;
pub mod generate;
pub mod import;
pub mod model;
pub mod shared;
pub mod stops;
pub mod validate;
pub mod workspace;
pub mod yaml;

pub use config::Config;

pub mod prelude {
    pub use crate::Config;
    pub use crate::backend::{Backend, HttpBackend, StopLookup};
    pub use crate::generate::{Generated, generate_opposite};
    pub use crate::model::*;
    pub use crate::stops::StopDirectory;
    pub use crate::validate::{Issue, Severity, Target, ValidationReport};
    pub use crate::workspace::{
        Document, RouteEdit, RouteWorkspace, ScheduleEdit, ScheduleWorkspace, Session, Workspace,
    };
}
