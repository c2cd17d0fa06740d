//! The REST services the portal talks to, seen through typed DTOs.

mod dto;
mod http;

pub use dto::*;
pub use http::HttpBackend;

use thiserror::Error;

use crate::workspace::Document;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Backend responded with {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Could not find {0}")]
    NotFound(String),
    #[error("Invalid backend url {0}")]
    BaseUrl(String),
}

/// Existence check against the bus stop service.
pub trait StopLookup {
    /// `Ok(false)` when the service answers that the stop does not exist,
    /// `Err` when it could not be asked.
    fn stop_exists(&self, stop_id: &str) -> impl Future<Output = Result<bool, self::Error>> + Send;
}

/// Persistence for one kind of workspace document.
pub trait Backend<D: Document>: StopLookup + Send + Sync {
    fn load(&self, id: &str) -> impl Future<Output = Result<D, self::Error>> + Send;

    /// Returns the id the backend assigned.
    fn create(&self, request: &D::Request)
    -> impl Future<Output = Result<String, self::Error>> + Send;

    fn update(
        &self,
        id: &str,
        request: &D::Request,
    ) -> impl Future<Output = Result<(), self::Error>> + Send;
}
