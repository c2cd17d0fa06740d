use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use routedesk::{import, validate::ValidationReport, workspace};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDto {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ValidationReport>,
}

/// An error response: status plus a JSON body with a user facing message.
#[derive(Debug)]
pub struct ApiError(pub StatusCode, pub ErrorDto);

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self(
            status,
            ErrorDto {
                message: message.into(),
                report: None,
            },
        )
    }

    pub fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("Could not find {what}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(self.1)).into_response()
    }
}

impl From<workspace::Error> for ApiError {
    fn from(err: workspace::Error) -> Self {
        let message = err.to_string();
        let status = match &err {
            workspace::Error::SubmitInFlight
            | workspace::Error::LoadInFlight
            | workspace::Error::AlreadyLoaded(_)
            | workspace::Error::Closed(_) => StatusCode::CONFLICT,
            workspace::Error::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            workspace::Error::Detached => StatusCode::GONE,
            workspace::Error::OutOfRange { .. }
            | workspace::Error::NoRouteSelected
            | workspace::Error::Yaml(_) => StatusCode::BAD_REQUEST,
            workspace::Error::Load(_) | workspace::Error::Backend(_) => StatusCode::BAD_GATEWAY,
            workspace::Error::Draft(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let report = match err {
            workspace::Error::Invalid(report) => Some(report),
            _ => None,
        };
        Self(status, ErrorDto { message, report })
    }
}

impl From<import::Error> for ApiError {
    fn from(err: import::Error) -> Self {
        let status = match &err {
            import::Error::Csv(_) | import::Error::MissingHeader(_) | import::Error::Empty => {
                StatusCode::BAD_REQUEST
            }
            import::Error::NothingToImport(_) => StatusCode::UNPROCESSABLE_ENTITY,
            import::Error::Backend(_) => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, err.to_string())
    }
}
