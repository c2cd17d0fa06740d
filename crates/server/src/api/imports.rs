use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use routedesk::import::{self, ImportKind, ImportOutcome};
use serde::Serialize;
use std::sync::Arc;

use crate::{dto::ApiError, state::AppState};

#[derive(Debug, Clone, Serialize)]
pub struct ImportDto {
    pub outcome: ImportOutcome,
    pub message: String,
    pub navigates_away: bool,
}

fn kind_from_str(kind: &str) -> Result<ImportKind, ApiError> {
    match kind {
        "stops" => Ok(ImportKind::Stops),
        "routes" => Ok(ImportKind::Routes),
        _ => Err(ApiError::not_found(&format!("import {kind}"))),
    }
}

pub async fn upload(
    Path(kind): Path<String>,
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Response, ApiError> {
    let kind = kind_from_str(&kind)?;
    let outcome = import::import(&state.backend, kind, body.as_bytes()).await?;
    Ok(Json(ImportDto {
        message: outcome.message(),
        navigates_away: outcome.navigates_away(),
        outcome,
    })
    .into_response())
}

pub async fn template(
    Path(kind): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let kind = kind_from_str(&kind)?;
    let csv = import::template(&state.backend, kind).await;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}_template.csv\"", kind.resource()),
            ),
        ],
        csv,
    )
        .into_response())
}
