use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use routedesk::stops::StopDirectory;
use std::{collections::HashMap, sync::Arc, time::Instant};
use tracing::debug;

use crate::{
    dto::{ApiError, StopDto},
    state::AppState,
};

/// The cached directory, fetched on first use.
async fn directory(state: &AppState) -> Result<Arc<StopDirectory>, ApiError> {
    if let Some(directory) = state.stops.read().await.as_ref() {
        return Ok(directory.clone());
    }
    let mut cached = state.stops.write().await;
    if let Some(directory) = cached.as_ref() {
        return Ok(directory.clone());
    }
    let now = Instant::now();
    let stops = state
        .backend
        .stops()
        .await
        .map_err(|err| ApiError::new(StatusCode::BAD_GATEWAY, err.to_string()))?;
    let directory = Arc::new(StopDirectory::new(stops));
    debug!(
        "Fetching {} stop(s) took {:?}",
        directory.len(),
        now.elapsed()
    );
    *cached = Some(directory.clone());
    Ok(directory)
}

pub async fn search(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let Some(query) = params.get("q") else {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "Missing q"));
    };
    let count: usize = match params.get("count") {
        Some(value) => value
            .parse()
            .map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, "count must be a number"))?,
        None => 5,
    };
    let directory = directory(&state).await?;
    let result: Vec<_> = directory
        .search(query, count)
        .into_iter()
        .map(StopDto::from)
        .collect();
    Ok(Json(result).into_response())
}
