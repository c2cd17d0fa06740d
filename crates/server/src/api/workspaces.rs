use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use routedesk::{
    backend::{Backend, HttpBackend},
    model::RouteWorkspaceData,
    workspace::Workspace,
};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, info};

use crate::{
    dto::{ApiError, OppositeDto, SessionDto, SubmittedDto},
    state::{AppState, Hosted},
};

async fn workspace<D>(
    state: &AppState,
    session: u64,
) -> Result<Arc<Workspace<D, HttpBackend>>, ApiError>
where
    D: Hosted,
    HttpBackend: Backend<D>,
{
    D::sessions(state)
        .read()
        .await
        .get(&session)
        .cloned()
        .ok_or_else(|| ApiError::not_found(&format!("{} session {session}", D::PATH)))
}

/// Opens a session. With `id` the document is loaded in the background:
/// the response comes back in create mode with `loading` set, and closing
/// the session before the load finishes discards its result.
pub async fn open<D>(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError>
where
    D: Hosted,
    HttpBackend: Backend<D>,
{
    let id = params.get("id").cloned();
    let workspace = Arc::new(match id {
        Some(_) => Workspace::<D, _>::new(state.backend.clone()),
        None => Workspace::with_document(state.backend.clone(), D::initial(&state).await),
    });

    let session = state.next_session_id();
    D::sessions(&state)
        .write()
        .await
        .insert(session, workspace.clone());

    let dto = SessionDto::from(session, &*workspace);
    if let Some(id) = id {
        let loading = workspace.clone();
        let load_id = id.clone();
        tokio::spawn(async move {
            // A failure is kept in the session for the page to show.
            if let Err(err) = loading.load(&load_id).await {
                debug!("Load of {} {load_id} for session {session} ended: {err}", D::PATH);
            }
        });
        info!("Opened {} session {session}, loading {id}", D::PATH);
        return Ok((
            StatusCode::ACCEPTED,
            Json(SessionDto {
                loading: true,
                ..dto
            }),
        )
            .into_response());
    }

    info!("Opened {} session {session} in {} mode", D::PATH, dto.mode);
    Ok((StatusCode::CREATED, Json(dto)).into_response())
}

pub async fn get_session<D>(
    Path(session): Path<u64>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError>
where
    D: Hosted,
    HttpBackend: Backend<D>,
{
    let workspace = workspace::<D>(&state, session).await?;
    Ok(Json(SessionDto::from(session, &*workspace)).into_response())
}

/// Abandons the session. A load still in flight discards its result.
pub async fn close<D>(
    Path(session): Path<u64>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError>
where
    D: Hosted,
    HttpBackend: Backend<D>,
{
    let workspace = D::sessions(&state)
        .write()
        .await
        .remove(&session)
        .ok_or_else(|| ApiError::not_found(&format!("{} session {session}", D::PATH)))?;
    workspace.detach();
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn reset<D>(
    Path(session): Path<u64>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError>
where
    D: Hosted,
    HttpBackend: Backend<D>,
{
    let workspace = workspace::<D>(&state, session).await?;
    workspace.reset();
    Ok(Json(SessionDto::from(session, &*workspace)).into_response())
}

pub async fn get_yaml<D>(
    Path(session): Path<u64>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError>
where
    D: Hosted,
    HttpBackend: Backend<D>,
{
    let workspace = workspace::<D>(&state, session).await?;
    Ok(workspace.yaml()?.into_response())
}

/// Merges the text into the document. Text that does not parse is ignored,
/// the response is always the current text.
pub async fn put_yaml<D>(
    Path(session): Path<u64>,
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Response, ApiError>
where
    D: Hosted,
    HttpBackend: Backend<D>,
{
    let workspace = workspace::<D>(&state, session).await?;
    workspace.apply_yaml(&body);
    Ok(workspace.yaml()?.into_response())
}

pub async fn validate<D>(
    Path(session): Path<u64>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError>
where
    D: Hosted,
    HttpBackend: Backend<D>,
{
    let workspace = workspace::<D>(&state, session).await?;
    Ok(Json(workspace.validate().await).into_response())
}

pub async fn submit<D>(
    Path(session): Path<u64>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError>
where
    D: Hosted,
    HttpBackend: Backend<D>,
{
    let workspace = workspace::<D>(&state, session).await?;
    let id = workspace.submit().await?;
    Ok(Json(SubmittedDto { id }).into_response())
}

pub async fn save_draft<D>(
    Path(session): Path<u64>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError>
where
    D: Hosted,
    HttpBackend: Backend<D>,
{
    let workspace = workspace::<D>(&state, session).await?;
    workspace.save_draft(&state.drafts)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn restore_draft<D>(
    Path(session): Path<u64>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError>
where
    D: Hosted,
    HttpBackend: Backend<D>,
{
    let workspace = workspace::<D>(&state, session).await?;
    if !workspace.restore_draft(&state.drafts)? {
        return Err(ApiError::not_found(&format!("a {} draft", D::PATH)));
    }
    Ok(Json(SessionDto::from(session, &*workspace)).into_response())
}

pub async fn opposite(
    Path((session, index)): Path<(u64, usize)>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let workspace = workspace::<RouteWorkspaceData>(&state, session).await?;
    let generated = workspace.generate_opposite(index)?;
    Ok(Json(OppositeDto::from(generated)).into_response())
}
