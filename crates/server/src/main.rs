mod api;
mod dto;
mod state;

use crate::state::AppState;
use axum::routing::{get, post};
use routedesk::{
    Config,
    backend::HttpBackend,
    model::{RouteWorkspaceData as Routes, ScheduleWorkspaceData as Schedules},
};
use std::{env, path::PathBuf, sync::Arc};
use tracing::{error, info};

const PORT: u32 = 3000;

fn config_from_env() -> Config {
    let mut config = Config::default();
    if let Ok(url) = env::var("ROUTEDESK_BACKEND_URL") {
        config.base_url = url;
    }
    if let Ok(token) = env::var("ROUTEDESK_TOKEN") {
        config.token = Some(token);
    }
    if let Ok(dir) = env::var("ROUTEDESK_DRAFT_DIR") {
        config.draft_dir = PathBuf::from(dir);
    }
    config
}

fn router(state: Arc<AppState>) -> axum::Router {
    axum::Router::new()
        .route("/workspaces/routes", post(api::open::<Routes>))
        .route(
            "/workspaces/routes/{session}",
            get(api::get_session::<Routes>).delete(api::reset::<Routes>),
        )
        .route(
            "/workspaces/routes/{session}/close",
            post(api::close::<Routes>),
        )
        .route(
            "/workspaces/routes/{session}/yaml",
            get(api::get_yaml::<Routes>).put(api::put_yaml::<Routes>),
        )
        .route(
            "/workspaces/routes/{session}/validate",
            post(api::validate::<Routes>),
        )
        .route(
            "/workspaces/routes/{session}/submit",
            post(api::submit::<Routes>),
        )
        .route(
            "/workspaces/routes/{session}/draft",
            post(api::save_draft::<Routes>),
        )
        .route(
            "/workspaces/routes/{session}/draft/restore",
            post(api::restore_draft::<Routes>),
        )
        .route(
            "/workspaces/routes/{session}/opposite/{index}",
            post(api::opposite),
        )
        .route("/workspaces/schedules", post(api::open::<Schedules>))
        .route(
            "/workspaces/schedules/{session}",
            get(api::get_session::<Schedules>).delete(api::reset::<Schedules>),
        )
        .route(
            "/workspaces/schedules/{session}/close",
            post(api::close::<Schedules>),
        )
        .route(
            "/workspaces/schedules/{session}/yaml",
            get(api::get_yaml::<Schedules>).put(api::put_yaml::<Schedules>),
        )
        .route(
            "/workspaces/schedules/{session}/validate",
            post(api::validate::<Schedules>),
        )
        .route(
            "/workspaces/schedules/{session}/submit",
            post(api::submit::<Schedules>),
        )
        .route(
            "/workspaces/schedules/{session}/draft",
            post(api::save_draft::<Schedules>),
        )
        .route(
            "/workspaces/schedules/{session}/draft/restore",
            post(api::restore_draft::<Schedules>),
        )
        .route("/imports/{kind}", post(api::upload))
        .route("/imports/{kind}/template", get(api::template))
        .route("/stops/search", get(api::search))
        .with_state(state)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    info!("Starting server...");
    let config = config_from_env();
    let port = match env::var("ROUTEDESK_PORT") {
        Ok(value) => match value.parse::<u32>() {
            Ok(port) => port,
            Err(err) => {
                error!("Invalid ROUTEDESK_PORT {value}: {err}");
                std::process::exit(1);
            }
        },
        Err(_) => PORT,
    };

    let backend = match HttpBackend::new(&config) {
        Ok(backend) => backend,
        Err(err) => {
            error!("Could not build backend client: {err}");
            std::process::exit(1);
        }
    };
    info!("Using backend at {}", config.base_url);
    let state = Arc::new(AppState::new(&config, backend));

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Could not bind port {port}: {err}");
            std::process::exit(1);
        }
    };
    info!("Listening to port {port}");
    if let Err(err) = axum::serve(listener, router(state)).await {
        error!("Server stopped: {err}");
    }
}
