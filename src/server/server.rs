use anyhow::Result;
use std::time::Duration;

use tower_http::services::ServeDir;
use tracing::info;

use axum::{extract::State, middleware, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use super::{log_requests, metrics, song_routes::song_routes, state::ServerState, upload_routes::upload_routes};
use crate::ingestion::{PUBLIC_COVERS_PREFIX, PUBLIC_UPLOADS_PREFIX};

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    uptime: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn health(State(state): State<ServerState>) -> impl IntoResponse {
    Json(HealthResponse {
        ok: true,
        uptime: format_uptime(state.start_time.elapsed()),
    })
}

/// Assemble the full application router.
pub fn make_app(state: ServerState) -> Router {
    let uploads_dir = state.pipeline.media().uploads_dir().to_path_buf();
    let covers_dir = state.pipeline.media().covers_dir().to_path_buf();

    let api_routes: Router<ServerState> = Router::new()
        .nest("/api/songs", song_routes())
        .nest("/api", upload_routes(state.config.max_upload_size_mb));

    let mut app = Router::new()
        .route("/health", get(health))
        .merge(api_routes)
        .with_state(state.clone())
        .nest_service(PUBLIC_UPLOADS_PREFIX, ServeDir::new(uploads_dir))
        .nest_service(PUBLIC_COVERS_PREFIX, ServeDir::new(covers_dir));

    if let Some(frontend_path) = &state.config.frontend_dir_path {
        let static_files_service =
            ServeDir::new(frontend_path).append_index_html_on_directories(true);
        app = app.fallback_service(static_files_service);
    }

    app.layer(middleware::from_fn_with_state(state, log_requests))
}

/// Bind and serve the application, spawning the metrics listener alongside.
pub async fn run_server(state: ServerState, metrics_port: u16) -> Result<()> {
    let port = state.config.port;
    let app = make_app(state);

    metrics::spawn_metrics_server(metrics_port);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    info!("Ready to serve at port {}!", port);

    Ok(axum::serve(listener, app).await?)
}
