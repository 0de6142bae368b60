use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use log::{error, info};
use tower_http::cors::{Any, CorsLayer};

use crate::api::handlers::{self, AppState};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/events", post(handlers::log_event))
        .route("/api/events/beacon", post(handlers::log_event_beacon))
        .route(
            "/api/students/{student_id}/reports",
            get(handlers::list_student_reports),
        )
        .route(
            "/api/students/{student_id}/reports/{filename}",
            get(handlers::get_student_report),
        )
        .route(
            "/api/teacher/activity-summary",
            get(handlers::teacher_activity_summary),
        )
        .route("/api/health", get(handlers::health_check))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn serve(state: Arc<AppState>) -> Result<()> {
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Listening on http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to install ctrl-c handler: {err}");
        return;
    }
    info!("Shutdown signal received");
}
