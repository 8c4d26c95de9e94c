//! HTTP surface over the session controller

pub mod handlers;
pub mod response;

pub use response::{ApiError, ApiResponse, CallerId, USER_ID_HEADER};

use crate::session::SessionController;
use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared API state
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<SessionController>,
}

/// Build API router
pub fn build_router(controller: Arc<SessionController>) -> Router {
    let state = AppState { controller };

    Router::new()
        .route("/api/v1/health", get(handlers::health))
        .route("/api/v1/methods", get(handlers::list_methods))
        .route("/api/v1/methods/{service}", get(handlers::service_methods))
        .route(
            "/api/v1/devices",
            get(handlers::list_devices).post(handlers::register_device),
        )
        .route(
            "/api/v1/sessions",
            get(handlers::list_sessions).post(handlers::start_session),
        )
        .route("/api/v1/sessions/{id}/progress", get(handlers::get_progress))
        .route("/api/v1/sessions/{id}/pause", post(handlers::pause_session))
        .route("/api/v1/sessions/{id}/resume", post(handlers::resume_session))
        .route("/api/v1/sessions/{id}/cancel", post(handlers::cancel_session))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C
pub async fn serve(controller: Arc<SessionController>, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    serve_on(listener, controller).await
}

/// Serve on an already bound listener
///
/// Drivers are stopped on shutdown without touching stored status, so a
/// durable store picks them up again on the next start.
pub async fn serve_on(listener: TcpListener, controller: Arc<SessionController>) -> Result<()> {
    let addr = listener.local_addr()?;
    info!("Starting phonekit API server on {}", addr);

    let app = build_router(Arc::clone(&controller));
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
        .context("API server failed")?;

    controller.shutdown();
    Ok(())
}
