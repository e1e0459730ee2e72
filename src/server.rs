//! HTTP control surface.
//!
//! This module provides the router and application state used by both
//! the production server and integration tests.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::models::AppConfig;
use crate::services::{HttpUploader, Relay};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

/// Build the relay from configuration and restore any saved state.
pub async fn create_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let uploader = HttpUploader::new(config.upload_timeout())
        .map_err(|e| anyhow::anyhow!("Failed to create upload client: {e}"))?;
    let relay = Arc::new(Relay::new(config, Arc::new(uploader)));
    relay.restore_from_store().await;
    Ok(AppState { relay })
}

/// Build the control router with all endpoints and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/stats", get(api::handle_stats))
        .route("/api/queue", get(api::handle_queue))
        .route("/api/history/reset", post(api::handle_reset_history))
        .route("/api/monitoring/start", post(api::handle_start_monitoring))
        .route("/api/monitoring/stop", post(api::handle_stop_monitoring))
        .route("/api/presets", get(api::handle_presets))
        .route(
            "/api/transform",
            get(api::handle_transform).delete(api::handle_remove_transform),
        )
        .route("/api/transform/preset/:id", post(api::handle_activate_preset))
        .route("/api/transform/table", post(api::handle_activate_table))
        .route(
            "/api/transform/adjustment",
            post(api::handle_activate_adjustment),
        )
        // Health check
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
