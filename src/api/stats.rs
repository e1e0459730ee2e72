use axum::{extract::State, response::Json};

use crate::server::AppState;
use crate::services::{QueueStatus, Stats};

/// Counters, queue size and current session
pub async fn handle_stats(State(state): State<AppState>) -> Json<Stats> {
    Json(state.relay.stats().await)
}

/// Pending files and worker status
pub async fn handle_queue(State(state): State<AppState>) -> Json<QueueStatus> {
    Json(state.relay.queue_status().await)
}

/// Forget delivered files, zero the counters and drop the session.
///
/// Queued files stay queued.
pub async fn handle_reset_history(State(state): State<AppState>) -> Json<Stats> {
    Json(state.relay.reset_history().await)
}
