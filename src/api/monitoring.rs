use axum::{body::Bytes, extract::State, response::Json};
use serde::Serialize;

use crate::error::ApiError;
use crate::server::AppState;
use crate::services::{MonitorRequest, Stats};

#[derive(Debug, Serialize)]
pub struct StopResponse {
    pub success: bool,
}

/// Start watching a folder and uploading to an endpoint.
///
/// Body fields override the configuration file. An empty body uses the
/// configured folder and endpoint; a body that is not a valid request is
/// rejected.
pub async fn handle_start_monitoring(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Stats>, ApiError> {
    let request = parse_request(&body)?;
    let stats = state.relay.start_monitoring(request).await?;
    Ok(Json(stats))
}

fn parse_request(body: &[u8]) -> Result<MonitorRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(MonitorRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid monitoring request: {e}")))
}

/// Stop the watcher and the worker; the queue is kept
pub async fn handle_stop_monitoring(State(state): State<AppState>) -> Json<StopResponse> {
    state.relay.stop_monitoring().await;
    Json(StopResponse { success: true })
}
