use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::ApiError;
use crate::presets::PresetEntry;
use crate::server::AppState;
use crate::services::TransformInfo;

/// Body naming a preset file on disk
#[derive(Debug, Deserialize)]
pub struct PathRequest {
    pub path: PathBuf,
}

impl PathRequest {
    fn checked(self) -> Result<PathBuf, ApiError> {
        if self.path.as_os_str().is_empty() {
            return Err(ApiError::BadRequest("path is required".to_string()));
        }
        Ok(self.path)
    }
}

pub async fn handle_presets(State(state): State<AppState>) -> Json<Vec<PresetEntry>> {
    Json(state.relay.presets().to_vec())
}

pub async fn handle_transform(State(state): State<AppState>) -> Json<TransformInfo> {
    Json(state.relay.transform_info().await)
}

/// Activate a catalog preset; a `none` preset clears the transform
pub async fn handle_activate_preset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TransformInfo>, ApiError> {
    Ok(Json(state.relay.activate_preset(&id).await?))
}

/// Activate a `.cube` color table from an arbitrary path
pub async fn handle_activate_table(
    State(state): State<AppState>,
    Json(body): Json<PathRequest>,
) -> Result<Json<TransformInfo>, ApiError> {
    let path = body.checked()?;
    Ok(Json(state.relay.activate_table(&path).await?))
}

/// Activate an XMP preset from an arbitrary path
pub async fn handle_activate_adjustment(
    State(state): State<AppState>,
    Json(body): Json<PathRequest>,
) -> Result<Json<TransformInfo>, ApiError> {
    let path = body.checked()?;
    Ok(Json(state.relay.activate_adjustment(&path).await?))
}

pub async fn handle_remove_transform(State(state): State<AppState>) -> Json<TransformInfo> {
    Json(state.relay.remove_transform().await)
}
