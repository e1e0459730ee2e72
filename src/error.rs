use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::presets::PresetError;
use crate::services::MonitorError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Preset error: {0}")]
    Preset(#[from] PresetError),

    #[error("Cannot start monitoring: {0}")]
    Monitor(#[from] MonitorError),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Image decode error: {0}")]
    Decode(String),

    #[error("Image encode error: {0}")]
    Encode(String),

    #[error("Grading error: {0}")]
    Grade(#[from] color_grade::GradeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Preset(PresetError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Preset(PresetError::Io { .. }) => StatusCode::NOT_FOUND,
            ApiError::Preset(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Monitor(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "status": status.as_u16(),
            "success": false,
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
