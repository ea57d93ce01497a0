use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Router,
};
use engine::EngineError;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, warn};

use crate::config::DaemonConfig;

pub mod assemble;

pub fn router(config: Arc<DaemonConfig>) -> Router {
    Router::new().merge(assemble::router(config))
}

/// Failures surfaced by the HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    Engine(EngineError),
    /// `output_path` escaping the configured output directory.
    InvalidOutputPath(String),
    /// ffprobe/ffmpeg failures, passed through as-is.
    Media(anyhow::Error),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError::Engine(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Engine(err) => match err {
                EngineError::InvalidEmotionLabel(_)
                | EngineError::InsufficientSources { .. }
                | EngineError::MalformedSource { .. } => StatusCode::BAD_REQUEST,
                EngineError::NoMatchingFrames { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                EngineError::Classifier(_) | EngineError::InvariantViolation(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::InvalidOutputPath(_) => StatusCode::BAD_REQUEST,
            ApiError::Media(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (kind, message) = match &self {
            ApiError::Engine(err) => (err.kind(), err.to_string()),
            ApiError::InvalidOutputPath(path) => (
                "invalid_output_path",
                format!("output path must be relative to the output directory: {}", path),
            ),
            ApiError::Media(err) => ("media", format!("{:#}", err)),
        };

        if status.is_server_error() {
            error!("{} ({}): {}", status, kind, message);
        } else {
            warn!("{} ({}): {}", status, kind, message);
        }

        (status, Json(json!({ "error": message, "kind": kind }))).into_response()
    }
}
