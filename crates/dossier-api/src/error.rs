//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use dossier_core::DossierError;

/// API error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code
    pub code: String,
    /// Human-readable message
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    UpstreamTimeout,
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::bad_request(msg)),
            AppError::UpstreamTimeout => (
                StatusCode::GATEWAY_TIMEOUT,
                ApiError::new("INFERENCE_TIMEOUT", "Inference backend did not respond in time"),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::internal_error(msg),
            ),
        };

        (status, Json(error)).into_response()
    }
}

impl From<DossierError> for AppError {
    fn from(err: DossierError) -> Self {
        match err {
            DossierError::EmptyBatch => AppError::BadRequest("batch contains no files".to_string()),
            DossierError::UnsupportedFormat(_) | DossierError::FileTooLarge { .. } => {
                AppError::BadRequest(err.to_string())
            }
            DossierError::InferenceTimeout => AppError::UpstreamTimeout,
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
