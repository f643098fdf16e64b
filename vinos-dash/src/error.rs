//! Error responses for vinos-dash
//!
//! Every pipeline failure becomes one JSON message for the caller; nothing
//! here panics or retries.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request parameter (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Pipeline, model or database failure
    #[error(transparent)]
    Pipeline(#[from] vinos_common::Error),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        use vinos_common::Error;

        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Pipeline(err) => match err {
                Error::Configuration(_) => (StatusCode::SERVICE_UNAVAILABLE, "CONFIGURATION_ERROR"),
                Error::Schema(_) => (StatusCode::BAD_REQUEST, "SCHEMA_ERROR"),
                Error::MissingColumns(_) => (StatusCode::UNPROCESSABLE_ENTITY, "MISSING_COLUMNS"),
                Error::ValueConversion { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "VALUE_CONVERSION_ERROR")
                }
                Error::ModelNotFound(_) => (StatusCode::NOT_FOUND, "MODEL_NOT_FOUND"),
                Error::Inference(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INFERENCE_ERROR"),
                Error::UnknownClass(_) => (StatusCode::INTERNAL_SERVER_ERROR, "UNKNOWN_CLASS"),
                Error::DataSource(_) => (StatusCode::BAD_GATEWAY, "DATA_SOURCE_ERROR"),
                Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();
        let message = self.to_string();
        warn!("Request failed ({}): {}", error_code, message);

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
