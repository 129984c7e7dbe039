//! services/api/src/error.rs
//!
//! Defines the error types for the API service: `ApiError` for startup and
//! `HandlerError` for request handling.

use crate::config::ConfigError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use playlist_core::ports::PortError;
use serde::Serialize;
use utoipa::ToSchema;

/// The fixed user-facing message for failures the caller cannot act on.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "予期せぬエラーが発生しました";

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The body of every non-2xx response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// An error returned from a route handler.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// Sent back verbatim as `400 {"error": ...}`.
    #[error("{0}")]
    BadRequest(String),

    /// A fault inside the handler itself; logged, then answered with the
    /// generic 500 message.
    #[error("{0}")]
    Unexpected(String),
}

impl From<PortError> for HandlerError {
    /// Every store failure, rejected query or lost connection alike, is a 400
    /// carrying the store's message.
    fn from(err: PortError) -> Self {
        HandlerError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for HandlerError {
    fn from(rejection: JsonRejection) -> Self {
        HandlerError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            HandlerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            HandlerError::Unexpected(ref msg) => {
                tracing::error!("Unexpected error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    UNEXPECTED_ERROR_MESSAGE.to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: error_message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_errors_become_bad_requests_with_store_text() {
        let err = HandlerError::from(PortError::Query("duplicate key value".to_string()));
        assert!(matches!(err, HandlerError::BadRequest(ref m) if m == "duplicate key value"));
    }

    #[test]
    fn connection_errors_are_bad_requests_too() {
        let err = HandlerError::from(PortError::Unexpected("pool timed out".to_string()));
        assert!(matches!(err, HandlerError::BadRequest(ref m) if m.contains("pool timed out")));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn handler_faults_are_500s() {
        let err = HandlerError::Unexpected("track missing after upsert".to_string());
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
