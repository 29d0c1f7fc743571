//! Application error type mapping to HTTP status codes.
//!
//! All errors are translated to a `{"error": "..."}` body. No internal
//! detail leaks to callers: storage and gateway failures collapse to a
//! generic message, with the full error logged server-side.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use luxchat_types::error::{SessionError, StoreError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Session service errors.
    Session(SessionError),
    /// Store errors from direct repository access (transcript reads, chatbot CRUD).
    Store(StoreError),
    /// Request validation failure.
    Validation(String),
    /// Resource not found.
    NotFound(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::Session(e)
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Session(SessionError::InvalidRequest(msg)) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::Session(SessionError::TargetNotFound) => {
                (StatusCode::NOT_FOUND, "target not found".to_string())
            }
            AppError::Session(e) => {
                error!(error = %e, "session request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
            AppError::Store(StoreError::NotFound) => {
                (StatusCode::NOT_FOUND, "not found".to_string())
            }
            AppError::Store(e) => {
                error!(error = %e, "store request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}
