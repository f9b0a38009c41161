//! Error taxonomy and the terminal error formatter.
//!
//! Every stage failure and the catch-all handler produce an [`AppError`].
//! Its [`IntoResponse`] impl is the last thing a failed request touches: it
//! renders the one client-visible error envelope and nothing downstream of
//! it runs. An error is constructed once and consumed once.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// An error carrying a client-visible message and an HTTP status.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, message)
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Envelope status field: "fail" for client errors, "error" otherwise.
    pub fn status_label(&self) -> &'static str {
        if self.status.is_client_error() {
            "fail"
        } else {
            "error"
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "status": self.status_label(),
            "message": self.message,
        }));

        (self.status, body).into_response()
    }
}
