//! JSON body parsing.
//!
//! Deserializes `application/json` request bodies into a structured value
//! attached to the request context, capped at a configured byte size. The
//! cap is checked against `Content-Length` before the body is read, and
//! again while streaming for bodies without a declared length. Non-JSON
//! requests pass through untouched.

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::http::error::AppError;
use crate::http::server::AppState;

/// Parsed JSON request body.
#[derive(Debug, Clone)]
pub struct JsonBody(pub Value);

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| ct.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Pipeline stage: parse JSON bodies into the request context.
pub async fn json_body_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let limit = state.config.body.max_bytes;

    if !is_json(request.headers()) {
        return next.run(request).await;
    }

    if let Some(length) = declared_length(request.headers()) {
        if length > limit as u64 {
            return AppError::payload_too_large(format!(
                "Request body exceeds the {limit} byte limit"
            ))
            .into_response();
        }
    }

    let (mut parts, body) = request.into_parts();

    let bytes = match to_bytes(body, limit).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return AppError::payload_too_large(format!(
                "Request body exceeds the {limit} byte limit"
            ))
            .into_response();
        }
    };

    if bytes.is_empty() {
        return next.run(Request::from_parts(parts, Body::empty())).await;
    }

    let value: Value = match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(err) => {
            return AppError::bad_request(format!("Invalid JSON payload: {err}")).into_response();
        }
    };

    parts.extensions.insert(JsonBody(value));

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
