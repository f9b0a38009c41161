//! Diagnostic request logging.
//!
//! One structured line per request: method, path, status, client address,
//! latency. Only present in the stack when the deployment mode is
//! development; it never touches request or response content.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::http::request::client_ip;

/// Pipeline stage: log a one-line summary of the completed request.
pub async fn dev_logger_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let client = client_ip(&request);
    let start = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        target: "request",
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        client = %client,
        latency_ms = start.elapsed().as_millis() as u64,
        "request completed"
    );

    response
}
