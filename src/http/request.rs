//! Per-request context: request IDs and client address resolution.
//!
//! # Responsibilities
//! - Generate a unique request ID as early as possible
//! - Echo the ID on the response for correlation
//! - Record per-request metrics (method, status, latency)
//! - Resolve the client address behind trusted proxies

use std::fmt;
use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::observability::metrics;

/// Response header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Unique identifier attached to every request.
#[derive(Debug, Clone)]
pub struct RequestId(String);

impl RequestId {
    fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Convenience accessor for the request ID extension.
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&RequestId>;
}

impl RequestIdExt for Request {
    fn request_id(&self) -> Option<&RequestId> {
        self.extensions().get::<RequestId>()
    }
}

/// Outermost pipeline wrapper: tags the request with an ID, times it, and
/// records request metrics once the response is ready.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let id = RequestId::new();
    request.extensions_mut().insert(id.clone());

    let method = request.method().clone();
    let start = Instant::now();

    let mut response = next.run(request).await;

    metrics::record_request(method.as_str(), response.status().as_u16(), start);

    // UUIDs are always valid header values.
    response
        .headers_mut()
        .insert(X_REQUEST_ID, HeaderValue::from_str(id.as_str()).unwrap());

    response
}

/// Resolve the client address for a request.
///
/// Forwarded headers win over the peer socket address, so deployments behind
/// a trusted proxy see the real client. Falls back to "unknown" when nothing
/// is available (e.g., in-process test services without connect info).
pub fn client_ip(request: &Request) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
    {
        if let Some(ip) = forwarded.split(',').next() {
            let ip = ip.trim();
            if !ip.is_empty() {
                return ip.to_string();
            }
        }
    }

    if let Some(real_ip) = request
        .headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
    {
        return real_ip.to_string();
    }

    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_header(name: &'static str, value: &'static str) -> Request {
        axum::http::Request::builder()
            .uri("/")
            .header(name, value)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn forwarded_for_wins() {
        let request = request_with_header("x-forwarded-for", "203.0.113.9, 10.0.0.1");
        assert_eq!(client_ip(&request), "203.0.113.9");
    }

    #[test]
    fn real_ip_is_second_choice() {
        let request = request_with_header("x-real-ip", "198.51.100.4");
        assert_eq!(client_ip(&request), "198.51.100.4");
    }

    #[test]
    fn connect_info_is_third_choice() {
        let mut request = axum::http::Request::builder()
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let addr: SocketAddr = "192.0.2.1:4711".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));
        assert_eq!(client_ip(&request), "192.0.2.1");
    }

    #[test]
    fn unknown_without_any_source() {
        let request = axum::http::Request::builder()
            .uri("/")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&request), "unknown");
    }
}
