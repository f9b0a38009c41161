//! Layer factories for the off-the-shelf stages.

use axum::http::{HeaderValue, Method};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowHeaders, CorsLayer};

use crate::config::schema::CorsConfig;

/// Cross-origin policy: exactly one allowed origin, credentials permitted.
///
/// An unparseable configured origin degrades to a layer that emits no
/// permissive headers at all; the browser enforces the denial.
pub fn cors(config: &CorsConfig) -> CorsLayer {
    let Ok(origin) = HeaderValue::from_str(&config.allowed_origin) else {
        return CorsLayer::new();
    };

    let layer = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::HEAD,
            Method::OPTIONS,
        ])
        // A wildcard is invalid alongside credentials; mirror the preflight
        // request headers instead.
        .allow_headers(AllowHeaders::mirror_request());

    if config.allow_credentials {
        layer.allow_credentials(true)
    } else {
        layer
    }
}

/// Response compression, negotiated from Accept-Encoding. Small and
/// non-text payloads are skipped by the default predicate.
pub fn compression() -> CompressionLayer {
    CompressionLayer::new()
}
