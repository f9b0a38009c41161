//! Configuration validation.
//!
//! Semantic checks on top of what serde already guarantees syntactically.
//! All errors are collected and returned together, not just the first.

use std::net::SocketAddr;

use axum::http::HeaderValue;

use crate::config::schema::AppConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a valid socket address")]
    InvalidBindAddress(String),

    #[error("rate_limit.max_requests must be greater than zero")]
    ZeroRateLimitMax,

    #[error("rate_limit.window_secs must be greater than zero")]
    ZeroRateLimitWindow,

    #[error("rate_limit.path_prefix {0:?} must start with '/'")]
    InvalidRateLimitPrefix(String),

    #[error("body.max_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("cors.allowed_origin {0:?} is not a valid header value")]
    InvalidCorsOrigin(String),
}

/// Validate a configuration, returning every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.rate_limit.enabled {
        if config.rate_limit.max_requests == 0 {
            errors.push(ValidationError::ZeroRateLimitMax);
        }
        if config.rate_limit.window_secs == 0 {
            errors.push(ValidationError::ZeroRateLimitWindow);
        }
        if !config.rate_limit.path_prefix.starts_with('/') {
            errors.push(ValidationError::InvalidRateLimitPrefix(
                config.rate_limit.path_prefix.clone(),
            ));
        }
    }

    if config.body.max_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if HeaderValue::from_str(&config.cors.allowed_origin).is_err() {
        errors.push(ValidationError::InvalidCorsOrigin(
            config.cors.allowed_origin.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
