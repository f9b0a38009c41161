//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the pipeline
//! server. All types derive Serde traits for deserialization from config
//! files; every field has a default so a missing file still yields a
//! runnable configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Root configuration for the pipeline server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Deployment mode. Read from the `APP_ENV` environment variable at
    /// startup, never from the config file.
    #[serde(skip)]
    pub environment: Environment,

    /// Hosting-server timeout settings.
    pub timeouts: TimeoutConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Request body limits.
    pub body: BodyLimitConfig,

    /// Cross-origin policy.
    pub cors: CorsConfig,

    /// Security header hardening.
    pub security: SecurityConfig,

    /// Response compression.
    pub compression: CompressionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Deployment mode, read once at process startup.
///
/// Controls the diagnostic request logger and the log output format. Nothing
/// else branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    /// Environment variable consulted by [`Environment::from_env`].
    pub const ENV_VAR: &'static str = "APP_ENV";

    /// Read the deployment mode from the process environment.
    pub fn from_env() -> Self {
        std::env::var(Self::ENV_VAR)
            .map(|value| Self::from_name(&value))
            .unwrap_or_default()
    }

    /// Parse a mode name. Unknown names mean production.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            _ => Environment::Production,
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Timeout configuration for the hosting server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Maximum requests per client address within one window.
    pub max_requests: u32,

    /// Window length in seconds. The counter for an address resets when its
    /// window has fully elapsed.
    pub window_secs: u64,

    /// Only paths under this prefix are counted.
    pub path_prefix: String,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 300,
            window_secs: 3600,
            path_prefix: "/api".to_string(),
        }
    }
}

/// Request body limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BodyLimitConfig {
    /// Maximum JSON body size in bytes.
    pub max_bytes: usize,
}

impl Default for BodyLimitConfig {
    fn default() -> Self {
        Self { max_bytes: 10_240 }
    }
}

/// Cross-origin policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// The single origin allowed to receive responses.
    pub allowed_origin: String,

    /// Allow credentialed requests from that origin.
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin: "http://localhost:8000".to_string(),
            allow_credentials: true,
        }
    }
}

/// Security header hardening.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Add the hardening header set to every response.
    pub enable_headers: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
        }
    }
}

/// Response compression.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Compress qualifying response bodies.
    pub enabled: bool,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
