//! Structured logging.
//!
//! # Design Decisions
//! - Uses the tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - Log level configurable via config and the RUST_LOG environment variable

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::schema::Environment;

/// Initialize the logging subsystem. Call once, before anything logs.
pub fn init(environment: Environment, log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("request_pipeline={log_level},tower_http=debug"))
    });

    let registry = tracing_subscriber::registry().with(filter);

    if environment.is_development() {
        registry.with(tracing_subscriber::fmt::layer()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    }
}
