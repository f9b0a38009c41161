//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → shared via Arc with every pipeline stage
//!
//! APP_ENV environment variable
//!     → Environment::from_env(), read once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the pipeline is declared once at
//!   startup and never reconfigured at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The deployment mode is an environment variable, never a file field

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::AppConfig;
pub use schema::Environment;
