//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, ordered middleware stack)
//!     → request.rs (request ID, client address resolution)
//!     → [middleware stages run in declaration order]
//!     → caller-mounted routes, else catch-all 404
//!     → error.rs (terminal error formatter)
//!     → Send to client
//! ```

pub mod error;
pub mod request;
pub mod server;

pub use error::AppError;
pub use request::{client_ip, RequestId, RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
