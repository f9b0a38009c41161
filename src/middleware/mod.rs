//! Request pipeline stages.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cookies.rs (parse Cookie header into the request context)
//!     → security_headers.rs (harden every response)
//!     → logger.rs (one line per request, development only)
//!     → rate_limit.rs (per-address windowed counter, /api scope)
//!     → body_parser.rs (JSON bodies, 10 KiB cap)
//!     → sanitize.rs (neutralize script injection in body and query)
//!     → layers.rs (cross-origin policy, response compression)
//!     → Pass to routes / catch-all
//! ```
//!
//! # Design Decisions
//! - Stages only see the request, the response, and the next stage
//! - Fail closed: a stage that rejects a request produces the error
//!   response itself; later stages never run
//! - No trust in client input

pub mod body_parser;
pub mod cookies;
pub mod layers;
pub mod logger;
pub mod rate_limit;
pub mod sanitize;
pub mod security_headers;

pub use body_parser::JsonBody;
pub use cookies::Cookies;
pub use rate_limit::RateLimiterState;
pub use sanitize::SanitizedQuery;
