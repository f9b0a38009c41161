//! HTTP request pipeline server.
//!
//! Assembles an ordered chain of request-processing stages in front of
//! application routes. Every inbound request passes through the stages in
//! declaration order; every response passes back through in reverse.
//!
//! ```text
//! Client Request
//!     │
//!     ▼
//! ┌──────────────────────────────────────────────────────┐
//! │ trace / request id / timeout      (ambient)          │
//! │ cookie parsing                    (stage 1)          │
//! │ security headers                  (stage 2)          │
//! │ diagnostic logging                (stage 3, dev only)│
//! │ rate limiting                     (stage 4, /api)    │
//! │ JSON body parsing, 10 KiB cap     (stage 5)          │
//! │ input sanitization                (stage 6)          │
//! │ cross-origin policy               (stage 7)          │
//! │ response compression              (stage 8)          │
//! │ routes, else catch-all 404        (stage 9)          │
//! └──────────────────────────────────────────────────────┘
//!     │
//!     ▼
//! terminal error formatter            (stage 10)
//! ```
//!
//! A stage either completes and hands the request to the next stage, or
//! short-circuits with an [`http::AppError`](crate::http::AppError) that the
//! terminal formatter renders. No stage reorders or skips a later stage
//! otherwise.

// Core subsystems
pub mod config;
pub mod http;
pub mod middleware;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
