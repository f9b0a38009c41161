//! Per-address rate limiting.
//!
//! Counts requests per client address over a fixed-length window, scoped to
//! a configured path prefix. Each address owns a `(count, window_start)`
//! pair; the counter resets once its window has fully elapsed. The store is
//! a concurrent map, so updates are atomic per address without a global lock
//! across unrelated addresses.

use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;

use crate::config::schema::RateLimitConfig;
use crate::http::error::AppError;
use crate::http::request::client_ip;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Client-visible message for rejected requests.
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests from this IP. Please retry in an hour";

/// One client address's counter.
#[derive(Debug)]
struct Window {
    count: u32,
    started_at: Instant,
}

impl Window {
    fn new() -> Self {
        Self {
            count: 0,
            started_at: Instant::now(),
        }
    }
}

/// Outcome of a rate-limit check.
#[derive(Debug)]
pub enum RateLimitDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

/// Shared state for the rate limiter.
pub struct RateLimiterState {
    windows: DashMap<String, Window>,
    config: RateLimitConfig,
}

impl RateLimiterState {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: DashMap::new(),
            config,
        }
    }

    /// Count a request for `key` and decide whether it may proceed.
    pub fn check(&self, key: &str) -> RateLimitDecision {
        let window = Duration::from_secs(self.config.window_secs);
        let now = Instant::now();

        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert_with(Window::new);

        if now.duration_since(entry.started_at) >= window {
            entry.count = 0;
            entry.started_at = now;
        }

        entry.count += 1;

        if entry.count > self.config.max_requests {
            let retry_after = window.saturating_sub(now.duration_since(entry.started_at));
            RateLimitDecision::Limited { retry_after }
        } else {
            RateLimitDecision::Allowed {
                remaining: self.config.max_requests - entry.count,
            }
        }
    }

    /// Drop windows that have fully elapsed. Returns how many were removed.
    pub fn prune_expired(&self) -> usize {
        let window = Duration::from_secs(self.config.window_secs);
        let now = Instant::now();
        let before = self.windows.len();

        self.windows
            .retain(|_, w| now.duration_since(w.started_at) < window);

        before - self.windows.len()
    }
}

/// Pipeline stage: enforce the per-address request budget under the
/// configured path prefix.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let config = &state.config.rate_limit;

    if !config.enabled || !request.uri().path().starts_with(config.path_prefix.as_str()) {
        return next.run(request).await;
    }

    let client = client_ip(&request);

    match state.limiter.check(&client) {
        RateLimitDecision::Allowed { remaining } => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            headers.insert("x-ratelimit-limit", HeaderValue::from(config.max_requests));
            headers.insert("x-ratelimit-remaining", HeaderValue::from(remaining));
            response
        }
        RateLimitDecision::Limited { retry_after } => {
            tracing::warn!(client = %client, path = %request.uri().path(), "Rate limit exceeded");
            metrics::record_rate_limited("window_limit");

            let mut response = AppError::too_many_requests(RATE_LIMIT_MESSAGE).into_response();
            let headers = response.headers_mut();
            headers.insert(
                "retry-after",
                HeaderValue::from(retry_after.as_secs().max(1)),
            );
            headers.insert("x-ratelimit-limit", HeaderValue::from(config.max_requests));
            headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
            response
        }
    }
}
