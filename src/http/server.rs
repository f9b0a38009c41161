//! HTTP server setup and pipeline assembly.
//!
//! # Responsibilities
//! - Declare the middleware stage order, once, at startup
//! - Wrap caller-mounted routes with the assembled stack
//! - Convert unmatched requests into "not found" errors
//! - Bind the server to a listener and serve until shutdown
//!
//! # Design Decisions
//! - The stack is a single `ServiceBuilder`: stages read top-to-bottom in
//!   execution order, responses travel back through in reverse
//! - Stages that are configured off are absent from the stack, not no-ops
//! - A stage short-circuits only by producing an error response; nothing
//!   else can reorder or skip later stages

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::Uri;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::schema::AppConfig;
use crate::http::error::AppError;
use crate::http::request;
use crate::middleware::rate_limit::RateLimiterState;
use crate::middleware::{body_parser, cookies, layers, logger, rate_limit, sanitize, security_headers};

/// Application state injected into stateful pipeline stages.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub limiter: Arc<RateLimiterState>,
}

/// HTTP server wrapping routes with the request pipeline.
pub struct HttpServer {
    router: Router,
    config: Arc<AppConfig>,
    limiter: Arc<RateLimiterState>,
}

impl HttpServer {
    /// Create a server with no mounted routes: every request traverses the
    /// pipeline and falls through to the catch-all handler.
    pub fn new(config: AppConfig) -> Self {
        Self::with_routes(config, Router::new())
    }

    /// Create a server wrapping caller-provided routes with the pipeline.
    pub fn with_routes(config: AppConfig, routes: Router) -> Self {
        let config = Arc::new(config);
        let limiter = Arc::new(RateLimiterState::new(config.rate_limit.clone()));
        let state = AppState {
            config: config.clone(),
            limiter: limiter.clone(),
        };

        let router = build_pipeline(state, routes);

        Self {
            router,
            config,
            limiter,
        }
    }

    /// Run the server, accepting connections on the given listener until the
    /// shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            environment = %self.config.environment,
            "HTTP server starting"
        );

        if self.config.rate_limit.enabled {
            spawn_window_pruner(self.limiter.clone(), self.config.rate_limit.window_secs);
        }

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// Assemble the ordered middleware stack around the given routes.
///
/// The `ServiceBuilder` order is the request order: the first layer listed is
/// the first to see a request and the last to see its response.
fn build_pipeline(state: AppState, routes: Router) -> Router {
    let config = state.config.clone();

    let stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(request::request_id_middleware))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.timeouts.request_secs,
        )))
        .layer(from_fn(cookies::cookie_parser_middleware))
        .option_layer(
            config
                .security
                .enable_headers
                .then(|| from_fn(security_headers::security_headers_middleware)),
        )
        .option_layer(
            config
                .environment
                .is_development()
                .then(|| from_fn(logger::dev_logger_middleware)),
        )
        .layer(from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit_middleware,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            body_parser::json_body_middleware,
        ))
        .layer(from_fn(sanitize::sanitize_middleware))
        .layer(layers::cors(&config.cors));

    // Compression sits innermost, directly wrapping the routes. It is applied
    // via `Router::layer` rather than inside the `ServiceBuilder` above because
    // `option_layer` would require the compressed and pass-through branches to
    // share one response body type, which they do not; `Router::layer` re-wraps
    // the body for us. Stage order is unchanged.
    let inner = routes.fallback(not_found);
    let inner = if config.compression.enabled {
        inner.layer(layers::compression())
    } else {
        inner
    };

    inner.layer(stack)
}

/// Catch-all for requests no route matched.
async fn not_found(uri: Uri) -> AppError {
    AppError::not_found(format!("Can't find {} on the server", uri.path()))
}

/// Periodically drop rate-limit windows that have fully elapsed so the
/// per-address map does not grow without bound.
fn spawn_window_pruner(limiter: Arc<RateLimiterState>, window_secs: u64) {
    let period = Duration::from_secs(window_secs.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = limiter.prune_expired();
            if removed > 0 {
                tracing::debug!(removed, "Pruned expired rate-limit windows");
            }
        }
    });
}
