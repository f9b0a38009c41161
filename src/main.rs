//! Binary entry point.
//!
//! Runs the pipeline with no mounted routes: every request flows through the
//! full middleware chain and falls through to the catch-all handler. Route
//! handlers are expected to be mounted by library consumers via
//! [`HttpServer::with_routes`](request_pipeline::http::HttpServer::with_routes).

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use request_pipeline::config::loader::load_config;
use request_pipeline::config::schema::Environment;
use request_pipeline::lifecycle::signals;
use request_pipeline::observability::{logging, metrics};
use request_pipeline::{AppConfig, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "request-pipeline")]
#[command(about = "HTTP request pipeline server", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    // The deployment mode comes from the environment, never from the file,
    // and is read exactly once.
    config.environment = Environment::from_env();

    logging::init(config.environment, &config.observability.log_level);

    tracing::info!("request-pipeline v0.1.0 starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        environment = %config.environment,
        rate_limit_max = config.rate_limit.max_requests,
        rate_limit_window_secs = config.rate_limit.window_secs,
        body_max_bytes = config.body.max_bytes,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config);
    server.run(listener, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
