//! Shared utilities for pipeline integration tests.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

use request_pipeline::config::schema::AppConfig;
use request_pipeline::http::HttpServer;
use request_pipeline::lifecycle::Shutdown;

/// A pipeline server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the pipeline with no mounted routes; every request falls through to
/// the catch-all handler.
#[allow(dead_code)]
pub async fn spawn_server(config: AppConfig) -> TestServer {
    spawn_server_with_routes(config, Router::new()).await
}

/// Start the pipeline wrapped around the given routes.
#[allow(dead_code)]
pub async fn spawn_server_with_routes(config: AppConfig, routes: Router) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::with_routes(config, routes);

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer { addr, shutdown }
}

/// Non-pooled client so every request opens a fresh connection.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
