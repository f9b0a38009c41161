//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): total requests by method, status
//! - `http_request_duration_seconds` (histogram): latency distribution
//! - `http_rate_limited_total` (counter): requests rejected by the limiter

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_counter!("http_requests_total", "Total requests by method and status");
            describe_histogram!(
                "http_request_duration_seconds",
                "Request latency distribution"
            );
            describe_counter!(
                "http_rate_limited_total",
                "Requests rejected by the rate limiter"
            );
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(err) => {
            tracing::error!(error = %err, "Failed to install metrics exporter");
        }
    }
}

/// Record one completed request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let latency = start.elapsed().as_secs_f64();

    counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
    )
    .record(latency);
}

/// Record one rate-limited request.
pub fn record_rate_limited(reason: &'static str) {
    counter!("http_rate_limited_total", "reason" => reason).increment(1);
}
