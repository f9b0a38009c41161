//! End-to-end tests for the request pipeline.
//!
//! Each test spawns the real server on an ephemeral port and drives it with
//! an HTTP client, so every stage runs exactly as it does in production.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use request_pipeline::config::schema::{AppConfig, Environment};
use request_pipeline::middleware::{Cookies, JsonBody, SanitizedQuery};

mod common;

#[tokio::test]
async fn unmatched_route_yields_404_embedding_the_path() {
    let server = common::spawn_server(AppConfig::default()).await;
    let client = common::client();

    let res = client
        .get(server.url("/no/such/route"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Can't find /no/such/route on the server");
}

#[tokio::test]
async fn every_response_carries_request_id_and_security_headers() {
    let server = common::spawn_server(AppConfig::default()).await;
    let client = common::client();

    let res = client.get(server.url("/anything")).send().await.unwrap();

    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.headers()["x-frame-options"], "SAMEORIGIN");
    assert_eq!(res.headers()["x-content-type-options"], "nosniff");
    assert_eq!(res.headers()["x-dns-prefetch-control"], "off");
    assert_eq!(
        res.headers()["strict-transport-security"],
        "max-age=15552000; includeSubDomains"
    );
}

#[tokio::test]
async fn security_headers_can_be_disabled() {
    let mut config = AppConfig::default();
    config.security.enable_headers = false;

    let server = common::spawn_server(config).await;
    let client = common::client();

    let res = client.get(server.url("/anything")).send().await.unwrap();

    assert!(!res.headers().contains_key("x-frame-options"));
    assert!(!res.headers().contains_key("x-content-type-options"));
}

#[tokio::test]
async fn oversized_body_is_rejected_before_any_route_handler() {
    let hits = Arc::new(AtomicUsize::new(0));
    let route_hits = hits.clone();

    let routes = Router::new().route(
        "/items",
        post(move || {
            let hits = route_hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                StatusCode::CREATED
            }
        }),
    );

    let server = common::spawn_server_with_routes(AppConfig::default(), routes).await;
    let client = common::client();

    // 10_240 bytes is the cap; this payload is comfortably over it.
    let res = client
        .post(server.url("/items"))
        .json(&json!({ "data": "x".repeat(11_000) }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(hits.load(Ordering::SeqCst), 0, "handler must not run");

    let res = client
        .post(server.url("/items"))
        .json(&json!({ "data": "small" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let server = common::spawn_server(AppConfig::default()).await;
    let client = common::client();

    let res = client
        .post(server.url("/items"))
        .header("content-type", "application/json")
        .body("{ definitely not json")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "fail");
}

#[tokio::test]
async fn non_json_bodies_pass_through_untouched() {
    let routes = Router::new().route("/upload", post(|| async { StatusCode::ACCEPTED }));

    let server = common::spawn_server_with_routes(AppConfig::default(), routes).await;
    let client = common::client();

    let res = client
        .post(server.url("/upload"))
        .header("content-type", "text/plain")
        .body("{ definitely not json")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn script_tags_are_neutralized_before_route_handlers() {
    let routes = Router::new().route(
        "/echo",
        post(|Extension(JsonBody(value)): Extension<JsonBody>| async move { Json(value) }),
    );

    let server = common::spawn_server_with_routes(AppConfig::default(), routes).await;
    let client = common::client();

    let res = client
        .post(server.url("/echo"))
        .json(&json!({ "name": "<script>alert('x')</script>" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    let name = body["name"].as_str().unwrap();
    assert!(!name.contains('<'), "markup survived: {name}");
    assert_eq!(
        name,
        "&lt;script&gt;alert(&#x27;x&#x27;)&lt;/script&gt;"
    );
}

#[tokio::test]
async fn query_values_are_sanitized() {
    let routes = Router::new().route(
        "/search",
        get(|Extension(query): Extension<SanitizedQuery>| async move {
            query.get("q").unwrap_or_default().to_string()
        }),
    );

    let server = common::spawn_server_with_routes(AppConfig::default(), routes).await;
    let client = common::client();

    let res = client
        .get(server.url("/search"))
        .query(&[("q", "<b>bold</b>")])
        .send()
        .await
        .unwrap();

    assert_eq!(res.text().await.unwrap(), "&lt;b&gt;bold&lt;/b&gt;");
}

#[tokio::test]
async fn cookies_are_attached_to_the_request_context() {
    let routes = Router::new().route(
        "/whoami",
        get(|Extension(cookies): Extension<Cookies>| async move {
            cookies.get("session").unwrap_or("anonymous").to_string()
        }),
    );

    let server = common::spawn_server_with_routes(AppConfig::default(), routes).await;
    let client = common::client();

    let res = client
        .get(server.url("/whoami"))
        .header("cookie", "session=abc123; theme=dark")
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "abc123");

    let res = client.get(server.url("/whoami")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "anonymous");
}

#[tokio::test]
async fn only_the_configured_origin_receives_cors_headers() {
    let server = common::spawn_server(AppConfig::default()).await;
    let client = common::client();

    let res = client
        .get(server.url("/api/data"))
        .header("origin", "http://localhost:8000")
        .send()
        .await
        .unwrap();

    assert_eq!(
        res.headers()["access-control-allow-origin"],
        "http://localhost:8000"
    );
    assert_eq!(res.headers()["access-control-allow-credentials"], "true");

    let res = client
        .get(server.url("/api/data"))
        .header("origin", "http://evil.example")
        .send()
        .await
        .unwrap();

    assert!(!res.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn large_text_responses_are_compressed_for_gzip_clients() {
    let routes = Router::new().route("/big", get(|| async { "x".repeat(8_192) }));

    let server = common::spawn_server_with_routes(AppConfig::default(), routes).await;
    let client = common::client();

    let res = client
        .get(server.url("/big"))
        .header("accept-encoding", "gzip")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["content-encoding"], "gzip");

    let res = client.get(server.url("/big")).send().await.unwrap();
    assert!(!res.headers().contains_key("content-encoding"));
}

#[tokio::test]
async fn development_mode_serves_requests() {
    let mut config = AppConfig::default();
    config.environment = Environment::Development;

    let server = common::spawn_server(config).await;
    let client = common::client();

    let res = client.get(server.url("/dev-check")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
