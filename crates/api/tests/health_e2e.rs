//! End-to-end tests for health endpoints and router-wide behavior.

#![allow(clippy::unwrap_used)]

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::TestApp;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_health_and_readiness() {
    let app = TestApp::new();

    let (status, body) = app.send("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");

    let (status, _) = app.send("GET", "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_ping() {
    let app = TestApp::new();

    let (status, body) = app.send("GET", "/api/ping", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "message": "pong"}));
}

#[tokio::test]
async fn test_unknown_route_uses_envelope() {
    let app = TestApp::new();

    let (status, body) = app.send("GET", "/api/nope", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::new();

    let request = Request::builder()
        .uri("/api/ping")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

#[tokio::test]
async fn test_request_id_is_generated() {
    let app = TestApp::new();

    let request = Request::builder().uri("/api/ping").body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_wrong_method_uses_envelope() {
    let app = TestApp::new();

    for (method, uri) in [
        ("GET", "/api/stores"),
        ("GET", "/api/auth/login"),
        ("POST", "/api/ping"),
        ("DELETE", "/health"),
    ] {
        let (status, body) = app.send(method, uri, None, None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
        assert_eq!(
            body,
            json!({"success": false, "message": "Method not allowed"}),
            "{method} {uri}"
        );
    }
}
