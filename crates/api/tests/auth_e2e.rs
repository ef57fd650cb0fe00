//! End-to-end tests for signup, login and the bearer token guard.

#![allow(clippy::unwrap_used)]

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{TimeDelta, Utc};
use common::{JWT_SECRET, TestApp};
use dreamnex_api::db::UserRepository;
use dreamnex_api::services::auth::TokenKeys;
use dreamnex_api::services::auth::token::TOKEN_TTL_DAYS;
use dreamnex_core::{Email, UserId};
use serde_json::json;

#[tokio::test]
async fn test_signup_returns_user_and_token() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/signup",
            None,
            Some(json!({"name": "Ann", "email": "Ann@X.com", "password": "secret1"})),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "User created");
    assert_eq!(body["data"]["user"]["name"], "Ann");
    assert_eq!(body["data"]["user"]["email"], "ann@x.com");
    assert!(body["data"]["user"].get("password").is_none());
    assert!(body["data"]["user"].get("passwordHash").is_none());

    let token = body["data"]["token"].as_str().unwrap();
    let claims = TokenKeys::from_secret(JWT_SECRET.as_bytes())
        .verify(token)
        .unwrap();
    assert_eq!(claims.sub, body["data"]["user"]["id"]);
}

#[tokio::test]
async fn test_signup_then_login_same_identity() {
    let app = TestApp::new();
    let (id, signup_token) = app.signup("a@x.com", "secret1").await;

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "a@x.com", "password": "secret1"})),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Authenticated");
    assert_eq!(body["data"]["user"]["id"], id.as_str());
    assert_ne!(body["data"]["token"], signup_token.as_str());
}

#[tokio::test]
async fn test_signup_duplicate_email_case_insensitive() {
    let app = TestApp::new();
    app.signup("a@x.com", "secret1").await;

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/signup",
            None,
            Some(json!({"email": "A@X.COM", "password": "other12"})),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({"success": false, "message": "Email already registered"}));
    assert_eq!(app.users.len(), 1);
}

#[tokio::test]
async fn test_signup_missing_and_invalid_fields() {
    let app = TestApp::new();

    let (status, body) = app
        .send("POST", "/api/auth/signup", None, Some(json!({"email": "a@x.com"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email and password are required");

    let (status, _) = app
        .send(
            "POST",
            "/api/auth/signup",
            None,
            Some(json!({"email": "not-an-email", "password": "secret1"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/signup",
            None,
            Some(json!({"email": "a@x.com", "password": "12345"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Password must be at least 6 characters");

    assert!(app.users.is_empty());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new();
    app.signup("a@x.com", "secret1").await;

    let wrong_password = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "a@x.com", "password": "wrong12"})),
        )
        .await;
    let unknown_email = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "nobody@x.com", "password": "secret1"})),
        )
        .await;

    assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password.1["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_missing_fields() {
    let app = TestApp::new();

    let (status, body) = app
        .send("POST", "/api/auth/login", None, Some(json!({"password": "secret1"})))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email and password are required");
}

#[tokio::test]
async fn test_malformed_json_is_rejected_in_envelope() {
    let app = TestApp::new();

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = app.send_request(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_me_returns_current_user() {
    let app = TestApp::new();
    let (id, token) = app.signup("a@x.com", "secret1").await;

    let (status, body) = app.send("GET", "/api/auth/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id.as_str());
    assert_eq!(body["data"]["email"], "a@x.com");
}

#[tokio::test]
async fn test_me_for_deleted_identity() {
    let app = TestApp::new();
    let (id, token) = app.signup("a@x.com", "secret1").await;
    assert!(app.users.remove(UserId::parse(&id).unwrap()));

    let (status, body) = app.send("GET", "/api/auth/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_guard_missing_header() {
    let app = TestApp::new();

    let (status, body) = app.send("GET", "/api/auth/me", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({"success": false, "message": "Missing authorization header"})
    );
}

#[tokio::test]
async fn test_guard_invalid_format() {
    let app = TestApp::new();

    for value in ["Bearer", "Bearer ", "sometoken", "Basic dXNlcjpwYXNz"] {
        let request = Request::builder()
            .uri("/api/auth/me")
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap();
        let (status, body) = app.send_request(request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED, "header {value:?}");
        assert_eq!(body["message"], "Invalid authorization format", "header {value:?}");
    }
}

#[tokio::test]
async fn test_guard_rejects_tampered_token() {
    let app = TestApp::new();
    let (_, token) = app.signup("a@x.com", "secret1").await;

    // Swap the payload for another user's while keeping the signature
    let (_, other) = app.signup("b@x.com", "secret1").await;
    let parts: Vec<&str> = token.split('.').collect();
    let other_parts: Vec<&str> = other.split('.').collect();
    let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

    let (status, body) = app.send("GET", "/api/auth/me", Some(&forged), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_guard_rejects_expired_token() {
    let app = TestApp::new();
    app.signup("a@x.com", "secret1").await;
    let user = app
        .users
        .get_by_email(&Email::parse("a@x.com").unwrap())
        .await
        .unwrap()
        .unwrap();

    let issued_at = Utc::now() - TimeDelta::days(TOKEN_TTL_DAYS) - TimeDelta::seconds(5);
    let expired = app.state.tokens().issue_at(&user, issued_at).unwrap();

    let (status, body) = app
        .send("GET", "/api/auth/me", Some(&expired.token), None)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_token_signed_with_other_secret() {
    let app = TestApp::new();
    app.signup("a@x.com", "secret1").await;
    let user = app
        .users
        .get_by_email(&Email::parse("a@x.com").unwrap())
        .await
        .unwrap()
        .unwrap();

    let foreign = TokenKeys::from_secret(b"some-other-deployment-secret-value")
        .issue(&user)
        .unwrap();
    let (status, _) = app
        .send("GET", "/api/auth/me", Some(&foreign.token), None)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
