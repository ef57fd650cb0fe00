//! Shared helpers for the end-to-end router tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use dreamnex_api::config::ApiConfig;
use dreamnex_api::db::memory::{InMemoryStoreRepository, InMemoryUserRepository};
use dreamnex_api::{AppState, app};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const JWT_SECRET: &str = "e2e-signing-secret-e2e-signing-secret";

/// A router over in-memory repositories.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub users: Arc<InMemoryUserRepository>,
    pub stores: Arc<InMemoryStoreRepository>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_env(&[])
    }

    /// Build an app with extra environment variables on top of the defaults.
    pub fn with_env(extra: &[(&str, &str)]) -> Self {
        let vars: HashMap<String, String> = [
            ("DATABASE_URL", "postgres://unused/dreamnex"),
            ("JWT_SECRET", JWT_SECRET),
        ]
        .iter()
        .chain(extra)
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();

        let config = ApiConfig::from_map(&vars).unwrap();
        let users = Arc::new(InMemoryUserRepository::new());
        let stores = Arc::new(InMemoryStoreRepository::new());
        let state = AppState::with_repositories(config, users.clone(), stores.clone()).unwrap();

        Self {
            router: app(state.clone()),
            state,
            users,
            stores,
        }
    }

    /// Send a request and return the status and JSON body.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send_request(request).await
    }

    /// Send a prepared request and return the status and JSON body.
    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    /// Sign up and return `(user id, token)`.
    pub async fn signup(&self, email: &str, password: &str) -> (String, String) {
        let (status, body) = self
            .send(
                "POST",
                "/api/auth/signup",
                None,
                Some(json!({"name": "Test", "email": email, "password": password})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
        (
            body["data"]["user"]["id"].as_str().unwrap().to_owned(),
            body["data"]["token"].as_str().unwrap().to_owned(),
        )
    }

    /// Create a store and return its JSON.
    pub async fn create_store(&self, token: &str, body: Value) -> Value {
        let (status, body) = self.send("POST", "/api/stores", Some(token), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "create store failed: {body}");
        body["data"].clone()
    }
}
