//! HTTP tests against a live server backed by `PostgreSQL`.
//!
//! Requires a migrated database, see the crate docs.

#![allow(clippy::unwrap_used)]

use dreamnex_integration_tests::{TestContext, unique_email};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

async fn signup(client: &Client, base_url: &str, email: &str) -> (String, String) {
    let resp = client
        .post(format!("{base_url}/api/auth/signup"))
        .json(&json!({"email": email, "password": "secret1"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    (
        body["data"]["user"]["id"].as_str().unwrap().to_owned(),
        body["data"]["token"].as_str().unwrap().to_owned(),
    )
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_readiness() {
    let ctx = TestContext::new().await.unwrap();
    let base_url = ctx.spawn_server().await.unwrap();

    let resp = reqwest::get(format!("{base_url}/health/ready")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_login_after_signup() {
    let ctx = TestContext::new().await.unwrap();
    let base_url = ctx.spawn_server().await.unwrap();
    let client = Client::new();
    let email = unique_email("login");
    let (id, _) = signup(&client, &base_url, &email).await;

    let resp = client
        .post(format!("{base_url}/api/auth/login"))
        .json(&json!({"email": email.to_uppercase(), "password": "secret1"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["user"]["id"], id.as_str());

    let resp = client
        .post(format!("{base_url}/api/auth/signup"))
        .json(&json!({"email": email, "password": "secret1"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_store_ownership() {
    let ctx = TestContext::new().await.unwrap();
    let base_url = ctx.spawn_server().await.unwrap();
    let client = Client::new();
    let (owner_id, owner) = signup(&client, &base_url, &unique_email("owner")).await;
    let (_, intruder) = signup(&client, &base_url, &unique_email("intruder")).await;

    let resp = client
        .post(format!("{base_url}/api/stores"))
        .bearer_auth(&owner)
        .json(&json!({"name": "Mugs", "items": [{"title": "Mug", "price": 9.5}]}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["ownerId"], owner_id.as_str());
    let store_url = format!("{base_url}/api/stores/{}", body["data"]["id"].as_str().unwrap());

    let resp = client
        .put(&store_url)
        .bearer_auth(&intruder)
        .json(&json!({"name": "Mine"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = client
        .put(&store_url)
        .bearer_auth(&owner)
        .json(&json!({"description": "Ceramics"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["name"], "Mugs");
    assert_eq!(body["data"]["items"][0]["price"], 9.5);

    let resp = client.delete(&store_url).bearer_auth(&owner).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
