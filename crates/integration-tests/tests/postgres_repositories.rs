//! Repository tests against `PostgreSQL`.
//!
//! Requires a migrated database, see the crate docs.

#![allow(clippy::unwrap_used)]

use dreamnex_api::db::{
    PgStoreRepository, PgUserRepository, RepositoryError, StoreRepository, UserRepository,
};
use dreamnex_api::models::{NewStore, StoreItem};
use dreamnex_core::{Email, StoreId};
use dreamnex_integration_tests::{TestContext, unique_email};

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_user_email_is_unique_case_insensitively() {
    let ctx = TestContext::new().await.unwrap();
    let users = PgUserRepository::new(ctx.pool.clone());
    let email = unique_email("dup");

    let created = users
        .create_with_password(Some("Ann"), &Email::parse(&email).unwrap(), "hash")
        .await
        .unwrap();
    let err = users
        .create_with_password(None, &Email::parse(&email.to_uppercase()).unwrap(), "hash")
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    let found = users
        .get_with_password(&Email::parse(&email).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.user.id, created.id);
    assert_eq!(found.password_hash, "hash");
    assert_eq!(users.get_by_id(created.id).await.unwrap(), Some(created));
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_store_lifecycle() {
    let ctx = TestContext::new().await.unwrap();
    let users = PgUserRepository::new(ctx.pool.clone());
    let stores = PgStoreRepository::new(ctx.pool.clone());
    let owner = users
        .create_with_password(None, &Email::parse(&unique_email("owner")).unwrap(), "hash")
        .await
        .unwrap();

    let store = stores
        .create(NewStore {
            owner_id: owner.id,
            name: "Mugs".to_owned(),
            niche: Some("kitchen".to_owned()),
            description: None,
            items: vec![StoreItem {
                title: Some("Blue mug".to_owned()),
                ..StoreItem::default()
            }],
        })
        .await
        .unwrap();
    assert_eq!(store.owner_id, owner.id);
    assert_eq!(stores.get_by_id(store.id).await.unwrap().as_ref(), Some(&store));

    let mut changed = store.clone();
    changed.name = "Cups".to_owned();
    changed.items.clear();
    let updated = stores.update(&changed).await.unwrap();
    assert_eq!(updated.name, "Cups");
    assert!(updated.items.is_empty());
    assert_eq!(updated.owner_id, owner.id);
    assert_eq!(updated.created_at, store.created_at);
    assert!(updated.updated_at >= store.updated_at);

    assert!(stores.delete(store.id).await.unwrap());
    assert!(!stores.delete(store.id).await.unwrap());
    assert!(stores.get_by_id(store.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "Requires a running PostgreSQL database"]
async fn test_update_missing_store() {
    let ctx = TestContext::new().await.unwrap();
    let users = PgUserRepository::new(ctx.pool.clone());
    let stores = PgStoreRepository::new(ctx.pool.clone());
    let owner = users
        .create_with_password(None, &Email::parse(&unique_email("gone")).unwrap(), "hash")
        .await
        .unwrap();
    let mut store = stores
        .create(NewStore {
            owner_id: owner.id,
            name: "Mugs".to_owned(),
            niche: None,
            description: None,
            items: vec![],
        })
        .await
        .unwrap();
    store.id = StoreId::generate();

    let err = stores.update(&store).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}
