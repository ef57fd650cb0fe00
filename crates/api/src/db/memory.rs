//! In-memory repositories.
//!
//! Same contracts as the `PostgreSQL` repositories: emails are unique,
//! stores keep their owner and creation time across updates. Used by the
//! test suites and handy for running the API without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use dreamnex_core::{Email, StoreId, UserId};

use super::{RepositoryError, StoreRepository, UserRepository, UserWithPassword};
use crate::models::{NewStore, Store, User};

/// Thread-safe in-memory user store.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, UserWithPassword>>,
}

impl InMemoryUserRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    /// Returns `true` if no users are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }

    /// Remove a user. Lets tests simulate an identity disappearing while
    /// its tokens are still valid.
    pub fn remove(&self, id: UserId) -> bool {
        self.users.write().remove(&id).is_some()
    }

    fn find_by_email(&self, email: &Email) -> Option<UserWithPassword> {
        self.users
            .read()
            .values()
            .find(|u| &u.user.email == email)
            .cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().get(&id).map(|u| u.user.clone()))
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self.find_by_email(email).map(|u| u.user))
    }

    async fn get_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<UserWithPassword>, RepositoryError> {
        Ok(self.find_by_email(email))
    }

    async fn create_with_password(
        &self,
        name: Option<&str>,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        // Check and insert under one write lock so concurrent signups for
        // the same email cannot both succeed.
        let mut users = self.users.write();
        if users.values().any(|u| &u.user.email == email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let now = Utc::now();
        let user = User {
            id: UserId::generate(),
            name: name.map(str::to_owned),
            email: email.clone(),
            created_at: now,
            updated_at: now,
        };
        users.insert(
            user.id,
            UserWithPassword {
                user: user.clone(),
                password_hash: password_hash.to_owned(),
            },
        );
        drop(users);

        Ok(user)
    }
}

/// Thread-safe in-memory store repository.
#[derive(Debug, Default)]
pub struct InMemoryStoreRepository {
    stores: RwLock<HashMap<StoreId, Store>>,
}

impl InMemoryStoreRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stores.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stores.read().len()
    }

    /// Returns `true` if there are no stores.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stores.read().is_empty()
    }
}

#[async_trait]
impl StoreRepository for InMemoryStoreRepository {
    async fn create(&self, store: NewStore) -> Result<Store, RepositoryError> {
        let now = Utc::now();
        let store = Store {
            id: StoreId::generate(),
            owner_id: store.owner_id,
            name: store.name,
            niche: store.niche,
            description: store.description,
            items: store.items,
            created_at: now,
            updated_at: now,
        };
        self.stores.write().insert(store.id, store.clone());
        Ok(store)
    }

    async fn get_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        Ok(self.stores.read().get(&id).cloned())
    }

    async fn update(&self, store: &Store) -> Result<Store, RepositoryError> {
        let mut stores = self.stores.write();
        let existing = stores.get_mut(&store.id).ok_or(RepositoryError::NotFound)?;

        existing.name.clone_from(&store.name);
        existing.niche.clone_from(&store.niche);
        existing.description.clone_from(&store.description);
        existing.items.clone_from(&store.items);
        existing.updated_at = Utc::now();

        Ok(existing.clone())
    }

    async fn delete(&self, id: StoreId) -> Result<bool, RepositoryError> {
        Ok(self.stores.write().remove(&id).is_some())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::StoreItem;

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicate_email() {
        let repo = InMemoryUserRepository::new();
        repo.create_with_password(None, &email("a@x.com"), "hash")
            .await
            .unwrap();

        let err = repo
            .create_with_password(Some("Other"), &email("A@X.COM"), "hash2")
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_get_with_password() {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .create_with_password(Some("Ann"), &email("ann@x.com"), "phc-hash")
            .await
            .unwrap();

        let found = repo
            .get_with_password(&email("ann@x.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.user, user);
        assert_eq!(found.password_hash, "phc-hash");
        assert!(
            repo.get_with_password(&email("bob@x.com"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_store_update_keeps_owner_and_created_at() {
        let repo = InMemoryStoreRepository::new();
        let owner = UserId::generate();
        let created = repo
            .create(NewStore {
                owner_id: owner,
                name: "Shop".to_owned(),
                niche: None,
                description: None,
                items: vec![],
            })
            .await
            .unwrap();

        let mut changed = created.clone();
        changed.owner_id = UserId::generate();
        changed.name = "Renamed".to_owned();
        changed.items = vec![StoreItem {
            title: Some("Mug".to_owned()),
            ..StoreItem::default()
        }];

        let updated = repo.update(&changed).await.unwrap();
        assert_eq!(updated.owner_id, owner);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.items.len(), 1);
    }

    #[tokio::test]
    async fn test_store_delete() {
        let repo = InMemoryStoreRepository::new();
        let store = repo
            .create(NewStore {
                owner_id: UserId::generate(),
                name: "Shop".to_owned(),
                niche: None,
                description: None,
                items: vec![],
            })
            .await
            .unwrap();

        assert!(repo.delete(store.id).await.unwrap());
        assert!(!repo.delete(store.id).await.unwrap());
        assert!(repo.get_by_id(store.id).await.unwrap().is_none());
    }
}
