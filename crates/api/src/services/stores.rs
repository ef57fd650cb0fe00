//! Store management with ownership checks.
//!
//! Any authenticated user may create a store and becomes its owner. Only the
//! owner may update or delete it afterwards.

use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::instrument;

use dreamnex_core::StoreId;

use crate::db::{RepositoryError, StoreRepository};
use crate::models::{AuthUser, NewStore, Store, StoreItem};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Name missing, null or blank.
    #[error("store name is required")]
    NameRequired,

    /// No store with the requested ID (or the ID is malformed).
    #[error("store not found")]
    NotFound,

    /// The caller does not own the store.
    #[error("caller does not own this store")]
    Forbidden,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Request body for creating a store.
#[derive(Debug, Default, Deserialize)]
pub struct CreateStoreRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub niche: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "products")]
    pub items: Option<Vec<StoreItem>>,
}

/// Partial update of a store.
///
/// The outer `Option` records whether the field was present in the request
/// body at all; the inner one whether it was `null`. Absent fields are left
/// alone. Fields outside this set (such as `ownerId`) are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct StorePatch {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub niche: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, alias = "products", deserialize_with = "present")]
    pub items: Option<Option<Vec<StoreItem>>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl StorePatch {
    /// Apply the present fields to `store`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NameRequired` if `name` is present but null or
    /// blank. `store` is left untouched in that case.
    pub fn apply(self, store: &mut Store) -> Result<(), StoreError> {
        let name = match self.name {
            Some(name) => Some(required_name(name)?),
            None => None,
        };

        if let Some(name) = name {
            store.name = name;
        }
        if let Some(niche) = self.niche {
            store.niche = niche;
        }
        if let Some(description) = self.description {
            store.description = description;
        }
        if let Some(items) = self.items {
            store.items = items.unwrap_or_default();
        }
        Ok(())
    }
}

fn required_name(name: Option<String>) -> Result<String, StoreError> {
    name.map(|n| n.trim().to_owned())
        .filter(|n| !n.is_empty())
        .ok_or(StoreError::NameRequired)
}

/// Store service.
pub struct StoreService<'a> {
    stores: &'a dyn StoreRepository,
}

impl<'a> StoreService<'a> {
    /// Create a new store service.
    #[must_use]
    pub const fn new(stores: &'a dyn StoreRepository) -> Self {
        Self { stores }
    }

    /// Create a store owned by `caller`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NameRequired` if the name is missing or blank.
    #[instrument(skip(self, caller, request), fields(user_id = %caller.id))]
    pub async fn create(
        &self,
        caller: &AuthUser,
        request: CreateStoreRequest,
    ) -> Result<Store, StoreError> {
        let name = required_name(request.name)?;

        let store = self
            .stores
            .create(NewStore {
                owner_id: caller.id,
                name,
                niche: request.niche,
                description: request.description,
                items: request.items.unwrap_or_default(),
            })
            .await?;

        tracing::info!(store_id = %store.id, "store created");
        Ok(store)
    }

    /// Apply a partial update to a store owned by `caller`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no store has this ID,
    /// `StoreError::Forbidden` if `caller` is not the owner, and
    /// `StoreError::NameRequired` if the patch blanks the name.
    #[instrument(skip(self, caller, patch), fields(user_id = %caller.id))]
    pub async fn update(
        &self,
        caller: &AuthUser,
        id: &str,
        patch: StorePatch,
    ) -> Result<Store, StoreError> {
        let mut store = self.load_owned(caller, id).await?;
        patch.apply(&mut store)?;

        let store = self.stores.update(&store).await.map_err(|e| match e {
            RepositoryError::NotFound => StoreError::NotFound,
            other => StoreError::Repository(other),
        })?;

        tracing::info!(store_id = %store.id, "store updated");
        Ok(store)
    }

    /// Delete a store owned by `caller`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no store has this ID and
    /// `StoreError::Forbidden` if `caller` is not the owner.
    #[instrument(skip(self, caller), fields(user_id = %caller.id))]
    pub async fn delete(&self, caller: &AuthUser, id: &str) -> Result<(), StoreError> {
        let store = self.load_owned(caller, id).await?;

        if !self.stores.delete(store.id).await? {
            return Err(StoreError::NotFound);
        }

        tracing::info!(store_id = %store.id, "store deleted");
        Ok(())
    }

    async fn load_owned(&self, caller: &AuthUser, id: &str) -> Result<Store, StoreError> {
        let id = StoreId::parse(id).ok_or(StoreError::NotFound)?;
        let store = self
            .stores
            .get_by_id(id)
            .await?
            .ok_or(StoreError::NotFound)?;

        if !store.is_owned_by(caller.id) {
            tracing::warn!(store_id = %store.id, owner_id = %store.owner_id, "ownership check failed");
            return Err(StoreError::Forbidden);
        }
        Ok(store)
    }
}
