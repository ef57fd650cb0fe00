//! Store domain types.
//!
//! A store is owned by exactly one identity. The owner is fixed at creation
//! and is the only identity allowed to change or delete the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dreamnex_core::{Price, StoreId, UserId};

/// A store with its product items (domain type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    /// Unique store ID.
    pub id: StoreId,
    /// Identity that created (and owns) the store.
    pub owner_id: UserId,
    /// Store name (never empty).
    pub name: String,
    /// Optional market niche.
    pub niche: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Ordered product items.
    pub items: Vec<StoreItem>,
    /// When the store was created.
    pub created_at: DateTime<Utc>,
    /// When the store was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Store {
    /// Returns `true` if `user_id` owns this store.
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }
}

/// A product item listed in a store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Price>,
}

/// Data needed to insert a new store.
#[derive(Debug, Clone)]
pub struct NewStore {
    pub owner_id: UserId,
    pub name: String,
    pub niche: Option<String>,
    pub description: Option<String>,
    pub items: Vec<StoreItem>,
}
