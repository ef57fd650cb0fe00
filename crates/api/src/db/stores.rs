//! `PostgreSQL` store repository.
//!
//! Items are kept in a single JSONB column so a store is always read and
//! written as one row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use dreamnex_core::{StoreId, UserId};

use super::{RepositoryError, StoreRepository};
use crate::models::{NewStore, Store, StoreItem};

const STORE_COLUMNS: &str =
    "id, owner_id, name, niche, description, items, created_at, updated_at";

#[derive(Debug, FromRow)]
struct StoreRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    niche: Option<String>,
    description: Option<String>,
    items: Json<Vec<StoreItem>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StoreRow> for Store {
    fn from(row: StoreRow) -> Self {
        Self {
            id: StoreId::new(row.id),
            owner_id: UserId::new(row.owner_id),
            name: row.name,
            niche: row.niche,
            description: row.description,
            items: row.items.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for store database operations.
#[derive(Clone)]
pub struct PgStoreRepository {
    pool: PgPool,
}

impl PgStoreRepository {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreRepository for PgStoreRepository {
    async fn create(&self, store: NewStore) -> Result<Store, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "INSERT INTO stores (id, owner_id, name, niche, description, items) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {STORE_COLUMNS}"
        ))
        .bind(StoreId::generate())
        .bind(store.owner_id)
        .bind(&store.name)
        .bind(&store.niche)
        .bind(&store.description)
        .bind(Json(&store.items))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM stores WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Store::from))
    }

    async fn update(&self, store: &Store) -> Result<Store, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "UPDATE stores \
             SET name = $2, niche = $3, description = $4, items = $5, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {STORE_COLUMNS}"
        ))
        .bind(store.id)
        .bind(&store.name)
        .bind(&store.niche)
        .bind(&store.description)
        .bind(Json(&store.items))
        .fetch_optional(&self.pool)
        .await?;

        row.map(Store::from).ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: StoreId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM stores WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
