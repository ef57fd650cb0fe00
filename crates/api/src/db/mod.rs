//! Database access for the API.
//!
//! # Database: `dreamnex`
//!
//! ## Tables
//!
//! - `users` - Registered identities (email unique, Argon2 password hash)
//! - `stores` - Stores owned by a user, items kept as JSONB
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p dreamnex-cli -- migrate run
//! ```
//!
//! Services only see the [`UserRepository`] and [`StoreRepository`] traits.
//! The `Pg*` types are the production implementations; [`memory`] holds
//! in-process implementations for tests and local experiments.

pub mod memory;
pub mod stores;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use dreamnex_core::{Email, StoreId, UserId};

use crate::models::{NewStore, Store, User};

pub use stores::PgStoreRepository;
pub use users::PgUserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// A user together with their stored password hash.
///
/// Only the login path ever asks for this.
#[derive(Debug, Clone)]
pub struct UserWithPassword {
    pub user: User,
    pub password_hash: String,
}

/// Storage for registered identities.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Get a user by their ID.
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Get a user by their normalized email address.
    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Get a user and their password hash by email.
    async fn get_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<UserWithPassword>, RepositoryError>;

    /// Create a new user.
    ///
    /// Returns `RepositoryError::Conflict` if the email is already taken.
    async fn create_with_password(
        &self,
        name: Option<&str>,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError>;
}

/// Storage for stores and their items.
#[async_trait]
pub trait StoreRepository: Send + Sync {
    /// Insert a new store.
    async fn create(&self, store: NewStore) -> Result<Store, RepositoryError>;

    /// Get a store by its ID.
    async fn get_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError>;

    /// Overwrite the mutable fields of an existing store.
    ///
    /// The owner and creation time are never changed. Returns
    /// `RepositoryError::NotFound` if the store no longer exists.
    async fn update(&self, store: &Store) -> Result<Store, RepositoryError>;

    /// Delete a store. Returns `false` if it did not exist.
    async fn delete(&self, id: StoreId) -> Result<bool, RepositoryError>;
}

/// Map a unique-constraint violation to `RepositoryError::Conflict`.
pub(crate) fn conflict_on_unique(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
