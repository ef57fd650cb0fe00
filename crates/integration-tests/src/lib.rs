//! Integration tests for DreamNex against a real `PostgreSQL` database.
//!
//! # Running Tests
//!
//! ```bash
//! export DREAMNEX_TEST_DATABASE_URL=postgres://localhost/dreamnex_test
//! cargo test -p dreamnex-integration-tests -- --ignored
//! ```
//!
//! Every test creates its own identities with random emails, so the suite
//! can run repeatedly against the same database.

use std::collections::HashMap;

use dreamnex_api::config::{ApiConfig, ConfigError};
use dreamnex_api::state::StateError;
use dreamnex_api::{AppState, app};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../api/migrations");

/// Signing secret used by servers spawned from a [`TestContext`].
pub const TEST_JWT_SECRET: &str = "integration-signing-secret-0123456789";

/// Errors that can occur while preparing the test environment.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("DREAMNEX_TEST_DATABASE_URL (or DATABASE_URL) is not set")]
    MissingDatabaseUrl,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("state error: {0}")]
    State(#[from] StateError),
    #[error("failed to bind test server: {0}")]
    Bind(#[from] std::io::Error),
}

/// A migrated database pool shared by one test.
pub struct TestContext {
    pub pool: PgPool,
    database_url: String,
}

impl TestContext {
    /// Connect to the test database and apply pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if no database URL is configured, the database is
    /// unreachable, or a migration fails.
    pub async fn new() -> Result<Self, SetupError> {
        let database_url = std::env::var("DREAMNEX_TEST_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .map_err(|_| SetupError::MissingDatabaseUrl)?;

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await?;
        MIGRATOR.run(&pool).await?;

        Ok(Self { pool, database_url })
    }

    /// Serve the full API on an ephemeral port and return its base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot be configured or bound.
    pub async fn spawn_server(&self) -> Result<String, SetupError> {
        let vars = HashMap::from([
            ("DATABASE_URL".to_owned(), self.database_url.clone()),
            ("JWT_SECRET".to_owned(), TEST_JWT_SECRET.to_owned()),
        ]);
        let config = ApiConfig::from_map(&vars)?;
        let state = AppState::new(config, self.pool.clone())?;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        Ok(format!("http://{addr}"))
    }
}

/// A random email that will not collide with earlier runs.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", uuid::Uuid::new_v4().simple())
}
