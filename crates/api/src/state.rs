//! Application state shared across handlers.

use std::sync::Arc;

use secrecy::ExposeSecret;
use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::db::{PgStoreRepository, PgUserRepository, StoreRepository, UserRepository};
use crate::services::auth::TokenKeys;
use crate::services::completion::{CompletionClient, CompletionError};
use crate::services::payments::{PaymentClient, PaymentError};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to build completion client: {0}")]
    Completion(#[from] CompletionError),
    #[error("failed to build payment client: {0}")]
    Payment(#[from] PaymentError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like repositories, signing keys and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    users: Arc<dyn UserRepository>,
    stores: Arc<dyn StoreRepository>,
    tokens: TokenKeys,
    completion: Option<CompletionClient>,
    payments: Option<PaymentClient>,
}

impl AppState {
    /// Create application state backed by `PostgreSQL`.
    ///
    /// # Errors
    ///
    /// Returns an error if an upstream HTTP client cannot be built.
    pub fn new(config: ApiConfig, pool: PgPool) -> Result<Self, StateError> {
        Self::with_repositories(
            config,
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgStoreRepository::new(pool)),
        )
    }

    /// Create application state over arbitrary repositories.
    ///
    /// # Errors
    ///
    /// Returns an error if an upstream HTTP client cannot be built.
    pub fn with_repositories(
        config: ApiConfig,
        users: Arc<dyn UserRepository>,
        stores: Arc<dyn StoreRepository>,
    ) -> Result<Self, StateError> {
        let tokens = TokenKeys::from_secret(config.jwt_secret.expose_secret().as_bytes());
        let completion = config
            .openai
            .as_ref()
            .map(CompletionClient::new)
            .transpose()?;
        let payments = config.stripe.as_ref().map(PaymentClient::new).transpose()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                users,
                stores,
                tokens,
                completion,
                payments,
            }),
        })
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get the user repository.
    #[must_use]
    pub fn users(&self) -> &dyn UserRepository {
        self.inner.users.as_ref()
    }

    /// Get the store repository.
    #[must_use]
    pub fn stores(&self) -> &dyn StoreRepository {
        self.inner.stores.as_ref()
    }

    /// Get the token signing/verification keys.
    #[must_use]
    pub fn tokens(&self) -> &TokenKeys {
        &self.inner.tokens
    }

    /// Get the AI completion client, if configured.
    #[must_use]
    pub fn completion(&self) -> Option<&CompletionClient> {
        self.inner.completion.as_ref()
    }

    /// Get the payment client, if configured.
    #[must_use]
    pub fn payments(&self) -> Option<&PaymentClient> {
        self.inner.payments.as_ref()
    }
}
