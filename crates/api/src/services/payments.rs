//! Payment intent proxy (Stripe).
//!
//! Thin wrapper over the Stripe `PaymentIntents` API. Requests are
//! form-encoded and authenticated with the secret key as a bearer token.

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::config::StripeConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur when calling the payment API.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The request was rejected before reaching the API.
    #[error("invalid payment request: {0}")]
    InvalidRequest(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status returned by the API.
        status: u16,
        /// Error message from the API body.
        message: String,
    },

    /// Failed to parse response.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Request body for creating a payment intent.
#[derive(Debug, Default, Deserialize)]
pub struct CreateIntentRequest {
    /// Amount in the currency's minor unit (e.g. cents).
    #[serde(default)]
    pub amount: Option<i64>,
    /// ISO 4217 currency code.
    #[serde(default)]
    pub currency: Option<String>,
}

/// A validated payment intent request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewIntent {
    pub amount: i64,
    pub currency: String,
}

impl CreateIntentRequest {
    /// Validate the request.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidRequest` if the amount is missing or not
    /// positive, or the currency is not a three-letter code.
    pub fn validate(self) -> Result<NewIntent, PaymentError> {
        let amount = self
            .amount
            .filter(|a| *a > 0)
            .ok_or_else(|| PaymentError::InvalidRequest("amount must be a positive integer".to_owned()))?;

        let currency = self
            .currency
            .map(|c| c.trim().to_ascii_lowercase())
            .filter(|c| c.len() == 3 && c.chars().all(|ch| ch.is_ascii_alphabetic()))
            .ok_or_else(|| {
                PaymentError::InvalidRequest("currency must be a 3-letter code".to_owned())
            })?;

        Ok(NewIntent { amount, currency })
    }
}

/// The parts of a Stripe payment intent returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    #[serde(default, alias = "client_secret")]
    pub client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Stripe payment intents client.
#[derive(Clone)]
pub struct PaymentClient {
    inner: Arc<PaymentClientInner>,
}

struct PaymentClientInner {
    client: reqwest::Client,
    secret_key: SecretString,
    api_url: String,
}

impl PaymentClient {
    /// Create a new payment client.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Http` if the HTTP client cannot be built.
    pub fn new(config: &StripeConfig) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(PaymentClientInner {
                client,
                secret_key: config.secret_key.clone(),
                api_url: config.api_url.trim_end_matches('/').to_owned(),
            }),
        })
    }

    /// Create a payment intent.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    #[instrument(skip(self), fields(amount = intent.amount, currency = %intent.currency))]
    pub async fn create_intent(&self, intent: &NewIntent) -> Result<PaymentIntent, PaymentError> {
        let amount = intent.amount.to_string();
        let form = [("amount", amount.as_str()), ("currency", intent.currency.as_str())];
        self.post(&format!("{}/payment_intents", self.inner.api_url), &form)
            .await
    }

    /// Confirm an existing payment intent.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidRequest` for a malformed intent ID, or
    /// an error if the request fails or the API rejects it.
    #[instrument(skip(self))]
    pub async fn confirm_intent(&self, id: &str) -> Result<PaymentIntent, PaymentError> {
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(PaymentError::InvalidRequest(
                "invalid payment intent id".to_owned(),
            ));
        }

        let form: [(&str, &str); 0] = [];
        self.post(
            &format!("{}/payment_intents/{id}/confirm", self.inner.api_url),
            &form,
        )
        .await
    }

    async fn post<F: Serialize + ?Sized>(
        &self,
        url: &str,
        form: &F,
    ) -> Result<PaymentIntent, PaymentError> {
        let response = self
            .inner
            .client
            .post(url)
            .bearer_auth(self.inner.secret_key.expose_secret())
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map_or(body, |e| e.error.message);
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| PaymentError::Parse(format!("Failed to parse payment intent: {e}")))
    }
}
