//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DREAMNEX_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `DREAMNEX_JWT_SECRET` - Token signing secret (falls back to `JWT_SECRET`).
//!   Required in production (min 32 chars, high entropy). In development a random
//!   per-process secret is generated when absent.
//!
//! ## Optional
//! - `DREAMNEX_ENV` - `development` (default) or `production`
//! - `DREAMNEX_HOST` - Bind address (default: 127.0.0.1)
//! - `DREAMNEX_PORT` - Listen port (default: 5000)
//! - `DREAMNEX_CORS_ORIGIN` - Single allowed CORS origin (default: any origin)
//! - `OPENAI_API_KEY` - Enables the AI completion proxy
//! - `OPENAI_MODEL` - Completion model (default: gpt-3.5-turbo)
//! - `OPENAI_API_URL` - Chat completions endpoint
//! - `STRIPE_SECRET_KEY` - Enables the payment intent proxy
//! - `STRIPE_API_URL` - Stripe API base URL (default: <https://api.stripe.com/v1>)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `LOG_FORMAT` - `pretty` (default) or `json`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use rand::Rng;
use rand::distr::Alphanumeric;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const GENERATED_SECRET_LENGTH: usize = 48;

const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_STRIPE_API_URL: &str = "https://api.stripe.com/v1";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "change_this",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Deployment environment.
///
/// Production turns missing or weak signing secrets into startup failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    /// Returns `true` for production deployments.
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Deployment environment
    pub environment: Environment,
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Bearer token signing secret
    pub jwt_secret: SecretString,
    /// Whether `jwt_secret` was generated for this process only
    pub jwt_secret_generated: bool,
    /// Allowed CORS origin (`None` allows any origin)
    pub cors_origin: Option<String>,
    /// AI completion proxy configuration
    pub openai: Option<OpenAiConfig>,
    /// Payment proxy configuration
    pub stripe: Option<StripeConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
    /// Log output format
    pub log_format: LogFormat,
}

/// `OpenAI`-compatible chat completion API configuration.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: SecretString,
    pub model: String,
    pub api_url: String,
}

/// Stripe API configuration.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: SecretString,
    pub api_url: String,
}

/// Lookup function for configuration values.
type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the signing secret fails validation in production.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    /// Load configuration from an in-memory map of variables.
    ///
    /// # Errors
    ///
    /// Same as [`ApiConfig::from_env`].
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(&|key| vars.get(key).cloned())
    }

    fn from_lookup(lookup: Lookup<'_>) -> Result<Self, ConfigError> {
        let environment = match get_optional_env(lookup, "DREAMNEX_ENV") {
            Some(value) => Environment::parse(&value).ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "DREAMNEX_ENV".to_string(),
                    format!("expected development or production, got '{value}'"),
                )
            })?,
            None => Environment::default(),
        };

        let database_url = SecretString::from(get_with_fallback(
            lookup,
            "DREAMNEX_DATABASE_URL",
            "DATABASE_URL",
        )?);
        let host = get_env_or_default(lookup, "DREAMNEX_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("DREAMNEX_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default(lookup, "DREAMNEX_PORT", "5000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("DREAMNEX_PORT".to_string(), e.to_string()))?;

        let (jwt_secret, jwt_secret_generated) = load_jwt_secret(lookup, environment)?;

        let log_format = match get_optional_env(lookup, "LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::InvalidEnvVar(
                    "LOG_FORMAT".to_string(),
                    format!("expected pretty or json, got '{other}'"),
                ));
            }
        };

        let cors_origin = get_optional_env(lookup, "DREAMNEX_CORS_ORIGIN");
        if let Some(origin) = &cors_origin
            && axum::http::HeaderValue::from_str(origin).is_err()
        {
            return Err(ConfigError::InvalidEnvVar(
                "DREAMNEX_CORS_ORIGIN".to_string(),
                format!("'{origin}' is not a valid origin header value"),
            ));
        }

        Ok(Self {
            environment,
            database_url,
            host,
            port,
            jwt_secret,
            jwt_secret_generated,
            cors_origin,
            openai: OpenAiConfig::from_lookup(lookup),
            stripe: StripeConfig::from_lookup(lookup),
            sentry_dsn: get_optional_env(lookup, "SENTRY_DSN"),
            sentry_environment: get_optional_env(lookup, "SENTRY_ENVIRONMENT"),
            log_format,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl OpenAiConfig {
    fn from_lookup(lookup: Lookup<'_>) -> Option<Self> {
        let api_key = get_optional_env(lookup, "OPENAI_API_KEY")?;
        Some(Self {
            api_key: SecretString::from(api_key),
            model: get_env_or_default(lookup, "OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            api_url: get_env_or_default(lookup, "OPENAI_API_URL", DEFAULT_OPENAI_API_URL),
        })
    }
}

impl StripeConfig {
    fn from_lookup(lookup: Lookup<'_>) -> Option<Self> {
        let secret_key = get_optional_env(lookup, "STRIPE_SECRET_KEY")?;
        Some(Self {
            secret_key: SecretString::from(secret_key),
            api_url: get_env_or_default(lookup, "STRIPE_API_URL", DEFAULT_STRIPE_API_URL),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional, non-empty variable.
fn get_optional_env(lookup: Lookup<'_>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

/// Get a variable with a default value.
fn get_env_or_default(lookup: Lookup<'_>, key: &str, default: &str) -> String {
    get_optional_env(lookup, key).unwrap_or_else(|| default.to_string())
}

/// Get a required variable, falling back to a generic name (e.g. `DATABASE_URL`).
fn get_with_fallback(
    lookup: Lookup<'_>,
    primary_key: &str,
    fallback_key: &str,
) -> Result<String, ConfigError> {
    get_optional_env(lookup, primary_key)
        .or_else(|| get_optional_env(lookup, fallback_key))
        .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Load the token signing secret.
///
/// Returns the secret and whether it was generated for this process.
fn load_jwt_secret(
    lookup: Lookup<'_>,
    environment: Environment,
) -> Result<(SecretString, bool), ConfigError> {
    const KEY: &str = "DREAMNEX_JWT_SECRET";

    let configured = get_optional_env(lookup, KEY).or_else(|| get_optional_env(lookup, "JWT_SECRET"));

    match (configured, environment) {
        (Some(value), Environment::Production) => {
            let secret = SecretString::from(value);
            validate_secret_length(&secret, KEY)?;
            validate_secret_strength(secret.expose_secret(), KEY)?;
            Ok((secret, false))
        }
        (Some(value), Environment::Development) => Ok((SecretString::from(value), false)),
        (None, Environment::Production) => Err(ConfigError::MissingEnvVar(KEY.to_string())),
        (None, Environment::Development) => Ok((generate_secret(), true)),
    }
}

/// Generate a random secret for development use.
fn generate_secret() -> SecretString {
    let value: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_SECRET_LENGTH)
        .map(char::from)
        .collect();
    SecretString::from(value)
}

/// Validate that a secret meets minimum length requirements.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}
