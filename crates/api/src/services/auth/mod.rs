//! Authentication service.
//!
//! Password signup and login. A successful call returns the user's public
//! profile together with a freshly issued bearer token.

mod error;
pub mod password;
pub mod token;

pub use error::AuthError;
pub use password::{
    hash_password, hash_password_blocking, verify_password, verify_password_blocking,
};
pub use token::{Claims, IssuedToken, TokenError, TokenKeys};

use serde::{Deserialize, Serialize};
use tracing::instrument;

use dreamnex_core::{Email, UserId};

use crate::db::{RepositoryError, UserRepository};
use crate::models::{User, UserProfile};

/// Minimum password length (in characters).
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Signup request body.
///
/// Every field is optional at the JSON level so that missing fields are
/// reported through [`AuthError::MissingCredentials`] instead of a generic
/// deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// A signup request that passed validation.
#[derive(Debug)]
pub struct ValidSignup {
    pub name: Option<String>,
    pub email: Email,
    pub password: String,
}

impl SignupRequest {
    /// Validate the request.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingCredentials` if email or password is blank,
    /// `AuthError::InvalidEmail` if the email is malformed, and
    /// `AuthError::WeakPassword` if the password is too short.
    pub fn validate(self) -> Result<ValidSignup, AuthError> {
        let (email, password) = required_credentials(self.email, self.password)?;
        let email = Email::parse(&email)?;
        validate_password(&password)?;

        let name = self
            .name
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty());

        Ok(ValidSignup {
            name,
            email,
            password,
        })
    }
}

/// Login request body.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Successful signup or login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub user: UserProfile,
    pub token: String,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: &'a dyn UserRepository,
    tokens: &'a TokenKeys,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a dyn UserRepository, tokens: &'a TokenKeys) -> Self {
        Self { users, tokens }
    }

    /// Register a new user and issue their first token.
    ///
    /// # Errors
    ///
    /// Returns the validation errors of [`SignupRequest::validate`],
    /// `AuthError::UserAlreadyExists` if the email is already registered
    /// (in any letter case), and `AuthError::Repository`,
    /// `AuthError::PasswordHash` or `AuthError::Token` for internal failures.
    #[instrument(skip(self, request))]
    pub async fn signup(&self, request: SignupRequest) -> Result<AuthSession, AuthError> {
        let signup = request.validate()?;

        if self.users.get_by_email(&signup.email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password_blocking(signup.password).await?;

        let user = self
            .users
            .create_with_password(signup.name.as_deref(), &signup.email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "user signed up");
        self.session_for(&user)
    }

    /// Check a user's password and issue a new token.
    ///
    /// Unknown emails, malformed emails and wrong passwords all fail the
    /// same way.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingCredentials` if email or password is blank,
    /// `AuthError::InvalidCredentials` if they do not match a user.
    #[instrument(skip(self, request))]
    pub async fn login(&self, request: LoginRequest) -> Result<AuthSession, AuthError> {
        let (email, password) = required_credentials(request.email, request.password)?;

        // Every failure below costs one Argon2 verification
        let found = match Email::parse(&email) {
            Ok(email) => self.users.get_with_password(&email).await?,
            Err(_) => None,
        };
        let hash = found.as_ref().map(|f| f.password_hash.clone());

        if !verify_password_blocking(password, hash).await {
            if let Some(found) = &found {
                tracing::debug!(user_id = %found.user.id, "wrong password");
            }
            return Err(AuthError::InvalidCredentials);
        }

        let Some(found) = found else {
            return Err(AuthError::InvalidCredentials);
        };

        self.session_for(&found.user)
    }

    /// Look up the user a verified token belongs to.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user no longer exists.
    pub async fn current_user(&self, id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    fn session_for(&self, user: &User) -> Result<AuthSession, AuthError> {
        let issued = self.tokens.issue(user)?;
        Ok(AuthSession {
            user: UserProfile::from(user),
            token: issued.token,
        })
    }
}

fn required_credentials(
    email: Option<String>,
    password: Option<String>,
) -> Result<(String, String), AuthError> {
    match (email, password) {
        (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
            Ok((email, password))
        }
        _ => Err(AuthError::MissingCredentials),
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}
