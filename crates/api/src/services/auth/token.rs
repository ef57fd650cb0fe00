//! Signed bearer tokens.
//!
//! Tokens are HS256 JWTs valid for seven days. Nothing is stored server-side:
//! a token is valid if its signature checks out and it has not expired, so
//! there is no way to revoke one early.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use dreamnex_core::UserId;

use crate::models::{AuthUser, User};

/// How long an issued token stays valid.
pub const TOKEN_TTL_DAYS: i64 = 7;

/// Token verification failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The token was well-formed and correctly signed but is past its expiry.
    #[error("token expired")]
    Expired,

    /// Bad signature, malformed token, or unusable claims.
    #[error("invalid token")]
    Invalid,

    /// Signing failed.
    #[error("failed to sign token")]
    Signing,
}

/// Claims carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: String,
    /// User email at issue time.
    pub email: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expires at (unix seconds).
    pub exp: i64,
    /// Unique token ID.
    pub jti: String,
}

impl Claims {
    /// Build the request identity from verified claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` if the subject is not a user ID.
    pub fn auth_user(&self) -> Result<AuthUser, TokenError> {
        let id = UserId::parse(&self.sub).ok_or(TokenError::Invalid)?;
        Ok(AuthUser {
            id,
            email: self.email.clone(),
        })
    }
}

/// A freshly signed token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Keys for signing and verifying tokens, built once at startup.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys").finish_non_exhaustive()
    }
}

impl TokenKeys {
    /// Derive signing and verification keys from a shared secret.
    #[must_use]
    pub fn from_secret(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a token for `user` starting now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if the token cannot be encoded.
    pub fn issue(&self, user: &User) -> Result<IssuedToken, TokenError> {
        self.issue_at(user, Utc::now())
    }

    /// Issue a token for `user` as if the current time were `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if the token cannot be encoded.
    pub fn issue_at(
        &self,
        user: &User,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = issued_at + TimeDelta::days(TOKEN_TTL_DAYS);
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| {
                tracing::error!(error = %e, "failed to sign token");
                TokenError::Signing
            })?;

        Ok(IssuedToken { token, claims })
    }

    /// Verify a token and return its claims unchanged.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` if the token is past its expiry and
    /// `TokenError::Invalid` for any other failure.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use dreamnex_core::Email;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: UserId::generate(),
            name: Some("Ann".to_owned()),
            email: Email::parse("ann@x.com").unwrap(),
            created_at: now,
            updated_at: now,
        }
    }

    fn keys() -> TokenKeys {
        TokenKeys::from_secret(b"test-signing-secret-with-enough-bytes")
    }

    #[test]
    fn test_issue_then_verify() {
        let keys = keys();
        let user = user();
        let issued = keys.issue(&user).unwrap();

        let claims = keys.verify(&issued.token).unwrap();
        assert_eq!(claims, issued.claims);
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, "ann@x.com");
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_DAYS * 24 * 60 * 60);
        assert_eq!(claims.auth_user().unwrap().id, user.id);
    }

    #[test]
    fn test_tokens_are_unique() {
        let keys = keys();
        let user = user();
        let now = Utc::now();
        let a = keys.issue_at(&user, now).unwrap();
        let b = keys.issue_at(&user, now).unwrap();
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn test_expired_token() {
        let keys = keys();
        let issued_at = Utc::now() - TimeDelta::days(TOKEN_TTL_DAYS) - TimeDelta::minutes(1);
        let issued = keys.issue_at(&user(), issued_at).unwrap();

        assert_eq!(keys.verify(&issued.token), Err(TokenError::Expired));
    }

    #[test]
    fn test_tampered_signature() {
        let keys = keys();
        let issued = keys.issue(&user()).unwrap();

        // Flip one character inside the signature segment
        let sig_start = issued.token.rfind('.').unwrap() + 1;
        let mut token = issued.token.into_bytes();
        let pos = sig_start + 4;
        token[pos] = if token[pos] == b'A' { b'B' } else { b'A' };
        let token = String::from_utf8(token).unwrap();

        assert_eq!(keys.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_wrong_secret() {
        let issued = keys().issue(&user()).unwrap();
        let other = TokenKeys::from_secret(b"a-completely-different-secret-value");
        assert_eq!(other.verify(&issued.token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_garbage() {
        assert_eq!(keys().verify("not.a.jwt"), Err(TokenError::Invalid));
        assert_eq!(keys().verify(""), Err(TokenError::Invalid));
    }
}
