//! Identity domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use dreamnex_core::{Email, UserId};

/// A registered identity (domain type).
///
/// Never carries the password hash; repositories hand that out separately
/// and only to the login path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Optional display name.
    pub name: Option<String>,
    /// Normalized email address (unique).
    pub email: Email,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Public view of a [`User`] returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: Option<String>,
    pub email: Email,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// The authenticated caller of a protected request.
///
/// Built from verified token claims by the access guard; lives only for the
/// duration of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthUser {
    /// Identity ID from the token subject.
    pub id: UserId,
    /// Email address from the token claims.
    pub email: String,
}
