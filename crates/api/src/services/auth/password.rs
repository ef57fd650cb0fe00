//! Password hashing with Argon2id.
//!
//! Hashing is CPU-bound, so the async entry points run it on tokio's
//! blocking pool instead of a runtime worker.

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use super::AuthError;

/// Hash checked when a login names no stored user, so that path costs the
/// same Argon2 work as a wrong password.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    hash_password("dreamnex-unmatched-login").unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to build dummy password hash");
        String::new()
    })
});

/// Hash a password using Argon2id with a fresh random salt.
///
/// Returns the PHC string (algorithm, parameters, salt and hash).
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored PHC hash.
///
/// A hash that cannot be parsed never matches.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Verify `password` against `hash`, or against a dummy hash when there is
/// no stored user. Returns `false` in the latter case.
#[must_use]
pub fn verify_password_or_dummy(password: &str, hash: Option<&str>) -> bool {
    match hash {
        Some(hash) => verify_password(password, hash),
        None => {
            let _ = verify_password(password, &DUMMY_HASH);
            false
        }
    }
}

/// [`hash_password`] on the blocking pool.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails or the task panics.
pub async fn hash_password_blocking(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "password hashing task failed");
            AuthError::PasswordHash
        })?
}

/// [`verify_password_or_dummy`] on the blocking pool.
///
/// A task that fails to complete counts as a mismatch.
pub async fn verify_password_blocking(password: String, hash: Option<String>) -> bool {
    tokio::task::spawn_blocking(move || verify_password_or_dummy(&password, hash.as_deref()))
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "password verification task failed");
            false
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("secret1").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("secret1", &hash));
        assert!(!verify_password("secret2", &hash));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let a = hash_password("secret1").unwrap();
        let b = hash_password("secret1").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("secret1", &a));
        assert!(verify_password("secret1", &b));
    }

    #[test]
    fn test_unparsable_hash_never_matches() {
        assert!(!verify_password("secret1", ""));
        assert!(!verify_password("secret1", "secret1"));
    }

    #[test]
    fn test_dummy_hash_uses_same_parameters() {
        let dummy = PasswordHash::new(&DUMMY_HASH).unwrap();
        let real_hash = hash_password("secret1").unwrap();
        let real = PasswordHash::new(&real_hash).unwrap();

        assert_eq!(dummy.algorithm, real.algorithm);
        assert_eq!(dummy.version, real.version);
        assert_eq!(dummy.params, real.params);
    }

    #[test]
    fn test_missing_user_runs_hasher_and_fails() {
        // Forces the dummy hash to exist so the call below does full Argon2 work
        assert!(PasswordHash::new(&DUMMY_HASH).is_ok());
        assert!(!verify_password_or_dummy("dreamnex-unmatched-login", None));
        assert!(!verify_password_or_dummy("secret1", None));
    }

    #[tokio::test]
    async fn test_blocking_helpers() {
        let hash = hash_password_blocking("secret1".to_owned()).await.unwrap();
        assert!(verify_password_blocking("secret1".to_owned(), Some(hash.clone())).await);
        assert!(!verify_password_blocking("secret2".to_owned(), Some(hash)).await);
        assert!(!verify_password_blocking("secret1".to_owned(), None).await);
    }
}
