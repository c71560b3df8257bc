//! Argon2 password hashing.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$...`), which carry
//! their own salt and parameters.
//!
//! Request paths use [`hash`] and [`verify`], which run on tokio's
//! blocking pool instead of a runtime worker.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::error::{DbError, DbResult};

/// Hash a password for storage.
pub fn hash_password(password: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::Internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Verify a password against its stored hash. A malformed hash never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// [`hash_password`] on the blocking pool.
pub async fn hash(password: String) -> DbResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| DbError::Internal(format!("Password hashing task failed: {e}")))?
}

/// [`verify_password`] on the blocking pool.
pub async fn verify(password: String, hash: String) -> DbResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| DbError::Internal(format!("Password check task failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("s3cret!pass").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret!pass", &hash));
        assert!(!verify_password("s3cret!pasS", &hash));
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(
            hash_password("same-pass1!").unwrap(),
            hash_password("same-pass1!").unwrap()
        );
    }

    #[tokio::test]
    async fn test_blocking_pool_round_trip() {
        let stored = hash("s3cret!pass".to_string()).await.unwrap();
        assert!(verify("s3cret!pass".to_string(), stored.clone()).await.unwrap());
        assert!(!verify("wrong!pass1".to_string(), stored).await.unwrap());
    }

    #[test]
    fn test_garbage_hash_never_matches() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("", ""));
    }
}
