//! Password hashing (bcrypt).

use bcrypt::{hash, verify};

pub use bcrypt::DEFAULT_COST;

use crate::error::ApiError;

/// Shortest accepted password.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Hashes a password with bcrypt at the given cost (4..=31).
///
/// bcrypt is CPU-bound, so the work runs on the blocking pool.
///
/// # Errors
///
/// Returns [`ApiError::Internal`] if hashing fails.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, ApiError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash(password, cost))
        .await
        .map_err(|e| ApiError::Internal(format!("hashing task failed: {e}")))?
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// Checks a password against a stored bcrypt hash.
///
/// # Errors
///
/// Returns [`ApiError::Internal`] if the stored hash is malformed.
pub async fn verify_password(password: &str, stored_hash: &str) -> Result<bool, ApiError> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    tokio::task::spawn_blocking(move || verify(password, &stored_hash))
        .await
        .map_err(|e| ApiError::Internal(format!("verification task failed: {e}")))?
        .map_err(|e| ApiError::Internal(format!("password verification failed: {e}")))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_and_verify() {
        let Ok(hashed) = hash_password("test_password_123", 4).await else {
            panic!("hashing failed");
        };
        assert!(matches!(verify_password("test_password_123", &hashed).await, Ok(true)));
        assert!(matches!(verify_password("wrong_password", &hashed).await, Ok(false)));
    }
}
