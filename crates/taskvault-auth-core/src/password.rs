//! Password hashing
//!
//! bcrypt runs on the blocking pool so hashing never stalls the async
//! executor.

use crate::AuthError;

/// bcrypt work factor
const BCRYPT_COST: u32 = 10;

/// Hash a password with bcrypt
pub async fn hash_password(password: &str) -> Result<String, AuthError> {
    let password = password.to_string();

    tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))?
        .map_err(|e| AuthError::Internal(format!("bcrypt hash failed: {e}")))
}

/// Verify a password against a stored bcrypt hash
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let password = password.to_string();
    let hash = hash.to_string();

    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))?
        .map_err(|e| AuthError::Internal(format!("bcrypt verify failed: {e}")))
}
