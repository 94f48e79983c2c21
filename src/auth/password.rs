//! Password hashing with Argon2id

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::error;

use crate::common::ApiError;

/// Hash a password with a fresh random salt (PHC string format)
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "Password hashing failed");
            ApiError::InternalServer("password hashing failed".to_string())
        })
}

/// Check a password against a stored hash; an unparseable hash never verifies
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            error!(error = %e, "Stored password hash is malformed");
            false
        }
    }
}

/// [`hash_password`] on the blocking pool, off the async executor
pub async fn hash_password_blocking(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| {
            error!(error = %e, "Password hashing task failed");
            ApiError::InternalServer("password hashing failed".to_string())
        })?
}

/// [`verify_password`] on the blocking pool, off the async executor
pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| {
            error!(error = %e, "Password verification task failed");
            ApiError::InternalServer("password verification failed".to_string())
        })
}
