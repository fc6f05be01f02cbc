//! Password Hashing and Revocation Checks

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::DateTime;
use serde_json::Value;

use super::errors::{AuthError, AuthResult};

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Verify a candidate password against a stored hash
pub fn verify_password(hash: &str, password: &str) -> AuthResult<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Whether the user changed their password after a token was issued
///
/// Credentials issued strictly before `password_changed_at` are revoked.
/// Users who never changed their password have no timestamp and pass.
pub fn changed_after(user: &Value, token_iat: i64) -> bool {
    user.get("password_changed_at")
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|changed_at| changed_at.timestamp() > token_iat)
        .unwrap_or(false)
}
