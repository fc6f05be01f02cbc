//! Signed Bearer Credentials
//!
//! Thin wrapper around `jsonwebtoken` binding the signing secret and the
//! expiry window at construction time. Expired and malformed tokens are
//! distinguished so the client can be told to log in again for the right
//! reason.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{AuthError, AuthResult};

/// Claims carried by every issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id
    pub sub: Uuid,
    /// Issued-at, seconds since epoch
    pub iat: i64,
    /// Expiry, seconds since epoch
    pub exp: i64,
}

/// Issues and verifies signed credentials
pub struct JwtManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expires_in: Duration,
}

impl JwtManager {
    /// Create a manager from the signing secret and expiry window
    pub fn new(secret: &str, expires_in_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expires_in: Duration::hours(expires_in_hours),
        }
    }

    /// Sign a new token for a user
    pub fn sign(&self, user_id: Uuid) -> AuthResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + self.expires_in).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::Hash(format!("token signing failed: {}", e)))
    }

    /// Verify signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid,
            })
    }

    /// Sign a token with explicit issue/expiry timestamps
    ///
    /// Only used by tests to fabricate stale or expired credentials.
    #[cfg(test)]
    pub fn sign_at(&self, user_id: Uuid, iat: i64, exp: i64) -> String {
        let claims = Claims {
            sub: user_id,
            iat,
            exp,
        };
        encode(&Header::default(), &claims, &self.encoding).expect("signing test token")
    }
}
