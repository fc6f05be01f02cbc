//! Auth Error Types

use thiserror::Error;

/// Auth result type
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors raised while verifying or issuing credentials
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No bearer header and no cookie
    #[error("no credential present")]
    MissingCredential,

    /// Signature invalid or token malformed
    #[error("token is invalid")]
    TokenInvalid,

    /// Signature valid but past expiry
    #[error("token has expired")]
    TokenExpired,

    /// Token subject no longer resolves to a live account
    #[error("user no longer exists")]
    UserGone,

    /// Token was issued before the most recent password change
    #[error("password changed after token issuance")]
    PasswordChanged,

    /// Login or password-change check failed
    #[error("wrong email or password")]
    WrongCredentials,

    /// Password hashing backend failure
    #[error("password hashing failed: {0}")]
    Hash(String),
}
