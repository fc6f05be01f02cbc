//! Application Error Model
//!
//! Unified error type for the request pipeline. Every stage that fails
//! builds an `AppError` and forwards it; the global error handler in
//! `http::error_handler` consumes it exactly once.

use std::fmt;

use crate::auth::errors::AuthError;
use crate::store::errors::StoreError;

/// Pipeline result type
pub type AppResult<T> = Result<T, AppError>;

/// Structured application error
///
/// Carries the client-facing message, the HTTP status code, and the
/// operational classification. Operational errors are anticipated failure
/// modes whose message is safe to show to the client; everything else is
/// logged server-side and replaced with a generic message in production.
#[derive(Debug, Clone)]
pub struct AppError {
    message: String,
    status_code: u16,
    is_operational: bool,
}

impl AppError {
    /// Create an operational error with an explicit status code
    pub fn new(message: impl Into<String>, status_code: u16) -> Self {
        Self {
            message: message.into(),
            status_code,
            is_operational: true,
        }
    }

    /// Validation failure (400)
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message, 400)
    }

    /// Authentication failure (401)
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(message, 401)
    }

    /// Authorization failure (403)
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(message, 403)
    }

    /// Missing resource (404)
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(message, 404)
    }

    /// Unclassified server failure (500), non-operational
    ///
    /// The message is kept for server-side logs but never shown to the
    /// client outside development mode.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: 500,
            is_operational: false,
        }
    }

    /// Client-facing message (subject to the operational check)
    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status code
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Status label derived from the status code class
    ///
    /// 4xx codes are client failures ("fail"), everything else is a
    /// server-side "error".
    pub fn status(&self) -> &'static str {
        if (400..500).contains(&self.status_code) {
            "fail"
        } else {
            "error"
        }
    }

    /// Whether this is an anticipated, client-safe failure
    pub fn is_operational(&self) -> bool {
        self.is_operational
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.status_code)
    }
}

impl std::error::Error for AppError {}

// ==================
// Translation Rules
// ==================
//
// Known lower-layer failure signatures become operational errors with
// tailored messages before they reach the global handler.

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidId(value) => {
                Self::bad_request(format!("Invalid id: '{}'.", value))
            }
            StoreError::DuplicateField { field, value } => Self::bad_request(format!(
                "Duplicate {} value: '{}'. Please use another value!",
                field, value
            )),
            StoreError::Validation(messages) => Self::bad_request(format!(
                "Invalid input data. {}",
                messages.join(". ")
            )),
            StoreError::NotAnObject => {
                Self::bad_request("Request body must be a JSON object".to_string())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingCredential => Self::unauthorized(
                "You are not logged in! Please log in to get access.",
            ),
            AuthError::TokenInvalid => {
                Self::unauthorized("Invalid token. Please log in again!")
            }
            AuthError::TokenExpired => {
                Self::unauthorized("Your token has expired. Please log in again!")
            }
            AuthError::UserGone => Self::unauthorized(
                "The user belonging to this token does no longer exist.",
            ),
            AuthError::PasswordChanged => Self::unauthorized(
                "User recently changed password! Please log in again.",
            ),
            AuthError::WrongCredentials => {
                Self::unauthorized("Incorrect email or password.")
            }
            AuthError::Hash(detail) => Self::unexpected(detail),
        }
    }
}
