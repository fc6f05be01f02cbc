//! Store Error Types

use thiserror::Error;

/// Store result type
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the document store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Identifier could not be parsed
    #[error("invalid id: {0}")]
    InvalidId(String),

    /// A unique field already holds this value
    #[error("duplicate value for unique field '{field}': {value}")]
    DuplicateField { field: String, value: String },

    /// Schema validation rejected the document
    #[error("validation failed: {0:?}")]
    Validation(Vec<String>),

    /// Documents must be JSON objects
    #[error("document is not a JSON object")]
    NotAnObject,
}
