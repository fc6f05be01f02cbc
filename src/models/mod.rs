//! # Resource Schemas
//!
//! Each resource binds a collection name, its hidden/unique fields, an
//! optional parent link for nested listing, and full-document validation.
//! The CRUD handler factory in `http::crud` is generic over this trait.

pub mod booking;
pub mod review;
pub mod tour;
pub mod user;

pub use booking::Booking;
pub use review::Review;
pub use tour::Tour;
pub use user::{Role, User};

use serde_json::Value;

use crate::store::{Collection, Store};

/// A storable resource type
pub trait Resource {
    /// Collection name
    const COLLECTION: &'static str;

    /// Fields that must be unique across the collection
    const UNIQUE_FIELDS: &'static [&'static str] = &[];

    /// Fields hidden from every response
    const HIDDEN_FIELDS: &'static [&'static str] = &[];

    /// Field referencing the parent resource, for nested listing
    const PARENT_FIELD: Option<&'static str> = None;

    /// The collection holding this resource
    fn collection(store: &Store) -> &Collection;

    /// Fill in schema defaults on a new document
    fn apply_defaults(_doc: &mut Value) {}

    /// Validate a full document, collecting every violation
    fn validate(doc: &Value) -> Result<(), Vec<String>>;
}

// ==================
// Validation Helpers
// ==================

pub(crate) fn require_string(doc: &Value, field: &str, message: &str, errors: &mut Vec<String>) {
    match doc.get(field).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => {}
        _ => errors.push(message.to_string()),
    }
}

pub(crate) fn require_number(doc: &Value, field: &str, message: &str, errors: &mut Vec<String>) {
    if doc.get(field).and_then(Value::as_f64).is_none() {
        errors.push(message.to_string());
    }
}

/// Range check on an optional numeric field; absence passes
pub(crate) fn check_number_range(
    doc: &Value,
    field: &str,
    min: f64,
    max: f64,
    message: &str,
    errors: &mut Vec<String>,
) {
    if let Some(n) = doc.get(field).and_then(Value::as_f64) {
        if n < min || n > max {
            errors.push(message.to_string());
        }
    }
}

/// Membership check on an optional string field; absence passes
pub(crate) fn check_one_of(
    doc: &Value,
    field: &str,
    allowed: &[&str],
    message: &str,
    errors: &mut Vec<String>,
) {
    if let Some(s) = doc.get(field).and_then(Value::as_str) {
        if !allowed.contains(&s) {
            errors.push(message.to_string());
        }
    }
}
