//! Booking Schema

use serde_json::{json, Value};

use super::{require_number, require_string, Resource};
use crate::store::{Collection, Store};

/// A paid booking of a tour by a user
pub struct Booking;

impl Resource for Booking {
    const COLLECTION: &'static str = "bookings";
    const PARENT_FIELD: Option<&'static str> = Some("tour");

    fn collection(store: &Store) -> &Collection {
        &store.bookings
    }

    fn apply_defaults(doc: &mut Value) {
        if let Some(fields) = doc.as_object_mut() {
            fields.entry("paid").or_insert(json!(true));
        }
    }

    fn validate(doc: &Value) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        require_string(doc, "tour", "Booking must belong to a tour", &mut errors);
        require_string(doc, "user", "Booking must belong to a user", &mut errors);
        require_number(doc, "price", "Booking must have a price", &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
