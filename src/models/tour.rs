//! Tour Schema

use serde_json::{json, Value};

use super::{check_number_range, check_one_of, require_number, require_string, Resource};
use crate::store::{Collection, Store};

/// A tour offering
pub struct Tour;

impl Resource for Tour {
    const COLLECTION: &'static str = "tours";
    const UNIQUE_FIELDS: &'static [&'static str] = &["name"];
    const HIDDEN_FIELDS: &'static [&'static str] = &["secret_tour"];

    fn collection(store: &Store) -> &Collection {
        &store.tours
    }

    fn apply_defaults(doc: &mut Value) {
        let Some(fields) = doc.as_object_mut() else {
            return;
        };
        fields.entry("ratings_average").or_insert(json!(4.5));
        fields.entry("ratings_quantity").or_insert(json!(0));
        fields.entry("secret_tour").or_insert(json!(false));
    }

    fn validate(doc: &Value) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        require_string(doc, "name", "A tour must have a name", &mut errors);
        if let Some(name) = doc.get("name").and_then(Value::as_str) {
            let len = name.chars().count();
            if !name.trim().is_empty() && !(10..=40).contains(&len) {
                errors.push(
                    "A tour name must have between 10 and 40 characters".to_string(),
                );
            }
        }

        require_number(doc, "duration", "A tour must have a duration", &mut errors);
        require_number(
            doc,
            "max_group_size",
            "A tour must have a group size",
            &mut errors,
        );
        require_string(doc, "summary", "A tour must have a summary", &mut errors);
        require_string(doc, "difficulty", "A tour must have a difficulty", &mut errors);
        check_one_of(
            doc,
            "difficulty",
            &["easy", "medium", "difficult"],
            "Difficulty is either: easy, medium, difficult",
            &mut errors,
        );

        require_number(doc, "price", "A tour must have a price", &mut errors);
        if let Some(price) = doc.get("price").and_then(Value::as_f64) {
            if price <= 0.0 {
                errors.push("A tour price must be above 0".to_string());
            }
            // Discount may not exceed the price itself
            if let Some(discount) = doc.get("price_discount").and_then(Value::as_f64) {
                if discount >= price {
                    errors.push("Discount price should be below regular price".to_string());
                }
            }
        }

        check_number_range(
            doc,
            "ratings_average",
            1.0,
            5.0,
            "Rating must be between 1.0 and 5.0",
            &mut errors,
        );

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
