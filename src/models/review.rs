//! Review Schema

use serde_json::Value;

use super::{check_number_range, require_number, require_string, Resource};
use crate::store::{Collection, Store};

/// A user review on a tour
pub struct Review;

impl Resource for Review {
    const COLLECTION: &'static str = "reviews";
    const PARENT_FIELD: Option<&'static str> = Some("tour");

    fn collection(store: &Store) -> &Collection {
        &store.reviews
    }

    fn validate(doc: &Value) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        require_string(doc, "review", "Review can not be empty", &mut errors);
        require_number(doc, "rating", "A review must have a rating", &mut errors);
        check_number_range(
            doc,
            "rating",
            1.0,
            5.0,
            "Rating must be between 1 and 5",
            &mut errors,
        );
        require_string(doc, "tour", "Review must belong to a tour", &mut errors);
        require_string(doc, "user", "Review must belong to a user", &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_review_passes() {
        let review = json!({
            "review": "Loved it",
            "rating": 5,
            "tour": "t1",
            "user": "u1",
        });
        assert!(Review::validate(&review).is_ok());
    }

    #[test]
    fn test_rating_bounds() {
        let review = json!({ "review": "x", "rating": 9, "tour": "t", "user": "u" });
        let errors = Review::validate(&review).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("between 1 and 5")));
    }

    #[test]
    fn test_orphan_review_rejected() {
        let errors = Review::validate(&json!({ "review": "x", "rating": 4 })).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("tour")));
        assert!(errors.iter().any(|e| e.contains("user")));
    }
}
