//! # In-Memory Document Store
//!
//! The minimal executable collaborator behind the request pipeline: named
//! collections of JSON documents with server-assigned ids, unique-field
//! enforcement, and atomic merge-and-validate updates. Consistency beyond
//! a single operation is out of scope here.

pub mod collection;
pub mod errors;

pub use collection::{parse_id, Collection};
pub use errors::{StoreError, StoreResult};

/// All collections owned by one server process
///
/// Fields are explicit rather than a name-keyed map so that a resource can
/// reach its collection without a runtime lookup that could fail.
pub struct Store {
    pub tours: Collection,
    pub users: Collection,
    pub reviews: Collection,
    pub bookings: Collection,
}

impl Store {
    /// Create an empty store with all collections registered
    pub fn new() -> Self {
        use crate::models::{Booking, Review, Tour, User};
        use crate::models::Resource;

        Self {
            tours: Collection::new(Tour::COLLECTION, Tour::UNIQUE_FIELDS),
            users: Collection::new(User::COLLECTION, User::UNIQUE_FIELDS),
            reviews: Collection::new(Review::COLLECTION, Review::UNIQUE_FIELDS),
            bookings: Collection::new(Booking::COLLECTION, Booking::UNIQUE_FIELDS),
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
