//! Per-resource route fragments

pub mod bookings;
pub mod reviews;
pub mod tours;
pub mod users;
