//! tourbase - a REST API for tours, reviews, and bookings
//!
//! The crate is organized as a request pipeline: `query` composes
//! listing behavior from URL parameters, `auth` guards routes, `http`
//! wires generic CRUD handlers and the global error handler, and
//! `store` holds the documents everything operates on.

pub mod auth;
pub mod cli;
pub mod config;
pub mod core;
pub mod http;
pub mod models;
pub mod query;
pub mod store;
