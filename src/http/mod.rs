//! # HTTP Surface
//!
//! Router assembly, the middleware chain, the generic CRUD handler
//! factory, and the terminal global error handler.

pub mod app;
pub mod crud;
pub mod error_handler;
pub mod middleware;
pub mod response;
pub mod routes;

use std::sync::Arc;

use crate::auth::JwtManager;
use crate::config::AppConfig;
use crate::store::Store;

/// Shared state handed to every pipeline stage at construction
///
/// Built once at startup; request handlers never reach for globals.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<Store>,
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    /// Construct the shared state from a validated configuration
    pub fn new(config: AppConfig) -> Self {
        let jwt = JwtManager::new(&config.jwt_secret, config.jwt_expires_in_hours);
        Self {
            config: Arc::new(config),
            store: Arc::new(Store::new()),
            jwt: Arc::new(jwt),
        }
    }
}
