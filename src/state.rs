//! Shared application state for Axum handlers and middleware.
//!
//! Everything here is built once at startup and never mutated afterwards,
//! so it is shared across requests behind `Arc` with no locking.

use std::sync::Arc;

use crate::config::Config;
use crate::keys::KeyStore;

/// Shared application state.
///
/// Cloned per request; clones only bump reference counts.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Application configuration, including the API key set
    pub config: Arc<Config>,
}

impl AppState {
    /// Create application state from a validated configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Keys accepted by the webhook routes.
    pub fn api_keys(&self) -> &KeyStore {
        &self.config.api_keys
    }
}
