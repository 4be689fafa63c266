//! Application state management.
//!
//! Shared state passed to the item routes and readiness check.

use database::mongodb::MongoProvider;
use std::sync::Arc;

/// Shared application state.
///
/// Cloned for each handler (inexpensive Arc clones).
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// Process-wide MongoDB provider; connects on first use
    pub mongo: Arc<MongoProvider>,
}

impl AppState {
    pub fn new(config: crate::config::Config) -> eyre::Result<Self> {
        let mongo = Arc::new(MongoProvider::new(config.mongodb.clone())?);
        Ok(Self { config, mongo })
    }
}
