use mongodb::{Client, Database};
use tracing::info;

use super::{MongoConfig, MongoError, connect_from_config};
use crate::common::LazyConnection;

/// Process-wide MongoDB connection provider.
///
/// Owns the configuration and a lazily established [`Client`]. The first call
/// to [`client`](Self::client) or [`database`](Self::database) connects; every
/// later call gets the same client. Callers racing the first one wait for its
/// outcome, so an unreachable server costs one attempt per burst. Share it behind an `Arc` and hand it to repositories.
///
/// # Example
/// ```ignore
/// use std::sync::Arc;
/// use database::mongodb::{MongoConfig, MongoProvider};
///
/// let provider = Arc::new(MongoProvider::new(MongoConfig::from_env()?)?);
/// let items = provider.database().await?.collection::<Document>("items");
/// ```
pub struct MongoProvider {
    config: MongoConfig,
    client: LazyConnection<Client, MongoError>,
}

impl MongoProvider {
    /// Validate `config` up front so bad settings fail at startup, not on the
    /// first request.
    pub fn new(config: MongoConfig) -> Result<Self, MongoError> {
        config.validate().map_err(MongoError::InvalidConfig)?;
        Ok(Self {
            config,
            client: LazyConnection::new(),
        })
    }

    pub fn config(&self) -> &MongoConfig {
        &self.config
    }

    /// The shared client, connecting on first use.
    pub async fn client(&self) -> Result<Client, MongoError> {
        self.client
            .get_or_connect(|| connect_from_config(&self.config))
            .await
    }

    /// Handle to the configured database on the shared client.
    pub async fn database(&self) -> Result<Database, MongoError> {
        Ok(self.client().await?.database(&self.config.database))
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_connected()
    }

    /// Number of connection attempts made by this provider.
    pub fn connection_attempts(&self) -> usize {
        self.client.attempts()
    }

    /// Close the pooled connections if a client was ever established.
    pub async fn shutdown(&self) {
        if let Some(client) = self.client.get() {
            info!("Closing MongoDB connections");
            client.clone().shutdown().await;
        }
    }
}
