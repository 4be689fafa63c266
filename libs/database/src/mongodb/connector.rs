use mongodb::{
    Client,
    bson::doc,
    options::{ClientOptions, Tls, TlsOptions},
};
use std::time::Duration;
use tracing::{info, instrument, warn};

use super::MongoConfig;

/// Error type for MongoDB operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum MongoError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Invalid MongoDB configuration: {0}")]
    InvalidConfig(String),
}

/// Build driver options from a MongoConfig.
///
/// Pool sizes, timeouts and TLS settings from the config take precedence over
/// whatever the connection string specifies.
pub async fn client_options(config: &MongoConfig) -> Result<ClientOptions, MongoError> {
    config.validate().map_err(MongoError::InvalidConfig)?;

    let mut options = ClientOptions::parse(&config.url).await?;

    options.max_pool_size = Some(config.max_pool_size);
    options.min_pool_size = Some(config.min_pool_size);
    options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
    options.server_selection_timeout =
        Some(Duration::from_secs(config.server_selection_timeout_secs));

    if let Some(ref app_name) = config.app_name {
        options.app_name = Some(app_name.clone());
    }

    match config.tls {
        Some(true) => {
            if config.tls_allow_invalid_certificates {
                warn!("MongoDB TLS certificate validation is DISABLED");
            }
            let tls = TlsOptions::builder()
                .allow_invalid_certificates(config.tls_allow_invalid_certificates)
                .build();
            options.tls = Some(Tls::Enabled(tls));
        }
        Some(false) => options.tls = Some(Tls::Disabled),
        None => {}
    }

    Ok(options)
}

/// Connect using a MongoConfig and verify the deployment answers a ping.
///
/// # Example
/// ```ignore
/// use database::mongodb::{MongoConfig, connect_from_config};
///
/// let config = MongoConfig::with_database("mongodb://localhost:27017", "mydb");
/// let client = connect_from_config(&config).await?;
/// ```
#[instrument(skip(config), fields(database = %config.database))]
pub async fn connect_from_config(config: &MongoConfig) -> Result<Client, MongoError> {
    info!("Attempting to connect to MongoDB at {}", config.redacted_url());

    let options = client_options(config).await?;
    let client = Client::with_options(options)?;

    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| MongoError::ConnectionFailed(e.to_string()))?;

    info!("Successfully connected to MongoDB");
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_options_apply_config() {
        let config = MongoConfig::with_database("mongodb://localhost:27017", "items")
            .with_app_name("items-api");

        let options = client_options(&config).await.unwrap();
        assert_eq!(options.max_pool_size, Some(100));
        assert_eq!(options.min_pool_size, Some(0));
        assert_eq!(options.server_selection_timeout, Some(Duration::from_secs(5)));
        assert_eq!(options.app_name.as_deref(), Some("items-api"));
        assert!(options.tls.is_none());
    }

    #[tokio::test]
    async fn test_client_options_explicit_tls() {
        let config = MongoConfig::default().with_tls(true);
        let options = client_options(&config).await.unwrap();
        match options.tls {
            Some(Tls::Enabled(tls)) => assert_eq!(tls.allow_invalid_certificates, Some(false)),
            other => panic!("expected TLS enabled, got {:?}", other),
        }

        let config = MongoConfig::default().with_tls(false);
        let options = client_options(&config).await.unwrap();
        assert!(matches!(options.tls, Some(Tls::Disabled)));
    }

    #[tokio::test]
    async fn test_client_options_reject_invalid_config() {
        let config = MongoConfig::default().allow_invalid_certificates();
        let err = client_options(&config).await.unwrap_err();
        assert!(matches!(err, MongoError::InvalidConfig(_)));
    }

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_connect_from_config() {
        let url = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let config = MongoConfig::with_database(url, "test");
        assert!(connect_from_config(&config).await.is_ok());
    }
}
