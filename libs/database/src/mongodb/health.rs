use mongodb::{Client, bson::doc};
use std::time::Instant;

use super::MongoProvider;

/// Health check status for MongoDB
#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub healthy: bool,
    /// Error details when unhealthy
    pub message: Option<String>,
    pub response_time_ms: u64,
}

async fn ping(client: &Client) -> Result<(), mongodb::error::Error> {
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map(|_| ())
}

/// Check MongoDB health with timing information and error details.
pub async fn check_health_detailed(client: &Client) -> HealthStatus {
    let start = Instant::now();
    let result = ping(client).await;
    let response_time_ms = start.elapsed().as_millis() as u64;

    HealthStatus {
        healthy: result.is_ok(),
        message: result.err().map(|e| e.to_string()),
        response_time_ms,
    }
}

/// Check health through the shared provider, connecting if needed.
pub async fn check_provider_health(provider: &MongoProvider) -> HealthStatus {
    let start = Instant::now();
    match provider.client().await {
        Ok(client) => check_health_detailed(&client).await,
        Err(e) => HealthStatus {
            healthy: false,
            message: Some(e.to_string()),
            response_time_ms: start.elapsed().as_millis() as u64,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mongodb::MongoConfig;

    #[tokio::test]
    async fn test_provider_health_reports_unreachable_server() {
        let mut config = MongoConfig::new("mongodb://127.0.0.1:1/?directConnection=true");
        config.server_selection_timeout_secs = 1;
        let provider = MongoProvider::new(config).unwrap();

        let status = check_provider_health(&provider).await;
        assert!(!status.healthy);
        assert!(status.message.is_some());
    }

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_check_health_detailed() {
        let client = Client::with_uri_str("mongodb://localhost:27017")
            .await
            .unwrap();
        let status = check_health_detailed(&client).await;
        assert!(status.healthy);
        assert!(status.message.is_none());
    }
}
