//! MongoDB connector, shared connection provider and health checks

mod config;
mod connector;
mod health;
mod provider;

pub use config::{DEFAULT_DATABASE, MongoConfig};
pub use connector::{MongoError, client_options, connect_from_config};
pub use health::{HealthStatus, check_health_detailed, check_provider_health};
pub use provider::MongoProvider;

// Re-export MongoDB types for convenience
pub use mongodb::{Client, Collection, Database};
