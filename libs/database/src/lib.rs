//! Database library providing the MongoDB connection layer
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB connector, lazily-shared provider and health checks
//! - `config` - Loading `MongoConfig` through `core_config::FromEnv`
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb::{MongoConfig, MongoProvider};
//!
//! let config = MongoConfig::with_database("mongodb://localhost:27017", "mydb");
//! let provider = MongoProvider::new(config)?;
//!
//! // The first call connects; later calls reuse the same client
//! let db = provider.database().await?;
//! let items = db.collection::<Document>("items");
//! ```

// Always available modules
pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::LazyConnection;
