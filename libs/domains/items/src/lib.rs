//! Items Domain
//!
//! CRUD for the `items` collection with string-or-ObjectId identifiers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, timestamps, pagination, id resolution
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Collection primitives (trait + MongoDB / in-memory)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use database::mongodb::{MongoConfig, MongoProvider};
//! use domain_items::{handlers, mongodb::MongoItemRepository, service::ItemService};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // The provider connects on first use
//! let provider = Arc::new(MongoProvider::new(MongoConfig::new("mongodb://localhost:27017"))?);
//!
//! let repository = MongoItemRepository::new(provider);
//! let service = ItemService::new(repository);
//!
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod resolver;
pub mod service;

// Re-export commonly used types
pub use error::{ItemError, ItemResult};
pub use handlers::ApiDoc;
pub use memory::InMemoryItemRepository;
pub use models::{
    CreateItem, Item, ItemId, ItemPage, ItemPatch, ListQuery, NewItem, Pagination, Price, Text,
    UpdateItem,
};
pub use mongodb::MongoItemRepository;
pub use repository::ItemRepository;
pub use service::ItemService;
