//! Items API routes
//!
//! Wires the items domain to the shared MongoDB provider.

use axum::Router;
use domain_items::{ItemService, MongoItemRepository, handlers};

use crate::state::AppState;

/// Create items router
pub fn router(state: &AppState) -> Router {
    let repository = MongoItemRepository::new(state.mongo.clone());
    let service = ItemService::new(repository);
    handlers::router(service)
}
