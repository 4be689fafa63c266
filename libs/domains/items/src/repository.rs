use async_trait::async_trait;

use crate::error::ItemResult;
use crate::models::{Item, ItemId, ItemPatch, NewItem};

/// Collection primitives for item persistence.
///
/// Each method addresses `_id` with exactly one representation; trying the
/// string and ObjectId forms in turn is the caller's job (see
/// [`resolver`](crate::resolver)).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Insert a record, assigning an ObjectId when it has no key
    async fn insert(&self, item: NewItem) -> ItemResult<Item>;

    async fn find_by_id(&self, id: &ItemId) -> ItemResult<Option<Item>>;

    /// Newest first by `createdAt`
    async fn find_page(&self, skip: u64, limit: u64) -> ItemResult<Vec<Item>>;

    /// Size of the whole collection
    async fn count(&self) -> ItemResult<u64>;

    /// Apply `patch` and return the document as it is after the update
    async fn find_and_update(&self, id: &ItemId, patch: &ItemPatch) -> ItemResult<Option<Item>>;

    /// Returns whether a document was deleted
    async fn delete_by_id(&self, id: &ItemId) -> ItemResult<bool>;
}
