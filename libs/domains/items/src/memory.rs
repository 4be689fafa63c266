//! In-memory ItemRepository for tests and local runs without MongoDB.

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::error::{ItemError, ItemResult};
use crate::models::{Item, ItemId, ItemPatch, NewItem};
use crate::repository::ItemRepository;

/// Keeps items in insertion order. String keys and ObjectIds are distinct ids,
/// as they are in MongoDB.
#[derive(Default)]
pub struct InMemoryItemRepository {
    items: RwLock<Vec<Item>>,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn insert(&self, item: NewItem) -> ItemResult<Item> {
        let mut items = self.items.write().await;

        let id = match item.id.clone() {
            Some(key) => {
                let id = ItemId::Key(key.clone());
                if items.iter().any(|existing| existing.id == id) {
                    return Err(ItemError::DuplicateId(key));
                }
                id
            }
            None => ItemId::ObjectId(ObjectId::new()),
        };

        let stored = item.into_item(id);
        items.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: &ItemId) -> ItemResult<Option<Item>> {
        let items = self.items.read().await;
        Ok(items.iter().find(|item| &item.id == id).cloned())
    }

    async fn find_page(&self, skip: u64, limit: u64) -> ItemResult<Vec<Item>> {
        let items = self.items.read().await;

        let mut sorted: Vec<&Item> = items.iter().collect();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(sorted
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn count(&self) -> ItemResult<u64> {
        Ok(self.items.read().await.len() as u64)
    }

    async fn find_and_update(&self, id: &ItemId, patch: &ItemPatch) -> ItemResult<Option<Item>> {
        let mut items = self.items.write().await;

        Ok(items.iter_mut().find(|item| &item.id == id).map(|item| {
            patch.apply(item);
            item.clone()
        }))
    }

    async fn delete_by_id(&self, id: &ItemId) -> ItemResult<bool> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|item| &item.id != id);
        Ok(items.len() < before)
    }
}
