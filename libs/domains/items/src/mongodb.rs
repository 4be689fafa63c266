//! MongoDB implementation of ItemRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use database::mongodb::MongoProvider;
use futures::TryStreamExt;
use mongodb::{
    Collection,
    bson::{self, Bson, Document, doc},
    error::{ErrorKind, WriteFailure},
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

use crate::error::{ItemError, ItemResult};
use crate::models::{Item, ItemId, ItemPatch, NewItem};
use crate::repository::ItemRepository;

pub const DEFAULT_COLLECTION: &str = "items";

const DUPLICATE_KEY_CODE: i32 = 11000;

/// Stored shape of an item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<Bson>,
    item_name: String,
    item_category: String,
    item_price: f64,
    status: String,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

fn to_bson_datetime(value: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(value.timestamp_millis())
}

fn from_bson_datetime(value: bson::DateTime) -> ItemResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value.timestamp_millis())
        .ok_or_else(|| ItemError::Database(format!("timestamp out of range: {}", value)))
}

fn id_to_bson(id: &ItemId) -> Bson {
    match id {
        ItemId::Key(key) => Bson::String(key.clone()),
        ItemId::ObjectId(oid) => Bson::ObjectId(*oid),
    }
}

fn id_from_bson(id: Bson) -> ItemResult<ItemId> {
    match id {
        Bson::String(key) => Ok(ItemId::Key(key)),
        Bson::ObjectId(oid) => Ok(ItemId::ObjectId(oid)),
        other => Err(ItemError::Database(format!(
            "unsupported _id type: {:?}",
            other.element_type()
        ))),
    }
}

impl ItemDocument {
    fn from_new(item: &NewItem) -> Self {
        Self {
            id: item.id.clone().map(Bson::String),
            item_name: item.item_name.clone(),
            item_category: item.item_category.clone(),
            item_price: item.item_price,
            status: item.status.clone(),
            created_at: to_bson_datetime(item.created_at),
            updated_at: to_bson_datetime(item.updated_at),
        }
    }

    fn into_item(self) -> ItemResult<Item> {
        let id = self
            .id
            .ok_or_else(|| ItemError::Database("document without _id".to_string()))?;

        Ok(Item {
            id: id_from_bson(id)?,
            item_name: self.item_name,
            item_category: self.item_category,
            item_price: self.item_price,
            status: self.status,
            created_at: from_bson_datetime(self.created_at)?,
            updated_at: from_bson_datetime(self.updated_at)?,
        })
    }
}

fn id_filter(id: &ItemId) -> Document {
    doc! { "_id": id_to_bson(id) }
}

fn set_document(patch: &ItemPatch) -> Document {
    let mut set = doc! { "updatedAt": to_bson_datetime(patch.updated_at) };

    if let Some(ref name) = patch.item_name {
        set.insert("itemName", name.as_str());
    }
    if let Some(ref category) = patch.item_category {
        set.insert("itemCategory", category.as_str());
    }
    if let Some(price) = patch.item_price {
        set.insert("itemPrice", price);
    }
    if let Some(ref status) = patch.status {
        set.insert("status", status.as_str());
    }

    doc! { "$set": set }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY_CODE
    )
}

/// MongoDB implementation of the ItemRepository.
///
/// Resolves the database through the shared [`MongoProvider`] on every call,
/// so the first request establishes the connection.
pub struct MongoItemRepository {
    provider: Arc<MongoProvider>,
    collection_name: String,
}

impl MongoItemRepository {
    /// Create a repository over the `items` collection
    ///
    /// # Example
    /// ```ignore
    /// let provider = Arc::new(MongoProvider::new(MongoConfig::from_env()?)?);
    /// let repo = MongoItemRepository::new(provider);
    /// ```
    pub fn new(provider: Arc<MongoProvider>) -> Self {
        Self::with_collection(provider, DEFAULT_COLLECTION)
    }

    /// Create a new MongoItemRepository with a custom collection name
    pub fn with_collection(provider: Arc<MongoProvider>, collection_name: &str) -> Self {
        Self {
            provider,
            collection_name: collection_name.to_string(),
        }
    }

    async fn collection(&self) -> ItemResult<Collection<ItemDocument>> {
        let db = self.provider.database().await?;
        Ok(db.collection::<ItemDocument>(&self.collection_name))
    }
}

#[async_trait]
impl ItemRepository for MongoItemRepository {
    #[instrument(skip(self, item), fields(item_name = %item.item_name))]
    async fn insert(&self, item: NewItem) -> ItemResult<Item> {
        let document = ItemDocument::from_new(&item);

        let result = self
            .collection()
            .await?
            .insert_one(&document)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    ItemError::DuplicateId(item.id.clone().unwrap_or_default())
                } else {
                    e.into()
                }
            })?;

        let id = id_from_bson(result.inserted_id)?;
        tracing::info!(item_id = %id, "Item created successfully");
        Ok(item.into_item(id))
    }

    #[instrument(skip(self), fields(item_id = %id))]
    async fn find_by_id(&self, id: &ItemId) -> ItemResult<Option<Item>> {
        self.collection()
            .await?
            .find_one(id_filter(id))
            .await?
            .map(ItemDocument::into_item)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn find_page(&self, skip: u64, limit: u64) -> ItemResult<Vec<Item>> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .skip(skip)
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .build();

        let cursor = self
            .collection()
            .await?
            .find(doc! {})
            .with_options(options)
            .await?;
        let documents: Vec<ItemDocument> = cursor.try_collect().await?;

        documents.into_iter().map(ItemDocument::into_item).collect()
    }

    #[instrument(skip(self))]
    async fn count(&self) -> ItemResult<u64> {
        let count = self.collection().await?.count_documents(doc! {}).await?;
        Ok(count)
    }

    #[instrument(skip(self, patch), fields(item_id = %id))]
    async fn find_and_update(&self, id: &ItemId, patch: &ItemPatch) -> ItemResult<Option<Item>> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection()
            .await?
            .find_one_and_update(id_filter(id), set_document(patch))
            .with_options(options)
            .await?;

        if updated.is_some() {
            tracing::info!(item_id = %id, "Item updated successfully");
        }
        updated.map(ItemDocument::into_item).transpose()
    }

    #[instrument(skip(self), fields(item_id = %id))]
    async fn delete_by_id(&self, id: &ItemId) -> ItemResult<bool> {
        let result = self.collection().await?.delete_one(id_filter(id)).await?;

        let deleted = result.deleted_count > 0;
        if deleted {
            tracing::info!(item_id = %id, "Item deleted successfully");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_717_243_200_250).unwrap()
    }

    #[test]
    fn test_id_filter_uses_one_representation() {
        let key = id_filter(&ItemId::Key("abc123".into()));
        assert_eq!(key.get_str("_id").unwrap(), "abc123");

        let oid = ObjectId::new();
        let object = id_filter(&ItemId::ObjectId(oid));
        assert_eq!(object.get_object_id("_id").unwrap(), oid);
    }

    #[test]
    fn test_set_document_only_contains_present_fields() {
        let patch = ItemPatch {
            item_name: None,
            item_category: None,
            item_price: Some(9.5),
            status: Some("inactive".into()),
            updated_at: now(),
        };

        let update = set_document(&patch);
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.get_f64("itemPrice").unwrap(), 9.5);
        assert_eq!(set.get_str("status").unwrap(), "inactive");
        assert!(set.get_datetime("updatedAt").is_ok());
        assert!(!set.contains_key("itemName"));
    }

    #[test]
    fn test_new_document_without_key_omits_id() {
        let item = NewItem {
            id: None,
            item_name: "Desk lamp".into(),
            item_category: "Lighting".into(),
            item_price: 24.99,
            status: "active".into(),
            created_at: now(),
            updated_at: now(),
        };

        let document = bson::to_document(&ItemDocument::from_new(&item)).unwrap();
        assert!(!document.contains_key("_id"));
        assert_eq!(document.get_str("itemName").unwrap(), "Desk lamp");
        assert!(document.get_datetime("createdAt").is_ok());
    }

    #[test]
    fn test_document_round_trips_timestamps() {
        let document = ItemDocument {
            id: Some(Bson::String("abc123".into())),
            item_name: "Desk lamp".into(),
            item_category: "Lighting".into(),
            item_price: 24.99,
            status: "active".into(),
            created_at: to_bson_datetime(now()),
            updated_at: to_bson_datetime(now()),
        };

        let item = document.into_item().unwrap();
        assert_eq!(item.id, ItemId::Key("abc123".into()));
        assert_eq!(item.created_at, now());
    }

    #[test]
    fn test_unsupported_id_type() {
        assert!(matches!(
            id_from_bson(Bson::Int32(7)),
            Err(ItemError::Database(_))
        ));
    }
}
