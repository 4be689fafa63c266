//! Item Service - Business logic layer

use chrono::{DateTime, SubsecRound, Utc};
use std::sync::Arc;
use tracing::instrument;

use crate::error::{ItemError, ItemResult};
use crate::models::{CreateItem, Item, ItemPage, Pagination, UpdateItem};
use crate::repository::ItemRepository;
use crate::resolver::resolve;

/// Current time at the precision MongoDB stores.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Item service providing the item operations exposed over HTTP.
///
/// Validates and normalizes input, stamps timestamps, paginates, and runs
/// id-addressed operations through the string-then-ObjectId resolver.
pub struct ItemService<R: ItemRepository> {
    repository: Arc<R>,
}

impl<R: ItemRepository> ItemService<R> {
    /// Create a new ItemService with the given repository
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new item
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreateItem) -> ItemResult<Item> {
        let item = input.into_new_item(now())?;
        self.repository.insert(item).await
    }

    /// Get an item by string key or ObjectId
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, raw_id: &str) -> ItemResult<Item> {
        let repository = &self.repository;
        resolve(raw_id, |id| async move { repository.find_by_id(&id).await })
            .await?
            .ok_or(ItemError::NotFound)
    }

    /// One page of items, newest first, with collection totals
    #[instrument(skip(self))]
    pub async fn list(&self, pagination: Pagination) -> ItemResult<ItemPage> {
        let (items, total) = tokio::try_join!(
            self.repository
                .find_page(pagination.skip(), pagination.limit),
            self.repository.count(),
        )?;

        Ok(ItemPage {
            items,
            page: pagination.page,
            limit: pagination.limit,
            total,
            total_pages: pagination.total_pages(total),
        })
    }

    /// Merge the provided fields into an item and refresh `updatedAt`
    #[instrument(skip(self, input))]
    pub async fn update_by_id(&self, raw_id: &str, input: UpdateItem) -> ItemResult<Item> {
        let patch = input.into_patch(now())?;

        let repository = &self.repository;
        let patch = &patch;
        resolve(raw_id, |id| async move {
            repository.find_and_update(&id, patch).await
        })
        .await?
        .ok_or(ItemError::NotFound)
    }

    /// Delete an item
    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, raw_id: &str) -> ItemResult<()> {
        let repository = &self.repository;
        resolve(raw_id, |id| async move {
            let deleted = repository.delete_by_id(&id).await?;
            Ok::<_, ItemError>(deleted.then_some(()))
        })
        .await?
        .ok_or(ItemError::NotFound)
    }
}

impl<R: ItemRepository> Clone for ItemService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemId, ItemPatch, ListQuery, NewItem, Price, Text};
    use crate::repository::MockItemRepository;
    use mockall::predicate::eq;
    use mongodb::bson::oid::ObjectId;

    const OID: &str = "665f1c2e9b1d8a3f4c2e1a7b";

    fn stored(id: ItemId) -> Item {
        let at = now();
        Item {
            id,
            item_name: "Desk lamp".into(),
            item_category: "Lighting".into(),
            item_price: 24.99,
            status: "active".into(),
            created_at: at,
            updated_at: at,
        }
    }

    fn oid() -> ObjectId {
        ObjectId::parse_str(OID).unwrap()
    }

    #[tokio::test]
    async fn test_create_stamps_equal_timestamps() {
        let mut mock = MockItemRepository::new();
        mock.expect_insert()
            .withf(|item: &NewItem| {
                item.created_at == item.updated_at
                    && item.item_name == "Desk lamp"
                    && item.created_at.timestamp_subsec_nanos() % 1_000_000 == 0
            })
            .times(1)
            .returning(|item| Ok(item.into_item(ItemId::ObjectId(ObjectId::new()))));

        let service = ItemService::new(mock);
        let input = CreateItem {
            id: None,
            item_name: Some(Text::from(" Desk lamp ")),
            item_category: Some(Text::from("Lighting")),
            item_price: Some(Price(24.99)),
            status: Some(Text::from("active")),
        };

        let item = service.create(input).await.unwrap();
        assert_eq!(item.created_at, item.updated_at);
    }

    #[tokio::test]
    async fn test_create_validation_skips_repository() {
        let mock = MockItemRepository::new();
        let service = ItemService::new(mock);

        let err = service.create(CreateItem::default()).await.unwrap_err();
        assert!(matches!(err, ItemError::Validation(_)));
    }

    #[tokio::test]
    async fn test_get_by_string_key_never_tries_object_id() {
        let mut mock = MockItemRepository::new();
        mock.expect_find_by_id()
            .with(eq(ItemId::Key("abc123".into())))
            .times(1)
            .returning(|id| Ok(Some(stored(id.clone()))));

        let service = ItemService::new(mock);
        let item = service.get_by_id("abc123").await.unwrap();
        assert_eq!(item.id, ItemId::Key("abc123".into()));
    }

    #[tokio::test]
    async fn test_get_falls_back_to_object_id() {
        let mut mock = MockItemRepository::new();
        mock.expect_find_by_id()
            .with(eq(ItemId::Key(OID.into())))
            .times(1)
            .returning(|_| Ok(None));
        mock.expect_find_by_id()
            .with(eq(ItemId::ObjectId(oid())))
            .times(1)
            .returning(|id| Ok(Some(stored(id.clone()))));

        let service = ItemService::new(mock);
        let item = service.get_by_id(OID).await.unwrap();
        assert_eq!(item.id, ItemId::ObjectId(oid()));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let mut mock = MockItemRepository::new();
        mock.expect_find_by_id().times(1).returning(|_| Ok(None));

        let service = ItemService::new(mock);
        let err = service.get_by_id("nope").await.unwrap_err();
        assert!(matches!(err, ItemError::NotFound));
    }

    #[tokio::test]
    async fn test_list_paginates() {
        let mut mock = MockItemRepository::new();
        mock.expect_find_page()
            .with(eq(5), eq(5))
            .times(1)
            .returning(|_, _| Ok((0..5).map(|i| stored(ItemId::Key(i.to_string()))).collect()));
        mock.expect_count().times(1).returning(|| Ok(12));

        let service = ItemService::new(mock);
        let pagination = Pagination::from_query(&ListQuery {
            page: Some("2".into()),
            limit: None,
        });

        let page = service.list(pagination).await.unwrap();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.page, 2);
        assert_eq!(page.limit, 5);
        assert_eq!(page.total, 12);
        assert_eq!(page.total_pages, 3);
    }

    #[tokio::test]
    async fn test_list_propagates_storage_error() {
        let mut mock = MockItemRepository::new();
        mock.expect_find_page()
            .returning(|_, _| Err(ItemError::Database("down".into())));
        mock.expect_count().returning(|| Ok(0));

        let service = ItemService::new(mock);
        let err = service.list(Pagination::default()).await.unwrap_err();
        assert!(matches!(err, ItemError::Database(_)));
    }

    #[tokio::test]
    async fn test_update_sends_only_present_fields() {
        let mut mock = MockItemRepository::new();
        mock.expect_find_and_update()
            .withf(|id: &ItemId, patch: &ItemPatch| {
                *id == ItemId::Key("abc123".into())
                    && patch.item_name.is_none()
                    && patch.status.as_deref() == Some("inactive")
            })
            .times(1)
            .returning(|id, patch| {
                let mut item = stored(id.clone());
                patch.apply(&mut item);
                Ok(Some(item))
            });

        let service = ItemService::new(mock);
        let input = UpdateItem {
            status: Some(Text::from("inactive")),
            ..Default::default()
        };

        let item = service.update_by_id("abc123", input).await.unwrap();
        assert_eq!(item.status, "inactive");
        assert_eq!(item.item_name, "Desk lamp");
    }

    #[tokio::test]
    async fn test_delete_falls_back_then_not_found() {
        let mut mock = MockItemRepository::new();
        mock.expect_delete_by_id().times(2).returning(|_| Ok(false));

        let service = ItemService::new(mock);
        let err = service.delete_by_id(OID).await.unwrap_err();
        assert!(matches!(err, ItemError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_by_object_id() {
        let mut mock = MockItemRepository::new();
        mock.expect_delete_by_id()
            .returning(|id| Ok(matches!(id, ItemId::ObjectId(_))));

        let service = ItemService::new(mock);
        assert!(service.delete_by_id(OID).await.is_ok());
    }
}
