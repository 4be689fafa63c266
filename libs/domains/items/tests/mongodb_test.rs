//! MongoDB repository tests against a real server.
//!
//! Run with `cargo test -p domain_items -- --ignored` (requires Docker).

use database::mongodb::{MongoConfig, MongoProvider};
use domain_items::{
    CreateItem, ItemError, ItemId, ItemService, MongoItemRepository, Pagination, Price, Text,
    UpdateItem,
};
use mongodb::bson::{doc, oid::ObjectId};
use std::sync::Arc;
use std::time::Duration;
use test_utils::{TestDataBuilder, TestMongo, assertions::assert_some};

async fn service(mongo: &TestMongo, test_name: &str) -> ItemService<MongoItemRepository> {
    let builder = TestDataBuilder::from_test_name(test_name);
    let config = MongoConfig::with_database(mongo.connection_string(), builder.name("db", "items"));
    let provider = Arc::new(MongoProvider::new(config).unwrap());
    ItemService::new(MongoItemRepository::new(provider))
}

fn lamp(id: Option<&str>) -> CreateItem {
    CreateItem {
        id: id.map(str::to_string),
        item_name: Some(Text::from(" Desk lamp ")),
        item_category: Some(Text::from("Lighting")),
        item_price: Some(Price(24.99)),
        status: Some(Text::from("active")),
    }
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_create_and_get_by_object_id() {
    let mongo = TestMongo::new().await;
    let service = service(&mongo, "test_create_and_get_by_object_id").await;

    let created = service.create(lamp(None)).await.unwrap();
    assert!(matches!(created.id, ItemId::ObjectId(_)));
    assert_eq!(created.item_name, "Desk lamp");

    let fetched = service.get_by_id(&created.id.to_string()).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_string_key_and_duplicate() {
    let mongo = TestMongo::new().await;
    let service = service(&mongo, "test_string_key_and_duplicate").await;

    let created = service.create(lamp(Some("abc123"))).await.unwrap();
    assert_eq!(created.id, ItemId::Key("abc123".into()));
    assert_eq!(service.get_by_id("abc123").await.unwrap(), created);

    let err = service.create(lamp(Some("abc123"))).await.unwrap_err();
    assert!(matches!(err, ItemError::DuplicateId(_)));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_hex_string_key_found_before_object_id() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("test_hex_string_key_found_before_object_id");
    let db = mongo.database(&builder.name("db", "items"));
    let service = service(&mongo, "test_hex_string_key_found_before_object_id").await;

    // Two records whose ids differ only in representation
    let hex = ObjectId::new().to_hex();
    service.create(lamp(Some(&hex))).await.unwrap();
    db.collection::<mongodb::bson::Document>("items")
        .insert_one(doc! {
            "_id": ObjectId::parse_str(&hex).unwrap(),
            "itemName": "Other",
            "itemCategory": "Other",
            "itemPrice": 1.0,
            "status": "inactive",
            "createdAt": mongodb::bson::DateTime::now(),
            "updatedAt": mongodb::bson::DateTime::now(),
        })
        .await
        .unwrap();

    let found = service.get_by_id(&hex).await.unwrap();
    assert_eq!(found.id, ItemId::Key(hex.clone()));

    // Deleting twice reaches the ObjectId record on the second call
    service.delete_by_id(&hex).await.unwrap();
    service.delete_by_id(&hex).await.unwrap();
    assert!(matches!(
        service.delete_by_id(&hex).await,
        Err(ItemError::NotFound)
    ));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_update_returns_document_after() {
    let mongo = TestMongo::new().await;
    let service = service(&mongo, "test_update_returns_document_after").await;

    let created = service.create(lamp(None)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;

    let updated = service
        .update_by_id(
            &created.id.to_string(),
            UpdateItem {
                item_price: Some(Price(19.5)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.item_price, 19.5);
    assert_eq!(updated.item_name, created.item_name);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);

    let missing = service
        .update_by_id("missing", UpdateItem::default())
        .await
        .unwrap_err();
    assert!(matches!(missing, ItemError::NotFound));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_list_newest_first_with_totals() {
    let mongo = TestMongo::new().await;
    let service = service(&mongo, "test_list_newest_first_with_totals").await;

    for i in 0..12 {
        let mut input = lamp(None);
        input.item_name = Some(Text(format!("Lamp {}", i)));
        service.create(input).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    let page = service.list(Pagination { page: 1, limit: 5 }).await.unwrap();
    assert_eq!(page.items.len(), 5);
    assert_eq!(page.total, 12);
    assert_eq!(page.total_pages, 3);
    let first = assert_some(page.items.first(), "first item");
    assert_eq!(first.item_name, "Lamp 11");

    let last = service.list(Pagination { page: 3, limit: 5 }).await.unwrap();
    assert_eq!(last.items.len(), 2);
}
