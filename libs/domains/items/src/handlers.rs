use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    AppError, JsonBody, QueryParams,
    errors::responses::{BadRequestResponse, InternalServerErrorResponse, NotFoundResponse},
    preflight,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::error::ItemError;
use crate::models::{CreateItem, Item, ItemPage, ListQuery, Pagination, UpdateItem};
use crate::repository::ItemRepository;
use crate::service::ItemService;

/// Body of a successful delete
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub ok: bool,
}

/// OpenAPI documentation for Items API
#[derive(OpenApi)]
#[openapi(
    paths(list_items, create_item, get_item, update_item, delete_item),
    components(
        schemas(Item, ItemPage, CreateItem, UpdateItem, DeleteResponse),
        responses(BadRequestResponse, NotFoundResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = "Items", description = "Item management endpoints (MongoDB)")
    )
)]
pub struct ApiDoc;

/// Create the items router with all HTTP endpoints
pub fn router<R: ItemRepository + 'static>(service: ItemService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route(
            "/",
            get(list_items).post(create_item).options(preflight),
        )
        .route(
            "/{id}",
            get(get_item)
                .put(update_item)
                .delete(delete_item)
                .options(preflight),
        )
        .with_state(shared_service)
}

/// List items, newest first
#[utoipa::path(
    get,
    path = "",
    tag = "Items",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of items", body = ItemPage),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_items<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Json<ItemPage>, AppError> {
    let page = service.list(Pagination::from_query(&query)).await?;
    Ok(Json(page))
}

/// Create a new item
#[utoipa::path(
    post,
    path = "",
    tag = "Items",
    request_body = CreateItem,
    responses(
        (status = 201, description = "Item created successfully", body = Item),
        (status = 400, response = BadRequestResponse)
    )
)]
async fn create_item<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
    JsonBody(input): JsonBody<CreateItem>,
) -> Result<impl IntoResponse, AppError> {
    let item = service
        .create(input)
        .await
        .map_err(ItemError::into_request_error)?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Get an item by string key or ObjectId
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Items",
    params(
        ("id" = String, Path, description = "String key or 24-character ObjectId hex")
    ),
    responses(
        (status = 200, description = "Item found", body = Item),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_item<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
    Path(id): Path<String>,
) -> Result<Json<Item>, AppError> {
    let item = service
        .get_by_id(&id)
        .await
        .map_err(ItemError::into_request_error)?;
    Ok(Json(item))
}

/// Update the provided fields of an item
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Items",
    params(
        ("id" = String, Path, description = "String key or 24-character ObjectId hex")
    ),
    request_body = UpdateItem,
    responses(
        (status = 200, description = "Item updated successfully", body = Item),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn update_item<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<UpdateItem>,
) -> Result<Json<Item>, AppError> {
    let item = service
        .update_by_id(&id, input)
        .await
        .map_err(ItemError::into_request_error)?;
    Ok(Json(item))
}

/// Delete an item
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Items",
    params(
        ("id" = String, Path, description = "String key or 24-character ObjectId hex")
    ),
    responses(
        (status = 200, description = "Item deleted successfully", body = DeleteResponse),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_item<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    service
        .delete_by_id(&id)
        .await
        .map_err(ItemError::into_request_error)?;
    Ok(Json(DeleteResponse { ok: true }))
}
