//! Two-step identifier resolution.
//!
//! A raw path id is first tried as a string key. Only when that finds nothing,
//! and the id is a valid ObjectId, is a second attempt made with the ObjectId.
//! The same protocol drives find, update and delete.

use std::future::Future;

use crate::error::ItemResult;
use crate::models::ItemId;

/// Run `operation` against the string form of `raw`, then against its
/// ObjectId form if the first attempt returned `None`.
///
/// `Ok(None)` means neither form matched. Storage errors end resolution
/// immediately.
pub async fn resolve<T, F, Fut>(raw: &str, mut operation: F) -> ItemResult<Option<T>>
where
    F: FnMut(ItemId) -> Fut,
    Fut: Future<Output = ItemResult<Option<T>>>,
{
    if let Some(found) = operation(ItemId::Key(raw.to_string())).await? {
        return Ok(Some(found));
    }

    match ItemId::parse_object_id(raw) {
        Some(oid) => operation(ItemId::ObjectId(oid)).await,
        None => Ok(None),
    }
}
