use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::error::{ItemError, ItemResult};

pub const MISSING_FIELDS_MESSAGE: &str = "Missing fields: itemName, itemCategory, itemPrice, status";
pub const BLANK_FIELDS_MESSAGE: &str = "itemName, itemCategory and status must not be blank";

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 5;
pub const MAX_LIMIT: u64 = 50;

/// Item identifier as stored in `_id`.
///
/// Records created by clients carry a string key; records created without one
/// get a MongoDB ObjectId. Both render as a plain string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemId {
    Key(String),
    ObjectId(ObjectId),
}

impl ItemId {
    /// Interpret `raw` as an ObjectId if it is 24 hex characters.
    pub fn parse_object_id(raw: &str) -> Option<ObjectId> {
        ObjectId::parse_str(raw).ok()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Key(key) => f.write_str(key),
            ItemId::ObjectId(oid) => write!(f, "{}", oid.to_hex()),
        }
    }
}

impl Serialize for ItemId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Item entity as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// String key or ObjectId hex
    #[serde(rename = "_id")]
    #[schema(value_type = String, example = "665f1c2e9b1d8a3f4c2e1a7b")]
    pub id: ItemId,
    pub item_name: String,
    pub item_category: String,
    pub item_price: f64,
    /// Free-form, e.g. "active" / "inactive"
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated record ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    /// Client-supplied key; `None` lets the store assign an ObjectId
    pub id: Option<String>,
    pub item_name: String,
    pub item_category: String,
    pub item_price: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewItem {
    /// The stored form of this record once `id` is known.
    pub fn into_item(self, id: ItemId) -> Item {
        Item {
            id,
            item_name: self.item_name,
            item_category: self.item_category,
            item_price: self.item_price,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Field-level merge applied by an update. `updated_at` is always written.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemPatch {
    pub item_name: Option<String>,
    pub item_category: Option<String>,
    pub item_price: Option<f64>,
    pub status: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ItemPatch {
    pub fn apply(&self, item: &mut Item) {
        if let Some(ref name) = self.item_name {
            item.item_name = name.clone();
        }
        if let Some(ref category) = self.item_category {
            item.item_category = category.clone();
        }
        if let Some(price) = self.item_price {
            item.item_price = price;
        }
        if let Some(ref status) = self.status {
            item.status = status.clone();
        }
        item.updated_at = self.updated_at;
    }
}

/// Text field that also accepts JSON numbers and booleans, keeping their
/// textual form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Text(pub String);

impl Text {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Text {
    fn from(value: &str) -> Self {
        Text(value.to_string())
    }
}

impl<'de> Deserialize<'de> for Text {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TextVisitor;

        impl Visitor<'_> for TextVisitor {
            type Value = Text;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a string, number or boolean")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Text, E> {
                Ok(Text(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Text, E> {
                Ok(Text(v))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Text, E> {
                Ok(Text(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Text, E> {
                Ok(Text(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Text, E> {
                Ok(Text(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Text, E> {
                Ok(Text(v.to_string()))
            }
        }

        deserializer.deserialize_any(TextVisitor)
    }
}

/// Price accepting a JSON number or a numeric string such as `"12.50"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Price(pub f64);

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PriceVisitor;

        impl Visitor<'_> for PriceVisitor {
            type Value = Price;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("itemPrice as a number or numeric string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Price, E> {
                Ok(Price(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Price, E> {
                Ok(Price(v as f64))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Price, E> {
                Ok(Price(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Price, E> {
                match v.trim().parse::<f64>() {
                    Ok(price) if price.is_finite() => Ok(Price(price)),
                    _ => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
                }
            }
        }

        deserializer.deserialize_any(PriceVisitor)
    }
}

fn not_blank(value: &Text) -> Result<(), ValidationError> {
    if value.as_str().trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// DTO for creating a new item
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItem {
    /// Optional client-chosen string key
    #[serde(rename = "_id", alias = "id", default)]
    pub id: Option<String>,
    #[validate(required, custom(function = "not_blank"))]
    #[schema(value_type = String, example = "Desk lamp")]
    pub item_name: Option<Text>,
    #[validate(required, custom(function = "not_blank"))]
    #[schema(value_type = String, example = "Lighting")]
    pub item_category: Option<Text>,
    #[validate(required)]
    #[schema(value_type = f64, example = 24.99)]
    pub item_price: Option<Price>,
    #[validate(required, custom(function = "not_blank"))]
    #[schema(value_type = String, example = "active")]
    pub status: Option<Text>,
}

impl CreateItem {
    /// Validate and normalize into an insertable record stamped with `now`.
    ///
    /// Any missing or blank required field yields the same message.
    pub fn into_new_item(self, now: DateTime<Utc>) -> ItemResult<NewItem> {
        self.validate()
            .map_err(|_| ItemError::Validation(MISSING_FIELDS_MESSAGE.to_string()))?;

        let (Some(name), Some(category), Some(price), Some(status)) = (
            self.item_name,
            self.item_category,
            self.item_price,
            self.status,
        ) else {
            return Err(ItemError::Validation(MISSING_FIELDS_MESSAGE.to_string()));
        };

        Ok(NewItem {
            id: self.id.filter(|id| !id.is_empty()),
            item_name: name.0.trim().to_string(),
            item_category: category.0.trim().to_string(),
            item_price: price.0,
            status: status.0,
            created_at: now,
            updated_at: now,
        })
    }
}

/// DTO for updating an existing item. Absent fields are left unchanged.
/// Explicit `null` is rejected rather than treated as absent.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItem {
    #[serde(default, deserialize_with = "non_null")]
    #[validate(custom(function = "not_blank"))]
    #[schema(value_type = Option<String>)]
    pub item_name: Option<Text>,
    #[serde(default, deserialize_with = "non_null")]
    #[validate(custom(function = "not_blank"))]
    #[schema(value_type = Option<String>)]
    pub item_category: Option<Text>,
    #[serde(default, deserialize_with = "non_null")]
    #[schema(value_type = Option<f64>)]
    pub item_price: Option<Price>,
    #[serde(default, deserialize_with = "non_null")]
    #[validate(custom(function = "not_blank"))]
    #[schema(value_type = Option<String>)]
    pub status: Option<Text>,
}

fn non_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)?
        .map(Some)
        .ok_or_else(|| de::Error::custom("field must not be null"))
}

impl UpdateItem {
    pub fn into_patch(self, now: DateTime<Utc>) -> ItemResult<ItemPatch> {
        self.validate()
            .map_err(|_| ItemError::Validation(BLANK_FIELDS_MESSAGE.to_string()))?;

        Ok(ItemPatch {
            item_name: self.item_name.map(|name| name.0.trim().to_string()),
            item_category: self.item_category.map(|c| c.0.trim().to_string()),
            item_price: self.item_price.map(|p| p.0),
            status: self.status.map(|s| s.0),
            updated_at: now,
        })
    }
}

/// Raw list query; values are parsed leniently by [`Pagination`].
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Page number, 1-based (default 1)
    pub page: Option<String>,
    /// Page size, 1..=50 (default 5)
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Leading integer of `raw`, ignoring trailing garbage (`"3abc"` → 3).
fn parse_int_prefix(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let digits_start = usize::from(trimmed.starts_with(['-', '+']));
    let end = trimmed[digits_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(trimmed.len(), |i| i + digits_start);

    if end == digits_start {
        return None;
    }
    match trimmed[..end].parse::<i64>() {
        Ok(n) => Some(n),
        // Too many digits: saturate in the direction of the sign
        Err(_) if trimmed.starts_with('-') => Some(i64::MIN),
        Err(_) => Some(i64::MAX),
    }
}

impl Pagination {
    /// `page` below 1 or unparsable becomes 1; `limit` unparsable becomes 5 and
    /// is clamped to `1..=50`.
    pub fn from_query(query: &ListQuery) -> Self {
        let page = query
            .page
            .as_deref()
            .filter(|raw| !raw.is_empty())
            .and_then(parse_int_prefix)
            .map_or(DEFAULT_PAGE, |page| page.max(1) as u64);

        let limit = query
            .limit
            .as_deref()
            .filter(|raw| !raw.is_empty())
            .and_then(parse_int_prefix)
            .map_or(DEFAULT_LIMIT, |limit| {
                limit.clamp(1, MAX_LIMIT as i64) as u64
            });

        Self { page, limit }
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

/// One page of items, newest first
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemPage {
    pub items: Vec<Item>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}
