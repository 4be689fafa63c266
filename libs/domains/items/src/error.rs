use axum_helpers::AppError;
use database::mongodb::MongoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ItemError {
    #[error("Item not found")]
    NotFound,

    #[error("Item with id '{0}' already exists")]
    DuplicateId(String),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type ItemResult<T> = Result<T, ItemError>;

impl ItemError {
    /// Mapping for routes that take a body or an id: storage failures are
    /// reported as 400 alongside validation failures.
    pub fn into_request_error(self) -> AppError {
        match self {
            ItemError::Database(msg) => AppError::BadRequest(msg),
            other => other.into(),
        }
    }
}

/// Convert ItemError to AppError for standardized error responses
impl From<ItemError> for AppError {
    fn from(err: ItemError) -> Self {
        match err {
            ItemError::NotFound => AppError::NotFound("item".to_string()),
            err @ ItemError::DuplicateId(_) => AppError::BadRequest(err.to_string()),
            ItemError::Validation(msg) => AppError::BadRequest(msg),
            ItemError::Database(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<mongodb::error::Error> for ItemError {
    fn from(err: mongodb::error::Error) -> Self {
        ItemError::Database(err.to_string())
    }
}

impl From<MongoError> for ItemError {
    fn from(err: MongoError) -> Self {
        ItemError::Database(err.to_string())
    }
}
