//! Custom extractors for Axum handlers.
//!
//! Rejections are rendered through [`AppError`](crate::AppError), so malformed
//! input produces the same `{ "error": ... }` envelope as every other failure.

pub mod json_body;
pub mod query_params;

pub use json_body::JsonBody;
pub use query_params::QueryParams;
