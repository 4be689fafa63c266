//! HTTP middleware module.
//!
//! - Fixed permissive CORS headers on every response
//! - Security headers
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::http::{cors_layer, security_headers};
//!
//! let app = Router::new()
//!     .layer(axum::middleware::from_fn(security_headers))
//!     .layer(cors_layer());
//! ```

pub mod cors;
pub mod security;

pub use cors::{CORS_ALLOW_HEADERS, CORS_ALLOW_METHODS, CORS_ALLOW_ORIGIN, cors_layer, preflight};
pub use security::security_headers;
