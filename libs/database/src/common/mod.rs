//! Common utilities shared across database implementations

pub mod lazy;

pub use lazy::LazyConnection;
