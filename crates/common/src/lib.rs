//! Shared identifier types used across the store, domain and API crates.

pub mod ids;

pub use ids::{OrderId, ProductId};
