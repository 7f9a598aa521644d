//! Domain layer for the order capture service.
//!
//! This crate provides the write side of the system:
//! - [`ProductResolver`] mapping incoming line items onto catalog products
//! - [`OrderService`] ingesting an order atomically and signalling changes
//! - [`CatalogService`] for explicit product management
//! - [`ChangeNotifier`] coalescing "sales changed" signals for live clients
//! - [`DemoSeeder`] populating demo data

pub mod catalog;
pub mod error;
pub mod notifier;
pub mod order;
pub mod seed;

pub use catalog::{CatalogService, CreateProduct};
pub use error::DomainError;
pub use notifier::{ChangeNotifier, ChangeSubscription, Wake};
pub use order::{CreateOrder, LineItemInput, OrderService, ProductResolver, ResolvedProduct};
pub use seed::{DEMO_CATALOG, DemoSeeder, SeedReport};
