//! Persistence layer for the catalog, orders and order lines.
//!
//! Two backends implement the same [`Store`] / [`StoreTx`] pair:
//! - [`PostgresStore`] for production, backed by a `sqlx` connection pool
//! - [`InMemoryStore`] for tests and local runs without a database

pub mod error;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod query;
pub mod store;

pub use common::{OrderId, ProductId};
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use model::{
    DailySales, MAX_UNIT_PRICE, Metric, NewOrder, NewOrderLine, NewProduct, Order, OrderLine,
    Product, ProductSales, SalesSummary, normalize_price,
};
pub use postgres::PostgresStore;
pub use query::SalesQuery;
pub use store::{Store, StoreTx};
