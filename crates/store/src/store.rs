use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    DailySales, NewOrder, NewOrderLine, NewProduct, Order, OrderLine, Product, ProductId,
    ProductSales, Result, SalesQuery, SalesSummary,
};

/// Core trait for storage backends.
///
/// Single-statement reads and writes run directly on the store. Multi-statement
/// writes go through a [`StoreTx`] obtained from [`Store::begin`].
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait Store: Send + Sync {
    /// Opens a new transaction.
    ///
    /// Nothing written through the transaction is visible to other readers
    /// until [`StoreTx::commit`] succeeds. Dropping it without committing
    /// discards every write.
    async fn begin(&self) -> Result<Box<dyn StoreTx>>;

    /// Lists all products ordered by id ascending.
    async fn list_products(&self) -> Result<Vec<Product>>;

    /// Inserts a single product outside of any order.
    async fn create_product(&self, product: NewProduct) -> Result<Product>;

    /// Aggregates sales per product title, ranked descending by the query
    /// metric with ascending title as tie-break.
    async fn top_products(&self, query: &SalesQuery) -> Result<Vec<ProductSales>>;

    /// Aggregates sales per (UTC day, title), ordered by day then title.
    async fn daily_sales(&self, query: &SalesQuery) -> Result<Vec<DailySales>>;

    /// Totals orders, units and revenue for orders created at or after `since`.
    async fn summary(&self, since: DateTime<Utc>) -> Result<SalesSummary>;

    /// Returns the total number of orders.
    async fn count_orders(&self) -> Result<i64>;

    /// Returns the total number of order lines.
    async fn count_order_lines(&self) -> Result<i64>;
}

/// An open store transaction.
#[async_trait]
pub trait StoreTx: Send {
    /// Looks up a product by id.
    async fn find_product(&mut self, id: ProductId) -> Result<Option<Product>>;

    /// Looks up a product whose trimmed, lowercased title equals the trimmed,
    /// lowercased `title`. The lowest id wins when several rows match.
    async fn find_product_by_title(&mut self, title: &str) -> Result<Option<Product>>;

    /// Inserts a product.
    async fn insert_product(&mut self, product: NewProduct) -> Result<Product>;

    /// Inserts an order header.
    async fn insert_order(&mut self, order: NewOrder) -> Result<Order>;

    /// Inserts an order line. Fails if the order or product does not exist.
    async fn insert_order_line(&mut self, line: NewOrderLine) -> Result<OrderLine>;

    /// Commits every write made through this transaction.
    async fn commit(self: Box<Self>) -> Result<()>;
}

/// Normalizes a title into the key used for case/whitespace-insensitive
/// matching.
pub fn title_key(title: &str) -> String {
    title.trim().to_lowercase()
}
