use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use crate::model::normalize_price;
use crate::store::{Store, StoreTx, title_key};
use crate::{
    DailySales, NewOrder, NewOrderLine, NewProduct, Order, OrderId, OrderLine, Product, ProductId,
    ProductSales, Result, SalesQuery, SalesSummary, StoreError,
};

const NO_FAULT: usize = usize::MAX;

/// Applies the `NUMERIC(14,2) CHECK (>= 0)` rule of the price columns.
fn stored_price(price: Decimal) -> Result<Decimal> {
    normalize_price(price).ok_or(StoreError::PriceOutOfRange(price))
}

/// Adds one line to a running `(quantity, revenue)` total.
fn accumulate(totals: &mut (i64, Decimal), line: &OrderLine) -> Result<()> {
    let revenue = line
        .subtotal()
        .and_then(|subtotal| totals.1.checked_add(subtotal))
        .ok_or(StoreError::Overflow("revenue"))?;
    let quantity = totals
        .0
        .checked_add(i64::from(line.quantity))
        .ok_or(StoreError::Overflow("quantity"))?;
    *totals = (quantity, revenue);
    Ok(())
}

#[derive(Debug, Clone, Default)]
struct Tables {
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, Order>,
    lines: Vec<OrderLine>,
    last_product_id: i64,
    last_order_id: i64,
    last_line_id: i64,
}

impl Tables {
    fn find_product_by_title(&self, title: &str) -> Option<&Product> {
        let key = title_key(title);
        self.products.values().find(|p| title_key(&p.title) == key)
    }

    fn insert_product(&mut self, product: NewProduct) -> Result<Product> {
        let unit_price = stored_price(product.unit_price)?;
        self.last_product_id += 1;
        let product = Product {
            id: ProductId::new(self.last_product_id),
            title: product.title,
            unit_price,
        };
        self.products.insert(product.id, product.clone());
        Ok(product)
    }

    fn insert_order(&mut self, order: NewOrder) -> Order {
        self.last_order_id += 1;
        let order = Order {
            id: OrderId::new(self.last_order_id),
            customer_name: order.customer_name,
            customer_email: order.customer_email,
            created_at: order.created_at,
        };
        self.orders.insert(order.id, order.clone());
        order
    }

    fn insert_order_line(&mut self, line: NewOrderLine) -> Result<OrderLine> {
        if !self.orders.contains_key(&line.order_id) {
            return Err(StoreError::ForeignKeyViolation {
                entity: "order",
                id: line.order_id.as_i64(),
            });
        }
        if !self.products.contains_key(&line.product_id) {
            return Err(StoreError::ForeignKeyViolation {
                entity: "product",
                id: line.product_id.as_i64(),
            });
        }

        let unit_price = stored_price(line.unit_price)?;
        self.last_line_id += 1;
        let line = OrderLine {
            id: self.last_line_id,
            order_id: line.order_id,
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price,
        };
        self.lines.push(line.clone());
        Ok(line)
    }

    /// Joins lines with their order and product, keeping lines whose order
    /// falls inside the window and whose title passes the query filter.
    fn sales<'a>(
        &'a self,
        query: &'a SalesQuery,
    ) -> impl Iterator<Item = (&'a Order, &'a OrderLine, &'a Product)> + 'a {
        self.lines.iter().filter_map(move |line| {
            let order = self.orders.get(&line.order_id)?;
            let product = self.products.get(&line.product_id)?;
            (order.created_at >= query.since && query.includes_title(&product.title))
                .then_some((order, line, product))
        })
    }
}

/// In-memory store implementation for testing.
///
/// Provides the same interface and transactional guarantees as the PostgreSQL
/// implementation: a transaction works on a private copy of the tables and
/// publishes it on commit, so an aborted transaction leaves no trace.
#[derive(Clone)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    fail_after_lines: Arc<AtomicUsize>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            fail_after_lines: Arc::new(AtomicUsize::new(NO_FAULT)),
        }
    }

    /// Makes every subsequent transaction fail once it has inserted `lines`
    /// order lines. `None` disables the fault.
    pub fn set_fail_after_lines(&self, lines: Option<usize>) {
        self.fail_after_lines
            .store(lines.unwrap_or(NO_FAULT), Ordering::SeqCst);
    }

    /// Returns a copy of every line of the given order.
    pub async fn order_lines(&self, order_id: OrderId) -> Vec<OrderLine> {
        self.tables
            .read()
            .await
            .lines
            .iter()
            .filter(|l| l.order_id == order_id)
            .cloned()
            .collect()
    }

    /// Returns the order with the given id.
    pub async fn order(&self, order_id: OrderId) -> Option<Order> {
        self.tables.read().await.orders.get(&order_id).cloned()
    }

    /// Rewrites the creation time of an order, for window tests.
    pub async fn backdate_order(&self, order_id: OrderId, created_at: DateTime<Utc>) -> bool {
        match self.tables.write().await.orders.get_mut(&order_id) {
            Some(order) => {
                order.created_at = created_at;
                true
            }
            None => false,
        }
    }

    /// Changes the catalog price of a product.
    pub async fn set_product_price(&self, id: ProductId, unit_price: Decimal) -> bool {
        match self.tables.write().await.products.get_mut(&id) {
            Some(product) => {
                product.unit_price = unit_price;
                true
            }
            None => false,
        }
    }

    /// Clears all tables.
    pub async fn clear(&self) {
        *self.tables.write().await = Tables::default();
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>> {
        let guard = self.tables.clone().write_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryTx {
            guard,
            staged,
            fail_after_lines: self.fail_after_lines.load(Ordering::SeqCst),
            lines_inserted: 0,
        }))
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.tables.read().await.products.values().cloned().collect())
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        self.tables.write().await.insert_product(product)
    }

    async fn top_products(&self, query: &SalesQuery) -> Result<Vec<ProductSales>> {
        let tables = self.tables.read().await;

        let mut totals: BTreeMap<&str, (i64, Decimal)> = BTreeMap::new();
        for (_, line, product) in tables.sales(query) {
            accumulate(totals.entry(product.title.as_str()).or_default(), line)?;
        }

        // BTreeMap yields titles in byte order; the stable sort keeps that as the tie-break.
        let mut rows: Vec<ProductSales> = totals
            .into_iter()
            .map(|(title, (quantity, revenue))| ProductSales {
                title: title.to_string(),
                quantity,
                revenue,
            })
            .collect();
        rows.sort_by(|a, b| b.value(query.metric).cmp(&a.value(query.metric)));

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn daily_sales(&self, query: &SalesQuery) -> Result<Vec<DailySales>> {
        let tables = self.tables.read().await;

        let mut totals: BTreeMap<(NaiveDate, &str), (i64, Decimal)> = BTreeMap::new();
        for (order, line, product) in tables.sales(query) {
            let key = (order.created_at.date_naive(), product.title.as_str());
            accumulate(totals.entry(key).or_default(), line)?;
        }

        Ok(totals
            .into_iter()
            .map(|((day, title), (quantity, revenue))| DailySales {
                day,
                title: title.to_string(),
                quantity,
                revenue,
            })
            .collect())
    }

    async fn summary(&self, since: DateTime<Utc>) -> Result<SalesSummary> {
        let tables = self.tables.read().await;
        let query = SalesQuery::since(since);

        let mut orders = HashSet::new();
        let mut totals = (0, Decimal::ZERO);
        for (order, line, _) in tables.sales(&query) {
            orders.insert(order.id);
            accumulate(&mut totals, line)?;
        }

        Ok(SalesSummary {
            orders: orders.len() as i64,
            items: totals.0,
            revenue: totals.1,
        })
    }

    async fn count_orders(&self) -> Result<i64> {
        Ok(self.tables.read().await.orders.len() as i64)
    }

    async fn count_order_lines(&self) -> Result<i64> {
        Ok(self.tables.read().await.lines.len() as i64)
    }
}

/// Transaction over the in-memory tables.
///
/// Holds the write lock for its whole lifetime, so transactions are
/// serialized and readers wait for the commit.
struct MemoryTx {
    guard: OwnedRwLockWriteGuard<Tables>,
    staged: Tables,
    fail_after_lines: usize,
    lines_inserted: usize,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn find_product(&mut self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.staged.products.get(&id).cloned())
    }

    async fn find_product_by_title(&mut self, title: &str) -> Result<Option<Product>> {
        Ok(self.staged.find_product_by_title(title).cloned())
    }

    async fn insert_product(&mut self, product: NewProduct) -> Result<Product> {
        self.staged.insert_product(product)
    }

    async fn insert_order(&mut self, order: NewOrder) -> Result<Order> {
        Ok(self.staged.insert_order(order))
    }

    async fn insert_order_line(&mut self, line: NewOrderLine) -> Result<OrderLine> {
        if self.lines_inserted >= self.fail_after_lines {
            return Err(StoreError::Unavailable(format!(
                "injected failure after {} order lines",
                self.lines_inserted
            )));
        }
        let line = self.staged.insert_order_line(line)?;
        self.lines_inserted += 1;
        Ok(line)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let MemoryTx {
            mut guard, staged, ..
        } = *self;
        *guard = staged;
        Ok(())
    }
}
