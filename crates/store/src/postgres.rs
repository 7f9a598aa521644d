use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Postgres, QueryBuilder, Row, Transaction};

use crate::store::{Store, StoreTx};
use crate::{
    DailySales, Metric, NewOrder, NewOrderLine, NewProduct, Order, OrderId, OrderLine, Product,
    ProductId, ProductSales, Result, SalesQuery, SalesSummary, StoreError,
};

const SALES_FROM: &str = r#"
    FROM orders o
    JOIN order_lines l ON l.order_id = o.id
    JOIN products p ON p.id = l.product_id
    WHERE o.created_at >= "#;

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies the bootstrap schema.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::new(row.try_get("id")?),
            title: row.try_get("title")?,
            unit_price: row.try_get("unit_price")?,
        })
    }

    /// Appends the window bound and the optional title filter to a sales query.
    fn push_sales_filter(builder: &mut QueryBuilder<'_, Postgres>, query: &SalesQuery) {
        builder.push(SALES_FROM);
        builder.push_bind(query.since);

        if let Some(titles) = &query.titles {
            builder.push(" AND p.title IN (");
            let mut separated = builder.separated(", ");
            for title in titles {
                separated.push_bind(title.clone());
            }
            separated.push_unseparated(")");
        }
    }

    fn order_column(metric: Metric) -> &'static str {
        match metric {
            Metric::Quantity => "quantity",
            Metric::Revenue => "revenue",
        }
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresTx { tx }))
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query("SELECT id, title, unit_price FROM products ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let row = sqlx::query(
            r#"
            INSERT INTO products (title, unit_price)
            VALUES ($1, $2)
            RETURNING id, title, unit_price
            "#,
        )
        .bind(&product.title)
        .bind(product.unit_price)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_product(row)
    }

    async fn top_products(&self, query: &SalesQuery) -> Result<Vec<ProductSales>> {
        if query.matches_nothing() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT p.title AS title, SUM(l.quantity)::BIGINT AS quantity, \
             SUM(l.quantity * l.unit_price) AS revenue",
        );
        Self::push_sales_filter(&mut builder, query);
        builder.push(" GROUP BY p.title ORDER BY ");
        builder.push(Self::order_column(query.metric));
        builder.push(" DESC, p.title COLLATE \"C\" ASC");
        if let Some(limit) = query.limit {
            builder.push(" LIMIT ");
            builder.push_bind(limit as i64);
        }

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|row| {
                Ok(ProductSales {
                    title: row.try_get("title")?,
                    quantity: row.try_get("quantity")?,
                    revenue: row.try_get("revenue")?,
                })
            })
            .collect()
    }

    async fn daily_sales(&self, query: &SalesQuery) -> Result<Vec<DailySales>> {
        if query.matches_nothing() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT (o.created_at AT TIME ZONE 'UTC')::DATE AS day, p.title AS title, \
             SUM(l.quantity)::BIGINT AS quantity, SUM(l.quantity * l.unit_price) AS revenue",
        );
        Self::push_sales_filter(&mut builder, query);
        builder.push(" GROUP BY day, p.title ORDER BY day ASC, p.title COLLATE \"C\" ASC");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|row| {
                Ok(DailySales {
                    day: row.try_get("day")?,
                    title: row.try_get("title")?,
                    quantity: row.try_get("quantity")?,
                    revenue: row.try_get("revenue")?,
                })
            })
            .collect()
    }

    async fn summary(&self, since: DateTime<Utc>) -> Result<SalesSummary> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(DISTINCT o.id) AS orders,
                   COALESCE(SUM(l.quantity), 0)::BIGINT AS items,
                   COALESCE(SUM(l.quantity * l.unit_price), 0) AS revenue
            FROM orders o
            JOIN order_lines l ON l.order_id = o.id
            WHERE o.created_at >= $1
            "#,
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(SalesSummary {
            orders: row.try_get("orders")?,
            items: row.try_get("items")?,
            revenue: row.try_get("revenue")?,
        })
    }

    async fn count_orders(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_order_lines(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_lines")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// A transaction on the PostgreSQL store. Rolled back on drop unless committed.
struct PostgresTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PostgresTx {
    async fn find_product(&mut self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT id, title, unit_price FROM products WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&mut *self.tx)
            .await?;

        row.map(PostgresStore::row_to_product).transpose()
    }

    async fn find_product_by_title(&mut self, title: &str) -> Result<Option<Product>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, unit_price
            FROM products
            WHERE lower(btrim(title)) = lower(btrim($1))
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(title)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(PostgresStore::row_to_product).transpose()
    }

    async fn insert_product(&mut self, product: NewProduct) -> Result<Product> {
        let row = sqlx::query(
            r#"
            INSERT INTO products (title, unit_price)
            VALUES ($1, $2)
            RETURNING id, title, unit_price
            "#,
        )
        .bind(&product.title)
        .bind(product.unit_price)
        .fetch_one(&mut *self.tx)
        .await?;

        PostgresStore::row_to_product(row)
    }

    async fn insert_order(&mut self, order: NewOrder) -> Result<Order> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO orders (customer_name, customer_email, created_at)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&order.customer_name)
        .bind(&order.customer_email)
        .bind(order.created_at)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(Order {
            id: OrderId::new(id),
            customer_name: order.customer_name,
            customer_email: order.customer_email,
            created_at: order.created_at,
        })
    }

    async fn insert_order_line(&mut self, line: NewOrderLine) -> Result<OrderLine> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO order_lines (order_id, product_id, quantity, unit_price)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(line.order_id.as_i64())
        .bind(line.product_id.as_i64())
        .bind(i64::from(line.quantity))
        .bind(line.unit_price)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return match db_err.constraint() {
                    Some("order_lines_order_id_fkey") => StoreError::ForeignKeyViolation {
                        entity: "order",
                        id: line.order_id.as_i64(),
                    },
                    _ => StoreError::ForeignKeyViolation {
                        entity: "product",
                        id: line.product_id.as_i64(),
                    },
                };
            }
            StoreError::Database(e)
        })?;

        Ok(OrderLine {
            id,
            order_id: line.order_id,
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price: line.unit_price,
        })
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        tracing::debug!("store transaction committed");
        Ok(())
    }
}
