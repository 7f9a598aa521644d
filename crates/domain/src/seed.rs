//! Demo data for trying the dashboards without real traffic.

use chrono::{Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use store::{NewOrder, NewOrderLine, NewProduct, Product, Store};

use crate::error::DomainError;
use crate::notifier::ChangeNotifier;

/// Fixed demo catalog: title and unit price.
pub const DEMO_CATALOG: [(&str, i64); 5] = [
    ("Leggings Pro", 120_000),
    ("Top Compresión", 90_000),
    ("Jogger Fit", 135_000),
    ("Short Runner", 80_000),
    ("Camiseta Dry", 70_000),
];

const DEMO_ORDERS: usize = 12;
const MAX_DAYS_AGO: i64 = 14;
const MAX_LINES: usize = 3;
const MAX_QUANTITY: u32 = 4;

/// What a seeding run wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub products_created: usize,
    pub orders_created: usize,
    pub lines_created: usize,
}

struct PlannedOrder {
    days_ago: i64,
    /// (index into the catalog, quantity)
    lines: Vec<(usize, u32)>,
}

/// Seeds the demo catalog and a batch of random recent orders.
///
/// Catalog products are looked up by title first, so seeding twice does not
/// duplicate the catalog. Orders are placed at noon UTC on a random day of
/// the last two weeks, each with one to three lines charged at catalog
/// price. Everything is written in one transaction.
pub struct DemoSeeder<S: Store> {
    store: S,
    notifier: ChangeNotifier,
}

impl<S: Store> DemoSeeder<S> {
    pub fn new(store: S, notifier: ChangeNotifier) -> Self {
        Self { store, notifier }
    }

    #[tracing::instrument(skip(self))]
    pub async fn seed(&self) -> Result<SeedReport, DomainError> {
        let plan = Self::plan();
        let mut tx = self.store.begin().await?;

        let mut products_created = 0;
        let mut catalog: Vec<Product> = Vec::with_capacity(DEMO_CATALOG.len());
        for (title, price) in DEMO_CATALOG {
            let product = match tx.find_product_by_title(title).await? {
                Some(product) => product,
                None => {
                    products_created += 1;
                    tx.insert_product(NewProduct::new(title, Decimal::from(price)))
                        .await?
                }
            };
            catalog.push(product);
        }

        let today = Utc::now().date_naive();
        let mut lines_created = 0;
        for (index, planned) in plan.iter().enumerate() {
            let day = today - Duration::days(planned.days_ago);
            let created_at = day
                .and_hms_opt(12, 0, 0)
                .map(|noon| noon.and_utc())
                .unwrap_or_else(Utc::now);
            let number = index + 1;

            let order = tx
                .insert_order(NewOrder {
                    customer_name: format!("Cliente {number}"),
                    customer_email: format!("c{number}@mail.com"),
                    created_at,
                })
                .await?;

            for &(product_index, quantity) in &planned.lines {
                let product = &catalog[product_index];
                tx.insert_order_line(NewOrderLine {
                    order_id: order.id,
                    product_id: product.id,
                    quantity,
                    unit_price: product.unit_price,
                })
                .await?;
                lines_created += 1;
            }
        }

        tx.commit().await?;
        self.notifier.notify();

        let report = SeedReport {
            products_created,
            orders_created: plan.len(),
            lines_created,
        };
        tracing::info!(?report, "demo data seeded");
        Ok(report)
    }

    fn plan() -> Vec<PlannedOrder> {
        let mut rng = rand::rng();
        (0..DEMO_ORDERS)
            .map(|_| PlannedOrder {
                days_ago: rng.random_range(0..=MAX_DAYS_AGO),
                lines: (0..rng.random_range(1..=MAX_LINES))
                    .map(|_| {
                        (
                            rng.random_range(0..DEMO_CATALOG.len()),
                            rng.random_range(1..=MAX_QUANTITY),
                        )
                    })
                    .collect(),
            })
            .collect()
    }
}
