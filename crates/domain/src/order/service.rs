//! Order service providing the atomic order write path.

use std::time::Instant;

use chrono::{SubsecRound, Utc};
use store::{NewOrder, NewOrderLine, OrderId, Store};

use super::{CreateOrder, LineItemInput, ProductResolver};
use crate::error::DomainError;
use crate::notifier::ChangeNotifier;

/// Service for placing orders.
///
/// Every order is written in a single store transaction: the header, one
/// product resolution per item and one line per item. Any failure rolls the
/// whole order back. Each committed order signals the [`ChangeNotifier`]
/// once.
pub struct OrderService<S: Store> {
    store: S,
    notifier: ChangeNotifier,
}

impl<S: Store> OrderService<S> {
    /// Creates a new order service over the given store.
    pub fn new(store: S, notifier: ChangeNotifier) -> Self {
        Self { store, notifier }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Places an order and returns its id.
    #[tracing::instrument(skip(self, cmd), fields(items = cmd.items.len()))]
    pub async fn create_order(&self, cmd: CreateOrder) -> Result<OrderId, DomainError> {
        let customer_name = cmd.customer_name.trim();
        let customer_email = cmd.customer_email.trim();
        if customer_name.is_empty() {
            return Err(DomainError::Validation(
                "customer name is required".to_string(),
            ));
        }
        if customer_email.is_empty() {
            return Err(DomainError::Validation(
                "customer email is required".to_string(),
            ));
        }
        if cmd.items.is_empty() {
            return Err(DomainError::Validation(
                "items must be a non-empty list".to_string(),
            ));
        }
        if let Some(index) = cmd.items.iter().position(|item| item.quantity == 0) {
            return Err(DomainError::InvalidItem {
                index,
                reason: "quantity must be positive".to_string(),
            });
        }

        let started = Instant::now();
        let line_count = cmd.items.len();
        let result = self
            .write_order(customer_name, customer_email, cmd.items)
            .await;

        match result {
            Ok((order_id, products_created)) => {
                metrics::counter!("orders_created_total").increment(1);
                metrics::counter!("order_lines_created_total").increment(line_count as u64);
                metrics::counter!("products_created_total").increment(products_created);
                metrics::histogram!("order_ingestion_duration_seconds")
                    .record(started.elapsed().as_secs_f64());

                self.notifier.notify();
                tracing::info!(%order_id, lines = line_count, products_created, "order placed");
                Ok(order_id)
            }
            Err(err) => {
                metrics::counter!("order_ingestion_failures_total").increment(1);
                tracing::warn!(error = %err, "order rejected, transaction rolled back");
                Err(err)
            }
        }
    }

    /// Writes the order inside one transaction. Returns the order id and the
    /// number of products created along the way.
    async fn write_order(
        &self,
        customer_name: &str,
        customer_email: &str,
        items: Vec<LineItemInput>,
    ) -> Result<(OrderId, u64), DomainError> {
        let mut tx = self.store.begin().await?;

        let order = tx
            .insert_order(NewOrder {
                customer_name: customer_name.to_string(),
                customer_email: customer_email.to_string(),
                created_at: Utc::now().trunc_subsecs(0),
            })
            .await?;

        let mut products_created = 0;
        for (index, item) in items.into_iter().enumerate() {
            let resolved = ProductResolver::resolve(tx.as_mut(), item.id, &item.title, item.price)
                .await
                .map_err(|e| e.for_item(index))?;
            if resolved.created {
                products_created += 1;
            }

            tx.insert_order_line(NewOrderLine {
                order_id: order.id,
                product_id: resolved.product_id,
                quantity: item.quantity,
                unit_price: resolved.unit_price,
            })
            .await?;
        }

        tx.commit().await?;
        Ok((order.id, products_created))
    }
}
