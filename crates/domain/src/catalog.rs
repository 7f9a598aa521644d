//! Explicit catalog management.

use rust_decimal::Decimal;
use store::{MAX_UNIT_PRICE, NewProduct, Product, Store, normalize_price};

use crate::error::DomainError;

/// Command to add a product to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProduct {
    pub title: String,
    /// `None` when the client sent something that is not a number.
    pub price: Option<Decimal>,
}

/// Service for listing and adding catalog products.
pub struct CatalogService<S: Store> {
    store: S,
}

impl<S: Store> CatalogService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lists every product ordered by id.
    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        Ok(self.store.list_products().await?)
    }

    /// Adds a product. The title must not be blank and the price must be a
    /// number between zero and [`MAX_UNIT_PRICE`]; it is stored rounded to
    /// the cent.
    #[tracing::instrument(skip(self))]
    pub async fn create_product(&self, cmd: CreateProduct) -> Result<Product, DomainError> {
        let title = cmd.title.trim();
        if title.is_empty() {
            return Err(DomainError::Validation("title is required".to_string()));
        }
        let Some(price) = cmd.price else {
            return Err(DomainError::Validation("price must be numeric".to_string()));
        };
        if price < Decimal::ZERO {
            return Err(DomainError::Validation(
                "price must not be negative".to_string(),
            ));
        }
        let Some(price) = normalize_price(price.abs()) else {
            return Err(DomainError::Validation(format!(
                "price must not exceed {MAX_UNIT_PRICE}"
            )));
        };

        let product = self
            .store
            .create_product(NewProduct::new(title, price))
            .await?;
        metrics::counter!("products_created_total").increment(1);
        tracing::info!(product_id = %product.id, "product created");
        Ok(product)
    }
}
