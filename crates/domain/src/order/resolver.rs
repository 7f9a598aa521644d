//! Maps an incoming order line onto a canonical catalog product.

use rust_decimal::Decimal;
use store::{NewProduct, ProductId, StoreTx};

use crate::error::DomainError;

/// Outcome of resolving one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProduct {
    pub product_id: ProductId,
    /// Price to record on the order line.
    pub unit_price: Decimal,
    /// True if the product was created by this resolution.
    pub created: bool,
}

/// Resolves line items against the catalog inside an open transaction.
///
/// Matching order, first hit wins:
/// 1. the candidate id, if it exists;
/// 2. the title, compared trimmed and case-insensitively;
/// 3. otherwise a new product is created from the title and supplied price.
///
/// The line price is the supplied price when it is non-zero, else the
/// matched product's catalog price, else zero.
pub struct ProductResolver;

impl ProductResolver {
    #[tracing::instrument(skip(tx))]
    pub async fn resolve(
        tx: &mut dyn StoreTx,
        candidate_id: Option<ProductId>,
        title: &str,
        supplied_price: Option<Decimal>,
    ) -> Result<ResolvedProduct, DomainError> {
        let title = title.trim();
        let supplied_price = supplied_price.filter(|price| !price.is_zero());

        let mut existing = None;
        if let Some(id) = candidate_id {
            existing = tx.find_product(id).await?;
        }
        if existing.is_none() && !title.is_empty() {
            existing = tx.find_product_by_title(title).await?;
        }

        if let Some(product) = existing {
            return Ok(ResolvedProduct {
                product_id: product.id,
                unit_price: supplied_price.unwrap_or(product.unit_price),
                created: false,
            });
        }

        if title.is_empty() {
            return Err(DomainError::Validation(match candidate_id {
                Some(id) => format!("product {id} does not exist and no title was given"),
                None => "a product id or title is required".to_string(),
            }));
        }

        let unit_price = supplied_price.unwrap_or(Decimal::ZERO);
        let product = tx
            .insert_product(NewProduct::new(title, unit_price))
            .await?;
        tracing::debug!(product_id = %product.id, title, "created product from order line");

        Ok(ResolvedProduct {
            product_id: product.id,
            unit_price,
            created: true,
        })
    }
}
