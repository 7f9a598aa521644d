//! Route handlers grouped by resource.

pub mod events;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;
pub mod sales;
pub mod seed;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serializer;

/// Serializes a list of amounts as JSON numbers.
pub(crate) fn decimals_as_numbers<S: Serializer>(
    values: &[Decimal],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(values.iter().map(|v| v.to_f64().unwrap_or_default()))
}
