//! Order ingestion: input coercion, product resolution and the atomic write path.

mod input;
mod resolver;
mod service;

pub use input::{
    CreateOrder, LineItemInput, coerce_price, coerce_product_id, coerce_quantity, decimal_from_json,
    text_from_json,
};
pub use resolver::{ProductResolver, ResolvedProduct};
pub use service::OrderService;
