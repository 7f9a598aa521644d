//! Typed records produced and consumed by the store.

use chrono::{DateTime, NaiveDate, Utc};
use common::{OrderId, ProductId};
use rust_decimal::{Decimal, RoundingStrategy};

/// Largest unit price the `NUMERIC(14,2)` price columns hold: 999999999999.99.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// Brings a price to the stored precision of two decimal places, rounding
/// half away from zero like PostgreSQL does.
///
/// Returns `None` for negative prices and prices above [`MAX_UNIT_PRICE`].
pub fn normalize_price(price: Decimal) -> Option<Decimal> {
    if price.is_sign_negative() || price > MAX_UNIT_PRICE {
        return None;
    }
    Some(price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub unit_price: Decimal,
}

/// A product that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub title: String,
    pub unit_price: Decimal,
}

impl NewProduct {
    pub fn new(title: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            title: title.into(),
            unit_price,
        }
    }
}

/// A placed order. Lines are stored separately and owned by the order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub customer_email: String,
    pub created_at: DateTime<Utc>,
}

/// Order header that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_email: String,
    pub created_at: DateTime<Utc>,
}

/// A single line of an order.
///
/// `unit_price` is the price charged at sale time; it never follows later
/// catalog changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub id: i64,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl OrderLine {
    /// Returns `quantity * unit_price`, or `None` if it overflows.
    pub fn subtotal(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Order line that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderLine {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Decimal,
}

/// The measure used to rank and chart sales.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Units sold.
    #[default]
    Quantity,
    /// Units sold times the unit price charged.
    Revenue,
}

impl Metric {
    /// Parses a metric name, accepting both the English and Spanish spellings.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "quantity" | "cantidad" => Some(Self::Quantity),
            "revenue" | "ingreso" => Some(Self::Revenue),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quantity => "quantity",
            Self::Revenue => "revenue",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sales of one product title within a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSales {
    pub title: String,
    pub quantity: i64,
    pub revenue: Decimal,
}

impl ProductSales {
    /// Returns the value of the given metric.
    pub fn value(&self, metric: Metric) -> Decimal {
        match metric {
            Metric::Quantity => Decimal::from(self.quantity),
            Metric::Revenue => self.revenue,
        }
    }
}

/// Sales of one product title on one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySales {
    pub day: NaiveDate,
    pub title: String,
    pub quantity: i64,
    pub revenue: Decimal,
}

impl DailySales {
    /// Returns the value of the given metric.
    pub fn value(&self, metric: Metric) -> Decimal {
        match metric {
            Metric::Quantity => Decimal::from(self.quantity),
            Metric::Revenue => self.revenue,
        }
    }
}

/// Totals over a window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesSummary {
    pub orders: i64,
    pub items: i64,
    pub revenue: Decimal,
}
