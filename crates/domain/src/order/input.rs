//! Lenient conversion of loosely typed order payloads.
//!
//! Clients send ids, quantities and prices as numbers or numeric strings, and
//! sometimes as garbage. Optional numerics never fail an order on their own:
//! a bad price is treated as absent and a missing quantity defaults to one.
//! Usable prices are rounded to the cent.
//! Only a quantity that cannot be read as a number at all, or that is
//! negative, is rejected.

use rust_decimal::Decimal;
use serde_json::Value;
use store::{ProductId, normalize_price};

use crate::error::DomainError;

/// One requested order line, after coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItemInput {
    /// Candidate catalog id; may not exist.
    pub id: Option<ProductId>,
    /// Display title, trimmed. Empty when the client sent none.
    pub title: String,
    /// Units ordered, at least one.
    pub quantity: u32,
    /// Price to charge for this line, if the client supplied a usable one.
    pub price: Option<Decimal>,
}

impl LineItemInput {
    /// Creates a line for a known title with no id and no price.
    pub fn titled(title: impl Into<String>, quantity: u32) -> Self {
        Self {
            id: None,
            title: title.into(),
            quantity,
            price: None,
        }
    }

    /// Sets the candidate product id.
    pub fn with_id(mut self, id: ProductId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the supplied price.
    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    /// Reads a line from a JSON object with optional `id`, `titulo`, `qty`
    /// and `precio` fields.
    pub fn from_json(index: usize, value: &Value) -> Result<Self, DomainError> {
        let Value::Object(fields) = value else {
            return Err(DomainError::InvalidItem {
                index,
                reason: "item must be an object".to_string(),
            });
        };

        let quantity = coerce_quantity(fields.get("qty"))
            .map_err(|reason| DomainError::InvalidItem { index, reason })?;

        Ok(Self {
            id: fields.get("id").and_then(coerce_product_id),
            title: fields.get("titulo").map(text_from_json).unwrap_or_default(),
            quantity,
            price: fields.get("precio").and_then(coerce_price),
        })
    }

    /// Reads every line of a JSON `items` value, which must be an array.
    pub fn list_from_json(items: &Value) -> Result<Vec<Self>, DomainError> {
        let Value::Array(items) = items else {
            return Err(DomainError::Validation(
                "items must be a non-empty list".to_string(),
            ));
        };
        items
            .iter()
            .enumerate()
            .map(|(index, item)| Self::from_json(index, item))
            .collect()
    }
}

/// Command to place an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrder {
    pub customer_name: String,
    pub customer_email: String,
    pub items: Vec<LineItemInput>,
}

impl CreateOrder {
    pub fn new(
        customer_name: impl Into<String>,
        customer_email: impl Into<String>,
        items: Vec<LineItemInput>,
    ) -> Self {
        Self {
            customer_name: customer_name.into(),
            customer_email: customer_email.into(),
            items,
        }
    }
}

/// Renders a scalar JSON value as trimmed text; anything else is empty.
pub fn text_from_json(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Reads a decimal from a JSON number or numeric string.
pub fn decimal_from_json(value: &Value) -> Option<Decimal> {
    let raw = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    raw.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(&raw).ok())
}

/// Reads a supplied price, rounded to the cent. Malformed, negative and
/// oversized prices (above [`store::MAX_UNIT_PRICE`]) count as absent.
pub fn coerce_price(value: &Value) -> Option<Decimal> {
    decimal_from_json(value).and_then(normalize_price)
}

/// Reads a candidate product id. Anything that is not an integer counts as
/// absent.
pub fn coerce_product_id(value: &Value) -> Option<ProductId> {
    match value {
        Value::Number(n) => n.as_i64().map(ProductId::new),
        Value::String(s) => s.trim().parse::<i64>().ok().map(ProductId::new),
        _ => None,
    }
}

/// Reads a line quantity.
///
/// Missing, `null`, empty and zero quantities default to one. Fractional
/// numbers are truncated. Negative or non-numeric values are an error.
pub fn coerce_quantity(value: Option<&Value>) -> Result<u32, String> {
    let raw = match value {
        None | Some(Value::Null) => return Ok(1),
        Some(Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i,
            (None, Some(f)) if f.is_finite() && f.abs() < i64::MAX as f64 => f.trunc() as i64,
            _ => return Err(format!("quantity {n} is out of range")),
        },
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(1),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("quantity {s:?} is not a whole number"))?,
        Some(other) => return Err(format!("quantity {other} is not a number")),
    };

    match raw {
        0 => Ok(1),
        n if n < 0 => Err(format!("quantity {n} must be positive")),
        n => u32::try_from(n).map_err(|_| format!("quantity {n} is out of range")),
    }
}
