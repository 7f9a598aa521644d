//! Domain error types.

use store::StoreError;
use thiserror::Error;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A required field is missing or malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A single order item is malformed.
    #[error("Invalid item {index}: {reason}")]
    InvalidItem { index: usize, reason: String },

    /// An error occurred in the store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl DomainError {
    /// Returns true if the error was caused by the caller's input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidItem { .. })
    }

    /// Attaches an item position to a validation error.
    pub(crate) fn for_item(self, index: usize) -> Self {
        match self {
            Self::Validation(reason) => Self::InvalidItem { index, reason },
            other => other,
        }
    }
}
