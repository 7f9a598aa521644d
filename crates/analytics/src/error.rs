//! Analytics error types.

use thiserror::Error;

/// Errors that can occur while answering an analytics query.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// An error occurred in the store.
    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),
}

/// Result type for analytics operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;
