use thiserror::Error;

/// Errors that can occur when interacting with the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A referenced row does not exist.
    #[error("Foreign key violation: {entity} {id} does not exist")]
    ForeignKeyViolation { entity: &'static str, id: i64 },

    /// The backend refused the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A price is negative or does not fit the price columns.
    #[error("Price {0} is outside the storable range")]
    PriceOutOfRange(rust_decimal::Decimal),

    /// A sales total does not fit a decimal.
    #[error("Arithmetic overflow while totalling {0}")]
    Overflow(&'static str),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
