//! # Database Error Types
//!
//! Error types for storage, the inventory ledger and order placement.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError ◄──── LedgerError (stock rejections)                          │
//! │       │               │                                                 │
//! │       ▼               ▼                                                 │
//! │  OrderError { Validation | UnknownProduct | InsufficientStock |        │
//! │               Conflict | Storage }                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller (register, kiosk, place-order)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use teahouse_core::{CoreError, Quantity, ValidationError};
use thiserror::Error;

// =============================================================================
// Storage Errors
// =============================================================================

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Two first orders from the same external token racing each other
    /// - Seeding the same id twice
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// SQLite reported the database as locked past the busy timeout.
    #[error("Database busy: {0}")]
    Busy(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Repository input rejected before reaching SQLite.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// A stored value could not be decoded into its domain type.
    #[error("Corrupt data: {0}")]
    Corrupt(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::UniqueViolation { .. })
    }

    /// Lock contention and pool exhaustion clear up on their own.
    pub fn is_transient(&self) -> bool {
        matches!(self, DbError::Busy(_) | DbError::PoolExhausted)
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → constraint type from the SQLite message
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::ColumnDecode   → DbError::Corrupt
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // "UNIQUE constraint failed: customers.external_token"
                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::duplicate(field, "unknown")
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("database is locked") || msg.contains("database is busy") {
                    DbError::Busy(msg.to_string())
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                DbError::Corrupt(err.to_string())
            }

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Ledger Errors
// =============================================================================

/// Why the inventory ledger refused an adjustment.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Strict policy: the adjustment would take stock below zero.
    #[error("Insufficient stock for {ingredient}: on hand {on_hand}, requested {requested}")]
    InsufficientStock {
        ingredient: String,
        on_hand: Quantity,
        requested: Quantity,
    },

    #[error(transparent)]
    Db(#[from] DbError),
}

// =============================================================================
// Order Errors
// =============================================================================

/// What a caller of `place_order` sees when an order does not commit.
///
/// Every variant means the same thing for the database: nothing was written.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Malformed request or unresolvable actor.
    #[error("Invalid order: {0}")]
    Validation(#[from] ValidationError),

    /// A line item names a product that is not on the menu.
    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    /// Strict stock policy refused the order.
    #[error("Insufficient stock for {ingredient}: on hand {on_hand}, requested {requested}")]
    InsufficientStock {
        ingredient: String,
        on_hand: Quantity,
        requested: Quantity,
    },

    /// Lost a race with a concurrent writer. Safe to retry.
    #[error("Order conflict: {0}")]
    Conflict(String),

    /// The database failed underneath the order.
    #[error("Storage error: {0}")]
    Storage(DbError),
}

impl OrderError {
    /// True when resubmitting the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            OrderError::Conflict(_) => true,
            OrderError::Storage(err) => err.is_transient(),
            _ => false,
        }
    }

    /// True when the order itself is at fault rather than the store.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            OrderError::Validation(_)
                | OrderError::UnknownProduct(_)
                | OrderError::InsufficientStock { .. }
        )
    }
}

impl From<CoreError> for OrderError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(err) => OrderError::Validation(err),
        }
    }
}

impl From<DbError> for OrderError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation { .. } => OrderError::Conflict(err.to_string()),
            DbError::Validation(invalid) => OrderError::Validation(invalid),
            other => OrderError::Storage(other),
        }
    }
}

impl From<LedgerError> for OrderError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientStock {
                ingredient,
                on_hand,
                requested,
            } => OrderError::InsufficientStock {
                ingredient,
                on_hand,
                requested,
            },
            LedgerError::Db(db) => db.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_shortage_is_a_rejection() {
        let err: OrderError = LedgerError::InsufficientStock {
            ingredient: "Tapioca Pearls".to_string(),
            on_hand: Quantity::from_units(1),
            requested: Quantity::from_units(3),
        }
        .into();

        assert!(matches!(err, OrderError::InsufficientStock { .. }));
        assert!(err.is_rejection());
        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Tapioca Pearls: on hand 1.0, requested 3.0"
        );
    }

    #[test]
    fn test_unique_violation_is_a_conflict() {
        let err: OrderError = DbError::duplicate("customers.external_token", "user_1").into();
        assert!(matches!(err, OrderError::Conflict(_)));
        assert!(err.is_retryable());

        let busy: OrderError = DbError::Busy("database is locked".to_string()).into();
        assert!(matches!(busy, OrderError::Storage(_)));
        assert!(busy.is_retryable());

        let broken: OrderError = DbError::QueryFailed("no such table".to_string()).into();
        assert!(!broken.is_retryable());
        assert!(!broken.is_rejection());
    }

    #[test]
    fn test_core_errors_map_to_order_errors() {
        let err: OrderError = CoreError::Validation(ValidationError::MissingActor).into();
        assert!(matches!(
            err,
            OrderError::Validation(ValidationError::MissingActor)
        ));
    }
}
