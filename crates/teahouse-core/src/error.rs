//! # Error Types
//!
//! Domain-specific error types for teahouse-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  teahouse-core errors (this file)                                      │
//! │  ├── CoreError        - Request failures                               │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  teahouse-db errors (separate crate)                                   │
//! │  ├── DbError          - Database operation failures                    │
//! │  ├── LedgerError      - Stock adjustment rejections                    │
//! │  └── OrderError       - What callers of place_order see                │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → OrderError → caller               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Request checks are the only failures that need no database; unknown
/// products and stock shortages surface from teahouse-db.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised while checking an order request, before a transaction is opened.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Neither a staff member nor a customer placed the order.
    #[error("An order needs either an employee or a customer")]
    MissingActor,

    /// Both a staff member and a customer were given.
    #[error("An order cannot have both an employee and a customer")]
    AmbiguousActor,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
