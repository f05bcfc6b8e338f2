//! # Validation Module
//!
//! Field-level validation rules for order requests and catalog writes.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  └── Closed enums reject unknown sugar/size/ice values                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (called from OrderRequest::validate)             │
//! │  ├── Quantities, prices, ids, actor fields                             │
//! │  └── Runs before any transaction is opened                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints on quantities, enums, actor exclusivity         │
//! │  ├── UNIQUE customers.external_token                                   │
//! │  └── Foreign keys Order → LineItem → Modification                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::quantity::Quantity;
use crate::{
    MAX_ITEM_QUANTITY, MAX_LINE_ITEMS, MAX_MODIFICATIONS_PER_ITEM, MAX_MODIFICATION_TENTHS,
    MAX_PRICE_CENTS,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest external identity token accepted.
pub const MAX_TOKEN_LEN: usize = 255;

/// Longest display name accepted (products, ingredients, people).
pub const MAX_NAME_LEN: usize = 200;

const MAX_EMAIL_LEN: usize = 254;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name.
///
/// ```rust
/// use teahouse_core::validation::validate_name;
///
/// assert!(validate_name("name", "Brown Sugar Milk Tea").is_ok());
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates the identity provider token of a customer.
pub fn validate_external_token(token: &str) -> ValidationResult<()> {
    let token = token.trim();

    if token.is_empty() {
        return Err(ValidationError::Required {
            field: "external_token".to_string(),
        });
    }

    if token.len() > MAX_TOKEN_LEN {
        return Err(ValidationError::TooLong {
            field: "external_token".to_string(),
            max: MAX_TOKEN_LEN,
        });
    }

    Ok(())
}

/// Validates an optional email address. Only the basic shape is checked;
/// deliverability is the notifier's problem.
pub fn validate_optional_email(email: Option<&str>) -> ValidationResult<()> {
    let Some(email) = email.map(str::trim) else {
        return Ok(());
    };

    if email.len() > MAX_EMAIL_LEN {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LEN,
        });
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@example.com".to_string(),
        }),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_line_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an amount in cents that may be zero (free drinks, free add-ons).
///
/// ```rust
/// use teahouse_core::validation::validate_non_negative_cents;
///
/// assert!(validate_non_negative_cents("unit_price_cents", 0).is_ok());
/// assert!(validate_non_negative_cents("unit_price_cents", -100).is_err());
/// ```
pub fn validate_non_negative_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a sale price: zero up to [`MAX_PRICE_CENTS`].
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    validate_non_negative_cents(field, cents)?;

    if cents > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a new menu price. Unlike sale prices, menu prices cannot be zero.
pub fn validate_menu_price_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "unit_price_cents".to_string(),
        });
    }

    validate_price_cents("unit_price_cents", cents)
}

/// Validates a modification's price change. Either sign is accepted; the
/// magnitude must not exceed [`MAX_PRICE_CENTS`].
pub fn validate_modification_price_cents(cents: i64) -> ValidationResult<()> {
    if cents.unsigned_abs() > MAX_PRICE_CENTS as u64 {
        return Err(ValidationError::OutOfRange {
            field: "price_change_cents".to_string(),
            min: -MAX_PRICE_CENTS,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a modification's quantity change in tenths. Either sign is
/// accepted; the magnitude must not exceed [`MAX_MODIFICATION_TENTHS`].
///
/// ```rust
/// use teahouse_core::validation::validate_modification_tenths;
///
/// assert!(validate_modification_tenths(-5).is_ok());
/// assert!(validate_modification_tenths(i64::MIN).is_err());
/// ```
pub fn validate_modification_tenths(tenths: i64) -> ValidationResult<()> {
    if tenths.unsigned_abs() > MAX_MODIFICATION_TENTHS as u64 {
        return Err(ValidationError::OutOfRange {
            field: "quantity_change_tenths".to_string(),
            min: -MAX_MODIFICATION_TENTHS,
            max: MAX_MODIFICATION_TENTHS,
        });
    }

    Ok(())
}

/// Validates a restock amount. Restocks only ever add stock.
pub fn validate_restock_delta(delta: Quantity) -> ValidationResult<()> {
    if !delta.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "delta".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of line items in an order.
pub fn validate_line_item_count(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if count > MAX_LINE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_LINE_ITEMS as i64,
        });
    }

    Ok(())
}

/// Validates the number of modifications on one line item.
pub fn validate_modification_count(count: usize) -> ValidationResult<()> {
    if count > MAX_MODIFICATIONS_PER_ITEM {
        return Err(ValidationError::OutOfRange {
            field: "modifications".to_string(),
            min: 0,
            max: MAX_MODIFICATIONS_PER_ITEM as i64,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string.
///
/// ```rust
/// use teahouse_core::validation::validate_uuid;
///
/// assert!(validate_uuid("product_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("product_id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
