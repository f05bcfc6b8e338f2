//! # teahouse-core: Pure Business Logic for Teahouse POS
//!
//! This crate holds everything about placing a drink order that can be
//! decided without touching the database: the domain types, the recipe
//! resolver, the modification engine, the consumption plan and the order
//! summary handed to notifiers.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Teahouse POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Order request (kiosk, register, place-order)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ OrderRequest (JSON)                    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ teahouse-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌──────────────┐  ┌─────────┐  │   │
//! │  │   │  request  │  │  recipe   │  │ modification │  │  plan   │  │   │
//! │  │   │ validate  │  │ resolver  │  │    engine    │  │ deltas  │  │   │
//! │  │   └───────────┘  └───────────┘  └──────────────┘  └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │     teahouse-db (ledger, order coordinator, repositories)       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Ingredient, Order, LineItem, ...)
//! - [`money`] - Money type with integer cents
//! - [`quantity`] - Ingredient quantities in tenths of a unit
//! - [`request`] - Incoming order requests and their validated form
//! - [`recipe`] - Recipe resolution including the cup for each size
//! - [`modification`] - Signed ingredient deltas for modifications
//! - [`plan`] - Per-order consumption plan fed to the inventory ledger
//! - [`summary`] - Post-commit order summary and receipt text
//! - [`validation`] - Field-level validation rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use teahouse_core::quantity::Quantity;
//! use teahouse_core::types::ModificationKind;
//!
//! // Two extra pumps of syrup on a line of three drinks
//! let per_drink = Quantity::from_units(2);
//! let delta = ModificationKind::Extra.signed(per_drink.scale(3));
//! assert_eq!(delta, Quantity::from_units(6));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod modification;
pub mod money;
pub mod plan;
pub mod quantity;
pub mod recipe;
pub mod request;
pub mod summary;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use quantity::Quantity;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single order.
pub const MAX_LINE_ITEMS: usize = 100;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Catches typos at the register (1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum modifications on one line item.
pub const MAX_MODIFICATIONS_PER_ITEM: usize = 20;

/// Largest unit price or modification price change, in cents ($10,000).
pub const MAX_PRICE_CENTS: i64 = 1_000_000;

/// Largest quantity change of one modification, in tenths (1,000 units).
pub const MAX_MODIFICATION_TENTHS: i64 = 10_000;

/// Inventory name of the container consumed by a small drink.
pub const SMALL_CUP: &str = "Small Cup";

/// Inventory name of the container consumed by a normal drink.
pub const MEDIUM_CUP: &str = "Medium Cup";

/// Inventory name of the container consumed by a large drink.
pub const LARGE_CUP: &str = "Large Cup";

/// Name shown for a modification whose ingredient is not in inventory.
pub const UNKNOWN_INGREDIENT: &str = "Unknown Ingredient";

/// Greeting name used on receipts when the customer gave none.
pub const DEFAULT_CUSTOMER_NAME: &str = "Customer";
