//! # teahouse-db: Storage and Order Transaction for Teahouse POS
//!
//! Everything in the order path that touches SQLite. Pure recipe and
//! modification math lives in `teahouse-core`; this crate runs it inside
//! one transaction per order.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Teahouse POS Order Flow                            │
//! │                                                                         │
//! │  Register / kiosk / place-order binary                                 │
//! │       │  OrderRequest                                                   │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   teahouse-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │OrderCoordinator│──►│ Repositories  │    │  Migrations  │  │   │
//! │  │   │ (checkout.rs) │    │ customer      │    │  (embedded)  │  │   │
//! │  │   │               │    │ product       │    │ 001_init.sql │  │   │
//! │  │   │               │──► │ order         │    └──────────────┘  │   │
//! │  │   │               │    └───────────────┘                      │   │
//! │  │   │               │──► InventoryLedger (ledger.rs)            │   │
//! │  │   │               │──► OrderNotifier   (notify.rs)            │   │
//! │  │   └───────────────┘                                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`checkout`] - Order transaction coordinator
//! - [`ledger`] - Inventory ledger and stock policy
//! - [`notify`] - Post-commit notification seam
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`repository`] - Repository implementations
//! - [`config`] - TOML and environment configuration
//! - [`logging`] - tracing subscriber setup for the binaries
//! - [`error`] - Storage, ledger and order error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use teahouse_db::{AppConfig, Database, OrderCoordinator};
//!
//! let config = AppConfig::load(None)?;
//! let db = Database::new(config.db_config()).await?;
//!
//! let coordinator = OrderCoordinator::from_config(db, &config);
//! let placed = coordinator.place_order(request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod config;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod migrations;
pub mod notify;
pub mod pool;
pub mod repository;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{OrderCoordinator, OrderStage, PlacedOrder};
pub use config::{AppConfig, ConfigError};
pub use error::{DbError, DbResult, LedgerError, OrderError};
pub use ledger::{InventoryLedger, StockAdjustment, StockPolicy};
pub use notify::{ChannelNotifier, NotificationError, OrderNotifier, TracingNotifier};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::employee::EmployeeRepository;
pub use repository::inventory::InventoryRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
