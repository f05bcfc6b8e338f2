//! # Inventory Ledger
//!
//! The only code that changes on-hand stock during an order.
//!
//! ## Adjustment
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ConsumptionPlan { cup: +3.0, milk: +4.5, pearls: -1.0 }               │
//! │       │  sorted by ingredient id, zero deltas dropped                  │
//! │       ▼                                                                 │
//! │  UPDATE inventory SET on_hand_tenths = on_hand_tenths - :delta         │
//! │  WHERE id = :id [AND stock suffices, strict only]                      │
//! │  RETURNING on_hand_tenths                                              │
//! │       │                                                                 │
//! │       ├── row   → StockAdjustment                                      │
//! │       └── none  → unknown id (DbError) or shortage (InsufficientStock) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The arithmetic runs inside SQLite against the current row, never as a
//! read-modify-write in Rust. Concurrent orders are serialized by SQLite's
//! write lock, which the enclosing order transaction already holds.
//! Nothing is committed here; a failure leaves the caller to roll back.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::{DbError, LedgerError};
use teahouse_core::plan::ConsumptionPlan;
use teahouse_core::Quantity;

// =============================================================================
// Stock Policy
// =============================================================================

/// What to do when an order would take an ingredient below zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockPolicy {
    /// Let stock go negative and log a warning. Orders are never refused
    /// for stock.
    #[default]
    Permissive,
    /// Refuse the whole order.
    Strict,
}

impl StockPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockPolicy::Permissive => "permissive",
            StockPolicy::Strict => "strict",
        }
    }
}

impl fmt::Display for StockPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "permissive" => Ok(StockPolicy::Permissive),
            "strict" => Ok(StockPolicy::Strict),
            other => Err(format!(
                "unknown stock policy '{other}' (expected 'permissive' or 'strict')"
            )),
        }
    }
}

// =============================================================================
// Ledger
// =============================================================================

/// One applied change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockAdjustment {
    pub ingredient_id: String,
    /// Signed consumption; positive took stock away.
    pub delta: Quantity,
    pub on_hand_after: Quantity,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryLedger {
    policy: StockPolicy,
}

impl InventoryLedger {
    pub fn new(policy: StockPolicy) -> Self {
        InventoryLedger { policy }
    }

    pub fn policy(&self) -> StockPolicy {
        self.policy
    }

    /// Applies every non-zero delta of `plan` on `conn`.
    ///
    /// Stops at the first refused adjustment. Earlier adjustments stay
    /// pending in the caller's transaction.
    pub async fn apply_deltas(
        &self,
        conn: &mut SqliteConnection,
        plan: &ConsumptionPlan,
    ) -> Result<Vec<StockAdjustment>, LedgerError> {
        let strict = self.policy == StockPolicy::Strict;
        let now = Utc::now();
        let mut adjustments = Vec::new();

        for (ingredient_id, delta) in plan.deltas() {
            // Returns (delta <= 0) always pass, even under the strict policy.
            let on_hand: Option<i64> = sqlx::query_scalar(
                r#"
                UPDATE inventory
                SET on_hand_tenths = on_hand_tenths - ?2,
                    updated_at = ?3
                WHERE id = ?1
                  AND (?4 = 0 OR ?2 <= 0 OR on_hand_tenths >= ?2)
                RETURNING on_hand_tenths
                "#,
            )
            .bind(ingredient_id)
            .bind(delta.tenths())
            .bind(now)
            .bind(strict)
            .fetch_optional(&mut *conn)
            .await
            .map_err(DbError::from)?;

            let Some(on_hand) = on_hand.map(Quantity::from_tenths) else {
                return Err(Self::explain_refusal(conn, ingredient_id, delta).await);
            };

            if on_hand.is_negative() {
                warn!(
                    ingredient_id = %ingredient_id,
                    delta = %delta,
                    on_hand = %on_hand,
                    "Ingredient stock went negative"
                );
            } else {
                debug!(ingredient_id = %ingredient_id, delta = %delta, on_hand = %on_hand, "Stock adjusted");
            }

            adjustments.push(StockAdjustment {
                ingredient_id: ingredient_id.to_string(),
                delta,
                on_hand_after: on_hand,
            });
        }

        Ok(adjustments)
    }

    /// The update matched no row: either the ingredient is gone or strict
    /// mode refused it.
    async fn explain_refusal(
        conn: &mut SqliteConnection,
        ingredient_id: &str,
        requested: Quantity,
    ) -> LedgerError {
        let row: Result<Option<(String, i64)>, sqlx::Error> =
            sqlx::query_as("SELECT name, on_hand_tenths FROM inventory WHERE id = ?1")
                .bind(ingredient_id)
                .fetch_optional(&mut *conn)
                .await;

        match row {
            Ok(Some((name, on_hand))) => {
                warn!(
                    ingredient = %name,
                    on_hand_tenths = on_hand,
                    requested = %requested,
                    "Strict stock policy refused adjustment"
                );
                LedgerError::InsufficientStock {
                    ingredient: name,
                    on_hand: Quantity::from_tenths(on_hand),
                    requested,
                }
            }
            Ok(None) => DbError::not_found("Ingredient", ingredient_id).into(),
            Err(err) => DbError::from(err).into(),
        }
    }
}
