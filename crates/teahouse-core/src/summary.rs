//! # Order Summary
//!
//! What a notifier receives after an order commits: enough to print or
//! email a receipt without another database round trip.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use ts_rs::TS;

use crate::modification::ModificationEffects;
use crate::money::Money;
use crate::request::ValidatedLineItem;
use crate::types::{CupSize, IceLevel, ModificationKind, SugarLevel};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SummaryModification {
    pub kind: ModificationKind,
    /// "Unknown Ingredient" when the ingredient is not in inventory.
    pub ingredient_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SummaryItem {
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub sugar_level: SugarLevel,
    pub size: CupSize,
    pub ice_level: IceLevel,
    pub modifications: Vec<SummaryModification>,
}

impl SummaryItem {
    /// Builds a summary line from a validated line and its modification effects.
    pub fn from_line(
        product_name: impl Into<String>,
        item: &ValidatedLineItem,
        effects: &ModificationEffects,
    ) -> Self {
        SummaryItem {
            product_name: product_name.into(),
            quantity: item.quantity,
            unit_price_cents: item.unit_price.cents(),
            sugar_level: item.sugar_level,
            size: item.size,
            ice_level: item.ice_level,
            modifications: effects
                .effects
                .iter()
                .map(|e| SummaryModification {
                    kind: e.kind,
                    ingredient_name: e.ingredient_name.clone(),
                })
                .collect(),
        }
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

/// A committed order, ready for notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderSummary {
    pub order_id: String,
    pub customer_name: String,
    /// Where a receipt could be sent. None for staff orders and customers
    /// without an email on file.
    pub recipient_email: Option<String>,
    pub total_cents: i64,
    #[ts(as = "String")]
    pub placed_at: DateTime<Utc>,
    pub items: Vec<SummaryItem>,
}

impl OrderSummary {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Plain-text receipt.
    ///
    /// ```text
    /// Order #7d0c…
    /// Hi Mei, thank you for your order!
    ///
    /// 2 x Brown Sugar Milk Tea          $9.50
    ///     Sugar: 50% | Size: large | Ice: less
    ///     EXTRA: Tapioca Pearls
    ///
    /// Total: $11.00
    /// ```
    pub fn render_receipt(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(out, "Order #{}", self.order_id);
        let _ = writeln!(out, "Hi {}, thank you for your order!", self.customer_name);
        let _ = writeln!(out);

        for item in &self.items {
            let _ = writeln!(
                out,
                "{} x {:<28} {:>8}",
                item.quantity,
                item.product_name,
                item.line_total().to_string()
            );
            let _ = writeln!(
                out,
                "    Sugar: {} | Size: {} | Ice: {}",
                item.sugar_level, item.size, item.ice_level
            );
            for m in &item.modifications {
                let _ = writeln!(out, "    {}: {}", m.kind, m.ingredient_name);
            }
        }

        let _ = writeln!(out);
        let _ = write!(out, "Total: {}", self.total());
        out
    }
}
