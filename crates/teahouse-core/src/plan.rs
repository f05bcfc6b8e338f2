//! # Consumption Plan
//!
//! The net inventory change of a whole order, built line by line from the
//! recipe resolver and the modification engine, then handed to the ledger
//! in one piece.
//!
//! ```text
//! for each line item:
//!     resolve(product, size)  × quantity  ──┐
//!     apply(modifications, quantity)       ──┴──► plan[ingredient] += delta
//!
//! ledger.apply_deltas(plan)   (ingredient ids in sorted order)
//! ```

use std::collections::BTreeMap;

use crate::modification::{self, IngredientDirectory, ModificationEffects};
use crate::quantity::Quantity;
use crate::recipe::{self, ContainerIndex};
use crate::request::ValidatedLineItem;
use crate::types::Product;

/// Net signed consumption per ingredient. Positive values deplete stock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumptionPlan {
    deltas: BTreeMap<String, Quantity>,
}

impl ConsumptionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a signed delta for one ingredient.
    pub fn add(&mut self, ingredient_id: &str, delta: Quantity) {
        *self
            .deltas
            .entry(ingredient_id.to_string())
            .or_insert(Quantity::ZERO) += delta;
    }

    /// Adds everything one line item consumes and returns its modification
    /// effects for the order summary.
    pub fn add_line(
        &mut self,
        product: &Product,
        item: &ValidatedLineItem,
        containers: &ContainerIndex,
        directory: &IngredientDirectory,
    ) -> ModificationEffects {
        for consumption in recipe::resolve(product, item.size, containers) {
            self.add(
                &consumption.ingredient_id,
                consumption.quantity_per_unit.scale(item.quantity),
            );
        }

        let effects = modification::apply(&item.modifications, item.quantity, directory);
        for (ingredient_id, delta) in effects.deltas() {
            self.add(ingredient_id, delta);
        }
        effects
    }

    /// Non-zero net deltas in ingredient id order.
    pub fn deltas(&self) -> impl Iterator<Item = (&str, Quantity)> + '_ {
        self.deltas
            .iter()
            .filter(|(_, q)| !q.is_zero())
            .map(|(id, q)| (id.as_str(), *q))
    }

    /// Net delta for one ingredient.
    pub fn get(&self, ingredient_id: &str) -> Quantity {
        self.deltas
            .get(ingredient_id)
            .copied()
            .unwrap_or(Quantity::ZERO)
    }

    pub fn is_empty(&self) -> bool {
        self.deltas().next().is_none()
    }
}
