//! # Modification Engine
//!
//! Computes the signed inventory delta of a line item's modifications.
//!
//! ## Arithmetic
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  delta = |quantity_change| × line_quantity × sign(kind)                 │
//! │                                                                         │
//! │  ADD   / EXTRA   sign = +1   (consume more)                            │
//! │  REMOVE / LESS   sign = −1   (return to stock)                         │
//! │                                                                         │
//! │  Several modifications on one ingredient are summed:                   │
//! │  EXTRA pearls 1.0 + LESS pearls 0.5, line qty 2  →  +1.0               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Unknown Ingredients
//! A modification may name an ingredient id that inventory does not have
//! (stale menus, deleted add-ons). Such a modification is still recorded on
//! the order and listed on the receipt as "Unknown Ingredient", but its
//! delta is zero and it never reaches the ledger.

use std::collections::{BTreeMap, HashMap};

use crate::quantity::Quantity;
use crate::request::ModificationSpec;
use crate::types::{Ingredient, ModificationKind};
use crate::UNKNOWN_INGREDIENT;

// =============================================================================
// Ingredient Directory
// =============================================================================

/// Ingredient names by id, loaded once per order.
#[derive(Debug, Clone, Default)]
pub struct IngredientDirectory {
    names: HashMap<String, String>,
}

impl IngredientDirectory {
    pub fn from_inventory<'a>(ingredients: impl IntoIterator<Item = &'a Ingredient>) -> Self {
        IngredientDirectory {
            names: ingredients
                .into_iter()
                .map(|i| (i.id.clone(), i.name.clone()))
                .collect(),
        }
    }

    pub fn with(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.names.insert(id.into(), name.into());
        self
    }

    pub fn name(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Name for display, falling back to the unknown-ingredient placeholder.
    pub fn display_name(&self, id: &str) -> &str {
        self.name(id).unwrap_or(UNKNOWN_INGREDIENT)
    }
}

// =============================================================================
// Effects
// =============================================================================

/// The outcome of one requested modification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModificationEffect {
    pub ingredient_id: String,
    pub ingredient_name: String,
    pub kind: ModificationKind,
    /// Signed consumption for the whole line. Zero when not applied.
    pub delta: Quantity,
    /// False when the ingredient is not in inventory.
    pub applied: bool,
}

/// All modification effects of one line item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModificationEffects {
    pub effects: Vec<ModificationEffect>,
    deltas: BTreeMap<String, Quantity>,
}

impl ModificationEffects {
    /// Net delta per known ingredient, ordered by ingredient id.
    pub fn deltas(&self) -> impl Iterator<Item = (&str, Quantity)> + '_ {
        self.deltas.iter().map(|(id, q)| (id.as_str(), *q))
    }

    pub fn delta_for(&self, ingredient_id: &str) -> Quantity {
        self.deltas
            .get(ingredient_id)
            .copied()
            .unwrap_or(Quantity::ZERO)
    }

    /// Modifications skipped because their ingredient is unknown.
    pub fn skipped(&self) -> impl Iterator<Item = &ModificationEffect> + '_ {
        self.effects.iter().filter(|e| !e.applied)
    }
}

/// Applies a line item's modifications.
///
/// ```rust
/// use teahouse_core::modification::{apply, IngredientDirectory};
/// use teahouse_core::quantity::Quantity;
/// use teahouse_core::request::ModificationSpec;
/// use teahouse_core::types::ModificationKind;
/// use teahouse_core::Money;
///
/// let directory = IngredientDirectory::default().with("pearls", "Tapioca Pearls");
/// let extra = ModificationSpec {
///     ingredient_id: "pearls".into(),
///     kind: ModificationKind::Extra,
///     quantity_change: Quantity::ONE,
///     price_change: Money::from_cents(75),
/// };
///
/// let effects = apply(&[extra], 2, &directory);
/// assert_eq!(effects.delta_for("pearls"), Quantity::from_units(2));
/// ```
pub fn apply(
    modifications: &[ModificationSpec],
    line_quantity: i64,
    directory: &IngredientDirectory,
) -> ModificationEffects {
    let mut result = ModificationEffects::default();

    for modification in modifications {
        let Some(name) = directory.name(&modification.ingredient_id) else {
            result.effects.push(ModificationEffect {
                ingredient_id: modification.ingredient_id.clone(),
                ingredient_name: UNKNOWN_INGREDIENT.to_string(),
                kind: modification.kind,
                delta: Quantity::ZERO,
                applied: false,
            });
            continue;
        };

        let delta = modification
            .kind
            .signed(modification.quantity_change.abs().scale(line_quantity));

        *result
            .deltas
            .entry(modification.ingredient_id.clone())
            .or_insert(Quantity::ZERO) += delta;

        result.effects.push(ModificationEffect {
            ingredient_id: modification.ingredient_id.clone(),
            ingredient_name: name.to_string(),
            kind: modification.kind,
            delta,
            applied: true,
        });
    }

    result
}
