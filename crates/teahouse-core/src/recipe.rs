//! # Recipe Resolver
//!
//! Turns a product and a serving size into the ingredients one drink uses.
//!
//! ## Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Brown Sugar Milk Tea, size large                                       │
//! │                                                                         │
//! │  recipe (in order)          ──►  Black Tea       2.0                    │
//! │                                  Milk            1.5                    │
//! │                                  Brown Sugar     0.5                    │
//! │  container for "large"      ──►  Large Cup       1.0   (if stocked)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Container tracking is optional per store: when no ingredient named after
//! the size's cup exists, the container line is left out.

use std::collections::HashMap;

use crate::quantity::Quantity;
use crate::types::{CupSize, Ingredient, Product};

/// One ingredient consumed per drink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consumption {
    pub ingredient_id: String,
    pub quantity_per_unit: Quantity,
}

/// Cup ingredient ids per serving size, as found in inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerIndex {
    by_size: HashMap<CupSize, String>,
}

impl ContainerIndex {
    /// Builds the index by matching inventory names against each size's cup
    /// name. The first ingredient with a matching name wins.
    pub fn from_inventory<'a>(ingredients: impl IntoIterator<Item = &'a Ingredient>) -> Self {
        let mut by_size = HashMap::new();
        for ingredient in ingredients {
            for size in CupSize::ALL {
                if ingredient.name == size.container_name() {
                    by_size
                        .entry(size)
                        .or_insert_with(|| ingredient.id.clone());
                }
            }
        }
        ContainerIndex { by_size }
    }

    /// Registers the cup ingredient for a size.
    pub fn with(mut self, size: CupSize, ingredient_id: impl Into<String>) -> Self {
        self.by_size.insert(size, ingredient_id.into());
        self
    }

    /// Cup ingredient id for a size, if the store tracks it.
    pub fn get(&self, size: CupSize) -> Option<&str> {
        self.by_size.get(&size).map(String::as_str)
    }
}

/// Lists what one drink of `product` in `size` consumes.
///
/// The recipe comes first in its stored order, followed by one cup when the
/// store stocks a container for the size. An empty recipe is legal.
pub fn resolve(product: &Product, size: CupSize, containers: &ContainerIndex) -> Vec<Consumption> {
    let mut consumption: Vec<Consumption> = product
        .recipe
        .iter()
        .map(|entry| Consumption {
            ingredient_id: entry.ingredient_id.clone(),
            quantity_per_unit: entry.quantity_per_unit(),
        })
        .collect();

    if let Some(cup_id) = containers.get(size) {
        consumption.push(Consumption {
            ingredient_id: cup_id.to_string(),
            quantity_per_unit: Quantity::ONE,
        });
    }

    consumption
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecipeEntry;
    use chrono::Utc;

    fn ingredient(id: &str, name: &str) -> Ingredient {
        Ingredient {
            id: id.to_string(),
            name: name.to_string(),
            on_hand_tenths: 1000,
            is_add_on: false,
            price_per_unit_cents: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn milk_tea(recipe: Vec<(&str, i64)>) -> Product {
        Product {
            id: "milk-tea".to_string(),
            name: "Classic Milk Tea".to_string(),
            unit_price_cents: 450,
            vegan: false,
            category: Some("Milk Tea".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            recipe: recipe
                .into_iter()
                .map(|(id, tenths)| RecipeEntry {
                    ingredient_id: id.to_string(),
                    ingredient_name: id.to_string(),
                    quantity_per_unit_tenths: tenths,
                })
                .collect(),
        }
    }

    #[test]
    fn test_recipe_then_cup() {
        let containers = ContainerIndex::default().with(CupSize::Normal, "medium-cup");
        let product = milk_tea(vec![("black-tea", 20), ("milk", 15)]);

        let consumption = resolve(&product, CupSize::Normal, &containers);

        let ids: Vec<&str> = consumption.iter().map(|c| c.ingredient_id.as_str()).collect();
        assert_eq!(ids, vec!["black-tea", "milk", "medium-cup"]);
        assert_eq!(consumption[0].quantity_per_unit, Quantity::from_units(2));
        assert_eq!(consumption[2].quantity_per_unit, Quantity::ONE);
    }

    #[test]
    fn test_missing_cup_is_omitted() {
        let containers = ContainerIndex::default().with(CupSize::Normal, "medium-cup");
        let product = milk_tea(vec![("black-tea", 20)]);

        let consumption = resolve(&product, CupSize::Large, &containers);
        assert_eq!(consumption.len(), 1);
        assert_eq!(consumption[0].ingredient_id, "black-tea");
    }

    #[test]
    fn test_empty_recipe() {
        let containers = ContainerIndex::default().with(CupSize::Small, "small-cup");
        let consumption = resolve(&milk_tea(vec![]), CupSize::Small, &containers);
        assert_eq!(
            consumption,
            vec![Consumption {
                ingredient_id: "small-cup".to_string(),
                quantity_per_unit: Quantity::ONE,
            }]
        );
    }

    #[test]
    fn test_index_from_inventory() {
        let inventory = vec![
            ingredient("a", "Black Tea"),
            ingredient("b", "Small Cup"),
            ingredient("c", "Medium Cup"),
            ingredient("d", "Medium Cup"),
        ];
        let index = ContainerIndex::from_inventory(&inventory);

        assert_eq!(index.get(CupSize::Small), Some("b"));
        assert_eq!(index.get(CupSize::Normal), Some("c"));
        assert_eq!(index.get(CupSize::Large), None);
    }
}
