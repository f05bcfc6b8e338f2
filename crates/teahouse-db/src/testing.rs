//! Fixtures shared by the unit tests in this crate.

use chrono::Utc;
use uuid::Uuid;

use crate::pool::{Database, DbConfig};
use teahouse_core::{Employee, EmployeeRole, Ingredient, Product, RecipeEntry};

pub async fn memory_db() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

/// An ingredient with `on_hand_units` whole units in stock and no price.
pub fn ingredient(name: &str, on_hand_units: i64, is_add_on: bool) -> Ingredient {
    Ingredient {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        on_hand_tenths: on_hand_units * 10,
        is_add_on,
        price_per_unit_cents: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn add_on(name: &str, on_hand_units: i64, price_cents: i64) -> Ingredient {
    Ingredient {
        price_per_unit_cents: Some(price_cents),
        ..ingredient(name, on_hand_units, true)
    }
}

/// A product whose recipe is `(ingredient, tenths per drink)` in order.
pub fn product(name: &str, price_cents: i64, recipe: &[(&Ingredient, i64)]) -> Product {
    Product {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        unit_price_cents: price_cents,
        vegan: true,
        category: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        recipe: recipe
            .iter()
            .map(|(ingredient, tenths)| RecipeEntry {
                ingredient_id: ingredient.id.clone(),
                ingredient_name: ingredient.name.clone(),
                quantity_per_unit_tenths: *tenths,
            })
            .collect(),
    }
}

pub fn employee(name: &str) -> Employee {
    Employee {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        role: EmployeeRole::Cashier,
        email: None,
        created_at: Utc::now(),
    }
}
