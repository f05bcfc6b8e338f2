//! # Seed Data Generator
//!
//! Populates the database with a sample tea shop for development.
//!
//! ## Usage
//! ```bash
//! # Seed the database from the config file
//! cargo run -p teahouse-db --bin seed
//!
//! # Specify database path
//! cargo run -p teahouse-db --bin seed -- --db ./data/teahouse.db
//! ```
//!
//! ## Generated Data
//! - Structural ingredients (tea bases, milk, syrups)
//! - Cups for every size: `Small Cup`, `Medium Cup`, `Large Cup`
//! - Priced add-ons (pearls, jellies, foam)
//! - Drinks with recipes
//! - One cashier and one manager
//!
//! Prints the ids a first order needs.

use chrono::Utc;
use std::env;
use std::path::PathBuf;
use teahouse_core::{CupSize, Employee, EmployeeRole, Ingredient, Product, RecipeEntry};
use teahouse_db::logging::init_tracing;
use teahouse_db::repository::inventory::generate_ingredient_id;
use teahouse_db::repository::product::generate_product_id;
use teahouse_db::{AppConfig, Database};
use uuid::Uuid;

/// (name, on hand in whole units)
const BASES: &[(&str, i64)] = &[
    ("Black Tea Base", 200),
    ("Green Tea Base", 200),
    ("Oolong Tea Base", 150),
    ("Whole Milk", 120),
    ("Oat Milk", 80),
    ("Brown Sugar Syrup", 60),
    ("Taro Paste", 40),
    ("Mango Puree", 40),
];

/// (name, on hand in whole units, price per unit in cents)
const ADD_ONS: &[(&str, i64, i64)] = &[
    ("Tapioca Pearls", 100, 75),
    ("Lychee Jelly", 60, 75),
    ("Pudding", 40, 100),
    ("Cheese Foam", 40, 125),
    ("Red Bean", 30, 75),
];

/// (name, price in cents, category, vegan, [(ingredient, tenths per drink)])
const DRINKS: &[(&str, i64, &str, bool, &[(&str, i64)])] = &[
    (
        "Classic Milk Tea",
        450,
        "Milk Tea",
        false,
        &[("Black Tea Base", 20), ("Whole Milk", 10)],
    ),
    (
        "Brown Sugar Milk Tea",
        550,
        "Milk Tea",
        false,
        &[("Black Tea Base", 15), ("Whole Milk", 15), ("Brown Sugar Syrup", 5)],
    ),
    (
        "Taro Oat Latte",
        575,
        "Milk Tea",
        true,
        &[("Taro Paste", 5), ("Oat Milk", 20)],
    ),
    (
        "Jasmine Green Tea",
        400,
        "Fruit Tea",
        true,
        &[("Green Tea Base", 25)],
    ),
    (
        "Mango Green Tea",
        500,
        "Fruit Tea",
        true,
        &[("Green Tea Base", 20), ("Mango Puree", 5)],
    ),
    (
        "Roasted Oolong",
        425,
        "Pure Tea",
        true,
        &[("Oolong Tea Base", 25)],
    ),
];

const CUP_STOCK_UNITS: i64 = 300;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Teahouse POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>       Database file path (default: from config)");
                println!("  -c, --config <PATH>   Config file path");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            other => eprintln!("Ignoring unknown argument: {}", other),
        }
        i += 1;
    }

    let mut config = AppConfig::load(config_path)?;
    if let Some(path) = db_path {
        config.database.path = path;
    }
    init_tracing(&config.logging.filter);

    println!("🌱 Teahouse POS Seed Data Generator");
    println!("===================================");
    println!("Database: {}", config.database.path.display());
    println!();

    let db = Database::new(config.db_config()).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing menu
    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Stocking inventory...");

    let mut inventory: Vec<Ingredient> = Vec::new();

    for (name, units) in BASES {
        inventory.push(db.inventory().insert(&new_ingredient(name, *units, None)).await?);
    }

    for size in CupSize::ALL {
        let cup = new_ingredient(size.container_name(), CUP_STOCK_UNITS, None);
        inventory.push(db.inventory().insert(&cup).await?);
    }

    for (name, units, price) in ADD_ONS {
        inventory.push(db.inventory().insert(&new_ingredient(name, *units, Some(*price))).await?);
    }

    println!("  {} ingredients", inventory.len());

    println!("Building menu...");

    let mut first_drink: Option<Product> = None;
    for (name, price, category, vegan, recipe) in DRINKS {
        let mut entries = Vec::with_capacity(recipe.len());
        for (ingredient_name, tenths) in recipe.iter() {
            let Some(ingredient) = inventory.iter().find(|i| i.name == *ingredient_name) else {
                eprintln!("⚠ {}: no ingredient named {}, left out of recipe", name, ingredient_name);
                continue;
            };
            entries.push(RecipeEntry {
                ingredient_id: ingredient.id.clone(),
                ingredient_name: ingredient.name.clone(),
                quantity_per_unit_tenths: *tenths,
            });
        }

        let now = Utc::now();
        let product = Product {
            id: generate_product_id(),
            name: name.to_string(),
            unit_price_cents: *price,
            vegan: *vegan,
            category: Some(category.to_string()),
            created_at: now,
            updated_at: now,
            recipe: entries,
        };

        let product = db.products().insert(&product).await?;
        first_drink.get_or_insert(product);
    }

    println!("  {} drinks", db.products().count().await?);

    println!("Hiring staff...");
    let cashier = db
        .employees()
        .insert(&new_employee("Ana", EmployeeRole::Cashier))
        .await?;
    db.employees()
        .insert(&new_employee("Bao", EmployeeRole::Manager))
        .await?;

    println!();
    println!("✓ Seed complete!");
    println!();
    println!("Cashier id:  {}", cashier.id);
    if let Some(drink) = first_drink {
        println!("{} id:  {}", drink.name, drink.id);
    }
    if let Some(pearls) = inventory.iter().find(|i| i.name == "Tapioca Pearls") {
        println!("{} id:  {}", pearls.name, pearls.id);
    }

    db.close().await;
    Ok(())
}

fn new_ingredient(name: &str, units: i64, price_per_unit_cents: Option<i64>) -> Ingredient {
    let now = Utc::now();
    Ingredient {
        id: generate_ingredient_id(),
        name: name.to_string(),
        on_hand_tenths: units * 10,
        is_add_on: price_per_unit_cents.is_some(),
        price_per_unit_cents,
        created_at: now,
        updated_at: now,
    }
}

fn new_employee(name: &str, role: EmployeeRole) -> Employee {
    Employee {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        role,
        email: None,
        created_at: Utc::now(),
    }
}
