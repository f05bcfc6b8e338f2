//! # Product Repository
//!
//! Database operations for the drink menu and recipes.
//!
//! ## Recipe Storage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products                  product_recipe                inventory      │
//! │  ┌──────────────┐          ┌─────────────────────┐       ┌───────────┐  │
//! │  │ Taro Milk Tea│──────────┤ taro powder  2.0  #0├──────►│ on_hand   │  │
//! │  │  $5.25       │          │ milk         1.5  #1├──────►│ on_hand   │  │
//! │  └──────────────┘          └─────────────────────┘       └───────────┘  │
//! │                                                                         │
//! │  Orders read the recipe in position order. The cup is not part of the  │
//! │  recipe; it is chosen per line from the serving size.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use teahouse_core::validation::{validate_menu_price_cents, validate_name};
use teahouse_core::{Money, Product, RecipeEntry};

const PRODUCT_COLUMNS: &str =
    "id, name, unit_price_cents, vegan, category, created_at, updated_at";

/// Repository for menu products.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let menu = repo.list().await?;
/// let taro = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product with its recipe.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        Self::get_by_id_in_tx(&mut conn, id).await
    }

    /// Same as [`get_by_id`](Self::get_by_id), on a caller-held connection.
    ///
    /// The order coordinator passes its open transaction here so the
    /// product read happens under the same write lock as the order.
    pub async fn get_by_id_in_tx(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product: Option<Product> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        let Some(mut product) = product else {
            return Ok(None);
        };

        product.recipe = Self::recipe_in_position_order(conn, &product.id).await?;
        Ok(Some(product))
    }

    /// Lists the menu by name, recipes included.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let mut conn = self.pool.acquire().await?;

        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name");
        let mut products: Vec<Product> = sqlx::query_as(&sql).fetch_all(&mut *conn).await?;

        for product in &mut products {
            product.recipe = Self::recipe_in_position_order(&mut conn, &product.id).await?;
        }

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Recipe of a product ordered by ingredient name, for menu display.
    pub async fn recipe(&self, product_id: &str) -> DbResult<Vec<RecipeEntry>> {
        let entries = sqlx::query_as(
            r#"
            SELECT r.ingredient_id,
                   i.name AS ingredient_name,
                   r.quantity_per_unit_tenths
            FROM product_recipe r
            INNER JOIN inventory i ON i.id = r.ingredient_id
            WHERE r.product_id = ?1
            ORDER BY i.name
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn recipe_in_position_order(
        conn: &mut SqliteConnection,
        product_id: &str,
    ) -> DbResult<Vec<RecipeEntry>> {
        let entries = sqlx::query_as(
            r#"
            SELECT r.ingredient_id,
                   i.name AS ingredient_name,
                   r.quantity_per_unit_tenths
            FROM product_recipe r
            INNER JOIN inventory i ON i.id = r.ingredient_id
            WHERE r.product_id = ?1
            ORDER BY r.position
            "#,
        )
        .bind(product_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(entries)
    }

    /// Distinct menu categories, alphabetically.
    pub async fn categories(&self) -> DbResult<Vec<String>> {
        let categories = sqlx::query_scalar(
            "SELECT DISTINCT category FROM products WHERE category IS NOT NULL ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Inserts a product and its recipe in one transaction.
    ///
    /// Recipe entries keep the order they have in `product.recipe`.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKeyViolation)` - a recipe ingredient is not in inventory
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        validate_name("name", &product.name)?;
        validate_menu_price_cents(product.unit_price_cents)?;
        debug!(name = %product.name, recipe_len = product.recipe.len(), "Inserting product");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (id, name, unit_price_cents, vegan, category, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.unit_price_cents)
        .bind(product.vegan)
        .bind(&product.category)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        for (position, entry) in product.recipe.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO product_recipe (product_id, ingredient_id, quantity_per_unit_tenths, position)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(&product.id)
            .bind(&entry.ingredient_id)
            .bind(entry.quantity_per_unit_tenths)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(product.clone())
    }

    /// Changes the menu price. Orders already placed keep the price they
    /// were sold at.
    pub async fn update_price(&self, id: &str, price: Money) -> DbResult<()> {
        validate_menu_price_cents(price.cents())?;
        debug!(id = %id, price = %price, "Updating product price");

        let result = sqlx::query(
            "UPDATE products SET unit_price_cents = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(price.cents())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts menu products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ingredient, memory_db, product};

    #[tokio::test]
    async fn test_insert_and_get_with_recipe() {
        let db = memory_db().await;
        let milk = db.inventory().insert(&ingredient("Milk", 100, false)).await.unwrap();
        let taro = db.inventory().insert(&ingredient("Taro Powder", 50, false)).await.unwrap();

        let drink = product("Taro Milk Tea", 525, &[(&taro, 20), (&milk, 15)]);
        db.products().insert(&drink).await.unwrap();

        let loaded = db.products().get_by_id(&drink.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Taro Milk Tea");
        assert_eq!(loaded.unit_price(), Money::from_cents(525));

        // Position order, not name order
        let names: Vec<_> = loaded.recipe.iter().map(|r| r.ingredient_name.as_str()).collect();
        assert_eq!(names, vec!["Taro Powder", "Milk"]);
        assert_eq!(loaded.recipe[0].quantity_per_unit_tenths, 20);

        let by_name = db.products().recipe(&drink.id).await.unwrap();
        assert_eq!(by_name[0].ingredient_name, "Milk");
    }

    #[tokio::test]
    async fn test_get_missing_product() {
        let db = memory_db().await;
        assert!(db.products().get_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_recipe_ingredient_must_exist() {
        let db = memory_db().await;
        let mut drink = product("Ghost Tea", 400, &[]);
        drink.recipe.push(RecipeEntry {
            ingredient_id: "missing".to_string(),
            ingredient_name: "Missing".to_string(),
            quantity_per_unit_tenths: 10,
        });

        let err = db.products().insert(&drink).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        // Product row rolled back with the recipe
        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_and_categories() {
        let db = memory_db().await;
        let mut green = product("Jasmine Green Tea", 400, &[]);
        green.category = Some("Fruit Tea".to_string());
        let mut brown = product("Brown Sugar Milk Tea", 475, &[]);
        brown.category = Some("Milk Tea".to_string());
        let plain = product("Hot Water", 50, &[]);

        for p in [&green, &brown, &plain] {
            db.products().insert(p).await.unwrap();
        }

        let names: Vec<_> = db
            .products()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Brown Sugar Milk Tea", "Hot Water", "Jasmine Green Tea"]);

        assert_eq!(
            db.products().categories().await.unwrap(),
            vec!["Fruit Tea".to_string(), "Milk Tea".to_string()]
        );
    }

    #[tokio::test]
    async fn test_update_price() {
        let db = memory_db().await;
        let drink = product("Oolong", 400, &[]);
        db.products().insert(&drink).await.unwrap();

        db.products()
            .update_price(&drink.id, Money::from_cents(450))
            .await
            .unwrap();
        let loaded = db.products().get_by_id(&drink.id).await.unwrap().unwrap();
        assert_eq!(loaded.unit_price_cents, 450);

        let err = db
            .products()
            .update_price(&drink.id, Money::zero())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        let err = db
            .products()
            .update_price("nope", Money::from_cents(100))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
