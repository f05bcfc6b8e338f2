//! # Inventory Repository
//!
//! Ingredient rows: structural ingredients, cups and add-ons.
//!
//! Orders never write through this repository. Order consumption goes
//! through the [`InventoryLedger`](crate::ledger::InventoryLedger) inside
//! the order transaction; this repository covers reads and restocking.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use teahouse_core::validation::{validate_name, validate_restock_delta};
use teahouse_core::{CupSize, Ingredient, Quantity};

const INGREDIENT_COLUMNS: &str =
    "id, name, on_hand_tenths, is_add_on, price_per_unit_cents, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    pub async fn insert(&self, ingredient: &Ingredient) -> DbResult<Ingredient> {
        validate_name("name", &ingredient.name)?;
        debug!(name = %ingredient.name, on_hand = %ingredient.on_hand(), "Inserting ingredient");

        sqlx::query(
            r#"
            INSERT INTO inventory (id, name, on_hand_tenths, is_add_on, price_per_unit_cents,
                                   created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&ingredient.id)
        .bind(&ingredient.name)
        .bind(ingredient.on_hand_tenths)
        .bind(ingredient.is_add_on)
        .bind(ingredient.price_per_unit_cents)
        .bind(ingredient.created_at)
        .bind(ingredient.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(ingredient.clone())
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Ingredient>> {
        let sql = format!("SELECT {INGREDIENT_COLUMNS} FROM inventory WHERE id = ?1");
        let ingredient = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(ingredient)
    }

    /// All ingredients by name.
    pub async fn list(&self) -> DbResult<Vec<Ingredient>> {
        let mut conn = self.pool.acquire().await?;
        Self::list_in_tx(&mut conn).await
    }

    /// [`list`](Self::list) on a caller-held connection.
    pub async fn list_in_tx(conn: &mut SqliteConnection) -> DbResult<Vec<Ingredient>> {
        let sql = format!("SELECT {INGREDIENT_COLUMNS} FROM inventory ORDER BY name, id");
        let ingredients = sqlx::query_as(&sql).fetch_all(&mut *conn).await?;
        Ok(ingredients)
    }

    /// The rows one order needs: every cup plus the given ingredient ids.
    ///
    /// Runs inside the order transaction while it holds the write lock, so
    /// it reads only what the cup index and ingredient directory use.
    pub async fn list_for_order_in_tx(
        conn: &mut SqliteConnection,
        ingredient_ids: &[&str],
    ) -> DbResult<Vec<Ingredient>> {
        let cups = CupSize::ALL.map(|size| size.container_name());

        let cup_params = vec!["?"; cups.len()].join(", ");
        let sql = if ingredient_ids.is_empty() {
            format!(
                "SELECT {INGREDIENT_COLUMNS} FROM inventory
                 WHERE name IN ({cup_params})
                 ORDER BY name, id"
            )
        } else {
            let id_params = vec!["?"; ingredient_ids.len()].join(", ");
            format!(
                "SELECT {INGREDIENT_COLUMNS} FROM inventory
                 WHERE name IN ({cup_params}) OR id IN ({id_params})
                 ORDER BY name, id"
            )
        };

        let mut query = sqlx::query_as::<_, Ingredient>(&sql);
        for cup in cups {
            query = query.bind(cup);
        }
        for id in ingredient_ids {
            query = query.bind(*id);
        }

        let ingredients = query.fetch_all(&mut *conn).await?;
        Ok(ingredients)
    }

    /// First ingredient with exactly this name.
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Ingredient>> {
        let sql = format!(
            "SELECT {INGREDIENT_COLUMNS} FROM inventory WHERE name = ?1 ORDER BY id LIMIT 1"
        );
        let ingredient = sqlx::query_as(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(ingredient)
    }

    /// The modification menu: add-ons that carry a price.
    pub async fn list_add_ons(&self) -> DbResult<Vec<Ingredient>> {
        let sql = format!(
            "SELECT {INGREDIENT_COLUMNS} FROM inventory
             WHERE is_add_on = 1 AND price_per_unit_cents IS NOT NULL
             ORDER BY name"
        );
        let add_ons = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(add_ons)
    }

    /// Adds stock and returns the new on-hand amount.
    ///
    /// Uses a server-side increment, so a restock racing an order never
    /// loses either change.
    pub async fn restock(&self, id: &str, delta: Quantity) -> DbResult<Quantity> {
        validate_restock_delta(delta)?;

        let on_hand: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE inventory
            SET on_hand_tenths = on_hand_tenths + ?2,
                updated_at = ?3
            WHERE id = ?1
            RETURNING on_hand_tenths
            "#,
        )
        .bind(id)
        .bind(delta.tenths())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        let on_hand = on_hand
            .map(Quantity::from_tenths)
            .ok_or_else(|| DbError::not_found("Ingredient", id))?;

        info!(id = %id, delta = %delta, on_hand = %on_hand, "Ingredient restocked");
        Ok(on_hand)
    }
}

/// Helper to generate a new ingredient ID.
pub fn generate_ingredient_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{add_on, ingredient, memory_db};

    #[tokio::test]
    async fn test_insert_get_and_find_by_name() {
        let db = memory_db().await;
        let cup = db
            .inventory()
            .insert(&ingredient("Medium Cup", 200, false))
            .await
            .unwrap();

        let loaded = db.inventory().get(&cup.id).await.unwrap().unwrap();
        assert_eq!(loaded.on_hand(), Quantity::from_units(200));
        assert!(!loaded.is_add_on);

        let found = db.inventory().find_by_name("Medium Cup").await.unwrap();
        assert_eq!(found.map(|i| i.id), Some(cup.id));
        assert!(db.inventory().find_by_name("Large Cup").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_add_ons_only_priced() {
        let db = memory_db().await;
        db.inventory().insert(&add_on("Tapioca Pearls", 50, 75)).await.unwrap();
        db.inventory().insert(&add_on("Aloe Vera", 50, 60)).await.unwrap();
        db.inventory().insert(&ingredient("Black Tea", 100, false)).await.unwrap();

        let mut unpriced = ingredient("Cheese Foam", 10, true);
        unpriced.price_per_unit_cents = None;
        db.inventory().insert(&unpriced).await.unwrap();

        let names: Vec<_> = db
            .inventory()
            .list_add_ons()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["Aloe Vera", "Tapioca Pearls"]);
        assert_eq!(db.inventory().list().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_list_for_order_reads_cups_and_requested_ids() {
        let db = memory_db().await;
        let small = db.inventory().insert(&ingredient("Small Cup", 100, false)).await.unwrap();
        let large = db.inventory().insert(&ingredient("Large Cup", 100, false)).await.unwrap();
        let pearls = db.inventory().insert(&add_on("Tapioca Pearls", 50, 75)).await.unwrap();
        db.inventory().insert(&add_on("Aloe Vera", 50, 60)).await.unwrap();
        db.inventory().insert(&ingredient("Black Tea", 100, false)).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();

        let requested = [pearls.id.as_str(), "gone"];
        let rows = InventoryRepository::list_for_order_in_tx(&mut conn, &requested)
            .await
            .unwrap();
        let ids: Vec<_> = rows.iter().map(|i| i.id.clone()).collect();
        assert_eq!(ids, vec![large.id.clone(), small.id.clone(), pearls.id.clone()]);

        let cups_only = InventoryRepository::list_for_order_in_tx(&mut conn, &[])
            .await
            .unwrap();
        let names: Vec<_> = cups_only.into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["Large Cup", "Small Cup"]);
    }

    #[tokio::test]
    async fn test_restock() {
        let db = memory_db().await;
        let pearls = db.inventory().insert(&add_on("Tapioca Pearls", 5, 75)).await.unwrap();

        let on_hand = db
            .inventory()
            .restock(&pearls.id, Quantity::from_tenths(25))
            .await
            .unwrap();
        assert_eq!(on_hand, Quantity::from_tenths(75));

        let err = db
            .inventory()
            .restock(&pearls.id, Quantity::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        let err = db
            .inventory()
            .restock("nope", Quantity::ONE)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
