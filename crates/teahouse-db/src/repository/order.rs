//! # Order Repository
//!
//! Orders, their line items and modifications.
//!
//! ## Write Path vs Read Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WRITE (inside the order transaction, caller-held connection)          │
//! │    insert_order_in_tx ──► insert_line_item_in_tx ──► insert_modif…     │
//! │    Only the OrderCoordinator calls these; nothing here commits.        │
//! │                                                                         │
//! │  READ (pool)                                                            │
//! │    get_by_id, line_items, modifications, recent_for_customer           │
//! │                                                                         │
//! │  DELETE                                                                 │
//! │    delete(order_id) ──► ON DELETE CASCADE removes lines and mods       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use teahouse_core::summary::{OrderSummary, SummaryItem, SummaryModification};
use teahouse_core::{
    LineItem, Modification, ModificationKind, Order, DEFAULT_CUSTOMER_NAME, UNKNOWN_INGREDIENT,
};

/// How many orders `recent_for_customer` returns when the caller has no
/// preference.
pub const DEFAULT_RECENT_LIMIT: u32 = 5;

const ORDER_COLUMNS: &str = "id, total_cents, employee_id, customer_id, created_at";

const LINE_ITEM_COLUMNS: &str = "id, order_id, product_id, product_name, quantity, \
     unit_price_cents, sugar_level, size, ice_level, position, created_at";

const MODIFICATION_COLUMNS: &str =
    "id, line_item_id, ingredient_id, kind, quantity_change_tenths, price_change_cents, position";

#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Transaction-scoped writes
    // -------------------------------------------------------------------------

    /// Inserts the order header.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKeyViolation)` - employee or customer does not exist
    pub async fn insert_order_in_tx(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, total_cents, employee_id, customer_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&order.id)
        .bind(order.total_cents)
        .bind(&order.employee_id)
        .bind(&order.customer_id)
        .bind(order.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    pub async fn insert_line_item_in_tx(
        conn: &mut SqliteConnection,
        item: &LineItem,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO order_items (
                id, order_id, product_id, product_name, quantity, unit_price_cents,
                sugar_level, size, ice_level, position, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&item.id)
        .bind(&item.order_id)
        .bind(&item.product_id)
        .bind(&item.product_name)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.sugar_level)
        .bind(item.size)
        .bind(item.ice_level)
        .bind(item.position)
        .bind(item.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    pub async fn insert_modification_in_tx(
        conn: &mut SqliteConnection,
        modification: &Modification,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO modifications (
                id, line_item_id, ingredient_id, kind,
                quantity_change_tenths, price_change_cents, position
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&modification.id)
        .bind(&modification.line_item_id)
        .bind(&modification.ingredient_id)
        .bind(modification.kind)
        .bind(modification.quantity_change_tenths)
        .bind(modification.price_change_cents)
        .bind(modification.position)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");
        let order = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Line items of an order in the order they were rung up.
    pub async fn line_items(&self, order_id: &str) -> DbResult<Vec<LineItem>> {
        let sql = format!(
            "SELECT {LINE_ITEM_COLUMNS} FROM order_items WHERE order_id = ?1 ORDER BY position"
        );
        let items = sqlx::query_as(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    pub async fn modifications(&self, line_item_id: &str) -> DbResult<Vec<Modification>> {
        let sql = format!(
            "SELECT {MODIFICATION_COLUMNS} FROM modifications WHERE line_item_id = ?1 ORDER BY position"
        );
        let modifications = sqlx::query_as(&sql)
            .bind(line_item_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(modifications)
    }

    /// A customer's latest orders, newest first, rebuilt as summaries.
    ///
    /// Returns an empty list for a token that has never ordered.
    pub async fn recent_for_customer(
        &self,
        external_token: &str,
        limit: u32,
    ) -> DbResult<Vec<OrderSummary>> {
        let customer: Option<(String, Option<String>, Option<String>)> = sqlx::query_as(
            "SELECT id, name, email FROM customers WHERE external_token = ?1",
        )
        .bind(external_token)
        .fetch_optional(&self.pool)
        .await?;

        let Some((customer_id, name, email)) = customer else {
            return Ok(Vec::new());
        };

        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE customer_id = ?1
             ORDER BY created_at DESC, rowid DESC LIMIT ?2"
        );
        let orders: Vec<Order> = sqlx::query_as(&sql)
            .bind(&customer_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let customer_name = name.unwrap_or_else(|| DEFAULT_CUSTOMER_NAME.to_string());
        let mut summaries = Vec::with_capacity(orders.len());

        for order in orders {
            let mut items = Vec::new();
            for line in self.line_items(&order.id).await? {
                items.push(SummaryItem {
                    modifications: self.summary_modifications(&line.id).await?,
                    product_name: line.product_name,
                    quantity: line.quantity,
                    unit_price_cents: line.unit_price_cents,
                    sugar_level: line.sugar_level,
                    size: line.size,
                    ice_level: line.ice_level,
                });
            }

            summaries.push(OrderSummary {
                order_id: order.id,
                customer_name: customer_name.clone(),
                recipient_email: email.clone(),
                total_cents: order.total_cents,
                placed_at: order.created_at,
                items,
            });
        }

        debug!(count = summaries.len(), "Loaded recent orders for customer");
        Ok(summaries)
    }

    async fn summary_modifications(&self, line_item_id: &str) -> DbResult<Vec<SummaryModification>> {
        let rows: Vec<(ModificationKind, String)> = sqlx::query_as(
            r#"
            SELECT m.kind, COALESCE(i.name, ?2) AS ingredient_name
            FROM modifications m
            LEFT JOIN inventory i ON i.id = m.ingredient_id
            WHERE m.line_item_id = ?1
            ORDER BY m.position
            "#,
        )
        .bind(line_item_id)
        .bind(UNKNOWN_INGREDIENT)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(kind, ingredient_name)| SummaryModification {
                kind,
                ingredient_name,
            })
            .collect())
    }

    // -------------------------------------------------------------------------
    // Delete
    // -------------------------------------------------------------------------

    /// Deletes an order with its line items and modifications.
    ///
    /// Inventory is not restored.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        info!(order_id = %id, "Order deleted");
        Ok(())
    }

    /// Counts orders (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{add_on, employee, memory_db};
    use chrono::Utc;
    use teahouse_core::{CupSize, IceLevel, SugarLevel};
    use uuid::Uuid;

    fn order_for(employee_id: Option<&str>, customer_id: Option<&str>) -> Order {
        Order {
            id: Uuid::new_v4().to_string(),
            total_cents: 900,
            employee_id: employee_id.map(str::to_string),
            customer_id: customer_id.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    fn line_for(order: &Order, product_id: &str, position: i64) -> LineItem {
        LineItem {
            id: Uuid::new_v4().to_string(),
            order_id: order.id.clone(),
            product_id: product_id.to_string(),
            product_name: "Brown Sugar Milk Tea".to_string(),
            quantity: 2,
            unit_price_cents: 450,
            sugar_level: SugarLevel::Percent50,
            size: CupSize::Large,
            ice_level: IceLevel::NoIce,
            position,
            created_at: Utc::now(),
        }
    }

    fn modification_for(line: &LineItem, ingredient_id: &str, kind: ModificationKind) -> Modification {
        Modification {
            id: Uuid::new_v4().to_string(),
            line_item_id: line.id.clone(),
            ingredient_id: ingredient_id.to_string(),
            kind,
            quantity_change_tenths: 10,
            price_change_cents: 75,
            position: 0,
        }
    }

    /// Writes one order with one line and one modification per ingredient id.
    async fn write_order(
        db: &crate::Database,
        order: &Order,
        product_id: &str,
        ingredient_ids: &[&str],
    ) -> LineItem {
        let mut tx = db.begin().await.unwrap();
        OrderRepository::insert_order_in_tx(&mut tx, order).await.unwrap();

        let line = line_for(order, product_id, 0);
        OrderRepository::insert_line_item_in_tx(&mut tx, &line).await.unwrap();

        for (position, ingredient_id) in ingredient_ids.iter().enumerate() {
            let mut m = modification_for(&line, ingredient_id, ModificationKind::Extra);
            m.position = position as i64;
            OrderRepository::insert_modification_in_tx(&mut tx, &m).await.unwrap();
        }

        tx.commit().await.unwrap();
        line
    }

    async fn seed_product(db: &crate::Database) -> String {
        let product = crate::testing::product("Brown Sugar Milk Tea", 450, &[]);
        db.products().insert(&product).await.unwrap();
        product.id
    }

    #[tokio::test]
    async fn test_write_and_read_back() {
        let db = memory_db().await;
        let cashier = db.employees().insert(&employee("Ana")).await.unwrap();
        let product_id = seed_product(&db).await;
        let pearls = db.inventory().insert(&add_on("Tapioca Pearls", 50, 75)).await.unwrap();

        let order = order_for(Some(&cashier.id), None);
        let line = write_order(&db, &order, &product_id, &[&pearls.id]).await;

        let loaded = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert!(loaded.is_staff_order());
        assert_eq!(loaded.total_cents, 900);

        let lines = db.orders().line_items(&order.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].size, CupSize::Large);
        assert_eq!(lines[0].sugar_level, SugarLevel::Percent50);
        assert_eq!(lines[0].ice_level, IceLevel::NoIce);

        let mods = db.orders().modifications(&line.id).await.unwrap();
        assert_eq!(mods.len(), 1);
        assert_eq!(mods[0].kind, ModificationKind::Extra);
        assert_eq!(mods[0].ingredient_id, pearls.id);
    }

    #[tokio::test]
    async fn test_order_needs_exactly_one_actor() {
        let db = memory_db().await;
        let mut tx = db.begin().await.unwrap();

        let neither = order_for(None, None);
        let err = OrderRepository::insert_order_in_tx(&mut tx, &neither)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::QueryFailed(_)));

        let unknown_employee = order_for(Some("ghost"), None);
        let err = OrderRepository::insert_order_in_tx(&mut tx, &unknown_employee)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_recent_for_customer_rebuilds_summaries() {
        let db = memory_db().await;
        let product_id = seed_product(&db).await;
        let pearls = db.inventory().insert(&add_on("Tapioca Pearls", 50, 75)).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let customer = crate::repository::customer::CustomerRepository::resolve_or_create(
            &mut conn,
            "user_7",
            Some("mei@example.com"),
            None,
        )
        .await
        .unwrap();
        drop(conn);

        let older = order_for(None, Some(&customer.id));
        write_order(&db, &older, &product_id, &[]).await;
        let newer = order_for(None, Some(&customer.id));
        write_order(&db, &newer, &product_id, &[&pearls.id, "retired-add-on"]).await;

        let recent = db
            .orders()
            .recent_for_customer("user_7", DEFAULT_RECENT_LIMIT)
            .await
            .unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].order_id, newer.id);
        assert_eq!(recent[0].customer_name, DEFAULT_CUSTOMER_NAME);
        assert_eq!(recent[0].recipient_email.as_deref(), Some("mei@example.com"));

        let mods = &recent[0].items[0].modifications;
        assert_eq!(mods[0].ingredient_name, "Tapioca Pearls");
        assert_eq!(mods[1].ingredient_name, UNKNOWN_INGREDIENT);

        let limited = db.orders().recent_for_customer("user_7", 1).await.unwrap();
        assert_eq!(limited.len(), 1);

        assert!(db
            .orders()
            .recent_for_customer("stranger", DEFAULT_RECENT_LIMIT)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let db = memory_db().await;
        let cashier = db.employees().insert(&employee("Ana")).await.unwrap();
        let product_id = seed_product(&db).await;

        let order = order_for(Some(&cashier.id), None);
        let line = write_order(&db, &order, &product_id, &["a", "b"]).await;

        db.orders().delete(&order.id).await.unwrap();

        assert!(db.orders().get_by_id(&order.id).await.unwrap().is_none());
        assert!(db.orders().line_items(&order.id).await.unwrap().is_empty());
        assert!(db.orders().modifications(&line.id).await.unwrap().is_empty());

        let err = db.orders().delete(&order.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
