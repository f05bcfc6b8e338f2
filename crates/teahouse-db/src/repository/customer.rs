//! # Customer Repository
//!
//! Customers are known by the token their identity provider issued. The
//! first order from a token creates the customer; later orders find it.
//!
//! ## Identity Upsert
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  INSERT … ON CONFLICT(external_token) DO UPDATE … RETURNING *          │
//! │                                                                         │
//! │  new token       → row created with the request's email / name         │
//! │  known token     → existing row returned; stored email / name kept,    │
//! │                    blanks filled from the request                      │
//! │  racing inserts  → the loser takes the DO UPDATE branch; no retry      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! SQLite runs one writer at a time, so two first orders from one token
//! never both insert: the second sees the committed row and updates it.
//! The upsert is a write, so when it opens an order transaction that
//! transaction holds SQLite's write lock from its first statement.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use teahouse_core::Customer;

const CUSTOMER_COLUMNS: &str = "id, external_token, email, name, created_at";

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Finds the customer for `external_token`, creating it on first sight.
    ///
    /// Idempotent: calling it twice with one token returns the same
    /// customer and leaves one row.
    pub async fn resolve_or_create(
        conn: &mut SqliteConnection,
        external_token: &str,
        email: Option<&str>,
        name: Option<&str>,
    ) -> DbResult<Customer> {
        let sql = format!(
            r#"
            INSERT INTO customers (id, external_token, email, name, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(external_token) DO UPDATE SET
                email = COALESCE(customers.email, excluded.email),
                name = COALESCE(customers.name, excluded.name)
            RETURNING {CUSTOMER_COLUMNS}
            "#
        );

        let customer: Customer = sqlx::query_as(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(external_token)
            .bind(email)
            .bind(name)
            .bind(Utc::now())
            .fetch_one(&mut *conn)
            .await?;

        debug!(customer_id = %customer.id, "Customer resolved");
        Ok(customer)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1");
        let customer = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    pub async fn get_by_token(&self, external_token: &str) -> DbResult<Option<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE external_token = ?1");
        let customer = sqlx::query_as(&sql)
            .bind(external_token)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
