//! # Employee Repository
//!
//! Staff who ring up orders at the register. Order placement only needs
//! the employee id to exist; the orders table's foreign key checks it.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use teahouse_core::validation::validate_name;
use teahouse_core::Employee;

#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        EmployeeRepository { pool }
    }

    pub async fn insert(&self, employee: &Employee) -> DbResult<Employee> {
        validate_name("name", &employee.name)?;
        debug!(name = %employee.name, role = ?employee.role, "Inserting employee");

        sqlx::query(
            "INSERT INTO employees (id, name, role, email, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&employee.id)
        .bind(&employee.name)
        .bind(employee.role)
        .bind(&employee.email)
        .bind(employee.created_at)
        .execute(&self.pool)
        .await?;

        Ok(employee.clone())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Employee>> {
        let employee =
            sqlx::query_as("SELECT id, name, role, email, created_at FROM employees WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(employee)
    }

    pub async fn list(&self) -> DbResult<Vec<Employee>> {
        let employees =
            sqlx::query_as("SELECT id, name, role, email, created_at FROM employees ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(employees)
    }
}
