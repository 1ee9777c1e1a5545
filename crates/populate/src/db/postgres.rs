//! PostgreSQL store.
//!
//! Each chunk is one `INSERT ... SELECT * FROM UNNEST(...)` statement with
//! one array parameter per column, so statement size does not depend on
//! the number of rows and the bind-parameter limit never applies.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::{PgConnection, PgPoolOptions};
use sqlx::{PgPool, Postgres, Transaction};
use time::{Date, PrimitiveDateTime};
use tracing::debug;

use super::{RowChunk, Store, Table};
use crate::error::PopulateError;
use crate::generators::{
    GeneratedActivityLog, GeneratedCustomer, GeneratedDepartment, GeneratedEmployee,
    GeneratedProduct, GeneratedSale, GeneratedSupportTicket,
};

/// Store backed by a PostgreSQL pool, holding one open transaction per stage.
pub struct PgStore {
    pool: PgPool,
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgStore {
    /// Creates a store on an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool, tx: None }
    }

    /// Connects a new pool to `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, PopulateError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Returns a reference to the pool for advanced usage.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// The open transaction, beginning one if needed.
    async fn tx(&mut self) -> Result<&mut Transaction<'static, Postgres>, PopulateError> {
        let tx = match self.tx.take() {
            Some(tx) => tx,
            None => self.pool.begin().await?,
        };
        Ok(self.tx.insert(tx))
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert(&mut self, chunk: RowChunk<'_>) -> Result<u64, PopulateError> {
        if chunk.is_empty() {
            return Ok(0);
        }

        let conn: &mut PgConnection = self.tx().await?;
        let persisted = match chunk {
            RowChunk::Departments(rows) => insert_departments(conn, rows).await?,
            RowChunk::Employees(rows) => insert_employees(conn, rows).await?,
            RowChunk::Products(rows) => insert_products(conn, rows).await?,
            RowChunk::Customers(rows) => insert_customers(conn, rows).await?,
            RowChunk::Sales(rows) => insert_sales(conn, rows).await?,
            RowChunk::SupportTickets(rows) => insert_support_tickets(conn, rows).await?,
            RowChunk::ActivityLogs(rows) => insert_activity_logs(conn, rows).await?,
        };

        debug!(
            "Inserted {}/{} rows into {}",
            persisted,
            chunk.len(),
            chunk.table().name()
        );
        Ok(persisted)
    }

    async fn commit(&mut self) -> Result<(), PopulateError> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), PopulateError> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
        }
        Ok(())
    }

    async fn count_rows(&mut self, table: Table) -> Result<u64, PopulateError> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table.name()))
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn fetch_ids(&mut self, table: Table) -> Result<Vec<i64>, PopulateError> {
        let ids = sqlx::query_scalar(&format!(
            "SELECT id::BIGINT FROM {} ORDER BY id",
            table.name()
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn fetch_product_prices(&mut self) -> Result<Vec<(i64, Decimal)>, PopulateError> {
        let rows = sqlx::query_as("SELECT id::BIGINT, price::NUMERIC FROM products ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

async fn insert_departments(
    conn: &mut PgConnection,
    rows: &[GeneratedDepartment],
) -> Result<u64, sqlx::Error> {
    let names: Vec<&str> = rows.iter().map(|d| d.name.as_str()).collect();

    let result = sqlx::query(
        r#"
        INSERT INTO departments (name)
        SELECT * FROM UNNEST($1::TEXT[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(names)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

async fn insert_employees(
    conn: &mut PgConnection,
    rows: &[GeneratedEmployee],
) -> Result<u64, sqlx::Error> {
    let names: Vec<&str> = rows.iter().map(|e| e.name.as_str()).collect();
    let department_ids: Vec<i64> = rows.iter().map(|e| e.department_id).collect();
    let hire_dates: Vec<Date> = rows.iter().map(|e| e.hire_date).collect();
    let salaries: Vec<f64> = rows.iter().map(|e| e.salary).collect();

    let result = sqlx::query(
        r#"
        INSERT INTO employees (name, department_id, hire_date, salary)
        SELECT * FROM UNNEST($1::TEXT[], $2::BIGINT[], $3::DATE[], $4::FLOAT8[])
        "#,
    )
    .bind(names)
    .bind(department_ids)
    .bind(hire_dates)
    .bind(salaries)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

async fn insert_products(
    conn: &mut PgConnection,
    rows: &[GeneratedProduct],
) -> Result<u64, sqlx::Error> {
    let names: Vec<&str> = rows.iter().map(|p| p.name.as_str()).collect();
    let categories: Vec<&str> = rows.iter().map(|p| p.category.as_str()).collect();
    let prices: Vec<Decimal> = rows.iter().map(|p| p.price).collect();

    let result = sqlx::query(
        r#"
        INSERT INTO products (name, category, price)
        SELECT * FROM UNNEST($1::TEXT[], $2::TEXT[], $3::NUMERIC[])
        "#,
    )
    .bind(names)
    .bind(categories)
    .bind(prices)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

async fn insert_customers(
    conn: &mut PgConnection,
    rows: &[GeneratedCustomer],
) -> Result<u64, sqlx::Error> {
    let names: Vec<&str> = rows.iter().map(|c| c.name.as_str()).collect();
    let emails: Vec<&str> = rows.iter().map(|c| c.email.as_str()).collect();
    let signup_dates: Vec<Date> = rows.iter().map(|c| c.signup_date).collect();

    let result = sqlx::query(
        r#"
        INSERT INTO customers (name, email, signup_date)
        SELECT * FROM UNNEST($1::TEXT[], $2::TEXT[], $3::DATE[])
        ON CONFLICT (email) DO NOTHING
        "#,
    )
    .bind(names)
    .bind(emails)
    .bind(signup_dates)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

async fn insert_sales(conn: &mut PgConnection, rows: &[GeneratedSale]) -> Result<u64, sqlx::Error> {
    let product_ids: Vec<i64> = rows.iter().map(|s| s.product_id).collect();
    let customer_ids: Vec<i64> = rows.iter().map(|s| s.customer_id).collect();
    let sale_dates: Vec<PrimitiveDateTime> = rows.iter().map(|s| s.sale_date).collect();
    let quantities: Vec<i32> = rows.iter().map(|s| s.quantity).collect();
    let totals: Vec<Decimal> = rows.iter().map(|s| s.total_amount).collect();

    let result = sqlx::query(
        r#"
        INSERT INTO sales (product_id, customer_id, sale_date, quantity, total_amount)
        SELECT * FROM UNNEST($1::BIGINT[], $2::BIGINT[], $3::TIMESTAMP[], $4::INT[], $5::NUMERIC[])
        "#,
    )
    .bind(product_ids)
    .bind(customer_ids)
    .bind(sale_dates)
    .bind(quantities)
    .bind(totals)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

async fn insert_support_tickets(
    conn: &mut PgConnection,
    rows: &[GeneratedSupportTicket],
) -> Result<u64, sqlx::Error> {
    let customer_ids: Vec<i64> = rows.iter().map(|t| t.customer_id).collect();
    let created: Vec<PrimitiveDateTime> = rows.iter().map(|t| t.created_at).collect();
    let resolved: Vec<Option<PrimitiveDateTime>> = rows.iter().map(|t| t.resolved_at).collect();
    let statuses: Vec<&str> = rows.iter().map(|t| t.status.as_str()).collect();
    let subjects: Vec<&str> = rows.iter().map(|t| t.subject.as_str()).collect();
    let descriptions: Vec<&str> = rows.iter().map(|t| t.description.as_str()).collect();

    let result = sqlx::query(
        r#"
        INSERT INTO support_tickets (customer_id, created_at, resolved_at, status, subject, description)
        SELECT * FROM UNNEST($1::BIGINT[], $2::TIMESTAMP[], $3::TIMESTAMP[], $4::TEXT[], $5::TEXT[], $6::TEXT[])
        "#,
    )
    .bind(customer_ids)
    .bind(created)
    .bind(resolved)
    .bind(statuses)
    .bind(subjects)
    .bind(descriptions)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

async fn insert_activity_logs(
    conn: &mut PgConnection,
    rows: &[GeneratedActivityLog],
) -> Result<u64, sqlx::Error> {
    let employee_ids: Vec<i64> = rows.iter().map(|l| l.employee_id).collect();
    let types: Vec<&str> = rows.iter().map(|l| l.activity_type.as_str()).collect();
    let times: Vec<PrimitiveDateTime> = rows.iter().map(|l| l.activity_time).collect();
    let details: Vec<&str> = rows.iter().map(|l| l.details.as_str()).collect();

    let result = sqlx::query(
        r#"
        INSERT INTO activity_logs (employee_id, activity_type, activity_time, details)
        SELECT * FROM UNNEST($1::BIGINT[], $2::TEXT[], $3::TIMESTAMP[], $4::TEXT[])
        "#,
    )
    .bind(employee_ids)
    .bind(types)
    .bind(times)
    .bind(details)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}
