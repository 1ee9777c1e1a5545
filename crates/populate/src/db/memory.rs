//! In-process store with the same identity and conflict rules as the
//! PostgreSQL schema.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::{RowChunk, Store, Table};
use crate::error::PopulateError;
use crate::generators::{
    GeneratedActivityLog, GeneratedCustomer, GeneratedDepartment, GeneratedEmployee,
    GeneratedProduct, GeneratedSale, GeneratedSupportTicket,
};

/// Operation observed by a [`MemoryStore`], in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Insert { table: Table, rows: usize },
    Commit,
    Rollback,
    Count(Table),
    Fetch(Table),
}

/// Store that keeps rows in memory.
///
/// Identities are assigned per table starting at 1. Inserted rows stay
/// invisible to counts and identity reads until [`Store::commit`], and
/// [`Store::rollback`] drops them along with the keys they claimed.
/// Departments are unique by name and customers by email; colliding rows
/// are skipped exactly as `ON CONFLICT DO NOTHING` would.
#[derive(Debug, Default)]
pub struct MemoryStore {
    departments: Vec<(i64, GeneratedDepartment)>,
    employees: Vec<(i64, GeneratedEmployee)>,
    products: Vec<(i64, GeneratedProduct)>,
    customers: Vec<(i64, GeneratedCustomer)>,
    sales: Vec<(i64, GeneratedSale)>,
    support_tickets: Vec<(i64, GeneratedSupportTicket)>,
    activity_logs: Vec<(i64, GeneratedActivityLog)>,

    department_names: HashSet<String>,
    customer_emails: HashSet<String>,
    committed: HashMap<Table, usize>,
    failing: HashSet<Table>,
    events: Vec<StoreEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later insert into `table` fail with a database error.
    pub fn fail_inserts_into(&mut self, table: Table) {
        self.failing.insert(table);
    }

    /// Operations seen so far.
    pub fn events(&self) -> &[StoreEvent] {
        &self.events
    }

    pub fn departments(&self) -> &[(i64, GeneratedDepartment)] {
        &self.departments
    }

    pub fn employees(&self) -> &[(i64, GeneratedEmployee)] {
        &self.employees
    }

    pub fn products(&self) -> &[(i64, GeneratedProduct)] {
        &self.products
    }

    pub fn customers(&self) -> &[(i64, GeneratedCustomer)] {
        &self.customers
    }

    pub fn sales(&self) -> &[(i64, GeneratedSale)] {
        &self.sales
    }

    pub fn support_tickets(&self) -> &[(i64, GeneratedSupportTicket)] {
        &self.support_tickets
    }

    pub fn activity_logs(&self) -> &[(i64, GeneratedActivityLog)] {
        &self.activity_logs
    }

    /// Rows stored in `table`, committed or not.
    pub fn len(&self, table: Table) -> usize {
        match table {
            Table::Departments => self.departments.len(),
            Table::Employees => self.employees.len(),
            Table::Products => self.products.len(),
            Table::Customers => self.customers.len(),
            Table::Sales => self.sales.len(),
            Table::SupportTickets => self.support_tickets.len(),
            Table::ActivityLogs => self.activity_logs.len(),
        }
    }

    fn committed_len(&self, table: Table) -> usize {
        self.committed.get(&table).copied().unwrap_or(0)
    }

    fn committed_ids<T>(rows: &[(i64, T)], visible: usize) -> Vec<i64> {
        rows[..visible].iter().map(|(id, _)| *id).collect()
    }
}

/// Appends rows with sequential identities, returning the number added.
fn append_all<T: Clone>(target: &mut Vec<(i64, T)>, rows: &[T]) -> u64 {
    for row in rows {
        let id = target.len() as i64 + 1;
        target.push((id, row.clone()));
    }
    rows.len() as u64
}

/// Appends rows whose key is not yet taken, returning the number added.
fn append_unique<T: Clone>(
    target: &mut Vec<(i64, T)>,
    keys: &mut HashSet<String>,
    rows: &[T],
    key: impl Fn(&T) -> &str,
) -> u64 {
    let mut added = 0;
    for row in rows {
        if keys.insert(key(row).to_string()) {
            let id = target.len() as i64 + 1;
            target.push((id, row.clone()));
            added += 1;
        }
    }
    added
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert(&mut self, chunk: RowChunk<'_>) -> Result<u64, PopulateError> {
        let table = chunk.table();
        if self.failing.contains(&table) {
            return Err(PopulateError::Database(sqlx::Error::Protocol(format!(
                "insert into {} rejected",
                table.name()
            ))));
        }
        self.events.push(StoreEvent::Insert {
            table,
            rows: chunk.len(),
        });

        let persisted = match chunk {
            RowChunk::Departments(rows) => append_unique(
                &mut self.departments,
                &mut self.department_names,
                rows,
                |d| d.name.as_str(),
            ),
            RowChunk::Employees(rows) => append_all(&mut self.employees, rows),
            RowChunk::Products(rows) => append_all(&mut self.products, rows),
            RowChunk::Customers(rows) => append_unique(
                &mut self.customers,
                &mut self.customer_emails,
                rows,
                |c| c.email.as_str(),
            ),
            RowChunk::Sales(rows) => append_all(&mut self.sales, rows),
            RowChunk::SupportTickets(rows) => append_all(&mut self.support_tickets, rows),
            RowChunk::ActivityLogs(rows) => append_all(&mut self.activity_logs, rows),
        };
        Ok(persisted)
    }

    async fn commit(&mut self) -> Result<(), PopulateError> {
        self.events.push(StoreEvent::Commit);
        for table in Table::ALL {
            let len = self.len(table);
            self.committed.insert(table, len);
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), PopulateError> {
        self.events.push(StoreEvent::Rollback);
        let committed: HashMap<Table, usize> = Table::ALL
            .into_iter()
            .map(|table| (table, self.committed_len(table)))
            .collect();
        self.departments.truncate(committed[&Table::Departments]);
        self.employees.truncate(committed[&Table::Employees]);
        self.products.truncate(committed[&Table::Products]);
        self.customers.truncate(committed[&Table::Customers]);
        self.sales.truncate(committed[&Table::Sales]);
        self.support_tickets.truncate(committed[&Table::SupportTickets]);
        self.activity_logs.truncate(committed[&Table::ActivityLogs]);

        self.department_names = self
            .departments
            .iter()
            .map(|(_, d)| d.name.clone())
            .collect();
        self.customer_emails = self
            .customers
            .iter()
            .map(|(_, c)| c.email.clone())
            .collect();
        Ok(())
    }

    async fn count_rows(&mut self, table: Table) -> Result<u64, PopulateError> {
        self.events.push(StoreEvent::Count(table));
        Ok(self.committed_len(table) as u64)
    }

    async fn fetch_ids(&mut self, table: Table) -> Result<Vec<i64>, PopulateError> {
        self.events.push(StoreEvent::Fetch(table));
        let visible = self.committed_len(table);
        let ids = match table {
            Table::Departments => Self::committed_ids(&self.departments, visible),
            Table::Employees => Self::committed_ids(&self.employees, visible),
            Table::Products => Self::committed_ids(&self.products, visible),
            Table::Customers => Self::committed_ids(&self.customers, visible),
            Table::Sales => Self::committed_ids(&self.sales, visible),
            Table::SupportTickets => Self::committed_ids(&self.support_tickets, visible),
            Table::ActivityLogs => Self::committed_ids(&self.activity_logs, visible),
        };
        Ok(ids)
    }

    async fn fetch_product_prices(&mut self) -> Result<Vec<(i64, Decimal)>, PopulateError> {
        self.events.push(StoreEvent::Fetch(Table::Products));
        let visible = self.committed_len(Table::Products);
        Ok(self.products[..visible]
            .iter()
            .map(|(id, p)| (*id, p.price))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn customer(n: usize, email: &str) -> GeneratedCustomer {
        GeneratedCustomer {
            name: format!("Customer_{n}"),
            email: email.to_string(),
            signup_date: date!(2012 - 03 - 04),
        }
    }

    #[tokio::test]
    async fn test_rows_invisible_until_commit() {
        let mut store = MemoryStore::new();
        let departments = vec![GeneratedDepartment {
            name: "Department 1".to_string(),
        }];

        assert_eq!(store.insert(RowChunk::Departments(&departments)).await.unwrap(), 1);
        assert_eq!(store.count_rows(Table::Departments).await.unwrap(), 0);
        assert!(store.fetch_ids(Table::Departments).await.unwrap().is_empty());

        store.commit().await.unwrap();
        assert_eq!(store.fetch_ids(Table::Departments).await.unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_customer_conflicts_are_skipped() {
        let mut store = MemoryStore::new();
        let first = vec![customer(1, "a@example.com"), customer(2, "b@example.com")];
        let second = vec![customer(3, "b@example.com"), customer(4, "c@example.com")];

        assert_eq!(store.insert(RowChunk::Customers(&first)).await.unwrap(), 2);
        assert_eq!(store.insert(RowChunk::Customers(&second)).await.unwrap(), 1);
        store.commit().await.unwrap();

        assert_eq!(store.fetch_ids(Table::Customers).await.unwrap(), vec![1, 2, 3]);
        assert_eq!(store.customers()[2].1.email, "c@example.com");
    }

    #[tokio::test]
    async fn test_rollback_discards_rows_and_keys() {
        let mut store = MemoryStore::new();
        let kept = vec![customer(1, "a@example.com")];
        store.insert(RowChunk::Customers(&kept)).await.unwrap();
        store.commit().await.unwrap();

        let dropped = vec![customer(2, "b@example.com")];
        store.insert(RowChunk::Customers(&dropped)).await.unwrap();
        store.rollback().await.unwrap();
        assert_eq!(store.len(Table::Customers), 1);

        // The rolled-back email is free again; the committed one is not.
        let retry = vec![customer(3, "b@example.com"), customer(4, "a@example.com")];
        assert_eq!(store.insert(RowChunk::Customers(&retry)).await.unwrap(), 1);
        store.commit().await.unwrap();

        assert_eq!(store.fetch_ids(Table::Customers).await.unwrap(), vec![1, 2]);
        assert_eq!(store.customers()[1].1.name, "Customer_3");
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let mut store = MemoryStore::new();
        store.fail_inserts_into(Table::Customers);
        let rows = vec![customer(1, "a@example.com")];

        let result = store.insert(RowChunk::Customers(&rows)).await;
        assert!(matches!(result, Err(PopulateError::Database(_))));
        assert!(store.events().is_empty());
    }
}
