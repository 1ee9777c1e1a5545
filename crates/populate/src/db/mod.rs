//! Store integration for population runs.
//!
//! The [`Store`] trait is the only way the pipeline touches persisted
//! state. [`PgStore`] targets PostgreSQL; [`MemoryStore`] keeps everything
//! in process with the same conflict and identity rules.

mod memory;
mod postgres;

pub use memory::{MemoryStore, StoreEvent};
pub use postgres::PgStore;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::PopulateError;
use crate::generators::{
    GeneratedActivityLog, GeneratedCustomer, GeneratedDepartment, GeneratedEmployee,
    GeneratedProduct, GeneratedSale, GeneratedSupportTicket,
};

/// Tables populated by the pipeline, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Departments,
    Employees,
    Products,
    Customers,
    Sales,
    SupportTickets,
    ActivityLogs,
}

impl Table {
    pub const ALL: [Table; 7] = [
        Table::Departments,
        Table::Employees,
        Table::Products,
        Table::Customers,
        Table::Sales,
        Table::SupportTickets,
        Table::ActivityLogs,
    ];

    /// Returns the table name in the store.
    pub fn name(&self) -> &'static str {
        match self {
            Table::Departments => "departments",
            Table::Employees => "employees",
            Table::Products => "products",
            Table::Customers => "customers",
            Table::Sales => "sales",
            Table::SupportTickets => "support_tickets",
            Table::ActivityLogs => "activity_logs",
        }
    }

    /// Whether inserts skip rows that collide with persisted data.
    ///
    /// Tables without a natural key insert unconditionally, so a rerun
    /// against a populated store duplicates their rows.
    pub fn is_idempotent(&self) -> bool {
        matches!(self, Table::Departments | Table::Customers)
    }
}

/// One chunk of generated rows for a single table.
#[derive(Debug, Clone, Copy)]
pub enum RowChunk<'a> {
    Departments(&'a [GeneratedDepartment]),
    Employees(&'a [GeneratedEmployee]),
    Products(&'a [GeneratedProduct]),
    Customers(&'a [GeneratedCustomer]),
    Sales(&'a [GeneratedSale]),
    SupportTickets(&'a [GeneratedSupportTicket]),
    ActivityLogs(&'a [GeneratedActivityLog]),
}

impl RowChunk<'_> {
    pub fn table(&self) -> Table {
        match self {
            RowChunk::Departments(_) => Table::Departments,
            RowChunk::Employees(_) => Table::Employees,
            RowChunk::Products(_) => Table::Products,
            RowChunk::Customers(_) => Table::Customers,
            RowChunk::Sales(_) => Table::Sales,
            RowChunk::SupportTickets(_) => Table::SupportTickets,
            RowChunk::ActivityLogs(_) => Table::ActivityLogs,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RowChunk::Departments(rows) => rows.len(),
            RowChunk::Employees(rows) => rows.len(),
            RowChunk::Products(rows) => rows.len(),
            RowChunk::Customers(rows) => rows.len(),
            RowChunk::Sales(rows) => rows.len(),
            RowChunk::SupportTickets(rows) => rows.len(),
            RowChunk::ActivityLogs(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A generated record type that can be handed to a [`Store`].
pub trait Record: Sized {
    const TABLE: Table;

    fn chunk(rows: &[Self]) -> RowChunk<'_>;
}

macro_rules! impl_record {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Record for $ty {
                const TABLE: Table = Table::$variant;

                fn chunk(rows: &[Self]) -> RowChunk<'_> {
                    RowChunk::$variant(rows)
                }
            }
        )*
    };
}

impl_record! {
    GeneratedDepartment => Departments,
    GeneratedEmployee => Employees,
    GeneratedProduct => Products,
    GeneratedCustomer => Customers,
    GeneratedSale => Sales,
    GeneratedSupportTicket => SupportTickets,
    GeneratedActivityLog => ActivityLogs,
}

/// Persistence operations consumed by the loader.
///
/// Inserts are buffered in an open unit of work until [`Store::commit`];
/// reads observe committed data.
#[async_trait]
pub trait Store: Send {
    /// Inserts one chunk as a single bulk operation and returns the number
    /// of rows actually persisted.
    async fn insert(&mut self, chunk: RowChunk<'_>) -> Result<u64, PopulateError>;

    /// Makes every insert since the last commit durable and visible.
    async fn commit(&mut self) -> Result<(), PopulateError>;

    /// Discards every insert since the last commit.
    async fn rollback(&mut self) -> Result<(), PopulateError>;

    /// Number of rows currently in `table`.
    async fn count_rows(&mut self, table: Table) -> Result<u64, PopulateError>;

    /// All identities in `table`, ascending.
    async fn fetch_ids(&mut self, table: Table) -> Result<Vec<i64>, PopulateError>;

    /// All product identities with unit prices, ascending by identity.
    async fn fetch_product_prices(&mut self) -> Result<Vec<(i64, Decimal)>, PopulateError>;
}
