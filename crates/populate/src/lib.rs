//! Bulk population of the companydb demo schema.
//!
//! This crate generates an internally consistent dataset (departments,
//! employees, products, customers, sales, support tickets, and activity
//! logs) and loads it into a store in bounded-memory chunks, keeping every
//! foreign key valid and every customer email unique.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use populate::prelude::*;
//!
//! let mut store = PgStore::connect(&database_url, 5).await?;
//! let summary = Pipeline::new(PopulateConfig::default())
//!     .run(&mut store)
//!     .await?;
//! ```
//!
//! A fixed seed reproduces the same non-identity values in the same order.

pub mod config;
pub mod db;
pub mod error;
pub mod generators;
pub mod loader;
pub mod money;
pub mod pipeline;
pub mod resolver;
pub mod rng;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::config::{PopulateConfig, StageConfig, TargetState};
    pub use crate::db::{MemoryStore, PgStore, RowChunk, Store, Table};
    pub use crate::error::PopulateError;
    pub use crate::generators::{
        ActivityLogGenerator, Chunks, CustomerGenerator, DepartmentGenerator, EmployeeGenerator,
        ProductGenerator, RowGenerator, SaleGenerator, SupportTicketGenerator,
    };
    pub use crate::loader::{BatchLoader, StageReport};
    pub use crate::pipeline::{Pipeline, PopulateSummary};
    pub use crate::resolver::{EmailResolver, Resolution};
    pub use crate::rng::SeedStream;
}
