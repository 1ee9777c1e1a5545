//! Entity generators for the companydb tables.
//!
//! - [`DepartmentGenerator`]: fixed, numbered departments
//! - [`EmployeeGenerator`]: staff assigned to departments
//! - [`ProductGenerator`]: catalog items with exact-decimal prices
//! - [`CustomerGenerator`]: accounts with run-unique email addresses
//! - [`SaleGenerator`]: sales priced from the catalog
//! - [`SupportTicketGenerator`]: tickets opened by customers
//! - [`ActivityLogGenerator`]: staff activity events
//!
//! Generators never touch the store. Dependent generators are built from
//! already-persisted identity pools and refuse to exist when a pool is empty.

pub mod activity_log;
pub mod customer;
pub mod department;
pub mod employee;
pub mod product;
pub mod sale;
pub mod ticket;

pub use activity_log::{ActivityLogGenerator, ActivityType, GeneratedActivityLog};
pub use customer::{CustomerGenConfig, CustomerGenerator, GeneratedCustomer};
pub use department::{DepartmentGenerator, GeneratedDepartment};
pub use employee::{EmployeeGenConfig, EmployeeGenerator, GeneratedEmployee};
pub use product::{Category, GeneratedProduct, ProductGenerator};
pub use sale::{GeneratedSale, PricedProduct, SaleGenConfig, SaleGenerator};
pub use ticket::{GeneratedSupportTicket, SupportTicketGenerator, TicketGenConfig, TicketStatus};

use tracing::info;

use crate::error::PopulateError;
use crate::rng::SeedStream;

/// A generator that can produce the record at a given stage position.
pub trait RowGenerator {
    type Row;

    /// Generates the record at `index` (0-based) within the stage.
    fn generate_row(
        &mut self,
        index: usize,
        rng: &mut SeedStream,
    ) -> Result<Self::Row, PopulateError>;
}

/// Fails with [`PopulateError::EmptyParentPool`] when `pool` is empty.
pub(crate) fn require_pool<T>(
    pool: &[T],
    entity: &'static str,
    parent: &'static str,
) -> Result<(), PopulateError> {
    if pool.is_empty() {
        return Err(PopulateError::EmptyParentPool { entity, parent });
    }
    Ok(())
}

/// Lazily produces a stage's records one chunk at a time.
///
/// Only the current chunk is held in memory. After an error the stream is
/// finished and yields nothing further.
pub struct Chunks<'a, G> {
    generator: &'a mut G,
    rng: &'a mut SeedStream,
    next: usize,
    total: usize,
    chunk_size: usize,
    progress: Option<(&'static str, usize)>,
}

impl<'a, G: RowGenerator> Chunks<'a, G> {
    /// Creates a stream over `total` records in chunks of `chunk_size`.
    pub fn new(
        generator: &'a mut G,
        rng: &'a mut SeedStream,
        total: usize,
        chunk_size: usize,
    ) -> Self {
        Self {
            generator,
            rng,
            next: 0,
            total,
            chunk_size: chunk_size.max(1),
            progress: None,
        }
    }

    /// Logs `Prepared N/M <label>` every `every` generated records.
    ///
    /// Lines are emitted while a chunk is being built, so a stage produced
    /// as a single chunk still reports as it goes.
    pub fn with_progress(mut self, label: &'static str, every: usize) -> Self {
        self.progress = Some((label, every.max(1)));
        self
    }

    /// Continues numbering at `index` instead of zero.
    ///
    /// Only record indexes (and the names derived from them) resume. Random
    /// draws continue from `rng` in whatever state it is handed over, so the
    /// resumed records match an uninterrupted run only when `rng` is in the
    /// state that run had reached at `index`. A fresh stream seeded the same
    /// way yields different values for the same indexes.
    pub fn resume_from(mut self, index: usize) -> Self {
        self.next = index.min(self.total);
        self
    }

    /// Index of the next record to be generated.
    pub fn position(&self) -> usize {
        self.next
    }

    /// Records not yet generated.
    pub fn remaining(&self) -> usize {
        self.total - self.next
    }

    /// Total records in the stage.
    pub fn total(&self) -> usize {
        self.total
    }
}

impl<G: RowGenerator> Iterator for Chunks<'_, G> {
    type Item = Result<Vec<G::Row>, PopulateError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total {
            return None;
        }

        let end = (self.next + self.chunk_size).min(self.total);
        let mut rows = Vec::with_capacity(end - self.next);

        for index in self.next..end {
            match self.generator.generate_row(index, self.rng) {
                Ok(row) => {
                    rows.push(row);
                    if let Some((label, every)) = self.progress {
                        if (index + 1) % every == 0 {
                            info!("  Prepared {}/{} {}", index + 1, self.total, label);
                        }
                    }
                }
                Err(e) => {
                    self.next = self.total;
                    return Some(Err(e));
                }
            }
        }

        self.next = end;
        Some(Ok(rows))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let chunks = self.remaining().div_ceil(self.chunk_size);
        (chunks, Some(chunks))
    }
}
