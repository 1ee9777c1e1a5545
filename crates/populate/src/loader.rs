//! Chunked stage loading.
//!
//! A stage is: optional pre-count, chunked insert, commit, then identity
//! read-back by the caller. The commit always happens before any identity
//! read, so dependents only ever see committed parents. A stage that fails
//! is rolled back as a whole.

use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::config::{StageConfig, TargetState};
use crate::db::{Record, Store, Table};
use crate::error::PopulateError;
use crate::generators::PricedProduct;

/// Outcome of loading one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub table: Table,
    /// Candidate records generated.
    pub generated: usize,
    /// Rows the store reported as persisted.
    pub persisted: u64,
    /// Rows already in the table when the stage began.
    pub existing: u64,
    pub elapsed: Duration,
}

impl StageReport {
    /// Candidates the store silently dropped on conflict.
    pub fn skipped(&self) -> u64 {
        (self.generated as u64).saturating_sub(self.persisted)
    }

    /// Rows in the table after the stage.
    pub fn total(&self) -> u64 {
        self.existing + self.persisted
    }
}

/// Drives inserts for one stage at a time against a [`Store`].
pub struct BatchLoader<'s, S> {
    store: &'s mut S,
    target: TargetState,
}

impl<'s, S: Store> BatchLoader<'s, S> {
    pub fn new(store: &'s mut S, target: TargetState) -> Self {
        Self { store, target }
    }

    /// Inserts every chunk produced by `chunks`, then commits.
    ///
    /// `stage` supplies the expected count and progress cadence. The first
    /// failing chunk or store call rolls back everything this stage
    /// inserted and the error is returned.
    pub async fn load<R, I>(
        &mut self,
        stage: StageConfig,
        chunks: I,
    ) -> Result<StageReport, PopulateError>
    where
        R: Record,
        I: IntoIterator<Item = Result<Vec<R>, PopulateError>>,
    {
        let table = R::TABLE;
        let start = Instant::now();
        info!("Populating {} ({} records)...", table.name(), stage.count);

        let (existing, generated, persisted) = match self.insert_all(stage, chunks).await {
            Ok(counts) => counts,
            Err(e) => {
                self.abort(table).await;
                return Err(e);
            }
        };

        let report = StageReport {
            table,
            generated,
            persisted,
            existing,
            elapsed: start.elapsed(),
        };

        if report.skipped() > 0 {
            warn!(
                "{} of {} {} were skipped due to existing rows",
                report.skipped(),
                report.generated,
                table.name()
            );
        }
        info!(
            "Inserted {} new {} in {:.2?}. Total in table: {}.",
            report.persisted,
            table.name(),
            report.elapsed,
            report.total()
        );

        Ok(report)
    }

    /// Pre-count, insert and commit. Returns existing, generated and
    /// persisted counts.
    async fn insert_all<R, I>(
        &mut self,
        stage: StageConfig,
        chunks: I,
    ) -> Result<(u64, usize, u64), PopulateError>
    where
        R: Record,
        I: IntoIterator<Item = Result<Vec<R>, PopulateError>>,
    {
        let table = R::TABLE;
        let existing = match self.target {
            TargetState::Empty => 0,
            TargetState::MaybePopulated => self.store.count_rows(table).await?,
        };

        let interval = stage.effective_progress_interval();
        let mut generated = 0usize;
        let mut persisted = 0u64;
        let mut next_progress = interval;

        for chunk in chunks {
            let rows = chunk?;
            let inserted = self.store.insert(R::chunk(&rows)).await?;
            generated += rows.len();
            persisted += inserted;
            debug!(
                "  Inserted {} batch at {} ({} records)",
                table.name(),
                generated,
                rows.len()
            );

            if generated >= next_progress {
                info!("  Inserted {}/{} {}", generated, stage.count, table.name());
                next_progress = (generated / interval + 1) * interval;
            }
        }

        self.store.commit().await?;
        Ok((existing, generated, persisted))
    }

    /// Discards the failed stage's uncommitted rows.
    async fn abort(&mut self, table: Table) {
        match self.store.rollback().await {
            Ok(()) => warn!("Rolled back {} after a failed stage", table.name()),
            Err(e) => error!("Rollback of {} failed: {}", table.name(), e),
        }
    }

    /// Reads back every committed identity of `table`, ascending.
    pub async fn identities(&mut self, table: Table) -> Result<Vec<i64>, PopulateError> {
        let ids = self.store.fetch_ids(table).await?;
        debug!("Fetched {} {} identities", ids.len(), table.name());
        Ok(ids)
    }

    /// Reads back every committed product with its unit price, ascending.
    pub async fn priced_products(&mut self) -> Result<Vec<PricedProduct>, PopulateError> {
        let products: Vec<PricedProduct> = self
            .store
            .fetch_product_prices()
            .await?
            .into_iter()
            .map(|(id, price)| PricedProduct { id, price })
            .collect();
        debug!("Fetched {} product prices", products.len());
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, StoreEvent};
    use crate::generators::{GeneratedCustomer, GeneratedDepartment};
    use time::macros::date;

    fn departments(names: &[&str]) -> Vec<GeneratedDepartment> {
        names
            .iter()
            .map(|n| GeneratedDepartment {
                name: n.to_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_load_commits_once_after_all_chunks() {
        let mut store = MemoryStore::new();
        let mut loader = BatchLoader::new(&mut store, TargetState::Empty);

        let chunks = vec![Ok(departments(&["A", "B"])), Ok(departments(&["C"]))];
        let report = loader.load(StageConfig::whole(3), chunks).await.unwrap();

        assert_eq!(report.generated, 3);
        assert_eq!(report.persisted, 3);
        assert_eq!(report.skipped(), 0);
        assert_eq!(report.total(), 3);
        assert_eq!(
            loader.identities(Table::Departments).await.unwrap(),
            vec![1, 2, 3]
        );

        assert_eq!(
            store.events(),
            &[
                StoreEvent::Insert {
                    table: Table::Departments,
                    rows: 2
                },
                StoreEvent::Insert {
                    table: Table::Departments,
                    rows: 1
                },
                StoreEvent::Commit,
                StoreEvent::Fetch(Table::Departments),
            ]
        );
    }

    #[tokio::test]
    async fn test_rerun_reports_skips() {
        let mut store = MemoryStore::new();
        let mut loader = BatchLoader::new(&mut store, TargetState::MaybePopulated);

        loader
            .load(StageConfig::whole(2), vec![Ok(departments(&["A", "B"]))])
            .await
            .unwrap();
        let report = loader
            .load(StageConfig::whole(3), vec![Ok(departments(&["A", "B", "C"]))])
            .await
            .unwrap();

        assert_eq!(report.existing, 2);
        assert_eq!(report.persisted, 1);
        assert_eq!(report.skipped(), 2);
        assert_eq!(report.total(), 3);
    }

    #[tokio::test]
    async fn test_empty_target_skips_count() {
        let mut store = MemoryStore::new();
        let mut loader = BatchLoader::new(&mut store, TargetState::Empty);
        loader.load(StageConfig::whole(1), vec![Ok(departments(&["A"]))]).await.unwrap();

        assert!(
            !store
                .events()
                .iter()
                .any(|e| matches!(e, StoreEvent::Count(_)))
        );
    }

    #[tokio::test]
    async fn test_generation_error_aborts_without_commit() {
        let mut store = MemoryStore::new();
        let mut loader = BatchLoader::new(&mut store, TargetState::Empty);

        let chunks: Vec<Result<Vec<GeneratedCustomer>, PopulateError>> = vec![
            Ok(vec![GeneratedCustomer {
                name: "Customer_1".to_string(),
                email: "customer1@example.com".to_string(),
                signup_date: date!(2010 - 01 - 01),
            }]),
            Err(PopulateError::UniquenessExhausted {
                sequence: 2,
                attempts: 10,
            }),
        ];

        let result = loader.load(StageConfig::whole(2), chunks).await;
        assert!(matches!(result, Err(PopulateError::UniquenessExhausted { .. })));
        assert!(!store.events().contains(&StoreEvent::Commit));
        assert_eq!(store.events().last(), Some(&StoreEvent::Rollback));
        assert!(store.customers().is_empty());
    }

    #[tokio::test]
    async fn test_failed_stage_leaves_nothing_behind() {
        let mut store = MemoryStore::new();
        let mut loader = BatchLoader::new(&mut store, TargetState::MaybePopulated);

        let aborted = loader
            .load(
                StageConfig::whole(3),
                vec![
                    Ok(departments(&["Aborted 1", "Aborted 2"])),
                    Err(PopulateError::InvalidConfig("stop".to_string())),
                ],
            )
            .await;
        assert!(aborted.is_err());

        let report = loader
            .load(StageConfig::whole(1), vec![Ok(departments(&["Fresh"]))])
            .await
            .unwrap();
        assert_eq!(report.existing, 0);
        assert_eq!(report.persisted, 1);
        assert_eq!(report.total(), 1);
        assert_eq!(
            loader.identities(Table::Departments).await.unwrap(),
            vec![1]
        );

        let names: Vec<&str> = store
            .departments()
            .iter()
            .map(|(_, d)| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["Fresh"]);
    }

    #[tokio::test]
    async fn test_rolled_back_names_can_be_inserted_again() {
        let mut store = MemoryStore::new();
        let mut loader = BatchLoader::new(&mut store, TargetState::Empty);

        let result = loader
            .load(
                StageConfig::chunked(2, 1),
                vec![
                    Ok(departments(&["A"])),
                    Err(PopulateError::InvalidConfig("stop".to_string())),
                ],
            )
            .await;
        assert!(result.is_err());

        let report = loader
            .load(StageConfig::whole(1), vec![Ok(departments(&["A"]))])
            .await
            .unwrap();
        assert_eq!(report.persisted, 1);
        assert_eq!(report.skipped(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut store = MemoryStore::new();
        store.fail_inserts_into(Table::Departments);
        let mut loader = BatchLoader::new(&mut store, TargetState::Empty);

        let result = loader.load(StageConfig::whole(1), vec![Ok(departments(&["A"]))]).await;
        assert!(matches!(result, Err(PopulateError::Database(_))));
        assert_eq!(store.events().last(), Some(&StoreEvent::Rollback));
    }
}
