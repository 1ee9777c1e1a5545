//! Ordered population of every table.

use std::time::{Duration, Instant};

use tracing::info;

use crate::config::{PopulateConfig, StageConfig};
use crate::db::{Record, Store, Table};
use crate::error::PopulateError;
use crate::generators::{
    ActivityLogGenerator, Chunks, CustomerGenerator, DepartmentGenerator, EmployeeGenerator,
    ProductGenerator, RowGenerator, SaleGenerator, SupportTicketGenerator,
};
use crate::loader::{BatchLoader, StageReport};
use crate::rng::SeedStream;

/// Result of a complete population run.
#[derive(Debug, Clone)]
pub struct PopulateSummary {
    pub seed: u64,
    /// One report per table, in stage order.
    pub stages: Vec<StageReport>,
    pub elapsed: Duration,
}

impl PopulateSummary {
    /// Report for `table`, if its stage ran.
    pub fn stage(&self, table: Table) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.table == table)
    }

    /// Total rows persisted across every stage.
    pub fn persisted(&self) -> u64 {
        self.stages.iter().map(|s| s.persisted).sum()
    }
}

/// Runs the generation-and-loading stages in dependency order.
///
/// Stage order is fixed: departments, employees, products, customers,
/// sales, support tickets, activity logs. Every stage commits and its
/// identities are read back before the next dependent stage generates a
/// single record.
pub struct Pipeline {
    config: PopulateConfig,
}

impl Pipeline {
    pub fn new(config: PopulateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PopulateConfig {
        &self.config
    }

    /// Runs every stage with a fresh stream seeded from the configuration.
    pub async fn run<S: Store>(&self, store: &mut S) -> Result<PopulateSummary, PopulateError> {
        let mut rng = SeedStream::new(self.config.seed);
        self.run_with(store, &mut rng).await
    }

    /// Runs every stage drawing from `rng`.
    pub async fn run_with<S: Store>(
        &self,
        store: &mut S,
        rng: &mut SeedStream,
    ) -> Result<PopulateSummary, PopulateError> {
        self.config.validate()?;

        let start = Instant::now();
        let config = &self.config;
        let mut loader = BatchLoader::new(store, config.target);
        let mut stages = Vec::with_capacity(Table::ALL.len());

        info!("Populating with seed {}", rng.seed());

        let mut department_gen = DepartmentGenerator::new();
        stages.push(load_stage(&mut loader, &mut department_gen, rng, config.departments).await?);
        let department_ids = loader.identities(Table::Departments).await?;

        let mut employee_gen = EmployeeGenerator::new(&department_ids)?;
        stages.push(load_stage(&mut loader, &mut employee_gen, rng, config.employees).await?);
        let employee_ids = loader.identities(Table::Employees).await?;

        let mut product_gen = ProductGenerator::new();
        stages.push(load_stage(&mut loader, &mut product_gen, rng, config.products).await?);
        let products = loader.priced_products().await?;

        let mut customer_gen = CustomerGenerator::new();
        stages.push(load_stage(&mut loader, &mut customer_gen, rng, config.customers).await?);
        let customer_ids = loader.identities(Table::Customers).await?;

        let mut sale_gen = SaleGenerator::new(&products, &customer_ids)?;
        stages.push(load_stage(&mut loader, &mut sale_gen, rng, config.sales).await?);

        let mut ticket_gen = SupportTicketGenerator::new(&customer_ids)?;
        stages.push(load_stage(&mut loader, &mut ticket_gen, rng, config.support_tickets).await?);

        let mut log_gen = ActivityLogGenerator::new(&employee_ids)?;
        stages.push(load_stage(&mut loader, &mut log_gen, rng, config.activity_logs).await?);

        let summary = PopulateSummary {
            seed: rng.seed(),
            stages,
            elapsed: start.elapsed(),
        };
        info!(
            "Population complete: {} rows in {:.2?}",
            summary.persisted(),
            summary.elapsed
        );
        Ok(summary)
    }
}

/// Streams one stage's records through the loader.
async fn load_stage<S, G>(
    loader: &mut BatchLoader<'_, S>,
    generator: &mut G,
    rng: &mut SeedStream,
    stage: StageConfig,
) -> Result<StageReport, PopulateError>
where
    S: Store,
    G: RowGenerator,
    G::Row: Record,
{
    let chunks = Chunks::new(generator, rng, stage.count, stage.effective_chunk_size())
        .with_progress(<G::Row as Record>::TABLE.name(), stage.effective_progress_interval());
    loader.load(stage, chunks).await
}
