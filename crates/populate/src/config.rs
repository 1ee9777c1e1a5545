//! Configuration types for a population run.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::db::Table;
use crate::error::PopulateError;

/// Progress cadence for stages inserted in chunks.
pub const CHUNKED_PROGRESS_INTERVAL: usize = 100_000;
/// Progress cadence for stages inserted in one call.
pub const ONE_SHOT_PROGRESS_INTERVAL: usize = 10_000;

/// What the loader may assume about the target tables before inserting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetState {
    /// Tables are known to be empty; no pre-insert row count is taken.
    Empty,
    /// Tables may already hold rows from an earlier run. The loader counts
    /// rows before inserting so skip counts can be reported.
    #[default]
    MaybePopulated,
}

/// Row count and chunking for one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Number of candidate records to generate.
    pub count: usize,
    /// Records per insert call. `None` inserts the whole stage in one call.
    #[serde(default)]
    pub chunk_size: Option<usize>,
    /// Records between progress lines. `None` picks the cadence from
    /// whether the stage is chunked.
    #[serde(default)]
    pub progress_interval: Option<usize>,
}

impl StageConfig {
    pub const fn whole(count: usize) -> Self {
        Self {
            count,
            chunk_size: None,
            progress_interval: None,
        }
    }

    pub const fn chunked(count: usize, chunk_size: usize) -> Self {
        Self {
            count,
            chunk_size: Some(chunk_size),
            progress_interval: None,
        }
    }

    pub fn with_progress_interval(mut self, every: usize) -> Self {
        self.progress_interval = Some(every);
        self
    }

    /// Chunk size the loader will actually use (never zero).
    pub fn effective_chunk_size(&self) -> usize {
        self.chunk_size.unwrap_or(self.count).max(1)
    }

    /// Records between progress lines (never zero).
    pub fn effective_progress_interval(&self) -> usize {
        let default = match self.chunk_size {
            Some(_) => CHUNKED_PROGRESS_INTERVAL,
            None => ONE_SHOT_PROGRESS_INTERVAL,
        };
        self.progress_interval.unwrap_or(default).max(1)
    }
}

/// Configuration for a full population run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulateConfig {
    /// Seed for the run's random stream.
    pub seed: u64,

    pub departments: StageConfig,
    pub employees: StageConfig,
    pub products: StageConfig,
    pub customers: StageConfig,
    pub sales: StageConfig,
    pub support_tickets: StageConfig,
    pub activity_logs: StageConfig,

    /// Whether target tables are known to be empty.
    pub target: TargetState,
}

impl Default for PopulateConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            departments: StageConfig::whole(10),
            employees: StageConfig::whole(100_000),
            products: StageConfig::whole(1_000),
            customers: StageConfig::whole(500_000),
            sales: StageConfig::chunked(5_000_000, 10_000),
            support_tickets: StageConfig::whole(100_000),
            activity_logs: StageConfig::chunked(2_000_000, 10_000),
            target: TargetState::MaybePopulated,
        }
    }
}

impl PopulateConfig {
    /// A tiny configuration for smoke tests and dry runs.
    pub fn small() -> Self {
        Self {
            departments: StageConfig::whole(3),
            employees: StageConfig::whole(50),
            products: StageConfig::whole(20),
            customers: StageConfig::whole(100),
            sales: StageConfig::chunked(500, 64),
            support_tickets: StageConfig::whole(40),
            activity_logs: StageConfig::chunked(300, 64),
            ..Self::default()
        }
    }

    /// Loads a configuration from a TOML file. Missing keys take defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, PopulateError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Parses and validates a TOML configuration.
    pub fn from_toml_str(raw: &str) -> Result<Self, PopulateError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects zero chunk sizes and zero progress intervals.
    pub fn validate(&self) -> Result<(), PopulateError> {
        for table in Table::ALL {
            let stage = self.stage(table);
            if stage.chunk_size == Some(0) {
                return Err(PopulateError::InvalidConfig(format!(
                    "chunk_size for {} must be greater than zero",
                    table.name()
                )));
            }
            if stage.progress_interval == Some(0) {
                return Err(PopulateError::InvalidConfig(format!(
                    "progress_interval for {} must be greater than zero",
                    table.name()
                )));
            }
        }
        Ok(())
    }

    /// Stage settings for a table.
    pub fn stage(&self, table: Table) -> StageConfig {
        match table {
            Table::Departments => self.departments,
            Table::Employees => self.employees,
            Table::Products => self.products,
            Table::Customers => self.customers,
            Table::Sales => self.sales,
            Table::SupportTickets => self.support_tickets,
            Table::ActivityLogs => self.activity_logs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_run() {
        let config = PopulateConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.sales.count, 5_000_000);
        assert_eq!(config.sales.effective_chunk_size(), 10_000);
        assert_eq!(config.customers.effective_chunk_size(), 500_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PopulateConfig::from_toml_str(
            r#"
            seed = 7
            target = "empty"

            [customers]
            count = 25
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, 7);
        assert_eq!(config.target, TargetState::Empty);
        assert_eq!(config.customers, StageConfig::whole(25));
        assert_eq!(config.activity_logs.count, 2_000_000);
    }

    #[test]
    fn test_zero_chunk_rejected() {
        let result = PopulateConfig::from_toml_str(
            r#"
            [sales]
            count = 10
            chunk_size = 0
            "#,
        );
        assert!(matches!(result, Err(PopulateError::InvalidConfig(_))));
    }

    #[test]
    fn test_progress_cadence_follows_chunking() {
        let config = PopulateConfig::default();
        assert_eq!(config.sales.effective_progress_interval(), 100_000);
        assert_eq!(config.activity_logs.effective_progress_interval(), 100_000);
        assert_eq!(config.customers.effective_progress_interval(), 10_000);
        assert_eq!(config.employees.effective_progress_interval(), 10_000);
        assert_eq!(
            StageConfig::whole(50)
                .with_progress_interval(5)
                .effective_progress_interval(),
            5
        );
    }

    #[test]
    fn test_zero_progress_interval_rejected() {
        let result = PopulateConfig::from_toml_str(
            r#"
            [customers]
            count = 10
            progress_interval = 0
            "#,
        );
        assert!(matches!(result, Err(PopulateError::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_stage_chunk_size_is_positive() {
        assert_eq!(StageConfig::whole(0).effective_chunk_size(), 1);
    }
}
