//! Error types for the population pipeline.

use thiserror::Error;

/// Every failure that can abort a population run.
///
/// All variants are fatal: a run either completes every stage or is
/// restarted from scratch. Silent skips from idempotent inserts are not
/// errors and surface through [`crate::loader::StageReport`] instead.
#[derive(Debug, Error)]
pub enum PopulateError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to generate unique email for customer {sequence} after {attempts} attempts")]
    UniquenessExhausted { sequence: usize, attempts: usize },

    #[error("Cannot generate {entity}: no {parent} identities available")]
    EmptyParentPool {
        entity: &'static str,
        parent: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
