//! Populates the companydb schema with generated data.
//!
//! Run with:
//! ```
//! DATABASE_URL=postgres://localhost/companydb cargo run -p populate --bin populate -- --fresh
//! ```

use std::path::PathBuf;

use clap::Parser;
use populate::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "populate", about = "Populate companydb with generated data")]
struct Args {
    /// PostgreSQL connection string
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/companydb"
    )]
    database_url: String,

    /// TOML file with seed, row counts, and chunk sizes
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured seed
    #[arg(long)]
    seed: Option<u64>,

    /// Declare every target table empty (skips pre-insert row counts)
    #[arg(long)]
    fresh: bool,

    /// Generate into an in-memory store instead of the database
    #[arg(long)]
    dry_run: bool,

    /// Maximum pool connections
    #[arg(long, default_value_t = 5)]
    max_connections: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PopulateConfig::from_toml_file(path)?,
        None => PopulateConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.fresh {
        config.target = TargetState::Empty;
    }

    let pipeline = Pipeline::new(config);

    let summary = if args.dry_run {
        tracing::info!("Dry run: generating into memory");
        let mut store = MemoryStore::new();
        pipeline.run(&mut store).await?
    } else {
        let mut store = PgStore::connect(&args.database_url, args.max_connections).await?;
        tracing::info!("Connected to database");
        pipeline.run(&mut store).await?
    };

    tracing::info!("Population completed (seed {})", summary.seed);
    for stage in &summary.stages {
        tracing::info!(
            "  {}: {} generated, {} inserted, {} total",
            stage.table.name(),
            stage.generated,
            stage.persisted,
            stage.total()
        );
    }

    Ok(())
}
