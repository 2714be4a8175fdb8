//! # fetch-fmri
//!
//! Makes sure the fMRI time-series partitions are present under
//! `<root>/data/fmri` and match the bundled `data/fmri_filename.csv`,
//! downloading the archives that are missing or stale.
//!
//! ```text
//! $ fetch-fmri            # every atlas, in table order
//! $ fetch-fmri msdl       # a single atlas
//! ```
//!
//! ## Configuration
//!
//! ```text
//! FMRI_ROOT              project root            (default: current directory)
//! FMRI_ARCHIVE_BASE_URL  archive mirror          (default: Zenodo record 3625740)
//! RUST_LOG               log filter on stderr    (default: "info")
//! ```

use anyhow::{Context, Result};
use cache::{DatasetCache, ALL_PARTITIONS};
use clap::{CommandFactory, FromArgMatches, Parser};
use config::{CacheConfig, PartitionTable};
use fetch::HttpTransport;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "fetch-fmri",
    version,
    about = "Download and verify the fMRI atlas time series"
)]
struct Args {
    /// Atlas to fetch, or "all" for every atlas.
    #[arg(default_value = ALL_PARTITIONS)]
    atlas: String,
}

/// Parses the command line, listing the atlases of `table` in `--help`.
fn parse_args(table: &PartitionTable) -> Args {
    let atlases = format!("Atlases: {}", table.names().join(", "));
    let matches = Args::command().after_help(atlases).get_matches();
    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

fn main() -> Result<()> {
    let table = PartitionTable::from_env();
    let args = parse_args(&table);

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = CacheConfig::from_env().context("resolving the project root")?;
    let transport = HttpTransport::new().context("building the HTTP client")?;
    let cache = DatasetCache::new(config, table, transport);
    info!(
        data_dir = %cache.config().data_dir.display(),
        partitions = cache.table().len(),
        "dataset cache ready"
    );

    cache
        .fetch(&args.atlas)
        .with_context(|| format!("fetching {:?}", args.atlas))?;

    println!("Downloading completed ...");
    Ok(())
}
