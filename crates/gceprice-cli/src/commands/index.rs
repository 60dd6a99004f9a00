use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use gceprice_core::build_index_with_stats;
use gceprice_ingest as ingest;
use gceprice_report::terminal;
use std::path::PathBuf;
use tracing::info;

use super::DEFAULT_INDEX_PATH;

#[derive(Args)]
pub struct IndexArgs {
    /// Catalog JSON file, or a directory of saved `skus.list` pages
    #[arg(long, env = "GCEPRICE_CATALOG")]
    pub catalog: PathBuf,

    /// Where to write the price index cache
    #[arg(long, env = "GCEPRICE_INDEX", default_value = DEFAULT_INDEX_PATH)]
    pub out: PathBuf,
}

pub fn run(args: IndexArgs) -> Result<()> {
    let skus = ingest::load_catalog(&args.catalog)?;

    eprintln!("{} Indexing {} SKUs...", "→".cyan(), skus.len());
    let (index, stats) = build_index_with_stats(&skus)
        .with_context(|| format!("building price index from {}", args.catalog.display()))?;
    info!(
        skus = stats.skus_seen,
        filtered = stats.filtered,
        unclassified = stats.unclassified,
        inserted = stats.inserted,
        collisions = stats.collisions,
        replaced = stats.replaced,
        "price index built"
    );

    ingest::write_index(&args.out, &index)?;
    terminal::print_build_stats(&stats, &index);
    eprintln!("{} Written to {}", "✓".green(), ingest::short_path(&args.out));
    Ok(())
}
