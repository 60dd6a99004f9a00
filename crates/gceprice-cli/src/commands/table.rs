use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use gceprice_core::{build_index, generate_pricing_table, PriceIndex, TableOptions};
use gceprice_ingest as ingest;
use std::path::PathBuf;
use tracing::info;

use super::DEFAULT_TABLE_PATH;

#[derive(Args)]
pub struct TableArgs {
    /// Inventory files: normalized inventory or Compute API aggregatedList responses
    #[arg(long, env = "GCEPRICE_INVENTORY", value_delimiter = ',', required = true)]
    pub inventory: Vec<PathBuf>,

    /// Cached price index written by `gceprice index`
    #[arg(long, env = "GCEPRICE_INDEX")]
    pub index: Option<PathBuf>,

    /// Build the index from this catalog instead of reading a cache
    #[arg(long, env = "GCEPRICE_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Where to write the pricing table
    #[arg(long, env = "GCEPRICE_OUT", default_value = DEFAULT_TABLE_PATH)]
    pub out: PathBuf,

    /// Regions to leave out (replaces the built-in list)
    #[arg(long = "exclude-region", env = "GCEPRICE_EXCLUDED_REGIONS", value_delimiter = ',')]
    pub exclude_regions: Vec<String>,
}

fn load_index(args: &TableArgs) -> Result<PriceIndex> {
    if let Some(path) = &args.index {
        return ingest::read_index(path);
    }
    match &args.catalog {
        Some(catalog) => {
            let skus = ingest::load_catalog(catalog)?;
            build_index(&skus).with_context(|| format!("building price index from {}", catalog.display()))
        }
        None => anyhow::bail!("either --index or --catalog is required"),
    }
}

pub fn run(args: TableArgs) -> Result<()> {
    let index = load_index(&args)?;
    let inventory = ingest::load_inventory(args.inventory.as_slice())?;

    let options = if args.exclude_regions.is_empty() {
        TableOptions::default()
    } else {
        TableOptions::with_excluded_regions(args.exclude_regions.iter().cloned())
    };

    eprintln!("{} Pricing {} regions...", "→".cyan(), inventory.regions().len());
    let table = generate_pricing_table(&inventory, &index, &options);
    let priced = table
        .prices
        .iter()
        .filter(|r| r.price.total_on_demand.is_some())
        .count();
    info!(rows = table.prices.len(), priced, "pricing table generated");

    ingest::write_table(&args.out, &table)?;
    eprintln!(
        "{} {} rows ({} priced) written to {}",
        "✓".green(),
        table.prices.len(),
        priced,
        ingest::short_path(&args.out)
    );
    Ok(())
}
