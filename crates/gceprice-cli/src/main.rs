use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
use commands::{classify, index, show, table};

#[derive(Parser)]
#[command(
    name = "gceprice",
    version = "0.1.0",
    author,
    about = "Normalize the Compute Engine pricing catalog into a per-machine-type price table",
    long_about = r#"gceprice turns saved Cloud Billing catalog pages and Compute Engine inventory
listings into one price row per machine type and accelerator type per region, with
on-demand, spot, 1-year and 3-year commitment monthly costs and discount rates.

Quick start:
  gceprice index --catalog out/catalog/ --out out/skus.json
  gceprice table --index out/skus.json --inventory out/machine_types.json,out/accelerator_types.json
  gceprice show --region us-central1 --family N2 --sort cost
  gceprice classify --group CPU "N2D AMD Instance Core running in Americas"

Log verbosity follows RUST_LOG (default: info)."#
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the price index from catalog pages and cache it
    Index(index::IndexArgs),

    /// Price every machine/accelerator type and write the pricing table
    Table(table::TableArgs),

    /// Show rows of a generated pricing table
    Show(show::ShowArgs),

    /// Print the family a SKU description classifies to
    Classify(classify::ClassifyArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(cli) {
        eprintln!("{}: {:#}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Index(args) => index::run(args),
        Commands::Table(args) => table::run(args),
        Commands::Show(args) => show::run(args),
        Commands::Classify(args) => classify::run(args),
    }
}
