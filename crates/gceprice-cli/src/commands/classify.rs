use anyhow::Result;
use clap::Args;
use colored::Colorize;
use gceprice_core::classify_with_rule;

#[derive(Args)]
pub struct ClassifyArgs {
    /// Catalog resource group (CPU, RAM, GPU, N1Standard, ...)
    #[arg(long, default_value = "CPU")]
    pub group: String,

    /// SKU description
    #[arg(required = true, num_args = 1..)]
    pub description: Vec<String>,
}

pub fn run(args: ClassifyArgs) -> Result<()> {
    let description = args.description.join(" ");
    match classify_with_rule(&args.group, &description) {
        Some((rule, family)) => println!("{}  {}", family.green().bold(), format!("(rule: {})", rule).dimmed()),
        None => println!("{}", "unclassifiable".yellow()),
    }
    Ok(())
}
