use anyhow::Result;
use clap::{Args, ValueEnum};
use gceprice_core::PricingRow;
use gceprice_ingest as ingest;
use gceprice_report::{json as jreport, terminal};
use std::cmp::Ordering;
use std::path::PathBuf;

use super::DEFAULT_TABLE_PATH;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    Region,
    Name,
    Family,
    Cpus,
    Memory,
    /// Total on-demand monthly cost
    Cost,
    /// Total spot monthly cost
    Spot,
    /// Total 1-year commitment monthly cost
    Commit1yr,
    /// Total 3-year commitment monthly cost
    Commit3yr,
    /// Spot discount, highest first
    Discount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Table,
    Json,
    Summary,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Pricing table written by `gceprice table`
    #[arg(long, env = "GCEPRICE_OUT", default_value = DEFAULT_TABLE_PATH)]
    pub prices: PathBuf,

    #[command(flatten)]
    pub filter: RowFilter,

    /// Sort keys, applied in order (e.g. `family,cost`)
    #[arg(long, value_enum, value_delimiter = ',', default_value = "name")]
    pub sort: Vec<SortKey>,

    /// Limit results
    #[arg(long)]
    pub limit: Option<usize>,

    #[arg(long, value_enum, default_value_t = Format::Table)]
    pub format: Format,
}

/// Row predicates. Unset bounds accept everything; a set bound rejects rows without the value.
#[derive(Args, Debug, Clone, Default)]
pub struct RowFilter {
    /// Only rows in this region
    #[arg(long)]
    pub region: Option<String>,

    /// Only rows available in this zone
    #[arg(long)]
    pub zone: Option<String>,

    /// Only rows of this family (case-insensitive)
    #[arg(long)]
    pub family: Option<String>,

    /// Only rows whose name contains this substring
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub min_cpus: Option<u32>,

    #[arg(long)]
    pub max_cpus: Option<u32>,

    #[arg(long)]
    pub min_memory_gb: Option<f64>,

    #[arg(long)]
    pub max_memory_gb: Option<f64>,

    /// Upper bound on the on-demand monthly total
    #[arg(long)]
    pub max_cost: Option<f64>,

    /// Lower bound on the spot discount, in percent
    #[arg(long)]
    pub min_discount: Option<f64>,
}

impl RowFilter {
    pub fn matches(&self, row: &PricingRow) -> bool {
        self.region.as_ref().map_or(true, |r| &row.region == r)
            && self.zone.as_ref().map_or(true, |z| row.zones.contains(z))
            && self.family.as_ref().map_or(true, |f| row.family.eq_ignore_ascii_case(f))
            && self.name.as_ref().map_or(true, |n| row.name.contains(n.as_str()))
            && within(row.guest_cpus, self.min_cpus, self.max_cpus)
            && within(
                row.memory_mb.map(|mb| mb as f64 / 1024.0),
                self.min_memory_gb,
                self.max_memory_gb,
            )
            && within(row.price.total_on_demand, None, self.max_cost)
            && within(row.price.discount_rate_spot, self.min_discount, None)
    }
}

fn within<T: PartialOrd + Copy>(value: Option<T>, min: Option<T>, max: Option<T>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    match value {
        Some(v) => min.map_or(true, |m| v >= m) && max.map_or(true, |m| v <= m),
        None => false,
    }
}

/// Missing values sort last.
fn cmp_missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare(a: &PricingRow, b: &PricingRow, key: SortKey) -> Ordering {
    match key {
        SortKey::Region => a.region.cmp(&b.region),
        SortKey::Name => a.name.cmp(&b.name),
        SortKey::Family => a.family.cmp(&b.family),
        SortKey::Cpus => cmp_missing_last(a.guest_cpus.map(f64::from), b.guest_cpus.map(f64::from)),
        SortKey::Memory => cmp_missing_last(a.memory_mb.map(|m| m as f64), b.memory_mb.map(|m| m as f64)),
        SortKey::Cost => cmp_missing_last(a.price.total_on_demand, b.price.total_on_demand),
        SortKey::Spot => cmp_missing_last(a.price.total_spot, b.price.total_spot),
        SortKey::Commit1yr => cmp_missing_last(a.price.total_commit_1yr, b.price.total_commit_1yr),
        SortKey::Commit3yr => cmp_missing_last(a.price.total_commit_3yr, b.price.total_commit_3yr),
        SortKey::Discount => cmp_missing_last(
            a.price.discount_rate_spot.map(|d| -d),
            b.price.discount_rate_spot.map(|d| -d),
        ),
    }
}

/// Sort by each key in turn; region then name breaks remaining ties.
fn sort_rows(rows: &mut [&PricingRow], keys: &[SortKey]) {
    rows.sort_by(|a, b| {
        keys.iter()
            .fold(Ordering::Equal, |ord, key| ord.then_with(|| compare(a, b, *key)))
            .then_with(|| (&a.region, &a.name).cmp(&(&b.region, &b.name)))
    });
}

pub fn run(args: ShowArgs) -> Result<()> {
    let table = ingest::read_table(&args.prices)?;

    if args.format == Format::Summary {
        println!("{}", jreport::render_summary(&table)?);
        return Ok(());
    }

    let mut rows: Vec<&PricingRow> = table.prices.iter().filter(|r| args.filter.matches(r)).collect();

    sort_rows(&mut rows, &args.sort);

    if let Some(n) = args.limit {
        rows.truncate(n);
    }

    match args.format {
        Format::Json => println!("{}", jreport::render_rows(&rows)?),
        _ => terminal::print_rows(&rows, table.generated_at_utc()),
    }
    Ok(())
}
