use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Hours in an average month (24 × 365 / 12).
pub const HOURS_PER_MONTH: f64 = 24.0 * 365.0 / 12.0;

const NANOS_PER_UNIT: f64 = 1e9;

// ── catalog input ─────────────────────────────────────────────────────────────

/// One line item of the Cloud Billing catalog, as returned by `services.skus.list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuRecord {
    pub sku_id: String,
    #[serde(default)]
    pub description: String,
    pub category: SkuCategory,
    #[serde(default)]
    pub service_regions: Vec<String>,
    #[serde(default)]
    pub pricing_info: Vec<PricingInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuCategory {
    #[serde(default)]
    pub resource_family: String,
    #[serde(default)]
    pub resource_group: String,
    #[serde(default)]
    pub usage_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingInfo {
    pub pricing_expression: PricingExpression,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingExpression {
    #[serde(default)]
    pub usage_unit: String,
    #[serde(default)]
    pub tiered_rates: Vec<TieredRate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TieredRate {
    pub unit_price: Money,
}

/// Google `Money`: whole `units` plus `nanos` (10^-9 of a unit).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    #[serde(default)]
    pub currency_code: String,
    #[serde(default, deserialize_with = "de_int64")]
    pub units: i64,
    #[serde(default)]
    pub nanos: i32,
}

/// The REST API encodes int64 as a decimal string; accept either form.
fn de_int64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Int64 {
        Num(i64),
        Str(String),
    }

    match Int64::deserialize(deserializer)? {
        Int64::Num(n) => Ok(n),
        Int64::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl SkuRecord {
    pub fn resource_family(&self) -> &str {
        &self.category.resource_family
    }

    pub fn resource_group(&self) -> &str {
        &self.category.resource_group
    }

    pub fn usage_type(&self) -> Option<UsageType> {
        UsageType::from_catalog(&self.category.usage_type)
    }
}

// ── index vocabulary ──────────────────────────────────────────────────────────

/// Billing mode of a SKU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UsageType {
    OnDemand,
    Preemptible,
    Commit1Yr,
    Commit3Yr,
}

impl UsageType {
    pub const ALL: [UsageType; 4] = [
        UsageType::OnDemand,
        UsageType::Preemptible,
        UsageType::Commit1Yr,
        UsageType::Commit3Yr,
    ];

    pub fn from_catalog(s: &str) -> Option<Self> {
        match s {
            "OnDemand" => Some(UsageType::OnDemand),
            "Preemptible" => Some(UsageType::Preemptible),
            "Commit1Yr" => Some(UsageType::Commit1Yr),
            "Commit3Yr" => Some(UsageType::Commit3Yr),
            _ => None,
        }
    }
}

impl std::fmt::Display for UsageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UsageType::OnDemand => write!(f, "OnDemand"),
            UsageType::Preemptible => write!(f, "Preemptible"),
            UsageType::Commit1Yr => write!(f, "Commit1Yr"),
            UsageType::Commit3Yr => write!(f, "Commit3Yr"),
        }
    }
}

/// Billed quantity dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResourceKind {
    Cpu,
    Ram,
    Gpu,
}

impl ResourceKind {
    pub fn from_group(group: &str) -> Option<Self> {
        match group {
            "CPU" => Some(ResourceKind::Cpu),
            "RAM" => Some(ResourceKind::Ram),
            "GPU" => Some(ResourceKind::Gpu),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Cpu => write!(f, "CPU"),
            ResourceKind::Ram => write!(f, "RAM"),
            ResourceKind::Gpu => write!(f, "GPU"),
        }
    }
}

/// The SKU that won a slot in the price index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub sku_id: String,
    pub description: String,
    pub unit_price_units: i64,
    pub unit_price_nanos: i32,
}

impl PriceRecord {
    /// Monthly cost of `factor` billed quantities at this rate.
    pub fn monthly_cost(&self, factor: f64) -> f64 {
        self.unit_price_units as f64 * factor * HOURS_PER_MONTH
            + self.unit_price_nanos as f64 * factor * HOURS_PER_MONTH / NANOS_PER_UNIT
    }
}

// ── inventory input ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineType {
    pub family: String,
    pub guest_cpus: u32,
    pub memory_mb: u64,
    #[serde(default)]
    pub zones: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceleratorType {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub zones: Vec<String>,
}

/// Machine and accelerator types keyed by region, then by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Inventory {
    #[serde(default)]
    pub machine_types: BTreeMap<String, BTreeMap<String, MachineType>>,
    #[serde(default)]
    pub accelerator_types: BTreeMap<String, BTreeMap<String, AcceleratorType>>,
}

impl Inventory {
    /// Every region named by either inventory map, sorted.
    pub fn regions(&self) -> Vec<&str> {
        let mut regions: Vec<&str> = self
            .machine_types
            .keys()
            .chain(self.accelerator_types.keys())
            .map(|r| r.as_str())
            .collect();
        regions.sort();
        regions.dedup();
        regions
    }

    /// Fold another inventory into this one; later entries win per name.
    pub fn merge(&mut self, other: Inventory) {
        for (region, types) in other.machine_types {
            self.machine_types.entry(region).or_default().extend(types);
        }
        for (region, types) in other.accelerator_types {
            self.accelerator_types.entry(region).or_default().extend(types);
        }
    }
}

/// A concrete thing to price.
#[derive(Debug, Clone, Copy)]
pub enum ResourceShape<'a> {
    Machine { name: &'a str, machine: &'a MachineType },
    Accelerator { name: &'a str, accelerator: &'a AcceleratorType },
}

// ── output ────────────────────────────────────────────────────────────────────

/// Price records consulted for one family, by usage type then kind.
pub type SkuSnapshot = BTreeMap<UsageType, BTreeMap<ResourceKind, PriceRecord>>;

/// Resolved monthly prices for one resource shape. `None` means unresolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceResult {
    pub cpu_on_demand: Option<f64>,
    pub cpu_spot: Option<f64>,
    pub cpu_commit_1yr: Option<f64>,
    pub cpu_commit_3yr: Option<f64>,
    pub memory_on_demand: Option<f64>,
    pub memory_spot: Option<f64>,
    pub memory_commit_1yr: Option<f64>,
    pub memory_commit_3yr: Option<f64>,
    pub gpu_on_demand: Option<f64>,
    pub gpu_spot: Option<f64>,
    pub gpu_commit_1yr: Option<f64>,
    pub gpu_commit_3yr: Option<f64>,
    pub total_on_demand: Option<f64>,
    pub total_spot: Option<f64>,
    pub total_commit_1yr: Option<f64>,
    pub total_commit_3yr: Option<f64>,
    pub discount_rate_spot: Option<f64>,
    pub discount_rate_commit_1yr: Option<f64>,
    pub discount_rate_commit_3yr: Option<f64>,
    pub sku: Option<SkuSnapshot>,
}

impl PriceResult {
    pub fn component(&self, kind: ResourceKind, usage: UsageType) -> Option<f64> {
        match (kind, usage) {
            (ResourceKind::Cpu, UsageType::OnDemand) => self.cpu_on_demand,
            (ResourceKind::Cpu, UsageType::Preemptible) => self.cpu_spot,
            (ResourceKind::Cpu, UsageType::Commit1Yr) => self.cpu_commit_1yr,
            (ResourceKind::Cpu, UsageType::Commit3Yr) => self.cpu_commit_3yr,
            (ResourceKind::Ram, UsageType::OnDemand) => self.memory_on_demand,
            (ResourceKind::Ram, UsageType::Preemptible) => self.memory_spot,
            (ResourceKind::Ram, UsageType::Commit1Yr) => self.memory_commit_1yr,
            (ResourceKind::Ram, UsageType::Commit3Yr) => self.memory_commit_3yr,
            (ResourceKind::Gpu, UsageType::OnDemand) => self.gpu_on_demand,
            (ResourceKind::Gpu, UsageType::Preemptible) => self.gpu_spot,
            (ResourceKind::Gpu, UsageType::Commit1Yr) => self.gpu_commit_1yr,
            (ResourceKind::Gpu, UsageType::Commit3Yr) => self.gpu_commit_3yr,
        }
    }

    pub(crate) fn component_mut(&mut self, kind: ResourceKind, usage: UsageType) -> &mut Option<f64> {
        match (kind, usage) {
            (ResourceKind::Cpu, UsageType::OnDemand) => &mut self.cpu_on_demand,
            (ResourceKind::Cpu, UsageType::Preemptible) => &mut self.cpu_spot,
            (ResourceKind::Cpu, UsageType::Commit1Yr) => &mut self.cpu_commit_1yr,
            (ResourceKind::Cpu, UsageType::Commit3Yr) => &mut self.cpu_commit_3yr,
            (ResourceKind::Ram, UsageType::OnDemand) => &mut self.memory_on_demand,
            (ResourceKind::Ram, UsageType::Preemptible) => &mut self.memory_spot,
            (ResourceKind::Ram, UsageType::Commit1Yr) => &mut self.memory_commit_1yr,
            (ResourceKind::Ram, UsageType::Commit3Yr) => &mut self.memory_commit_3yr,
            (ResourceKind::Gpu, UsageType::OnDemand) => &mut self.gpu_on_demand,
            (ResourceKind::Gpu, UsageType::Preemptible) => &mut self.gpu_spot,
            (ResourceKind::Gpu, UsageType::Commit1Yr) => &mut self.gpu_commit_1yr,
            (ResourceKind::Gpu, UsageType::Commit3Yr) => &mut self.gpu_commit_3yr,
        }
    }

    pub fn total(&self, usage: UsageType) -> Option<f64> {
        match usage {
            UsageType::OnDemand => self.total_on_demand,
            UsageType::Preemptible => self.total_spot,
            UsageType::Commit1Yr => self.total_commit_1yr,
            UsageType::Commit3Yr => self.total_commit_3yr,
        }
    }

    pub(crate) fn total_mut(&mut self, usage: UsageType) -> &mut Option<f64> {
        match usage {
            UsageType::OnDemand => &mut self.total_on_demand,
            UsageType::Preemptible => &mut self.total_spot,
            UsageType::Commit1Yr => &mut self.total_commit_1yr,
            UsageType::Commit3Yr => &mut self.total_commit_3yr,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Machine,
    Accelerator,
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShapeKind::Machine => write!(f, "machine"),
            ShapeKind::Accelerator => write!(f, "accelerator"),
        }
    }
}

/// One row of the pricing table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRow {
    pub region: String,
    pub kind: ShapeKind,
    pub name: String,
    pub family: String,
    pub zones: Vec<String>,
    pub guest_cpus: Option<u32>,
    pub memory_mb: Option<u64>,
    pub description: Option<String>,
    #[serde(flatten)]
    pub price: PriceResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTable {
    pub prices: Vec<PricingRow>,
    /// Milliseconds since the Unix epoch.
    pub generated_at: i64,
}

impl PricingTable {
    pub fn generated_at_utc(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.generated_at)
    }
}
