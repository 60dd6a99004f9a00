//! Catalog builders shared by the unit tests.

use crate::schema::*;

#[derive(Debug, Clone)]
pub struct SkuBuilder {
    sku_id: String,
    description: String,
    resource_family: String,
    resource_group: String,
    usage_type: String,
    regions: Vec<String>,
    units: i64,
    nanos: i32,
    currency: String,
    unit: String,
    tiers: usize,
    rates: usize,
}

/// A single-tier USD compute SKU in `us-central1`.
pub fn sku(sku_id: &str, description: &str, group: &str, usage_type: &str, nanos: i32) -> SkuBuilder {
    let unit = if group == "RAM" { "GiBy.h" } else { "h" };
    SkuBuilder {
        sku_id: sku_id.to_string(),
        description: description.to_string(),
        resource_family: "Compute".to_string(),
        resource_group: group.to_string(),
        usage_type: usage_type.to_string(),
        regions: vec!["us-central1".to_string()],
        units: 0,
        nanos,
        currency: "USD".to_string(),
        unit: unit.to_string(),
        tiers: 1,
        rates: 1,
    }
}

impl SkuBuilder {
    pub fn regions(mut self, regions: &[&str]) -> Self {
        self.regions = regions.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn family(mut self, family: &str) -> Self {
        self.resource_family = family.to_string();
        self
    }

    pub fn units(mut self, units: i64) -> Self {
        self.units = units;
        self
    }

    pub fn currency(mut self, currency: &str) -> Self {
        self.currency = currency.to_string();
        self
    }

    pub fn unit(mut self, unit: &str) -> Self {
        self.unit = unit.to_string();
        self
    }

    pub fn tiers(mut self, tiers: usize) -> Self {
        self.tiers = tiers;
        self
    }

    pub fn rates(mut self, rates: usize) -> Self {
        self.rates = rates;
        self
    }

    pub fn build(self) -> SkuRecord {
        let rate = TieredRate {
            unit_price: Money {
                currency_code: self.currency,
                units: self.units,
                nanos: self.nanos,
            },
        };
        let info = PricingInfo {
            pricing_expression: PricingExpression {
                usage_unit: self.unit,
                tiered_rates: vec![rate; self.rates],
            },
        };
        SkuRecord {
            sku_id: self.sku_id,
            description: self.description,
            category: SkuCategory {
                resource_family: self.resource_family,
                resource_group: self.resource_group,
                usage_type: self.usage_type,
            },
            service_regions: self.regions,
            pricing_info: vec![info; self.tiers],
        }
    }
}

pub fn machine(family: &str, guest_cpus: u32, memory_mb: u64) -> MachineType {
    MachineType {
        family: family.to_string(),
        guest_cpus,
        memory_mb,
        zones: vec!["us-central1-a".to_string(), "us-central1-b".to_string()],
    }
}

pub fn accelerator(description: &str) -> AcceleratorType {
    AcceleratorType {
        description: description.to_string(),
        zones: vec!["us-central1-a".to_string()],
    }
}
