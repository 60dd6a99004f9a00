use std::collections::BTreeSet;

use chrono::Utc;
use tracing::debug;

use crate::index::PriceIndex;
use crate::resolve::{accelerator_family, resolve};
use crate::schema::*;

/// Regions that show up in the inventory or catalog but are not offered publicly.
pub const DEFAULT_EXCLUDED_REGIONS: [&str; 2] = ["us-central2", "us-east7"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    pub excluded_regions: BTreeSet<String>,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self::with_excluded_regions(DEFAULT_EXCLUDED_REGIONS)
    }
}

impl TableOptions {
    pub fn with_excluded_regions<I, S>(regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded_regions: regions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_excluded(&self, region: &str) -> bool {
        self.excluded_regions.contains(region)
    }
}

/// Price every machine and accelerator type in the inventory.
pub fn generate_pricing_table(inventory: &Inventory, index: &PriceIndex, options: &TableOptions) -> PricingTable {
    PricingTable {
        prices: pricing_rows(inventory, index, options),
        generated_at: Utc::now().timestamp_millis(),
    }
}

/// Rows ordered by region, machine types before accelerator types, then by name.
pub fn pricing_rows(inventory: &Inventory, index: &PriceIndex, options: &TableOptions) -> Vec<PricingRow> {
    let mut rows = Vec::new();

    for region in inventory.regions() {
        if options.is_excluded(region) {
            debug!(region, "skipping excluded region");
            continue;
        }

        for (name, machine) in inventory.machine_types.get(region).into_iter().flatten() {
            rows.push(PricingRow {
                region: region.to_string(),
                kind: ShapeKind::Machine,
                name: name.clone(),
                family: machine.family.to_uppercase(),
                zones: machine.zones.clone(),
                guest_cpus: Some(machine.guest_cpus),
                memory_mb: Some(machine.memory_mb),
                description: None,
                price: resolve(index, region, ResourceShape::Machine { name, machine }),
            });
        }

        for (name, accelerator) in inventory.accelerator_types.get(region).into_iter().flatten() {
            rows.push(PricingRow {
                region: region.to_string(),
                kind: ShapeKind::Accelerator,
                name: name.clone(),
                family: accelerator_family(name).map_or_else(|| name.clone(), str::to_string),
                zones: accelerator.zones.clone(),
                guest_cpus: None,
                memory_mb: None,
                description: Some(accelerator.description.clone()),
                price: resolve(index, region, ResourceShape::Accelerator { name, accelerator }),
            });
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{accelerator, machine, sku};
    use crate::index::build_index;

    fn inventory() -> Inventory {
        let mut inv = Inventory::default();
        for region in ["us-central1", "us-central2", "asia-northeast1"] {
            let machines = inv.machine_types.entry(region.to_string()).or_default();
            machines.insert("e2-standard-2".to_string(), machine("e2", 2, 8_192));
            machines.insert("n1-standard-1".to_string(), machine("n1", 1, 3_840));
        }
        inv.accelerator_types
            .entry("us-central1".to_string())
            .or_default()
            .insert("nvidia-tesla-t4".to_string(), accelerator("NVIDIA T4"));
        inv
    }

    fn index() -> PriceIndex {
        build_index(&[
            sku("e2c", "E2 Instance Core running in Americas", "CPU", "OnDemand", 21_811_590)
                .regions(&["us-central1", "us-central2"])
                .build(),
            sku("t4", "Nvidia Tesla T4 GPU running in Americas", "GPU", "OnDemand", 350_000_000).build(),
        ])
        .unwrap()
    }

    #[test]
    fn rows_follow_inventory_order_and_skip_excluded_regions() {
        let rows = pricing_rows(&inventory(), &index(), &TableOptions::default());
        let keys: Vec<(&str, &str)> = rows.iter().map(|r| (r.region.as_str(), r.name.as_str())).collect();
        assert_eq!(
            keys,
            vec![
                ("asia-northeast1", "e2-standard-2"),
                ("asia-northeast1", "n1-standard-1"),
                ("us-central1", "e2-standard-2"),
                ("us-central1", "n1-standard-1"),
                ("us-central1", "nvidia-tesla-t4"),
            ]
        );
    }

    #[test]
    fn misses_still_produce_rows() {
        let rows = pricing_rows(&inventory(), &index(), &TableOptions::default());

        let tokyo = &rows[0];
        assert_eq!(tokyo.family, "E2");
        assert_eq!(tokyo.price, PriceResult::default());

        let n1 = &rows[3];
        assert_eq!(n1.kind, ShapeKind::Machine);
        assert_eq!(n1.guest_cpus, Some(1));
        assert!(n1.price.total_on_demand.is_none());

        let e2 = &rows[2];
        assert!(e2.price.cpu_on_demand.is_some());
        assert_eq!(e2.zones, vec!["us-central1-a", "us-central1-b"]);

        let t4 = &rows[4];
        assert_eq!(t4.kind, ShapeKind::Accelerator);
        assert_eq!(t4.family, "Tesla T4");
        assert_eq!(t4.description.as_deref(), Some("NVIDIA T4"));
        assert!((t4.price.gpu_on_demand.unwrap() - 255.5).abs() < 1e-6);
    }

    #[test]
    fn custom_exclusions_replace_defaults() {
        let options = TableOptions::with_excluded_regions(["us-central1"]);
        let rows = pricing_rows(&inventory(), &index(), &options);
        assert!(rows.iter().all(|r| r.region != "us-central1"));
        assert!(rows.iter().any(|r| r.region == "us-central2"));
    }

    #[test]
    fn table_is_stamped_and_serializes_flat() {
        let table = generate_pricing_table(&inventory(), &index(), &TableOptions::default());
        assert!(table.generated_at > 0);
        assert!(table.generated_at_utc().is_some());

        let json = serde_json::to_value(&table).unwrap();
        let row = &json["prices"][2];
        assert_eq!(row["name"], "e2-standard-2");
        assert_eq!(row["kind"], "machine");
        assert!(row["total_on_demand"].is_f64());
        assert!(row["discount_rate_spot"].is_null());
        assert_eq!(row["sku"]["OnDemand"]["CPU"]["sku_id"], "e2c");

        let back: PricingTable = serde_json::from_value(json).unwrap();
        assert_eq!(back, table);
    }
}
