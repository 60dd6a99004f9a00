/// Machine and accelerator inventory.
/// Accepts the normalized document (`{"machine_types": ..., "accelerator_types": ...}`)
/// or Compute API `aggregatedList` responses keyed by `zones/<zone>`.
use anyhow::{Context, Result};
use gceprice_core::{AcceleratorType, Inventory, MachineType};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

const RETIRED_STATES: [&str; 3] = ["DEPRECATED", "OBSOLETE", "DELETED"];

#[derive(Deserialize)]
struct AggregatedList {
    #[serde(default)]
    items: BTreeMap<String, ScopedList>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScopedList {
    #[serde(default)]
    machine_types: Vec<RawMachineType>,
    #[serde(default)]
    accelerator_types: Vec<RawAcceleratorType>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMachineType {
    name: String,
    guest_cpus: u32,
    memory_mb: u64,
    #[serde(default)]
    zone: String,
    #[serde(default)]
    deprecated: Option<Deprecation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAcceleratorType {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    zone: String,
    #[serde(default)]
    deprecated: Option<Deprecation>,
}

#[derive(Deserialize)]
struct Deprecation {
    #[serde(default)]
    state: String,
}

fn is_retired(deprecated: &Option<Deprecation>) -> bool {
    deprecated
        .as_ref()
        .map(|d| RETIRED_STATES.contains(&d.state.as_str()))
        .unwrap_or(false)
}

/// Load and merge one or more inventory files.
pub fn load_inventory<P: AsRef<Path>>(paths: &[P]) -> Result<Inventory> {
    let mut inventory = Inventory::default();
    for path in paths {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let part = parse_inventory(&content)
            .with_context(|| format!("parsing inventory {}", path.display()))?;
        inventory.merge(part);
    }
    info!(
        regions = inventory.regions().len(),
        machine_types = inventory.machine_types.values().map(|m| m.len()).sum::<usize>(),
        accelerator_types = inventory.accelerator_types.values().map(|a| a.len()).sum::<usize>(),
        "loaded inventory"
    );
    Ok(inventory)
}

/// An `aggregatedList` response is recognised by its `items` map or its
/// `kind`; anything else must be a normalized document with no extra keys.
fn parse_inventory(content: &str) -> Result<Inventory> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    let aggregated = value.get("items").is_some()
        || value
            .get("kind")
            .and_then(|k| k.as_str())
            .is_some_and(|k| k.ends_with("AggregatedList"));
    if aggregated {
        let list: AggregatedList = serde_json::from_value(value).context("invalid aggregatedList response")?;
        Ok(collapse_aggregated(list))
    } else {
        serde_json::from_value(value).context("invalid normalized inventory")
    }
}

/// Fold per-zone listings into per-region entries with a sorted zone list.
fn collapse_aggregated(list: AggregatedList) -> Inventory {
    let mut inventory = Inventory::default();

    for (scope, scoped) in list.items {
        for mt in scoped.machine_types {
            if is_retired(&mt.deprecated) {
                debug!(name = %mt.name, "skipping retired machine type");
                continue;
            }
            let Some((zone, region)) = zone_and_region(&mt.zone, &scope) else {
                continue;
            };
            let family = mt.name.split('-').next().unwrap_or(&mt.name).to_string();
            inventory
                .machine_types
                .entry(region)
                .or_default()
                .entry(mt.name)
                .or_insert_with(|| MachineType {
                    family,
                    guest_cpus: mt.guest_cpus,
                    memory_mb: mt.memory_mb,
                    zones: Vec::new(),
                })
                .zones
                .push(zone);
        }

        for at in scoped.accelerator_types {
            if is_retired(&at.deprecated) {
                debug!(name = %at.name, "skipping retired accelerator type");
                continue;
            }
            let Some((zone, region)) = zone_and_region(&at.zone, &scope) else {
                continue;
            };
            inventory
                .accelerator_types
                .entry(region)
                .or_default()
                .entry(at.name)
                .or_insert_with(|| AcceleratorType {
                    description: at.description,
                    zones: Vec::new(),
                })
                .zones
                .push(zone);
        }
    }

    for zones in inventory
        .machine_types
        .values_mut()
        .flat_map(|m| m.values_mut().map(|t| &mut t.zones))
        .chain(
            inventory
                .accelerator_types
                .values_mut()
                .flat_map(|a| a.values_mut().map(|t| &mut t.zones)),
        )
    {
        zones.sort();
        zones.dedup();
    }

    inventory
}

/// Zone name and its region. `zone` may be a full resource URL; the
/// aggregated-list scope (`zones/<zone>`) is used when it is empty.
pub fn zone_and_region(zone: &str, scope: &str) -> Option<(String, String)> {
    let source = if zone.is_empty() { scope } else { zone };
    let zone = source.rsplit('/').next().filter(|z| !z.is_empty())?;
    let (region, _) = zone.rsplit_once('-')?;
    Some((zone.to_string(), region.to_string()))
}
