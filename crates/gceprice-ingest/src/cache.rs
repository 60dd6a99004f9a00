//! Flat-file caches: the price index between `index` and `table` runs, and the
//! published pricing table.

use anyhow::{Context, Result};
use gceprice_core::{PriceIndex, PricingTable};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

pub fn read_index(path: &Path) -> Result<PriceIndex> {
    read_json(path)
}

pub fn write_index(path: &Path, index: &PriceIndex) -> Result<()> {
    write_json(path, index, false)
}

pub fn read_table(path: &Path) -> Result<PricingTable> {
    read_json(path)
}

pub fn write_table(path: &Path, table: &PricingTable) -> Result<()> {
    write_json(path, table, true)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let content = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))
}
