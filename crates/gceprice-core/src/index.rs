use std::collections::btree_map::{self, Entry};
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::classify::{classify, FLAGSHIP_ACCELERATOR};
use crate::error::CatalogError;
use crate::schema::*;

/// Resource groups that carry machine or accelerator rates.
pub const ACCEPTED_GROUPS: [&str; 6] = ["CPU", "RAM", "GPU", "F1Micro", "G1Small", "N1Standard"];

/// Shared-core and predefined N1 groups, whose CPU/RAM split lives in the description.
const LEGACY_GROUPS: [&str; 3] = ["F1Micro", "G1Small", "N1Standard"];

/// Descriptions containing any of these are not general-purpose VM rates.
pub const EXCLUDED_MARKERS: [&str; 4] = ["Sole Tenancy", "Reserved", "Premium", "DWS"];

pub const ACCEPTED_USAGE_UNITS: [&str; 3] = ["h", "GiBy.h", "GBy.h"];

pub const ACCEPTED_CURRENCY: &str = "USD";

const CUSTOM_MARKER: &str = "Custom";

/// Composite key of one price slot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexKey {
    pub region: String,
    pub family: String,
    pub usage_type: UsageType,
    pub kind: ResourceKind,
}

/// `region → family → usage type → kind → record`, the shape of the on-disk cache.
pub type NestedIndex =
    BTreeMap<String, BTreeMap<String, BTreeMap<UsageType, BTreeMap<ResourceKind, PriceRecord>>>>;

/// Normalized price catalog. Built once by [`IndexBuilder`], read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "NestedIndex", into = "NestedIndex")]
pub struct PriceIndex {
    entries: BTreeMap<IndexKey, PriceRecord>,
}

impl PriceIndex {
    pub fn get(
        &self,
        region: &str,
        family: &str,
        usage_type: UsageType,
        kind: ResourceKind,
    ) -> Option<&PriceRecord> {
        self.entries.get(&IndexKey {
            region: region.to_string(),
            family: family.to_string(),
            usage_type,
            kind,
        })
    }

    /// All slots of one family in one region, in usage type then kind order.
    pub fn family(&self, region: &str, family: &str) -> btree_map::Range<'_, IndexKey, PriceRecord> {
        let key = |usage_type, kind| IndexKey {
            region: region.to_string(),
            family: family.to_string(),
            usage_type,
            kind,
        };
        self.entries
            .range(key(UsageType::OnDemand, ResourceKind::Cpu)..=key(UsageType::Commit3Yr, ResourceKind::Gpu))
    }

    pub fn has_family(&self, region: &str, family: &str) -> bool {
        self.family(region, family).next().is_some()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, IndexKey, PriceRecord> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn regions(&self) -> Vec<&str> {
        let mut regions: Vec<&str> = self.entries.keys().map(|k| k.region.as_str()).collect();
        regions.dedup();
        regions
    }
}

impl From<NestedIndex> for PriceIndex {
    fn from(nested: NestedIndex) -> Self {
        let mut entries = BTreeMap::new();
        for (region, families) in nested {
            for (family, usages) in families {
                for (usage_type, kinds) in usages {
                    for (kind, record) in kinds {
                        let key = IndexKey {
                            region: region.clone(),
                            family: family.clone(),
                            usage_type,
                            kind,
                        };
                        entries.insert(key, record);
                    }
                }
            }
        }
        PriceIndex { entries }
    }
}

impl From<PriceIndex> for NestedIndex {
    fn from(index: PriceIndex) -> Self {
        let mut nested = NestedIndex::new();
        for (key, record) in index.entries {
            nested
                .entry(key.region)
                .or_default()
                .entry(key.family)
                .or_default()
                .entry(key.usage_type)
                .or_default()
                .insert(key.kind, record);
        }
        nested
    }
}

/// Counters reported after a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub skus_seen: usize,
    pub filtered: usize,
    pub unclassified: usize,
    pub inserted: usize,
    pub collisions: usize,
    pub replaced: usize,
}

/// Folds catalog SKUs into a [`PriceIndex`]. Input order decides collisions.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    index: PriceIndex,
    stats: BuildStats,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, sku: &SkuRecord) -> Result<(), CatalogError> {
        self.stats.skus_seen += 1;

        let Some((usage_type, kind)) = relevance(sku) else {
            self.stats.filtered += 1;
            return Ok(());
        };

        let price = unit_price(sku)?;

        let Some(family) = classify(sku.resource_group(), &sku.description) else {
            warn!(sku_id = %sku.sku_id, description = %sku.description, "machine family not found");
            self.stats.unclassified += 1;
            return Ok(());
        };

        let record = PriceRecord {
            sku_id: sku.sku_id.clone(),
            description: sku.description.clone(),
            unit_price_units: price.units,
            unit_price_nanos: price.nanos,
        };

        for region in &sku.service_regions {
            let key = IndexKey {
                region: region.clone(),
                family: family.clone(),
                usage_type,
                kind,
            };
            self.insert(key, record.clone());
        }
        Ok(())
    }

    fn insert(&mut self, key: IndexKey, record: PriceRecord) {
        match self.index.entries.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(record);
                self.stats.inserted += 1;
            }
            Entry::Occupied(mut slot) => {
                self.stats.collisions += 1;
                let existing_custom = slot.get().description.contains(CUSTOM_MARKER);
                let incoming_custom = record.description.contains(CUSTOM_MARKER);
                let k = slot.key();
                // Custom-instance SKUs are shared by several families; a
                // family's own rate always wins over them.
                if existing_custom && !incoming_custom {
                    warn!(
                        region = %k.region, family = %k.family, usage_type = %k.usage_type, kind = %k.kind,
                        replaced = %slot.get().sku_id, sku_id = %record.sku_id,
                        "preferring non-custom instance price"
                    );
                    slot.insert(record);
                    self.stats.replaced += 1;
                } else {
                    warn!(
                        region = %k.region, family = %k.family, usage_type = %k.usage_type, kind = %k.kind,
                        kept = %slot.get().sku_id, sku_id = %record.sku_id,
                        "duplicate key"
                    );
                }
            }
        }
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    pub fn finish(self) -> (PriceIndex, BuildStats) {
        (self.index, self.stats)
    }
}

/// Build an index from a full catalog. Fails on the first malformed relevant SKU.
pub fn build_index<'a>(skus: impl IntoIterator<Item = &'a SkuRecord>) -> Result<PriceIndex, CatalogError> {
    build_index_with_stats(skus).map(|(index, _)| index)
}

pub fn build_index_with_stats<'a>(
    skus: impl IntoIterator<Item = &'a SkuRecord>,
) -> Result<(PriceIndex, BuildStats), CatalogError> {
    let mut builder = IndexBuilder::new();
    for sku in skus {
        builder.add(sku)?;
    }
    Ok(builder.finish())
}

/// Usage type and billed kind of a SKU worth indexing, `None` if it is filtered out.
fn relevance(sku: &SkuRecord) -> Option<(UsageType, ResourceKind)> {
    if sku.resource_family() != "Compute" {
        return None;
    }
    let group = sku.resource_group();
    if !ACCEPTED_GROUPS.contains(&group) {
        return None;
    }
    let usage_type = sku.usage_type()?;
    if is_excluded(&sku.description) {
        return None;
    }

    let kind = if LEGACY_GROUPS.contains(&group) {
        if sku.description.contains("Core") || sku.description.contains("CPU") {
            ResourceKind::Cpu
        } else {
            ResourceKind::Ram
        }
    } else {
        ResourceKind::from_group(group)?
    };
    Some((usage_type, kind))
}

fn is_excluded(description: &str) -> bool {
    EXCLUDED_MARKERS.iter().any(|marker| {
        description.contains(marker)
            && !(*marker == "DWS" && description.contains(FLAGSHIP_ACCELERATOR))
    })
}

/// The single USD rate of a SKU; anything else means the catalog contract changed.
fn unit_price(sku: &SkuRecord) -> Result<&Money, CatalogError> {
    let [info] = sku.pricing_info.as_slice() else {
        return Err(CatalogError::PricingTiers {
            sku_id: sku.sku_id.clone(),
            count: sku.pricing_info.len(),
        });
    };
    let expr = &info.pricing_expression;
    let [rate] = expr.tiered_rates.as_slice() else {
        return Err(CatalogError::TieredRates {
            sku_id: sku.sku_id.clone(),
            count: expr.tiered_rates.len(),
        });
    };
    if !ACCEPTED_USAGE_UNITS.contains(&expr.usage_unit.as_str()) {
        return Err(CatalogError::UsageUnit {
            sku_id: sku.sku_id.clone(),
            unit: expr.usage_unit.clone(),
        });
    }
    if rate.unit_price.currency_code != ACCEPTED_CURRENCY {
        return Err(CatalogError::Currency {
            sku_id: sku.sku_id.clone(),
            currency: rate.unit_price.currency_code.clone(),
        });
    }
    Ok(&rate.unit_price)
}
