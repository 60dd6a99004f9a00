use anyhow::Result;
use gceprice_core::*;
use std::collections::BTreeMap;

pub fn render_table(table: &PricingTable) -> Result<String> {
    Ok(serde_json::to_string_pretty(table)?)
}

pub fn render_rows(rows: &[&PricingRow]) -> Result<String> {
    Ok(serde_json::to_string_pretty(rows)?)
}

/// Row counts and on-demand price coverage per region.
pub fn render_summary(table: &PricingTable) -> Result<String> {
    let mut regions: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for row in &table.prices {
        let entry = regions.entry(row.region.as_str()).or_default();
        entry.0 += 1;
        if row.price.total_on_demand.is_some() {
            entry.1 += 1;
        }
    }

    let per_region: BTreeMap<&str, serde_json::Value> = regions
        .into_iter()
        .map(|(region, (rows, priced))| (region, serde_json::json!({ "rows": rows, "priced": priced })))
        .collect();

    let summary = serde_json::json!({
        "generated_at": table.generated_at,
        "rows": table.prices.len(),
        "priced": table.prices.iter().filter(|r| r.price.total_on_demand.is_some()).count(),
        "regions": per_region,
    });

    Ok(serde_json::to_string_pretty(&summary)?)
}
