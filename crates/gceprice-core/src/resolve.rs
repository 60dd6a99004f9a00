use tracing::warn;

use crate::classify::FLAGSHIP_ACCELERATOR;
use crate::index::PriceIndex;
use crate::schema::*;

/// Compute API accelerator type name → family token used in SKU descriptions.
const ACCELERATOR_FAMILIES: &[(&str, &str)] = &[
    ("nvidia-tesla-k80", "Tesla K80"),
    ("nvidia-tesla-p4", "Tesla P4"),
    ("nvidia-tesla-p4-vws", "Tesla P4 Virtual Workstation"),
    ("nvidia-tesla-p100", "Tesla P100"),
    ("nvidia-tesla-p100-vws", "Tesla P100 Virtual Workstation"),
    ("nvidia-tesla-v100", "Tesla V100"),
    ("nvidia-tesla-t4", "Tesla T4"),
    ("nvidia-tesla-t4-vws", "Tesla T4 Virtual Workstation"),
    ("nvidia-tesla-a100", "Tesla A100"),
    ("nvidia-a100-80gb", "A100 80GB"),
    ("nvidia-l4", "L4"),
    ("nvidia-l4-vws", "L4 Virtual Workstation"),
    ("nvidia-h100-80gb", "H100 80GB"),
    ("nvidia-h100-mega-80gb", FLAGSHIP_ACCELERATOR),
    ("nvidia-h200-141gb", "H200 141GB"),
];

/// Pricing family of an accelerator type, `None` if it is not in the table.
pub fn accelerator_family(accelerator: &str) -> Option<&'static str> {
    ACCELERATOR_FAMILIES
        .iter()
        .find(|(name, _)| *name == accelerator)
        .map(|(_, family)| *family)
}

/// Pricing family of a machine type family. M2 has no SKUs of its own and bills as M1.
pub fn machine_family(family: &str) -> String {
    let family = family.to_uppercase();
    if family == "M2" {
        "M1".to_string()
    } else {
        family
    }
}

/// Price one resource shape in one region.
///
/// Misses (unknown family, unmapped accelerator) are logged and leave every
/// field unresolved; they never fail.
pub fn resolve(index: &PriceIndex, region: &str, shape: ResourceShape<'_>) -> PriceResult {
    match shape {
        ResourceShape::Machine { name, machine } => {
            let family = machine_family(&machine.family);
            let factors = [
                (ResourceKind::Cpu, machine.guest_cpus as f64),
                (ResourceKind::Ram, machine.memory_mb as f64 / 1024.0),
            ];
            resolve_family(index, region, name, &family, &factors)
        }
        ResourceShape::Accelerator { name, .. } => match accelerator_family(name) {
            Some(family) => resolve_family(index, region, name, family, &[(ResourceKind::Gpu, 1.0)]),
            None => {
                warn!(region, accelerator = name, "accelerator type has no pricing family");
                PriceResult::default()
            }
        },
    }
}

fn resolve_family(
    index: &PriceIndex,
    region: &str,
    name: &str,
    family: &str,
    factors: &[(ResourceKind, f64)],
) -> PriceResult {
    let mut result = PriceResult::default();
    if !index.has_family(region, family) {
        warn!(region, name, family, "family not found in pricing data");
        return result;
    }

    let mut snapshot = SkuSnapshot::new();
    for usage in UsageType::ALL {
        for &(kind, factor) in factors {
            let Some(record) = index.get(region, family, usage, kind) else {
                continue;
            };
            let cost = record.monthly_cost(factor);
            *result.component_mut(kind, usage) = Some(cost);
            let total = result.total_mut(usage);
            *total = Some(total.unwrap_or(0.0) + cost);
            snapshot.entry(usage).or_default().insert(kind, record.clone());
        }
    }

    result.discount_rate_spot = discount_rate(result.total_on_demand, result.total_spot);
    result.discount_rate_commit_1yr = discount_rate(result.total_on_demand, result.total_commit_1yr);
    result.discount_rate_commit_3yr = discount_rate(result.total_on_demand, result.total_commit_3yr);
    if !snapshot.is_empty() {
        result.sku = Some(snapshot);
    }
    result
}

/// Percentage saved against on-demand; unresolved unless on-demand is positive.
pub fn discount_rate(on_demand: Option<f64>, alternative: Option<f64>) -> Option<f64> {
    match (on_demand, alternative) {
        (Some(od), Some(alt)) if od > 0.0 => Some((od - alt) / od * 100.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{accelerator, machine, sku};
    use crate::index::build_index;

    fn approx(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("resolved value");
        assert!((actual - expected).abs() < 0.05, "{actual} != {expected}");
    }

    fn n1_index() -> PriceIndex {
        build_index(&[
            sku("c-od", "N1 Predefined Instance Core running in Americas", "N1Standard", "OnDemand", 31_611_000).build(),
            sku("r-od", "N1 Predefined Instance Ram running in Americas", "N1Standard", "OnDemand", 4_237_000).build(),
            sku("c-sp", "Spot Preemptible N1 Predefined Instance Core running in Americas", "N1Standard", "Preemptible", 6_655_000)
                .build(),
            sku("r-sp", "Spot Preemptible N1 Predefined Instance Ram running in Americas", "N1Standard", "Preemptible", 892_000)
                .build(),
            sku("c-1y", "Commitment v1: Cpu in Americas for 1 Year", "CPU", "Commit1Yr", 19_915_000).build(),
            sku("r-1y", "Commitment v1: Ram in Americas for 1 Year", "RAM", "Commit1Yr", 2_669_000).build(),
        ])
        .unwrap()
    }

    fn price_machine(index: &PriceIndex, family: &str, cpus: u32, mem: u64) -> PriceResult {
        let m = machine(family, cpus, mem);
        resolve(index, "us-central1", ResourceShape::Machine { name: "n1-standard-8", machine: &m })
    }

    #[test]
    fn n1_standard_8_monthly_costs() {
        let result = price_machine(&n1_index(), "n1", 8, 32_768);
        approx(result.cpu_on_demand, 184.6);
        approx(result.memory_on_demand, 99.0);
        approx(result.total_on_demand, 283.6);
        assert!(result.gpu_on_demand.is_none());
        assert!(result.total_commit_3yr.is_none());
        assert!(result.discount_rate_commit_3yr.is_none());

        let spot = result.total_spot.unwrap();
        let expected = (result.total_on_demand.unwrap() - spot) / result.total_on_demand.unwrap() * 100.0;
        approx(result.discount_rate_spot, expected);
        approx(result.discount_rate_commit_1yr, 37.0);

        let snapshot = result.sku.unwrap();
        assert_eq!(snapshot[&UsageType::OnDemand][&ResourceKind::Cpu].sku_id, "c-od");
        assert_eq!(snapshot[&UsageType::Commit1Yr][&ResourceKind::Ram].sku_id, "r-1y");
    }

    #[test]
    fn whole_units_are_priced() {
        let index = build_index(&[
            sku("g", "Nvidia Tesla V100 GPU running in Americas", "GPU", "OnDemand", 480_000_000).units(2).build(),
        ])
        .unwrap();
        let acc = accelerator("NVIDIA V100");
        let result = resolve(
            &index,
            "us-central1",
            ResourceShape::Accelerator { name: "nvidia-tesla-v100", accelerator: &acc },
        );
        approx(result.gpu_on_demand, 2.48 * 730.0);
        approx(result.total_on_demand, 2.48 * 730.0);
        assert!(result.cpu_on_demand.is_none());
        assert!(result.memory_on_demand.is_none());
    }

    #[test]
    fn m2_bills_as_m1() {
        let index = build_index(&[
            sku("c", "Memory-optimized Instance Core running in Americas", "CPU", "OnDemand", 34_800_000).build(),
            sku("r", "Memory-optimized Instance Ram running in Americas", "RAM", "OnDemand", 5_100_000).build(),
        ])
        .unwrap();
        let m1 = price_machine(&index, "m1", 40, 983_040);
        let m2 = price_machine(&index, "m2", 40, 983_040);
        assert!(m1.total_on_demand.is_some());
        assert_eq!(m1, m2);
    }

    #[test]
    fn missing_kind_contributes_nothing() {
        let index = build_index(&[
            sku("c", "E2 Instance Core running in Americas", "CPU", "OnDemand", 21_811_590).build(),
            sku("r", "Spot Preemptible E2 Instance Ram running in Americas", "RAM", "Preemptible", 1_000_000).build(),
        ])
        .unwrap();
        let result = price_machine(&index, "e2", 2, 8_192);
        assert_eq!(result.total_on_demand, result.cpu_on_demand);
        assert!(result.memory_on_demand.is_none());
        assert_eq!(result.total_spot, result.memory_spot);
        approx(result.memory_spot, 0.001 * 8.0 * 730.0);
    }

    #[test]
    fn discount_needs_positive_on_demand() {
        assert_eq!(discount_rate(Some(0.0), Some(5.0)), None);
        assert_eq!(discount_rate(None, Some(5.0)), None);
        assert_eq!(discount_rate(Some(10.0), None), None);
        assert_eq!(discount_rate(Some(10.0), Some(4.0)), Some(60.0));

        let index = build_index(&[
            sku("c", "E2 Instance Core running in Americas", "CPU", "OnDemand", 0).build(),
            sku("s", "Spot Preemptible E2 Instance Core running in Americas", "CPU", "Preemptible", 5_000_000).build(),
        ])
        .unwrap();
        let result = price_machine(&index, "e2", 4, 16_384);
        assert_eq!(result.total_on_demand, Some(0.0));
        assert!(result.total_spot.unwrap() > 0.0);
        assert_eq!(result.discount_rate_spot, None);
    }

    #[test]
    fn unknown_family_leaves_everything_unresolved() {
        let result = price_machine(&n1_index(), "c4", 8, 32_768);
        assert_eq!(result, PriceResult::default());

        let result = resolve(
            &n1_index(),
            "europe-west1",
            ResourceShape::Machine { name: "n1-standard-8", machine: &machine("n1", 8, 32_768) },
        );
        assert_eq!(result, PriceResult::default());
    }

    #[test]
    fn accelerators_use_only_gpu_rates() {
        let index = build_index(&[
            sku("t4", "Nvidia Tesla T4 GPU running in Americas", "GPU", "OnDemand", 350_000_000).build(),
            sku("t4s", "Nvidia Tesla T4 GPU attached to Spot Preemptible VMs running in Americas", "GPU", "Preemptible", 140_000_000)
                .build(),
        ])
        .unwrap();
        let acc = accelerator("NVIDIA T4");
        let result = resolve(
            &index,
            "us-central1",
            ResourceShape::Accelerator { name: "nvidia-tesla-t4", accelerator: &acc },
        );
        approx(result.gpu_on_demand, 255.5);
        approx(result.gpu_spot, 102.2);
        approx(result.discount_rate_spot, 60.0);
        assert!(result.cpu_on_demand.is_none());

        let unmapped = resolve(
            &index,
            "us-central1",
            ResourceShape::Accelerator { name: "ct5lp-hightpu-1t", accelerator: &acc },
        );
        assert_eq!(unmapped, PriceResult::default());
    }

    #[test]
    fn family_tables() {
        assert_eq!(machine_family("n2d"), "N2D");
        assert_eq!(machine_family("m2"), "M1");
        assert_eq!(accelerator_family("nvidia-tesla-t4"), Some("Tesla T4"));
        assert_eq!(accelerator_family("nvidia-h100-mega-80gb"), Some(FLAGSHIP_ACCELERATOR));
        assert_eq!(accelerator_family("nvidia-unknown"), None);
    }

    #[test]
    fn reloaded_index_resolves_identically() {
        let index = n1_index();
        let json = serde_json::to_string(&index).unwrap();
        let reloaded: PriceIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(
            price_machine(&index, "n1", 16, 61_440),
            price_machine(&reloaded, "n1", 16, 61_440)
        );
    }
}
