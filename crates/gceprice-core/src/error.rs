use thiserror::Error;

/// The catalog no longer has the shape this crate knows how to price.
///
/// These abort an index build: a partially priced index is never returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("sku {sku_id}: expected exactly one pricing tier, found {count}")]
    PricingTiers { sku_id: String, count: usize },

    #[error("sku {sku_id}: expected exactly one tiered rate, found {count}")]
    TieredRates { sku_id: String, count: usize },

    #[error("sku {sku_id}: unsupported currency {currency:?}")]
    Currency { sku_id: String, currency: String },

    #[error("sku {sku_id}: unsupported usage unit {unit:?}")]
    UsageUnit { sku_id: String, unit: String },
}
