pub mod classify;
pub mod index;
pub mod show;
pub mod table;

pub const DEFAULT_INDEX_PATH: &str = "out/skus.json";
pub const DEFAULT_TABLE_PATH: &str = "public/data/prices.json";
