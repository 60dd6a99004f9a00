/// Saved Cloud Billing catalog pages.
/// Layout: a single JSON file, or a directory of `*.json` pages read in file-name order.
/// Each page is a `services.skus.list` response (`{"skus": [...], "nextPageToken": ...}`)
/// or a bare array of SKUs.
use anyhow::{Context, Result};
use gceprice_core::SkuRecord;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListSkusResponse {
    skus: Vec<SkuRecord>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Load every SKU under `path`, preserving page and in-page order.
pub fn load_catalog(path: &Path) -> Result<Vec<SkuRecord>> {
    let mut skus = Vec::new();
    for page in catalog_pages(path)? {
        let found = load_page(&page)?;
        debug!(page = %page.display(), skus = found.len(), "read catalog page");
        skus.extend(found);
    }
    info!(path = %path.display(), skus = skus.len(), "loaded catalog");
    Ok(skus)
}

/// Page files under `path`, sorted by name. A plain file is its own single page.
pub fn catalog_pages(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        anyhow::ensure!(path.exists(), "catalog not found: {}", path.display());
        return Ok(vec![path.to_path_buf()]);
    }

    let mut pages = Vec::new();
    for entry in WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("listing {}", path.display()))?;
        let p = entry.path();
        if p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("json") {
            pages.push(p.to_path_buf());
        }
    }
    Ok(pages)
}

fn load_page(path: &Path) -> Result<Vec<SkuRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_page(&content, path).with_context(|| format!("parsing catalog page {}", path.display()))
}

fn parse_page(content: &str, path: &Path) -> Result<Vec<SkuRecord>> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    if value.is_array() {
        return Ok(serde_json::from_value(value)?);
    }
    if let Some(error) = value.get("error") {
        anyhow::bail!("page holds an API error: {error}");
    }
    anyhow::ensure!(value.get("skus").is_some(), "page has no `skus` list");

    let resp: ListSkusResponse = serde_json::from_value(value)?;
    if let Some(token) = resp.next_page_token.as_deref().filter(|t| !t.is_empty()) {
        debug!(page = %path.display(), next_page_token = token, "page has a continuation");
    }
    Ok(resp.skus)
}
