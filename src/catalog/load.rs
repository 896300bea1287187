use std::fs;
use std::path::Path;

use anyhow::{Context, Result, ensure};

use super::Catalog;

pub fn load_catalog(path: &str) -> Result<Catalog> {
    let raw = fs::read_to_string(Path::new(path))
        .with_context(|| format!("could not read catalog file {path}"))?;

    let catalog: Catalog =
        serde_json::from_str(&raw).with_context(|| format!("invalid catalog JSON in {path}"))?;

    let mut ids = catalog
        .collections
        .iter()
        .map(|collection| collection.id.as_str())
        .collect::<Vec<_>>();
    ids.sort_unstable();
    let before = ids.len();
    ids.dedup();
    ensure!(
        ids.len() == before,
        "catalog {path} contains duplicate collection ids"
    );

    log::info!(
        "loaded catalog from {path}: {} collections, {} sources",
        catalog.collections.len(),
        catalog.sources.values().map(Vec::len).sum::<usize>()
    );

    Ok(catalog)
}
