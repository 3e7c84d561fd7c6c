//! Orphan detection: crawled files the API does not know about.

use std::collections::HashSet;

use crate::inventory::InventorySet;
use crate::url_model::{ComparisonKey, MediaUrl};

/// Returns the crawled URLs whose comparison key is absent from the API set.
///
/// One-directional (crawl minus API): files the API lists but the crawl did
/// not find are never reported. Output follows the crawl set's sorted order.
pub fn reconcile(api: &InventorySet, crawl: &InventorySet) -> Vec<MediaUrl> {
    if crawl.is_empty() {
        return Vec::new();
    }
    let api_keys: HashSet<ComparisonKey> = api.iter().map(MediaUrl::comparison_key).collect();
    crawl
        .iter()
        .filter(|url| !api_keys.contains(&url.comparison_key()))
        .cloned()
        .collect()
}
