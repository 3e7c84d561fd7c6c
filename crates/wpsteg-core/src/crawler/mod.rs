//! Uploads directory crawler.
//!
//! Walks an auto-index listing of `wp-content/uploads/` and its `YYYY/` and
//! `YYYY/MM/` subdirectories, collecting files with an allowed extension and
//! counting everything else as skipped.
//!
//! The walk uses an explicit stack of pending directories plus a frontier of
//! visited URLs. A URL enters the frontier before its page is fetched, so a
//! listing that links back to itself (or two anchors that resolve to the same
//! directory) is fetched at most once. A directory that fails to load prunes
//! only that branch.

mod listing;

pub use listing::{extract_hrefs, fetch_listing, is_archive_dir, ListingPage};

use std::collections::HashSet;
use url::Url;

use crate::config::AuditConfig;
use crate::control::AuditControl;
use crate::http::{FetchError, Fetched, HttpClient};
use crate::inventory::InventorySet;
use crate::progress::Progress;
use crate::url_model::{canonicalize, file_extension};

/// A directory whose listing could not be loaded.
#[derive(Debug)]
pub struct PrunedBranch {
    pub url: String,
    pub error: FetchError,
}

/// Result of crawling one uploads tree.
#[derive(Debug, Default)]
pub struct CrawlReport {
    pub files: InventorySet,
    /// Anchors that were neither a followed directory nor an allowed file.
    pub skipped: usize,
    /// Listing pages fetched successfully.
    pub directories_visited: usize,
    pub pruned: Vec<PrunedBranch>,
    /// Set when the crawl stopped early because the audit was cancelled.
    pub cancelled: bool,
}

impl CrawlReport {
    /// True if the root listing itself could not be loaded.
    pub fn root_failed(&self) -> bool {
        self.directories_visited == 0 && !self.pruned.is_empty()
    }
}

/// Crawls the listing at `root_url` (a trailing slash is added if missing).
pub fn crawl(
    client: &dyn HttpClient,
    root_url: &str,
    config: &AuditConfig,
    control: &AuditControl,
    progress: &dyn Progress,
) -> CrawlReport {
    let root = format!("{}/", root_url.trim_end_matches('/'));
    let mut report = CrawlReport::default();
    let mut frontier: HashSet<String> = HashSet::new();
    let mut pending: Vec<String> = vec![root];
    // Post-redirect URL of the root listing; archive dirs are matched against it.
    let mut listing_root: Option<Url> = None;

    while let Some(dir) = pending.pop() {
        if !frontier.insert(dir.clone()) {
            continue;
        }
        if control.check().is_err() {
            report.cancelled = true;
            break;
        }
        progress.crawling(&dir);

        let page = match fetch_listing(client, &dir) {
            Fetched::Data(page) => page,
            Fetched::Empty => {
                report.directories_visited += 1;
                tracing::debug!(url = %dir, "listing has no entries");
                continue;
            }
            Fetched::Failed(error) => {
                tracing::warn!(url = %dir, error = %error, "listing failed, branch pruned");
                report.pruned.push(PrunedBranch { url: dir, error });
                continue;
            }
        };
        report.directories_visited += 1;
        frontier.insert(page.final_url.to_string());
        let root = listing_root.get_or_insert_with(|| page.final_url.clone()).clone();

        let mut subdirs = Vec::new();
        for href in &page.hrefs {
            if href.starts_with("../") {
                continue;
            }
            let full = match page.final_url.join(href) {
                Ok(u) => u,
                Err(e) => {
                    tracing::debug!(href = %href, error = %e, "unresolvable link skipped");
                    report.skipped += 1;
                    continue;
                }
            };
            if href.ends_with('/') && is_archive_dir(&root, &full) {
                if !frontier.contains(full.as_str()) {
                    subdirs.push(full.to_string());
                }
                continue;
            }
            let file = canonicalize(full.as_str());
            match file_extension(file.as_str()) {
                Some(ext) if config.is_allowed_extension(&ext) => {
                    report.files.insert(file);
                }
                _ => report.skipped += 1,
            }
        }
        // Reverse so the stack visits siblings in document order.
        pending.extend(subdirs.into_iter().rev());
    }

    tracing::info!(
        files = report.files.len(),
        skipped = report.skipped,
        directories = report.directories_visited,
        pruned = report.pruned.len(),
        "crawl finished"
    );
    report
}
