//! Authoritative media inventory from the WordPress REST API.
//!
//! Pages through `/wp-json/wp/v2/media` and keeps the `source_url` of every
//! record attached to a post. A failing or empty page ends the walk; what was
//! collected so far is kept and the failure is recorded on the result.

mod record;

pub use record::{parse_media_page, MediaRecord};

use crate::control::AuditControl;
use crate::http::{FetchError, Fetched, HttpClient};
use crate::inventory::InventorySet;
use crate::progress::Progress;

/// Header carrying the total page count for the requested page size.
pub const TOTAL_PAGES_HEADER: &str = "X-WP-TotalPages";

const MEDIA_ENDPOINT: &str = "/wp-json/wp/v2/media";

/// Result of paginating the media endpoint.
#[derive(Debug, Default)]
pub struct ApiInventory {
    pub urls: InventorySet,
    /// Total page count reported by the first page (1 if absent).
    pub total_pages: u32,
    /// Pages that returned records.
    pub pages_fetched: u32,
    /// Set when a page failed before `total_pages` was reached.
    pub failure: Option<FetchError>,
}

/// URL of one page of the media listing.
pub fn media_page_url(base_url: &str, per_page: u32, page: u32) -> String {
    format!(
        "{}{}?per_page={}&page={}",
        base_url.trim_end_matches('/'),
        MEDIA_ENDPOINT,
        per_page,
        page
    )
}

/// Reads the total page count header; missing or unparseable means 1.
pub fn parse_total_pages(value: Option<&str>) -> u32 {
    value
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(1)
        .max(1)
}

/// Fetches one page. `Empty` for an empty array, `Failed` for transport
/// errors, non-2xx status or a body that is not a JSON array.
pub fn fetch_page(
    client: &dyn HttpClient,
    base_url: &str,
    per_page: u32,
    page: u32,
) -> (Fetched<Vec<MediaRecord>>, Option<u32>) {
    let url = media_page_url(base_url, per_page, page);
    let resp = match client.get(&url).and_then(|r| r.error_for_status()) {
        Ok(resp) => resp,
        Err(e) => return (Fetched::Failed(e), None),
    };
    let total = parse_total_pages(resp.header(TOTAL_PAGES_HEADER));
    let outcome = match parse_media_page(&resp.body) {
        Ok(records) if records.is_empty() => Fetched::Empty,
        Ok(records) => Fetched::Data(records),
        Err(e) => Fetched::Failed(e.into()),
    };
    (outcome, Some(total))
}

/// Paginates the media endpoint and returns the attached-media inventory.
///
/// The page count is read from the first page. Pages are requested in order
/// until the count is reached, a page is empty, or a page fails.
pub fn fetch_inventory(
    client: &dyn HttpClient,
    base_url: &str,
    per_page: u32,
    control: &AuditControl,
    progress: &dyn Progress,
) -> ApiInventory {
    let per_page = per_page.max(1);
    let mut inventory = ApiInventory {
        total_pages: 1,
        ..Default::default()
    };
    let mut total: Option<u32> = None;
    let mut page = 1u32;

    loop {
        if let Err(e) = control.check() {
            inventory.failure = Some(e.into());
            break;
        }
        let (outcome, page_total) = fetch_page(client, base_url, per_page, page);
        if total.is_none() {
            if let Some(t) = page_total {
                total = Some(t);
                inventory.total_pages = t;
            }
        }
        let total_pages = total.unwrap_or(1);
        progress.api_page(page, total_pages);

        match outcome {
            Fetched::Data(records) => {
                inventory.pages_fetched += 1;
                for url in records.iter().filter_map(MediaRecord::attached_source_url) {
                    inventory.urls.insert_raw(url);
                }
            }
            Fetched::Empty => {
                tracing::debug!(base_url, page, "media page empty, stopping");
                break;
            }
            Fetched::Failed(e) => {
                tracing::warn!(
                    base_url,
                    page,
                    error = %e,
                    "media page failed, inventory truncated"
                );
                inventory.failure = Some(e);
                break;
            }
        }

        if page >= total_pages {
            break;
        }
        page += 1;
    }

    tracing::info!(
        base_url,
        files = inventory.urls.len(),
        pages = inventory.pages_fetched,
        total_pages = inventory.total_pages,
        "API inventory fetched"
    );
    inventory
}
