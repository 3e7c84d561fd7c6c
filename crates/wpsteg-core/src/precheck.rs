//! Precondition checks and scheme probing run before an audit.
//!
//! An audit only makes sense if the site is up, runs WordPress, exposes the
//! REST API and has directory listing enabled on its uploads folder. Each
//! check is a plain pass/fail with an optional reason; transport errors fail
//! the check rather than the run.

use crate::http::{FetchError, HttpClient, HttpResponse};

/// Path of the uploads directory relative to the site root.
pub const UPLOADS_PATH: &str = "/wp-content/uploads/";

/// Outcome of one precondition check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub label: &'static str,
    pub passed: bool,
    /// Why the check failed, if it did.
    pub detail: Option<String>,
}

impl CheckOutcome {
    fn pass(label: &'static str) -> Self {
        Self {
            label,
            passed: true,
            detail: None,
        }
    }

    fn fail(label: &'static str, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        tracing::warn!(check = label, %detail, "precondition failed");
        Self {
            label,
            passed: false,
            detail: Some(detail),
        }
    }
}

/// All precondition results for one target, in the order they ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrecheckReport {
    pub checks: Vec<CheckOutcome>,
}

impl PrecheckReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failed_labels(&self) -> Vec<&'static str> {
        self.checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.label)
            .collect()
    }
}

/// `base_url` + `/wp-content/uploads/`.
pub fn uploads_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), UPLOADS_PATH)
}

fn get(client: &dyn HttpClient, url: &str) -> Result<HttpResponse, FetchError> {
    client.get(url).inspect_err(|e| {
        tracing::debug!(url, error = %e, "precheck request failed");
    })
}

pub fn check_website_up(client: &dyn HttpClient, base_url: &str) -> CheckOutcome {
    const LABEL: &str = "Website Reachability";
    match get(client, base_url) {
        Ok(resp) if resp.status < 400 => CheckOutcome::pass(LABEL),
        Ok(resp) => CheckOutcome::fail(LABEL, format!("HTTP {}", resp.status)),
        Err(e) => CheckOutcome::fail(LABEL, e.to_string()),
    }
}

/// `wp-login.php` answers 200, or the homepage references `wp-content`.
pub fn check_wordpress(client: &dyn HttpClient, base_url: &str) -> CheckOutcome {
    const LABEL: &str = "WordPress Detection";
    let login_url = format!("{}/wp-login.php", base_url.trim_end_matches('/'));
    let login_status = match get(client, &login_url) {
        Ok(resp) if resp.status == 200 => return CheckOutcome::pass(LABEL),
        Ok(resp) => format!("wp-login.php returned {}", resp.status),
        Err(e) => format!("wp-login.php: {e}"),
    };
    match get(client, base_url) {
        Ok(resp) if resp.text().contains("wp-content") => CheckOutcome::pass(LABEL),
        Ok(_) => CheckOutcome::fail(
            LABEL,
            format!("{login_status} and wp-content not found on homepage"),
        ),
        Err(e) => CheckOutcome::fail(LABEL, format!("{login_status}; homepage: {e}")),
    }
}

/// `/wp-json/` answers 200 with a JSON content type.
pub fn check_wp_json(client: &dyn HttpClient, base_url: &str) -> CheckOutcome {
    const LABEL: &str = "WP-JSON API Availability";
    let url = format!("{}/wp-json/", base_url.trim_end_matches('/'));
    match get(client, &url) {
        Ok(resp)
            if resp.status == 200
                && resp
                    .header("content-type")
                    .is_some_and(|ct| ct.contains("application/json")) =>
        {
            CheckOutcome::pass(LABEL)
        }
        Ok(resp) => CheckOutcome::fail(
            LABEL,
            format!(
                "HTTP {} with content-type {}",
                resp.status,
                resp.header("content-type").unwrap_or("-")
            ),
        ),
        Err(e) => CheckOutcome::fail(LABEL, e.to_string()),
    }
}

/// The uploads folder answers 200 with an auto-index page.
pub fn check_directory_listing(client: &dyn HttpClient, base_url: &str) -> CheckOutcome {
    const LABEL: &str = "Directory Listing";
    match get(client, &uploads_url(base_url)) {
        Ok(resp) if resp.status == 200 && resp.text().contains("<title>Index of") => {
            CheckOutcome::pass(LABEL)
        }
        Ok(resp) => CheckOutcome::fail(
            LABEL,
            format!("directory listing not enabled (HTTP {})", resp.status),
        ),
        Err(e) => CheckOutcome::fail(LABEL, e.to_string()),
    }
}

/// Runs every precondition check against `base_url`.
pub fn run_prechecks(client: &dyn HttpClient, base_url: &str) -> PrecheckReport {
    PrecheckReport {
        checks: vec![
            check_website_up(client, base_url),
            check_wordpress(client, base_url),
            check_wp_json(client, base_url),
            check_directory_listing(client, base_url),
        ],
    }
}

/// Returns `https://authority` or `http://authority`, whichever answers
/// first with a status below 400, trying HTTPS first.
pub fn probe_scheme(client: &dyn HttpClient, authority: &str) -> Option<String> {
    ["https", "http"].into_iter().find_map(|scheme| {
        let url = format!("{scheme}://{authority}");
        match client.get(&url) {
            Ok(resp) if resp.status < 400 => Some(url),
            Ok(resp) => {
                tracing::debug!(url = %url, status = resp.status, "scheme probe rejected");
                None
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "scheme probe failed");
                None
            }
        }
    })
}
