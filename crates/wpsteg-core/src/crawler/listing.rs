//! Directory listing pages: fetching, anchor extraction, and the
//! year/month directory rule.

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

use crate::http::{Fetched, HttpClient};

/// `YYYY/` or `YYYY/MM/` relative to the uploads root.
static ARCHIVE_DIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}/(?:\d{2}/)?$").expect("archive dir rule is valid regex"));

/// A fetched listing page.
#[derive(Debug, Clone)]
pub struct ListingPage {
    /// Effective URL after redirects; links resolve against it.
    pub final_url: Url,
    pub hrefs: Vec<String>,
}

/// Fetches a listing. `Empty` when the page has no anchors at all.
pub fn fetch_listing(client: &dyn HttpClient, url: &str) -> Fetched<ListingPage> {
    let resp = match client.get(url).and_then(|r| r.error_for_status()) {
        Ok(resp) => resp,
        Err(e) => return Fetched::Failed(e),
    };
    let final_url = match Url::parse(&resp.final_url).or_else(|_| Url::parse(url)) {
        Ok(u) => u,
        Err(e) => {
            tracing::debug!(url, error = %e, "listing URL does not parse");
            return Fetched::Empty;
        }
    };
    let hrefs = extract_hrefs(&resp.text());
    if hrefs.is_empty() {
        return Fetched::Empty;
    }
    Fetched::Data(ListingPage { final_url, hrefs })
}

/// `href` values of every anchor, in document order.
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return vec![],
    };
    let document = Html::parse_document(html);
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .map(|href| href.trim().to_string())
        .collect()
}

/// True if `dir` is a `YYYY/` or `YYYY/MM/` directory directly under `root`
/// (same origin, path prefixed by the root's path).
pub fn is_archive_dir(root: &Url, dir: &Url) -> bool {
    if root.origin() != dir.origin() || dir.query().is_some() {
        return false;
    }
    dir.path()
        .strip_prefix(root.path())
        .is_some_and(|rest| ARCHIVE_DIR_RE.is_match(rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    const APACHE_INDEX: &str = r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 3.2 Final//EN">
<html><head><title>Index of /wp-content/uploads</title></head>
<body><h1>Index of /wp-content/uploads</h1>
<table>
<tr><th><a href="?C=N;O=D">Name</a></th><th><a href="?C=M;O=A">Last modified</a></th></tr>
<tr><td><a href="/wp-content/">Parent Directory</a></td></tr>
<tr><td><a href="2023/">2023/</a></td></tr>
<tr><td><a href="logo.png">logo.png</a></td></tr>
<tr><td><a>no href</a></td></tr>
</table></body></html>"#;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn extracts_hrefs_in_order() {
        assert_eq!(
            extract_hrefs(APACHE_INDEX),
            ["?C=N;O=D", "?C=M;O=A", "/wp-content/", "2023/", "logo.png"]
        );
    }

    #[test]
    fn extract_from_garbage_is_empty() {
        assert!(extract_hrefs("not html at all").is_empty());
        assert!(extract_hrefs("").is_empty());
    }

    #[test]
    fn archive_dir_rule() {
        let root = url("https://x.test/wp-content/uploads/");
        assert!(is_archive_dir(&root, &url("https://x.test/wp-content/uploads/2023/")));
        assert!(is_archive_dir(&root, &url("https://x.test/wp-content/uploads/2023/05/")));
        assert!(!is_archive_dir(&root, &url("https://x.test/wp-content/uploads/2023/05/1999/")));
        assert!(!is_archive_dir(&root, &url("https://x.test/wp-content/uploads/2023/5/")));
        assert!(!is_archive_dir(&root, &url("https://x.test/wp-content/uploads/2023")));
        assert!(!is_archive_dir(&root, &url("https://x.test/wp-content/uploads/cache/")));
        assert!(!is_archive_dir(&root, &url("https://x.test/wp-content/uploads/")));
        assert!(!is_archive_dir(&root, &url("https://other.test/wp-content/uploads/2023/")));
        assert!(!is_archive_dir(&root, &url("http://x.test/wp-content/uploads/2023/")));
    }
}
