//! Progress sink for long-running audit steps.
//!
//! Core functions never print; they report through this trait and the CLI
//! decides what to show (e.g. only with `--verbose`).

/// Receives progress events. Every method defaults to a no-op.
pub trait Progress: Send + Sync {
    /// A media API page was fetched (`page` of `total`).
    fn api_page(&self, _page: u32, _total: u32) {}

    /// A directory listing is about to be fetched.
    fn crawling(&self, _url: &str) {}
}

impl Progress for () {}
