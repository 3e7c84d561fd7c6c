//! Per-target audit orchestration.
//!
//! Sequence for one target: normalize the input, run precondition checks,
//! probe the scheme, then fetch the API inventory and crawl the uploads
//! listing concurrently, and finally reconcile the two sets. Progress and
//! results go to an [`AuditReporter`]; nothing here prints.

use anyhow::Result;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::api::{fetch_inventory, ApiInventory};
use crate::config::AuditConfig;
use crate::control::AuditControl;
use crate::crawler::{crawl, CrawlReport};
use crate::http::{FetchError, HttpClient};
use crate::precheck::{probe_scheme, run_prechecks, uploads_url, PrecheckReport};
use crate::progress::Progress;
use crate::reconcile::reconcile;
use crate::url_model::{base_authority, normalize_base_url, MediaUrl};

/// Counts and orphans for one audited target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditResult {
    /// Target as given by the user.
    pub target: String,
    /// Base URL the audit ran against (after scheme probing).
    pub base_url: String,
    pub api_files: usize,
    pub crawled_files: usize,
    /// Listing entries that were neither followed nor media files.
    pub skipped: usize,
    /// Crawled files missing from the API inventory, in sorted order.
    pub orphans: Vec<MediaUrl>,
    /// API pagination stopped on a failed page.
    pub api_truncated: bool,
    /// Listing directories that failed to load.
    pub pruned_branches: usize,
}

impl AuditResult {
    pub fn from_parts(
        target: &str,
        base_url: &str,
        api: &ApiInventory,
        crawl: &CrawlReport,
    ) -> Self {
        Self {
            target: target.to_string(),
            base_url: base_url.to_string(),
            api_files: api.urls.len(),
            crawled_files: crawl.files.len(),
            skipped: crawl.skipped,
            orphans: reconcile(&api.urls, &crawl.files),
            api_truncated: api.failure.is_some(),
            pruned_branches: crawl.pruned.len(),
        }
    }

    pub fn has_orphans(&self) -> bool {
        !self.orphans.is_empty()
    }
}

/// How an audit of one target ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditOutcome {
    Completed(AuditResult),
    /// At least one precondition failed; nothing was crawled.
    PreconditionsFailed(PrecheckReport),
    /// Neither HTTPS nor HTTP answered.
    Unreachable,
    Cancelled,
}

impl AuditOutcome {
    /// True only for a completed audit that found orphans.
    pub fn orphans_found(&self) -> bool {
        matches!(self, AuditOutcome::Completed(r) if r.has_orphans())
    }
}

/// Receives audit milestones, each tagged with the target it belongs to so
/// concurrent audits can be told apart. Every method defaults to a no-op.
pub trait AuditReporter: Send + Sync {
    fn started(&self, _target: &str) {}
    fn prechecks(&self, _target: &str, _report: &PrecheckReport) {}
    fn unreachable(&self, _target: &str) {}
    fn base_url(&self, _target: &str, _base_url: &str) {}
    fn api_page(&self, _target: &str, _page: u32, _total: u32) {}
    fn crawling(&self, _target: &str, _url: &str) {}
    fn completed(&self, _result: &AuditResult) {}
}

impl AuditReporter for () {}

/// Forwards progress events from blocking tasks to the shared reporter.
struct ReporterProgress {
    reporter: Arc<dyn AuditReporter>,
    target: String,
}

impl Progress for ReporterProgress {
    fn api_page(&self, page: u32, total: u32) {
        self.reporter.api_page(&self.target, page, total);
    }

    fn crawling(&self, url: &str) {
        self.reporter.crawling(&self.target, url);
    }
}

/// Runs audits against a shared client, config and cancel token.
#[derive(Clone)]
pub struct Auditor {
    client: Arc<dyn HttpClient>,
    config: Arc<AuditConfig>,
    control: AuditControl,
    reporter: Arc<dyn AuditReporter>,
}

impl Auditor {
    pub fn new(
        client: Arc<dyn HttpClient>,
        config: AuditConfig,
        control: AuditControl,
        reporter: Arc<dyn AuditReporter>,
    ) -> Self {
        Self {
            client,
            config: Arc::new(config),
            control,
            reporter,
        }
    }

    pub fn control(&self) -> &AuditControl {
        &self.control
    }

    /// Runs `f` with the client and config on the blocking pool.
    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn HttpClient, &AuditConfig) -> T + Send + 'static,
        T: Send + 'static,
    {
        let client = Arc::clone(&self.client);
        let config = Arc::clone(&self.config);
        tokio::task::spawn_blocking(move || f(client.as_ref(), &config))
            .await
            .map_err(|e| anyhow::anyhow!("audit task join: {}", e))
    }

    fn progress_for(&self, target: &str) -> ReporterProgress {
        ReporterProgress {
            reporter: Arc::clone(&self.reporter),
            target: target.to_string(),
        }
    }

    /// Audits one target end to end.
    pub async fn audit(&self, target: &str) -> Result<AuditOutcome> {
        self.reporter.started(target);
        let normalized = normalize_base_url(target);
        tracing::info!(site = %target, base = %normalized, "audit started");

        let base = normalized.clone();
        let prechecks = self
            .blocking(move |client, _| run_prechecks(client, &base))
            .await?;
        self.reporter.prechecks(target, &prechecks);
        if !prechecks.passed() {
            tracing::warn!(
                site = %target,
                failed = ?prechecks.failed_labels(),
                "preconditions not met"
            );
            return Ok(AuditOutcome::PreconditionsFailed(prechecks));
        }

        let authority = base_authority(&normalized).to_string();
        let probed = self
            .blocking(move |client, _| probe_scheme(client, &authority))
            .await?;
        let Some(base_url) = probed else {
            tracing::warn!(site = %target, "unreachable over https and http");
            self.reporter.unreachable(target);
            return Ok(AuditOutcome::Unreachable);
        };
        self.reporter.base_url(target, &base_url);

        if self.control.is_cancelled() {
            return Ok(AuditOutcome::Cancelled);
        }

        let api_task = {
            let base_url = base_url.clone();
            let control = self.control.clone();
            let progress = self.progress_for(target);
            self.blocking(move |client, config| {
                fetch_inventory(client, &base_url, config.per_page, &control, &progress)
            })
        };
        let crawl_task = {
            let root = uploads_url(&base_url);
            let control = self.control.clone();
            let progress = self.progress_for(target);
            self.blocking(move |client, config| crawl(client, &root, config, &control, &progress))
        };
        let (api, listing) = tokio::try_join!(api_task, crawl_task)?;

        if listing.cancelled || matches!(api.failure, Some(FetchError::Cancelled(_))) {
            tracing::info!(site = %target, "audit cancelled");
            return Ok(AuditOutcome::Cancelled);
        }

        let result = AuditResult::from_parts(target, &base_url, &api, &listing);
        tracing::info!(
            site = %target,
            api_files = result.api_files,
            crawled_files = result.crawled_files,
            skipped = result.skipped,
            orphans = result.orphans.len(),
            "audit completed"
        );
        self.reporter.completed(&result);
        Ok(AuditOutcome::Completed(result))
    }

    /// Audits every target with at most `jobs` audits in flight. Results are
    /// returned in input order; targets not started because of cancellation
    /// are reported as [`AuditOutcome::Cancelled`].
    pub async fn audit_all(
        &self,
        targets: &[String],
        jobs: usize,
    ) -> Result<Vec<(String, AuditOutcome)>> {
        let jobs = jobs.max(1);
        let mut outcomes: Vec<Option<AuditOutcome>> = targets.iter().map(|_| None).collect();
        let mut join_set = JoinSet::new();
        let mut next = 0usize;

        loop {
            while join_set.len() < jobs && next < targets.len() && !self.control.is_cancelled() {
                let auditor = self.clone();
                let target = targets[next].clone();
                let idx = next;
                join_set.spawn(async move { (idx, auditor.audit(&target).await) });
                next += 1;
            }

            let Some(res) = join_set.join_next().await else {
                break;
            };
            let (idx, outcome) = res.map_err(|e| anyhow::anyhow!("audit task join: {}", e))?;
            outcomes[idx] = Some(outcome?);
        }

        Ok(targets
            .iter()
            .cloned()
            .zip(
                outcomes
                    .into_iter()
                    .map(|o| o.unwrap_or(AuditOutcome::Cancelled)),
            )
            .collect())
    }
}
