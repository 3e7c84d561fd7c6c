//! Console reporter: prints audit progress and results, and writes the
//! orphan list file for each target that has orphans.
//!
//! With `--jobs` several audits report at once, so every line or block
//! printed here names the target it belongs to.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use wpsteg_core::precheck::PrecheckReport;
use wpsteg_core::report::write_orphan_report;
use wpsteg_core::url_model::MediaUrl;
use wpsteg_core::{AuditReporter, AuditResult};

pub struct ConsoleReporter {
    verbose: bool,
    preview_limit: usize,
    output_dir: PathBuf,
}

impl ConsoleReporter {
    pub fn new(verbose: bool, preview_limit: usize, output_dir: PathBuf) -> Self {
        Self {
            verbose,
            preview_limit,
            output_dir,
        }
    }

    /// Orphan preview (if any) followed by the summary table, as one block.
    fn completed_block(&self, result: &AuditResult) -> String {
        let mut out = String::new();
        if result.has_orphans() {
            let path = match write_orphan_report(&self.output_dir, &result.target, &result.orphans)
            {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!(site = %result.target, "could not write orphan list: {:#}", e);
                    let _ = writeln!(
                        out,
                        "\n[{}] Warning: could not write orphan list: {:#}",
                        result.target, e
                    );
                    None
                }
            };
            out.push_str(&format_orphan_preview(
                &result.target,
                &result.orphans,
                self.preview_limit,
                path.as_deref(),
            ));
        }
        out.push_str(&format_summary(result));
        out
    }
}

impl AuditReporter for ConsoleReporter {
    fn started(&self, target: &str) {
        println!(
            "\n{} Auditing {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            target
        );
    }

    fn prechecks(&self, target: &str, report: &PrecheckReport) {
        print!("{}", format_prechecks(target, report));
    }

    fn unreachable(&self, target: &str) {
        println!("[{}] Error: unreachable over https and http", target);
    }

    fn base_url(&self, target: &str, base_url: &str) {
        println!("[{}] Using base URL: {}", target, base_url);
    }

    fn api_page(&self, target: &str, page: u32, total: u32) {
        if self.verbose {
            println!("[{}] Fetching API page {}/{}", target, page, total);
        }
    }

    fn crawling(&self, target: &str, url: &str) {
        if self.verbose {
            println!("[{}] Crawling {}", target, url);
        }
    }

    fn completed(&self, result: &AuditResult) {
        print!("{}", self.completed_block(result));
    }
}

pub fn format_prechecks(target: &str, report: &PrecheckReport) -> String {
    let mut out = format!("\nPrecondition Checks for {}:\n\n", target);
    for check in &report.checks {
        let status = if check.passed { "OK" } else { "FAIL" };
        match &check.detail {
            Some(detail) if !check.passed => {
                let _ = writeln!(out, "[{:<4}] {} ({})", status, check.label, detail);
            }
            _ => {
                let _ = writeln!(out, "[{:<4}] {}", status, check.label);
            }
        }
    }
    if !report.passed() {
        let _ = writeln!(
            out,
            "ERROR: Failed checks for {}: {}",
            target,
            report.failed_labels().join(", ")
        );
        out.push_str("Condition not met for a successful audit.\n");
    }
    out
}

pub fn format_orphan_preview(
    target: &str,
    orphans: &[MediaUrl],
    limit: usize,
    path: Option<&Path>,
) -> String {
    let mut out = format!("\nOrphaned URLs for {} (showing up to {}):\n", target, limit);
    for url in orphans.iter().take(limit) {
        let _ = writeln!(out, " - {}", url);
    }
    if let Some(path) = path {
        let _ = writeln!(out, "\nFull list available at {}", path.display());
    }
    out
}

pub fn format_summary(result: &AuditResult) -> String {
    let rows = [
        ("Files from API", result.api_files),
        ("Files from directory listing", result.crawled_files),
        ("Skipped non-media files", result.skipped),
        ("Orphaned/Uncovered files", result.orphans.len()),
    ];
    let mut out = format!("\nAudit Summary for {} ({})\n", result.target, result.base_url);
    let _ = writeln!(out, "{:<32} {:>8}", "Metric", "Count");
    for (metric, count) in rows {
        let _ = writeln!(out, "{:<32} {:>8}", metric, count);
    }
    if result.api_truncated {
        out.push_str("Note: API pagination stopped early; inventory may be incomplete.\n");
    }
    if result.pruned_branches > 0 {
        let _ = writeln!(
            out,
            "Note: {} listing director{} could not be loaded.",
            result.pruned_branches,
            if result.pruned_branches == 1 { "y" } else { "ies" }
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use wpsteg_core::canonicalize;
    use wpsteg_core::precheck::CheckOutcome;

    fn result(target: &str, orphans: &[&str]) -> AuditResult {
        AuditResult {
            target: target.to_string(),
            base_url: format!("https://{target}"),
            api_files: 12,
            crawled_files: 14,
            skipped: 3,
            orphans: orphans.iter().map(|u| canonicalize(u)).collect(),
            api_truncated: false,
            pruned_branches: 0,
        }
    }

    #[test]
    fn summary_lists_all_counts() {
        let s = format_summary(&result("example.com", &["https://example.com/u/a.jpg"]));
        assert!(s.lines().any(|l| l.starts_with("Files from API") && l.ends_with("12")));
        assert!(s
            .lines()
            .any(|l| l.starts_with("Orphaned/Uncovered files") && l.ends_with('1')));
        assert!(!s.contains("Note:"));
    }

    #[test]
    fn summary_names_its_target() {
        let s = format_summary(&result("alpha.example", &[]));
        assert!(s.contains("Audit Summary for alpha.example (https://alpha.example)"));
    }

    #[test]
    fn summary_flags_degraded_results() {
        let mut r = result("example.com", &[]);
        r.api_truncated = true;
        r.pruned_branches = 2;
        let s = format_summary(&r);
        assert!(s.contains("API pagination stopped early"));
        assert!(s.contains("2 listing directories"));
    }

    #[test]
    fn preview_is_limited_and_tagged() {
        let orphans: Vec<MediaUrl> = (0..15)
            .map(|i| canonicalize(&format!("https://example.com/u/{i:02}.jpg")))
            .collect();
        let s = format_orphan_preview(
            "example.com",
            &orphans,
            10,
            Some(Path::new("/tmp/list.txt")),
        );
        assert!(s.contains("Orphaned URLs for example.com"));
        assert_eq!(s.lines().filter(|l| l.starts_with(" - ")).count(), 10);
        assert!(s.contains("Full list available at /tmp/list.txt"));
    }

    #[test]
    fn prechecks_show_failures_for_target() {
        let report = PrecheckReport {
            checks: vec![
                CheckOutcome {
                    label: "Website Reachability",
                    passed: true,
                    detail: None,
                },
                CheckOutcome {
                    label: "Directory Listing",
                    passed: false,
                    detail: Some("HTTP 403".to_string()),
                },
            ],
        };
        let s = format_prechecks("beta.example", &report);
        assert!(s.contains("Precondition Checks for beta.example:"));
        assert!(s.contains("[OK  ] Website Reachability"));
        assert!(s.contains("[FAIL] Directory Listing (HTTP 403)"));
        assert!(s.contains("ERROR: Failed checks for beta.example: Directory Listing"));
    }

    #[test]
    fn completed_block_writes_orphan_file() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = ConsoleReporter::new(false, 10, dir.path().to_path_buf());
        let block =
            reporter.completed_block(&result("example.com", &["https://example.com/u/a.jpg"]));
        let path = dir.path().join("WP_STEG_example_com_uncovered_files.txt");
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "https://example.com/u/a.jpg\n"
        );
        assert!(block.contains(&format!("Full list available at {}", path.display())));
        assert!(block.contains("Audit Summary for example.com"));
    }
}
