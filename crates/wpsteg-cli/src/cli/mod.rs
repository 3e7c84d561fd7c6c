//! CLI for the WP-Steg media audit tool.

mod console;
mod targets;

use anyhow::Result;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use std::sync::Arc;
use wpsteg_core::config;
use wpsteg_core::control::AuditControl;
use wpsteg_core::http::CurlClient;
use wpsteg_core::{AuditOutcome, Auditor};

use console::ConsoleReporter;
use targets::load_targets;

/// No target had orphans.
pub const EXIT_CLEAN: i32 = 0;
/// At least one target had orphans.
pub const EXIT_ORPHANS: i32 = 1;
/// Bad arguments, target list or config; nothing was audited.
pub const EXIT_CONFIG_ERROR: i32 = 2;
/// Interrupted with ctrl-c.
pub const EXIT_CANCELLED: i32 = 130;

/// Top-level CLI for the WP-Steg media audit tool.
#[derive(Debug, Parser)]
#[command(name = "wpsteg")]
#[command(about = "WP-Steg: WordPress media audit tool", long_about = None)]
#[command(group(ArgGroup::new("input").required(true).args(["target", "list"])))]
pub struct Cli {
    /// Single target URL or host.
    #[arg(short = 't', long)]
    pub target: Option<String>,

    /// Path to a file with targets, one per line.
    #[arg(short = 'l', long, value_name = "FILE")]
    pub list: Option<PathBuf>,

    /// Show API pages and crawled directories while auditing.
    #[arg(short, long)]
    pub verbose: bool,

    /// Audit up to N targets concurrently (overrides `jobs` in config.toml).
    #[arg(long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Directory where orphan lists are written.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Config file to use instead of ~/.config/wpsteg/config.toml.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parses arguments, runs every audit and returns the process exit code.
    pub async fn run_from_args() -> Result<i32> {
        let cli = Cli::parse();
        cli.run().await
    }

    pub async fn run(self) -> Result<i32> {
        let targets = load_targets(self.target.as_deref(), self.list.as_deref())?;
        let cfg = match &self.config {
            Some(path) => config::load_or_init_at(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);

        let jobs = self.jobs.unwrap_or(cfg.jobs).max(1);
        let client = CurlClient::new(cfg.http.clone());
        let reporter = ConsoleReporter::new(self.verbose, cfg.preview_limit, self.output_dir);
        let control = AuditControl::new();
        spawn_ctrl_c_handler(control.clone());

        let auditor = Auditor::new(Arc::new(client), cfg, control, Arc::new(reporter));
        let outcomes = auditor.audit_all(&targets, jobs).await?;

        let cancelled = auditor.control().is_cancelled();
        if cancelled {
            let skipped = outcomes
                .iter()
                .filter(|(_, o)| matches!(o, AuditOutcome::Cancelled))
                .count();
            println!("\nAudit cancelled; {} target(s) not completed.", skipped);
        }

        let code = exit_code(&outcomes, cancelled);
        tracing::info!(targets = targets.len(), code, "run completed");
        Ok(code)
    }
}

/// Process exit code for a finished run: cancellation wins, then any target
/// with orphans. Targets that failed prechecks or were unreachable count as
/// clean.
pub fn exit_code(outcomes: &[(String, AuditOutcome)], cancelled: bool) -> i32 {
    if cancelled {
        EXIT_CANCELLED
    } else if outcomes.iter().any(|(_, o)| o.orphans_found()) {
        EXIT_ORPHANS
    } else {
        EXIT_CLEAN
    }
}

/// First ctrl-c cancels every audit between requests.
fn spawn_ctrl_c_handler(control: AuditControl) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted, stopping after in-flight requests...");
            control.cancel();
        }
    });
}

#[cfg(test)]
mod tests;
