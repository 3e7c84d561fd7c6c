//! Target list loading.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

/// Targets from `-t` or from the `-l` file (one per line, blank lines
/// ignored). The list file wins if both are given.
pub fn load_targets(target: Option<&str>, list: Option<&Path>) -> Result<Vec<String>> {
    if let Some(path) = list {
        let data = fs::read_to_string(path)
            .with_context(|| format!("could not read list file {}", path.display()))?;
        let targets: Vec<String> = data
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        if targets.is_empty() {
            bail!("list file {} contains no targets", path.display());
        }
        return Ok(targets);
    }
    match target.map(str::trim) {
        Some(t) if !t.is_empty() => Ok(vec![t.to_string()]),
        _ => bail!("please specify a target with -t or a list of targets with -l"),
    }
}
