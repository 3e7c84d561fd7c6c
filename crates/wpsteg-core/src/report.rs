//! Orphan list files: one canonical URL per line, named after the target.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::url_model::{report_file_stem, MediaUrl};

/// `WP_STEG_<target>_uncovered_files.txt` inside `dir`.
pub fn orphan_report_path(dir: &Path, target: &str) -> PathBuf {
    dir.join(format!(
        "WP_STEG_{}_uncovered_files.txt",
        report_file_stem(target)
    ))
}

/// Writes the orphan list for `target` into `dir`, replacing any previous
/// list for the same target. Returns the file path.
pub fn write_orphan_report(dir: &Path, target: &str, orphans: &[MediaUrl]) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = orphan_report_path(dir, target);
    let mut out = String::with_capacity(orphans.iter().map(|u| u.as_str().len() + 1).sum());
    for url in orphans {
        out.push_str(url.as_str());
        out.push('\n');
    }
    let mut file =
        fs::File::create(&path).with_context(|| format!("create {}", path.display()))?;
    file.write_all(out.as_bytes())
        .with_context(|| format!("write {}", path.display()))?;
    tracing::info!(
        site = %target,
        path = %path.display(),
        count = orphans.len(),
        "orphan list written"
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url_model::canonicalize;

    #[test]
    fn path_is_derived_from_target() {
        let p = orphan_report_path(Path::new("/tmp/out"), "https://www.example.com");
        assert_eq!(
            p,
            Path::new("/tmp/out/WP_STEG_https___www_example_com_uncovered_files.txt")
        );
    }

    #[test]
    fn writes_one_url_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let orphans = vec![
            canonicalize("https://x/u/a.jpg"),
            canonicalize("https://x/u/b c.pdf"),
        ];
        let path = write_orphan_report(dir.path(), "x", &orphans).unwrap();
        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content, "https://x/u/a.jpg\nhttps://x/u/b c.pdf\n");
    }

    #[test]
    fn rewriting_replaces_previous_list() {
        let dir = tempfile::tempdir().unwrap();
        write_orphan_report(dir.path(), "x", &[canonicalize("https://x/u/old.jpg")]).unwrap();
        let path =
            write_orphan_report(dir.path(), "x", &[canonicalize("https://x/u/new.jpg")]).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "https://x/u/new.jpg\n");
    }
}
