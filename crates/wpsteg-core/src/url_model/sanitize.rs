//! Filesystem-safe names derived from audit targets.

/// Replaces every character that is not ASCII alphanumeric with `_`.
///
/// `https://www.example.com` → `https___www_example_com`. Used to name the
/// per-target orphan list so repeated runs overwrite the same file.
pub fn report_file_stem(target: &str) -> String {
    target
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
