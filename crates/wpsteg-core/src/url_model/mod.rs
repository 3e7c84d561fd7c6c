//! URL canonicalization and comparison keys.
//!
//! The API inventory and the crawled listing describe the same files in
//! slightly different ways (scheme, `www.` prefix, resized variants, query
//! strings, percent-encoding). Everything here reduces a URL to a form where
//! those cosmetic differences no longer cause mismatches.

mod percent;
mod sanitize;
mod suffix;

use std::fmt;

pub use percent::percent_decode_path;
pub use sanitize::report_file_stem;
pub use suffix::{strip_variant_suffix, VARIANT_SUFFIX_RULES};

/// A canonical, percent-decoded, query-stripped URL for one remote file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MediaUrl(String);

impl MediaUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Host (lowercase, `www.` stripped) plus path; the scheme is discarded.
    pub fn comparison_key(&self) -> ComparisonKey {
        comparison_key(&self.0)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for MediaUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MediaUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Reduced form of a [`MediaUrl`] used only for equality between inventories.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComparisonKey(String);

impl ComparisonKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Canonicalizes a URL into a [`MediaUrl`].
///
/// 1. Drops the query string (and fragment).
/// 2. Percent-decodes, keeping `%25`, `%3F` and `%23` encoded so the result
///    still parses the same way and a second pass is a no-op.
/// 3. Strips a trailing generated-variant suffix (`-300x200`, `-scaled`,
///    `-smush-original`, repeated) sitting right before the extension.
///
/// # Examples
///
/// - `https://x/u/photo-300x200.jpg?ver=2` → `https://x/u/photo.jpg`
/// - `https://x/u/my%20file-scaled.pdf` → `https://x/u/my file.pdf`
pub fn canonicalize(url: &str) -> MediaUrl {
    let without_query = url.split(['?', '#']).next().unwrap_or_default();
    let decoded = percent_decode_path(without_query);
    MediaUrl(strip_variant_suffix(&decoded).into_owned())
}

/// Computes the comparison key: lowercase host without a leading `www.`,
/// concatenated with the path. `http` and `https` compare equal.
pub fn comparison_key(url: &str) -> ComparisonKey {
    let (host, path) = split_host_and_path(url);
    let host = host.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    ComparisonKey(format!("{host}{path}"))
}

/// Splits `scheme://[user@]host[:port]/path?query` into (host, path).
///
/// Works on the raw string rather than a parsed `Url` so that decoded
/// characters in the path (spaces, UTF-8) are compared verbatim.
fn split_host_and_path(url: &str) -> (&str, &str) {
    let rest = match url.split_once("://") {
        Some((_, rest)) => rest,
        None => url,
    };
    let rest = rest.split(['?', '#']).next().unwrap_or_default();
    let (authority, path) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    let host = if host_port.starts_with('[') {
        host_port
            .split_once(']')
            .map_or(host_port, |(h, _)| &host_port[..h.len() + 1])
    } else {
        host_port.split(':').next().unwrap_or_default()
    };
    (host, path)
}

/// Normalizes user input (`example.com`, `https://www.Example.com/blog/`)
/// into a base URL: `scheme://host[:port]`, lowercase, `www.` stripped, no
/// path and no trailing slash. Missing schemes default to `http`.
pub fn normalize_base_url(target: &str) -> String {
    let target = target.trim();
    let (scheme, rest) = match target.split_once("://") {
        Some((scheme, rest))
            if !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphabetic()) =>
        {
            (scheme.to_ascii_lowercase(), rest)
        }
        _ => ("http".to_string(), target),
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let authority = authority.to_ascii_lowercase();
    let authority = authority.strip_prefix("www.").unwrap_or(&authority);
    format!("{scheme}://{authority}")
}

/// Host part (with port, if any) of a normalized base URL.
pub fn base_authority(base_url: &str) -> &str {
    base_url
        .split_once("://")
        .map_or(base_url, |(_, rest)| rest)
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default()
}

/// Lowercase file extension of the last path segment, with the leading dot.
///
/// Leading dots of the segment are not treated as an extension separator
/// (`.htaccess` has no extension). Directories and bare hosts yield `None`.
pub fn file_extension(url: &str) -> Option<String> {
    let (_, path) = split_host_and_path(url);
    let segment = path.rsplit('/').next()?;
    let trimmed = segment.trim_start_matches('.');
    let (_, ext) = trimmed.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(format!(".{}", ext.to_ascii_lowercase()))
}
