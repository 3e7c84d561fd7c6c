//! Deduplicated, sorted sets of canonical media URLs.

use std::collections::BTreeSet;

use crate::url_model::{canonicalize, MediaUrl};

/// A set of [`MediaUrl`]s. Iteration is in lexicographic order so every
/// consumer (reconciliation, reports) sees a reproducible sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventorySet {
    urls: BTreeSet<MediaUrl>,
}

impl InventorySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an already canonical URL. Returns false if it was present.
    pub fn insert(&mut self, url: MediaUrl) -> bool {
        self.urls.insert(url)
    }

    /// Canonicalizes `raw` and inserts it.
    pub fn insert_raw(&mut self, raw: &str) -> bool {
        self.insert(canonicalize(raw))
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MediaUrl> {
        self.urls.iter()
    }
}

impl FromIterator<MediaUrl> for InventorySet {
    fn from_iter<I: IntoIterator<Item = MediaUrl>>(iter: I) -> Self {
        Self {
            urls: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a str> for InventorySet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(canonicalize).collect()
    }
}

impl IntoIterator for InventorySet {
    type Item = MediaUrl;
    type IntoIter = std::collections::btree_set::IntoIter<MediaUrl>;

    fn into_iter(self) -> Self::IntoIter {
        self.urls.into_iter()
    }
}

impl<'a> IntoIterator for &'a InventorySet {
    type Item = &'a MediaUrl;
    type IntoIter = std::collections::btree_set::Iter<'a, MediaUrl>;

    fn into_iter(self) -> Self::IntoIter {
        self.urls.iter()
    }
}
