//! The set of content paths known to be seeded.

use std::collections::BTreeSet;

use crate::path::{SEPARATOR, normalize};

/// Canonical content paths reported by one or more backends.
///
/// An entry is either a single-file torrent's file or a multi-file torrent's
/// top directory; a file is seeded when it equals an entry or lies beneath one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentIndex {
    paths: BTreeSet<String>,
}

impl ContentIndex {
    /// Empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a content path; returns `false` for duplicates and empty paths.
    pub fn insert(&mut self, path: &str) -> bool {
        let canonical = normalize(path);
        if canonical.is_empty() {
            return false;
        }
        self.paths.insert(canonical)
    }

    /// Union another index into this one.
    pub fn merge(&mut self, other: Self) {
        self.paths.extend(other.paths);
    }

    /// Number of distinct content paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether no backend reported any content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Content paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// Whether a canonical file path is covered by any content path.
    ///
    /// Every ancestor of `file` ending at a separator is looked up, so the
    /// cost grows with path depth rather than index size.
    #[must_use]
    pub fn contains_file(&self, file: &str) -> bool {
        if self.paths.is_empty() {
            return false;
        }
        if self.paths.contains(file) {
            return true;
        }
        file.char_indices()
            .filter(|(_, ch)| *ch == SEPARATOR)
            .any(|(index, _)| {
                let ancestor = if index == 0 {
                    &file[..SEPARATOR.len_utf8()]
                } else {
                    &file[..index]
                };
                self.paths.contains(ancestor)
            })
    }
}

impl<S: AsRef<str>> FromIterator<S> for ContentIndex {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut index = Self::new();
        index.extend(iter);
        index
    }
}

impl<S: AsRef<str>> Extend<S> for ContentIndex {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for path in iter {
            self.insert(path.as_ref());
        }
    }
}

/// Content of one backend after path translation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeededPaths {
    /// Distinct save directories; per-service scans walk these.
    pub scan_roots: BTreeSet<String>,
    /// Content paths joined from save directory and torrent name.
    pub content: ContentIndex,
}
