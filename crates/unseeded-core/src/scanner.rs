//! Filesystem walk that reports large files not covered by the seeded index.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::cancel::CancelFlag;
use crate::index::ContentIndex;
use crate::path::{is_within, normalize};

/// Inputs for one scan.
#[derive(Debug, Clone, Default)]
pub struct ScanRequest {
    /// Directories to walk; overlapping roots are walked once.
    pub roots: Vec<String>,
    /// Content known to be seeded.
    pub index: ContentIndex,
    /// Files smaller than this are ignored.
    pub min_size_bytes: u64,
    /// Subtrees never descended into.
    pub excluded_paths: Vec<String>,
    /// Checked between entries.
    pub cancel: CancelFlag,
}

/// A regular file no backend is seeding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnseededFile {
    /// Path as found on disk.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
}

/// Result of a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Unseeded files in walk order, without duplicates.
    pub files: Vec<UnseededFile>,
    /// Files at or above the size threshold that were compared to the index.
    pub checked: u64,
    /// The walk stopped early because cancellation was requested.
    pub cancelled: bool,
}

/// Walk every root and collect unseeded files.
///
/// Missing roots are skipped with a warning; unreadable entries are skipped
/// quietly. Symbolic links are neither followed nor reported.
#[must_use]
pub fn scan(request: &ScanRequest) -> ScanOutcome {
    let excluded: Vec<String> = canonical_list(&request.excluded_paths);
    let roots = outermost_roots(canonical_list(&request.roots));

    let mut outcome = ScanOutcome::default();
    let mut seen = HashSet::new();

    for root in roots {
        if request.cancel.is_cancelled() {
            outcome.cancelled = true;
            break;
        }
        if is_excluded(&root, &excluded) {
            debug!(root = %root, "scan root is excluded; skipping");
            continue;
        }
        if !Path::new(&root).is_dir() {
            warn!(root = %root, "scan root does not exist or is not a directory; skipping");
            continue;
        }

        let checked_before = outcome.checked;
        let found_before = outcome.files.len();
        let walker = WalkDir::new(&root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !is_excluded(&entry_key(entry), &excluded));

        for entry in walker {
            if request.cancel.is_cancelled() {
                outcome.cancelled = true;
                break;
            }
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!(path = ?err.path(), error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let size = match entry.metadata() {
                Ok(metadata) => metadata.len(),
                Err(err) => {
                    debug!(path = %entry.path().display(), error = %err, "skipping file without metadata");
                    continue;
                }
            };
            if size < request.min_size_bytes {
                continue;
            }

            outcome.checked += 1;
            let key = entry_key(&entry);
            if request.index.contains_file(&key) || !seen.insert(key) {
                continue;
            }
            outcome.files.push(UnseededFile {
                path: entry.into_path(),
                size,
            });
        }

        info!(
            root = %root,
            checked = outcome.checked - checked_before,
            unseeded = outcome.files.len() - found_before,
            "finished scanning root"
        );
        if outcome.cancelled {
            break;
        }
    }

    outcome
}

fn entry_key(entry: &DirEntry) -> String {
    normalize(&entry.path().to_string_lossy())
}

fn canonical_list(paths: &[String]) -> Vec<String> {
    paths
        .iter()
        .map(|path| normalize(path.trim()))
        .filter(|path| !path.is_empty())
        .collect()
}

fn is_excluded(path: &str, excluded: &[String]) -> bool {
    excluded.iter().any(|prefix| is_within(path, prefix))
}

/// Drop roots nested inside other roots so no subtree is walked twice.
fn outermost_roots(mut roots: Vec<String>) -> Vec<String> {
    roots.sort_by_key(String::len);
    let mut kept: Vec<String> = Vec::with_capacity(roots.len());
    for root in roots {
        if !kept.iter().any(|outer| is_within(&root, outer)) {
            kept.push(root);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn write_file(path: &Path, size: usize) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, vec![0_u8; size])?;
        Ok(())
    }

    fn root_of(dir: &tempfile::TempDir) -> String {
        dir.path().to_string_lossy().into_owned()
    }

    fn found(outcome: &ScanOutcome) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = outcome.files.iter().map(|f| f.path.clone()).collect();
        paths.sort();
        paths
    }

    #[test]
    fn reports_only_uncovered_files() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let show1 = dir.path().join("Show1/e01.mkv");
        let show10 = dir.path().join("Show10/e01.mkv");
        write_file(&show1, 16)?;
        write_file(&show10, 16)?;

        let index: ContentIndex = [dir.path().join("Show1").to_string_lossy().into_owned()]
            .into_iter()
            .collect();
        let outcome = scan(&ScanRequest {
            roots: vec![root_of(&dir)],
            index,
            ..ScanRequest::default()
        });

        assert_eq!(found(&outcome), vec![show10]);
        assert_eq!(outcome.checked, 2);
        assert!(!outcome.cancelled);
        Ok(())
    }

    #[test]
    fn size_threshold_is_inclusive() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let exact = dir.path().join("exact.bin");
        let small = dir.path().join("small.bin");
        write_file(&exact, 1024)?;
        write_file(&small, 1023)?;

        let outcome = scan(&ScanRequest {
            roots: vec![root_of(&dir)],
            min_size_bytes: 1024,
            ..ScanRequest::default()
        });

        assert_eq!(found(&outcome), vec![exact]);
        Ok(())
    }

    #[test]
    fn excluded_subtrees_are_pruned_on_separator_boundaries() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let skipped = dir.path().join("skip/deep/a.bin");
        let sibling = dir.path().join("skipped/b.bin");
        write_file(&skipped, 8)?;
        write_file(&sibling, 8)?;

        let outcome = scan(&ScanRequest {
            roots: vec![root_of(&dir)],
            excluded_paths: vec![dir.path().join("skip").to_string_lossy().into_owned()],
            ..ScanRequest::default()
        });

        assert_eq!(found(&outcome), vec![sibling]);
        Ok(())
    }

    #[test]
    fn overlapping_roots_report_each_file_once() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join("tv/Show/e01.mkv");
        write_file(&file, 8)?;

        let outcome = scan(&ScanRequest {
            roots: vec![
                dir.path().join("tv").to_string_lossy().into_owned(),
                root_of(&dir),
                root_of(&dir),
            ],
            ..ScanRequest::default()
        });

        assert_eq!(found(&outcome), vec![file]);
        Ok(())
    }

    #[test]
    fn missing_roots_are_skipped() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join("a.bin");
        write_file(&file, 8)?;

        let outcome = scan(&ScanRequest {
            roots: vec![
                dir.path().join("missing").to_string_lossy().into_owned(),
                root_of(&dir),
            ],
            ..ScanRequest::default()
        });

        assert_eq!(found(&outcome), vec![file]);
        Ok(())
    }

    #[test]
    fn cancelled_scan_reports_nothing() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        write_file(&dir.path().join("a.bin"), 8)?;

        let cancel = CancelFlag::new();
        cancel.cancel();
        let outcome = scan(&ScanRequest {
            roots: vec![root_of(&dir)],
            cancel,
            ..ScanRequest::default()
        });

        assert!(outcome.cancelled);
        assert!(outcome.files.is_empty());
        Ok(())
    }

    #[test]
    fn outermost_roots_keeps_siblings_with_shared_prefix() {
        let roots = outermost_roots(vec![
            normalize("/data/Show10"),
            normalize("/data/Show1"),
            normalize("/data/Show1/season1"),
        ]);
        assert_eq!(roots, vec![normalize("/data/Show1"), normalize("/data/Show10")]);
    }
}
