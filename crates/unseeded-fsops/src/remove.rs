//! Deleting unseeded files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use unseeded_core::{CancelFlag, UnseededFile};

use crate::error::{FsOpsError, FsOpsResult};

/// What a removal pass actually did.
#[derive(Debug, Default)]
pub struct Removal {
    /// Files that were deleted, in input order.
    pub removed: Vec<PathBuf>,
    /// Bytes freed by the deleted files.
    pub freed_bytes: u64,
    /// Directories left empty by the deletions and removed afterwards.
    pub pruned_dirs: Vec<PathBuf>,
    /// Files that could not be deleted.
    pub failures: Vec<FsOpsError>,
    /// The pass stopped early because cancellation was requested.
    pub cancelled: bool,
}

/// Delete `files`, then prune parent directories they leave empty.
///
/// Only files beneath one of `stop_roots` are touched, and pruning never
/// removes a stop root itself. Files that have already disappeared are
/// skipped silently. Cancellation is checked before every deletion.
#[must_use]
pub fn remove_files(files: &[UnseededFile], stop_roots: &[PathBuf], cancel: &CancelFlag) -> Removal {
    let mut removal = Removal::default();

    for file in files {
        if cancel.is_cancelled() {
            warn!(
                remaining = files.len() - removal.removed.len() - removal.failures.len(),
                "removal cancelled"
            );
            removal.cancelled = true;
            break;
        }

        match remove_one(&file.path, stop_roots) {
            Ok(true) => {
                info!(path = %file.path.display(), size = file.size, "removed unseeded file");
                removal.removed.push(file.path.clone());
                removal.freed_bytes += file.size;
                if let Some(parent) = file.path.parent() {
                    prune_empty_parents(parent, stop_roots, cancel, &mut removal.pruned_dirs);
                }
            }
            Ok(false) => {
                debug!(path = %file.path.display(), "file already gone; skipping");
            }
            Err(err) => {
                warn!(path = %err.path().display(), error = %err, "failed to remove unseeded file");
                removal.failures.push(err);
            }
        }
    }

    removal
}

fn remove_one(path: &Path, stop_roots: &[PathBuf]) -> FsOpsResult<bool> {
    if !stop_roots.iter().any(|root| path.starts_with(root) && path != root) {
        return Err(FsOpsError::OutsideRoots {
            path: path.to_path_buf(),
        });
    }

    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(FsOpsError::io("remove.stat", path, err)),
    };
    if !metadata.is_file() {
        return Err(FsOpsError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(FsOpsError::io("remove.file", path, err)),
    }
}

fn prune_empty_parents(
    start: &Path,
    stop_roots: &[PathBuf],
    cancel: &CancelFlag,
    pruned: &mut Vec<PathBuf>,
) {
    let mut current = Some(start);
    while let Some(dir) = current {
        if cancel.is_cancelled() {
            break;
        }
        if !stop_roots.iter().any(|root| dir.starts_with(root) && dir != root) {
            break;
        }

        let is_empty = match dir.read_dir() {
            Ok(mut entries) => entries.next().is_none(),
            Err(err) => {
                debug!(path = %dir.display(), error = %err, "failed to read directory during pruning");
                false
            }
        };
        if !is_empty {
            break;
        }
        if let Err(err) = fs::remove_dir(dir) {
            warn!(path = %dir.display(), error = %err, "failed to remove empty directory");
            break;
        }
        info!(path = %dir.display(), "removed empty directory");
        pruned.push(dir.to_path_buf());
        current = dir.parent();
    }
}
