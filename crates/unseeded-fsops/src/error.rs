//! # Design
//!
//! - Constant-message errors for deletion.
//! - Operation and path are carried as fields, never interpolated.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for filesystem operations.
pub type FsOpsResult<T> = Result<T, FsOpsError>;

/// Errors produced while removing unseeded files.
#[derive(Debug, Error)]
pub enum FsOpsError {
    /// IO failures while interacting with the filesystem.
    #[error("fsops io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The file does not lie beneath any scanned root.
    #[error("fsops path outside scanned roots")]
    OutsideRoots {
        /// Path that was refused.
        path: PathBuf,
    },
    /// The path is not a regular file.
    #[error("fsops path is not a regular file")]
    NotAFile {
        /// Path that was refused.
        path: PathBuf,
    },
}

impl FsOpsError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Path the failure refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::OutsideRoots { path } | Self::NotAFile { path } => path,
        }
    }
}
