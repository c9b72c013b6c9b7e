//! Scan entry points for per-service and global modes.

use std::path::PathBuf;

use tracing::{error, info, warn};
use unseeded_config::{AppConfig, ServiceConfig};

use crate::aggregate::{aggregate, fetch_seeded};
use crate::cancel::CancelFlag;
use crate::client::Connector;
use crate::scanner::{ScanRequest, UnseededFile, scan};

/// Scanner settings shared by every scan in a cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSettings {
    /// Files smaller than this are ignored.
    pub min_size_bytes: u64,
    /// Subtrees never descended into.
    pub excluded_paths: Vec<String>,
}

impl ScanSettings {
    /// Settings derived from the configuration document.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            min_size_bytes: config.min_size_bytes(),
            excluded_paths: config.excluded_paths.clone(),
        }
    }
}

/// How a scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    /// The walk ran to completion.
    Completed,
    /// Cancellation was requested; `files` holds what was found so far.
    Cancelled,
    /// The service reported no torrents; nothing was scanned.
    NoTorrents,
    /// The service could not be queried; nothing was scanned.
    BackendUnavailable,
    /// No backend reported any content; the global scan was refused.
    NoSeededData,
    /// The blocking scan task did not finish.
    ScannerFailed,
}

impl ScanStatus {
    /// Whether the filesystem walk actually ran.
    #[must_use]
    pub const fn scanned(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Files found by one scan together with the errors met on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    /// Unseeded files, deduplicated.
    pub files: Vec<UnseededFile>,
    /// Human-readable backend and scanner errors.
    pub errors: Vec<String>,
    /// How the scan ended.
    pub status: ScanStatus,
    /// Roots that were walked; empty when nothing was scanned.
    pub roots: Vec<PathBuf>,
}

impl ScanResult {
    fn skipped(status: ScanStatus, errors: Vec<String>) -> Self {
        Self {
            files: Vec::new(),
            errors,
            status,
            roots: Vec::new(),
        }
    }

    /// Total size of the unseeded files in bytes.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|file| file.size).sum()
    }

    /// Whether any unseeded file was found.
    #[must_use]
    pub fn found(&self) -> bool {
        !self.files.is_empty()
    }
}

/// Scan one service's save directories against that service's content.
pub async fn scan_service(
    connector: &dyn Connector,
    service: &ServiceConfig,
    settings: &ScanSettings,
    cancel: &CancelFlag,
) -> ScanResult {
    let seeded = match fetch_seeded(connector, service).await {
        Ok(seeded) => seeded,
        Err(failure) => {
            warn!(
                service = %service.name,
                error = %failure.error.describe(),
                "skipping service scan"
            );
            return ScanResult::skipped(ScanStatus::BackendUnavailable, vec![failure.to_string()]);
        }
    };
    if seeded.content.is_empty() {
        info!(service = %service.name, "service reports no torrents; nothing to scan");
        return ScanResult::skipped(ScanStatus::NoTorrents, Vec::new());
    }

    let request = ScanRequest {
        roots: seeded.scan_roots.into_iter().collect(),
        index: seeded.content,
        min_size_bytes: settings.min_size_bytes,
        excluded_paths: settings.excluded_paths.clone(),
        cancel: cancel.clone(),
    };
    run_scan(request, Vec::new()).await
}

/// Scan shared directories against the union of every service's content.
///
/// The walk is refused when no backend reports any content, since every
/// file would otherwise be reported as unseeded.
pub async fn scan_global(
    connector: &dyn Connector,
    services: &[ServiceConfig],
    scan_paths: &[String],
    settings: &ScanSettings,
    cancel: &CancelFlag,
) -> ScanResult {
    let aggregation = aggregate(connector, services).await;
    let errors: Vec<String> = aggregation.errors.iter().map(ToString::to_string).collect();

    if aggregation.is_empty() {
        warn!(
            services = services.len(),
            failed = errors.len(),
            "no seeded content reported by any backend; refusing global scan"
        );
        return ScanResult::skipped(ScanStatus::NoSeededData, errors);
    }

    let request = ScanRequest {
        roots: scan_paths.to_vec(),
        index: aggregation.index,
        min_size_bytes: settings.min_size_bytes,
        excluded_paths: settings.excluded_paths.clone(),
        cancel: cancel.clone(),
    };
    run_scan(request, errors).await
}

async fn run_scan(request: ScanRequest, mut errors: Vec<String>) -> ScanResult {
    let roots = request.roots.iter().map(PathBuf::from).collect();
    match tokio::task::spawn_blocking(move || scan(&request)).await {
        Ok(outcome) => {
            let status = if outcome.cancelled {
                ScanStatus::Cancelled
            } else {
                ScanStatus::Completed
            };
            ScanResult {
                files: outcome.files,
                errors,
                status,
                roots,
            }
        }
        Err(err) => {
            error!(error = %err, "scanner task failed");
            errors.push(format!("scanner task failed: {err}"));
            ScanResult::skipped(ScanStatus::ScannerFailed, errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_sum_file_sizes() {
        let result = ScanResult {
            files: vec![
                UnseededFile {
                    path: PathBuf::from("/a"),
                    size: 3,
                },
                UnseededFile {
                    path: PathBuf::from("/b"),
                    size: 4,
                },
            ],
            errors: Vec::new(),
            status: ScanStatus::Completed,
            roots: vec![PathBuf::from("/")],
        };
        assert_eq!(result.total_bytes(), 7);
        assert!(result.found());
        assert!(result.status.scanned());
        assert!(!ScanStatus::NoSeededData.scanned());
    }
}
