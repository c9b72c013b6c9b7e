use std::path::PathBuf;

use chrono::Local;
use tracing::{Instrument, debug, info, info_span, warn};
use unseeded_config::AppConfig;
use unseeded_core::{
    CancelFlag, Connector, ScanResult, ScanSettings, UnseededFile, scan_global, scan_service,
};
use unseeded_fsops::{Removal, remove_files};
use unseeded_notify::{Notifier, Report, ReportOutcome};
use uuid::Uuid;

/// Report scope used for global scans.
pub const GLOBAL_SCOPE: &str = "global scan";

/// Totals for one cycle, mostly useful to callers that want to log or test it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Scans that ran or were attempted.
    pub scans: usize,
    /// Unseeded files found across all scans.
    pub found: usize,
    /// Files actually deleted.
    pub removed: Vec<PathBuf>,
    /// Error strings collected across all scans.
    pub errors: usize,
    /// Reports handed to the notifier.
    pub notifications: usize,
}

/// Run one detection cycle with the given configuration.
///
/// Global mode scans the shared paths once; otherwise each service is
/// scanned in turn. Found files are deleted when auto-remove is enabled and
/// reported either way. Nothing here aborts the cycle early except
/// cancellation.
pub async fn run_cycle(
    config: &AppConfig,
    connector: &dyn Connector,
    cancel: &CancelFlag,
) -> CycleSummary {
    let span = info_span!("cycle", id = %Uuid::new_v4());
    async move {
        let settings = ScanSettings::from_config(config);
        let notifier = build_notifier(config);
        let mut summary = CycleSummary::default();

        if config.global_scan.enabled {
            info!(
                services = config.services.len(),
                paths = config.global_scan.scan_paths.len(),
                "starting global scan"
            );
            let result = scan_global(
                connector,
                &config.services,
                &config.global_scan.scan_paths,
                &settings,
                cancel,
            )
            .await;
            let allow_removal = result.errors.is_empty();
            if !allow_removal && config.enable_auto_remove && result.found() {
                warn!(
                    failed = result.errors.len(),
                    "some backends were unreachable; deletion suppressed for this cycle"
                );
            }
            handle_result(
                GLOBAL_SCOPE,
                result,
                config.enable_auto_remove && allow_removal,
                notifier.as_ref(),
                cancel,
                &mut summary,
            )
            .await;
        } else {
            for service in &config.services {
                if cancel.is_cancelled() {
                    info!("cycle cancelled between services");
                    break;
                }
                info!(service = %service.name, backend = %service.kind, "scanning service");
                let result = scan_service(connector, service, &settings, cancel).await;
                handle_result(
                    &service.name,
                    result,
                    config.enable_auto_remove,
                    notifier.as_ref(),
                    cancel,
                    &mut summary,
                )
                .await;
            }
        }

        info!(
            scans = summary.scans,
            found = summary.found,
            removed = summary.removed.len(),
            errors = summary.errors,
            "cycle finished"
        );
        summary
    }
    .instrument(span)
    .await
}

fn build_notifier(config: &AppConfig) -> Option<Notifier> {
    match Notifier::from_config(config) {
        Ok(notifier) => notifier,
        Err(err) => {
            warn!(
                channel = %config.notification_type,
                error = %err,
                "notifications disabled for this cycle"
            );
            None
        }
    }
}

async fn handle_result(
    scope: &str,
    result: ScanResult,
    remove: bool,
    notifier: Option<&Notifier>,
    cancel: &CancelFlag,
    summary: &mut CycleSummary,
) {
    summary.scans += 1;
    summary.found += result.files.len();
    summary.errors += result.errors.len();
    let mut errors = result.errors;

    let (files, total_bytes) = if result.files.is_empty() {
        (Vec::new(), 0)
    } else if remove {
        let removal = delete(result.files, result.roots, cancel).await;
        errors.extend(removal.failures.iter().map(|failure| {
            format!("failed to remove {}: {failure}", failure.path().display())
        }));
        summary.removed.extend(removal.removed.iter().cloned());
        (removal.removed, removal.freed_bytes)
    } else {
        info!(scope, files = result.files.len(), "unseeded files found (preview mode)");
        let total: u64 = result.files.iter().map(|file| file.size).sum();
        (result.files.into_iter().map(|file| file.path).collect(), total)
    };

    let report = Report {
        scope: scope.to_string(),
        executed_at: Local::now().fixed_offset(),
        auto_remove: remove,
        files,
        total_bytes,
        errors,
    };

    if report.outcome() == ReportOutcome::Clean {
        info!(scope, "no unseeded files; directories are clean");
        return;
    }

    let text = report.render();
    debug!(scope, report = %text, "cycle report");
    let Some(notifier) = notifier else {
        return;
    };
    summary.notifications += 1;
    if let Err(err) = notifier.send(&text).await {
        warn!(
            scope,
            channel = %notifier.kind(),
            error = %err,
            "failed to deliver notification"
        );
    }
}

async fn delete(files: Vec<UnseededFile>, roots: Vec<PathBuf>, cancel: &CancelFlag) -> Removal {
    let cancel = cancel.clone();
    match tokio::task::spawn_blocking(move || remove_files(&files, &roots, &cancel)).await {
        Ok(removal) => {
            info!(
                removed = removal.removed.len(),
                failed = removal.failures.len(),
                pruned_dirs = removal.pruned_dirs.len(),
                freed_bytes = removal.freed_bytes,
                "removal finished"
            );
            removal
        }
        Err(err) => {
            warn!(error = %err, "removal task failed");
            Removal::default()
        }
    }
}
