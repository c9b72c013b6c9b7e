//! Plain-text cycle reports.

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};

const MAX_LISTED_FILES: usize = 15;
const RULE_WIDTH: usize = 34;
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Render a byte count as MB below one gigabyte and GB above, two decimals.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    let megabytes = bytes as f64 / BYTES_PER_MB;
    if megabytes < 1024.0 {
        format!("{megabytes:.2} MB")
    } else {
        format!("{:.2} GB", megabytes / 1024.0)
    }
}

/// Overall shape of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Unseeded files were found (and possibly removed).
    FilesFound,
    /// Nothing was found, but errors occurred.
    Failed,
    /// Nothing was found and nothing failed.
    Clean,
}

/// Summary of one service scan or one global scan.
#[derive(Debug, Clone)]
pub struct Report {
    /// Service name, or a label for the global scan.
    pub scope: String,
    /// When the cycle ran.
    pub executed_at: DateTime<FixedOffset>,
    /// Whether files were deleted rather than only listed.
    pub auto_remove: bool,
    /// Files removed (auto-remove) or pending (preview).
    pub files: Vec<PathBuf>,
    /// Combined size of `files`.
    pub total_bytes: u64,
    /// Backend and scanner errors.
    pub errors: Vec<String>,
}

impl Report {
    /// Classify the report.
    #[must_use]
    pub fn outcome(&self) -> ReportOutcome {
        if !self.files.is_empty() {
            ReportOutcome::FilesFound
        } else if self.errors.is_empty() {
            ReportOutcome::Clean
        } else {
            ReportOutcome::Failed
        }
    }

    /// Render the report as plain text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{0} Unseeded cleanup report {0}", "=".repeat(10));
        let _ = writeln!(out, "Service: {}", self.scope);
        let _ = writeln!(
            out,
            "Executed: {}",
            self.executed_at.format("%Y-%m-%d %H:%M:%S %:z")
        );

        match self.outcome() {
            ReportOutcome::Failed => {
                let _ = writeln!(out, "Status: failed");
                let _ = writeln!(out, "Errors: {}", self.errors.join(", "));
                let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
                let _ = writeln!(out, "Things to check:");
                let _ = writeln!(out, "   1. backend containers are running and reachable");
                let _ = writeln!(out, "   2. configured API credentials and permissions");
                let _ = writeln!(out, "   3. storage mounts on this host are online");
            }
            ReportOutcome::Clean => {
                let _ = writeln!(out, "Status: no unseeded files found");
                let _ = writeln!(out, "Result: nothing to do");
            }
            ReportOutcome::FilesFound => self.render_files(&mut out),
        }

        let _ = write!(out, "{}", "=".repeat(RULE_WIDTH));
        out
    }

    fn render_files(&self, out: &mut String) {
        let (status, mode, label) = if self.auto_remove {
            ("auto-remove executed", "enabled", "Removed files")
        } else {
            (
                "scan complete, manual action required",
                "disabled (report only)",
                "Pending files",
            )
        };
        let _ = writeln!(out, "Status: {status}");
        let _ = writeln!(out, "Auto-remove: {mode}");
        if !self.errors.is_empty() {
            let _ = writeln!(out, "Errors: {}", self.errors.join(", "));
        }
        let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
        let _ = writeln!(out, "Statistics:");
        let _ = writeln!(out, "   Files: {}", self.files.len());
        let _ = writeln!(out, "   Size: {}", format_size(self.total_bytes));
        let _ = writeln!(out);
        let _ = writeln!(out, "{label}:");
        for file in self.files.iter().take(MAX_LISTED_FILES) {
            let _ = writeln!(out, "   - {}", file.display());
        }
        if self.files.len() > MAX_LISTED_FILES {
            let _ = writeln!(
                out,
                "   ... and {} more",
                self.files.len() - MAX_LISTED_FILES
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2026-01-02T03:04:05+00:00").expect("timestamp")
    }

    fn report(files: Vec<PathBuf>, errors: Vec<String>) -> Report {
        Report {
            scope: "qb".to_string(),
            executed_at: at(),
            auto_remove: false,
            total_bytes: 0,
            files,
            errors,
        }
    }

    #[test]
    fn format_size_switches_units_at_one_gigabyte() {
        assert_eq!(format_size(0), "0.00 MB");
        assert_eq!(format_size(500 * 1024 * 1024), "500.00 MB");
        assert_eq!(format_size(1536 * 1024 * 1024), "1.50 GB");
    }

    #[test]
    fn outcome_prefers_files_over_errors() {
        assert_eq!(report(Vec::new(), Vec::new()).outcome(), ReportOutcome::Clean);
        assert_eq!(
            report(Vec::new(), vec!["down".into()]).outcome(),
            ReportOutcome::Failed
        );
        assert_eq!(
            report(vec![PathBuf::from("/a")], vec!["down".into()]).outcome(),
            ReportOutcome::FilesFound
        );
    }

    #[test]
    fn long_file_lists_are_truncated() {
        let files = (0..20).map(|i| PathBuf::from(format!("/d/{i}.bin"))).collect();
        let mut long = report(files, Vec::new());
        long.total_bytes = 2 * 1024 * 1024;
        let text = long.render();

        assert!(text.contains("Executed: 2026-01-02 03:04:05 +00:00"));
        assert!(text.contains("Pending files:"));
        assert!(text.contains("   - /d/14.bin"));
        assert!(!text.contains("   - /d/15.bin"));
        assert!(text.contains("... and 5 more"));
        assert!(text.contains("Size: 2.00 MB"));
    }

    #[test]
    fn failed_report_lists_errors() {
        let text = report(Vec::new(), vec!["a".into(), "b".into()]).render();
        assert!(text.contains("Status: failed"));
        assert!(text.contains("Errors: a, b"));
    }
}
