//! # Design
//!
//! - Centralize application-level errors for startup.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Per-cycle failures are logged and reported, never surfaced here.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration operations failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Configuration file involved.
        path: PathBuf,
        /// Source configuration error.
        source: unseeded_config::ConfigError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: unseeded_telemetry::TelemetryError,
    },
}

impl AppError {
    pub(crate) fn config(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: unseeded_config::ConfigError,
    ) -> Self {
        Self::Config {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: unseeded_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }
}
