//! Typed configuration models.

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::mapping::{PathMapping, RawPathMapping};

const BYTES_PER_MB: u64 = 1024 * 1024;
const DEFAULT_CHECK_INTERVAL_MINUTES: u64 = 60;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_READ_TIMEOUT_SECS: u64 = 15;
const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 15;
const DEFAULT_EMAIL_TIMEOUT_SECS: u64 = 30;

/// Root configuration document.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Torrent backends to query.
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
    /// Minimum file size considered by the scanner, in MB.
    #[serde(default, rename = "checkfile_size")]
    pub checkfile_size_mb: u64,
    /// Paths whose subtrees are never scanned.
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Delete unseeded files instead of only reporting them.
    #[serde(default)]
    pub enable_auto_remove: bool,
    /// Minutes between scan cycles.
    #[serde(default = "default_check_interval", rename = "check_interval")]
    pub check_interval_minutes: u64,
    /// Cross-backend scan of shared storage.
    #[serde(default)]
    pub global_scan: GlobalScanConfig,
    /// Channel used for cycle reports.
    #[serde(default)]
    pub notification_type: NotificationKind,
    /// Webhook notification target; webhook reports are disabled when absent.
    #[serde(default)]
    pub webhook: Option<WebhookConfig>,
    /// SMTP settings, required when `notification_type` is `email`.
    #[serde(default)]
    pub email: Option<EmailConfig>,
    /// Logging overrides.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// Minimum file size in bytes.
    #[must_use]
    pub const fn min_size_bytes(&self) -> u64 {
        self.checkfile_size_mb.saturating_mul(BYTES_PER_MB)
    }

    /// Interval between scan cycles.
    #[must_use]
    pub const fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_minutes.saturating_mul(60))
    }
}

const fn default_check_interval() -> u64 {
    DEFAULT_CHECK_INTERVAL_MINUTES
}

/// Global scan mode settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalScanConfig {
    /// Toggle for global mode; per-service mode runs when `false`.
    #[serde(default)]
    pub enabled: bool,
    /// Shared directories scanned against the union of all backends.
    #[serde(default)]
    pub scan_paths: Vec<String>,
}

/// Webhook delivery settings.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// Endpoint receiving `{"title", "text"}` JSON payloads.
    pub url: String,
    /// Optional title override.
    #[serde(default)]
    pub title: Option<String>,
    /// Per-attempt request timeout in seconds.
    #[serde(default = "default_webhook_timeout")]
    pub timeout_secs: u64,
}

const fn default_webhook_timeout() -> u64 {
    DEFAULT_WEBHOOK_TIMEOUT_SECS
}

/// Delivery channel for cycle reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum NotificationKind {
    /// JSON POST to `webhook.url`.
    #[default]
    Webhook,
    /// Plain-text mail through `email.smtp_host`.
    Email,
}

impl NotificationKind {
    /// Canonical configuration spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Webhook => "webhook",
            Self::Email => "email",
        }
    }
}

impl Display for NotificationKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<String> for NotificationKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "webhook" => Ok(Self::Webhook),
            "email" => Ok(Self::Email),
            other => Err(format!("unsupported notification type '{other}'")),
        }
    }
}

/// SMTP delivery settings.
///
/// Port 465 uses implicit TLS; any other port upgrades with STARTTLS.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// SMTP relay host.
    #[serde(default)]
    pub smtp_host: String,
    /// SMTP relay port.
    #[serde(default)]
    pub smtp_port: u16,
    /// Login user; also the sender address unless `from` is set.
    #[serde(default)]
    pub username: String,
    /// Login password.
    #[serde(default)]
    pub password: String,
    /// Recipient address.
    #[serde(default)]
    pub to: String,
    /// Sender address override.
    #[serde(default)]
    pub from: Option<String>,
    /// Subject override.
    #[serde(default)]
    pub subject: Option<String>,
    /// Whole-session timeout in seconds.
    #[serde(default = "default_email_timeout")]
    pub timeout_secs: u64,
}

impl EmailConfig {
    /// Sender address: `from` when set, otherwise the login user.
    #[must_use]
    pub fn sender(&self) -> &str {
        self.from
            .as_deref()
            .map(str::trim)
            .filter(|from| !from.is_empty())
            .unwrap_or(&self.username)
    }
}

const fn default_email_timeout() -> u64 {
    DEFAULT_EMAIL_TIMEOUT_SECS
}

/// Logging overrides read from the document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingSettings {
    /// Level or filter directive.
    #[serde(default)]
    pub level: Option<String>,
    /// `pretty` or `json`.
    #[serde(default)]
    pub format: Option<String>,
    /// Directory for rolling log files.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

/// Supported torrent backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum BackendKind {
    /// qBittorrent WebUI API v2.
    Qbittorrent,
    /// Transmission RPC.
    Transmission,
}

impl BackendKind {
    /// Canonical configuration spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Qbittorrent => "qbittorrent",
            Self::Transmission => "transmission",
        }
    }
}

impl Display for BackendKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "qbittorrent" | "qbit" => Ok(Self::Qbittorrent),
            "transmission" => Ok(Self::Transmission),
            other => Err(format!("unsupported backend type '{other}'")),
        }
    }
}

impl TryFrom<String> for BackendKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One torrent backend.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Display name used in logs and reports.
    pub name: String,
    /// Backend implementation.
    #[serde(rename = "type")]
    pub kind: BackendKind,
    /// Host name, IP address, or base URL (`http://host`).
    pub host: String,
    /// TCP port of the WebUI / RPC endpoint.
    pub port: u16,
    /// Login user, when the backend requires one.
    #[serde(default)]
    pub username: Option<String>,
    /// Login password.
    #[serde(default)]
    pub password: Option<String>,
    /// Ordered mapping rules; the first rule that changes a path wins.
    #[serde(default)]
    pub path_mapping: Vec<RawPathMapping>,
    /// Transmission RPC path override.
    #[serde(default)]
    pub rpc_path: Option<String>,
    /// TCP connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Per-request timeout in seconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
}

const fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

const fn default_read_timeout() -> u64 {
    DEFAULT_READ_TIMEOUT_SECS
}

impl ServiceConfig {
    /// Minimal service definition with default timeouts and no mappings.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: BackendKind,
        host: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            host: host.into(),
            port,
            username: None,
            password: None,
            path_mapping: Vec::new(),
            rpc_path: None,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
        }
    }

    /// Resolve the configured mapping rules in declared order.
    ///
    /// Malformed rules are logged and skipped; paths they would have matched
    /// pass through untranslated.
    #[must_use]
    pub fn path_mappings(&self) -> Vec<PathMapping> {
        self.path_mapping
            .iter()
            .enumerate()
            .filter_map(|(index, raw)| match raw.resolve() {
                Ok(mapping) => Some(mapping),
                Err(issue) => {
                    warn!(
                        service = %self.name,
                        rule = index,
                        error = %issue,
                        "skipping malformed path mapping"
                    );
                    None
                }
            })
            .collect()
    }

    /// TCP connect timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_kind_parses_case_insensitively() {
        assert_eq!(
            "QBittorrent".parse::<BackendKind>(),
            Ok(BackendKind::Qbittorrent)
        );
        assert_eq!(
            " transmission ".parse::<BackendKind>(),
            Ok(BackendKind::Transmission)
        );
        assert!("deluge".parse::<BackendKind>().is_err());
    }

    #[test]
    fn size_threshold_converts_megabytes() {
        let config: AppConfig =
            serde_yaml::from_str("checkfile_size: 100\n").expect("config should parse");
        assert_eq!(config.min_size_bytes(), 100 * 1024 * 1024);
        assert_eq!(config.check_interval(), Duration::from_secs(3600));
    }

    #[test]
    fn path_mappings_skip_malformed_rules() {
        let mut service = ServiceConfig::new("qb", BackendKind::Qbittorrent, "localhost", 8080);
        service.path_mapping = vec![
            RawPathMapping::shorthand("/mnt/a", "/a"),
            RawPathMapping::Shorthand(std::collections::BTreeMap::new()),
            RawPathMapping::explicit("/b", "/mnt/b"),
        ];
        assert_eq!(
            service.path_mappings(),
            vec![PathMapping::new("/a", "/mnt/a"), PathMapping::new("/b", "/mnt/b")]
        );
    }

    #[test]
    fn notification_type_defaults_to_webhook_and_parses_email() -> anyhow::Result<()> {
        let config: AppConfig = serde_yaml::from_str("{}\n")?;
        assert_eq!(config.notification_type, NotificationKind::Webhook);

        let config: AppConfig = serde_yaml::from_str(
            r"
notification_type: Email
email:
  smtp_host: smtp.example.com
  smtp_port: 465
  username: bot@example.com
  password: secret
  to: ops@example.com
",
        )?;
        assert_eq!(config.notification_type, NotificationKind::Email);
        let email = config
            .email
            .ok_or_else(|| anyhow::anyhow!("email block missing"))?;
        assert_eq!(email.sender(), "bot@example.com");
        assert_eq!(email.timeout_secs, 30);
        Ok(())
    }
}
