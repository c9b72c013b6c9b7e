#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! YAML-backed configuration for the unseeded file detector.
//!
//! Layout: `model.rs` (typed config models), `mapping.rs` (path mapping
//! rules), `loader.rs` (file discovery and parsing), `validate.rs`
//! (structural checks), `error.rs` (`ConfigError`).

pub mod error;
pub mod loader;
pub mod mapping;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH, LEGACY_CONFIG_PATH_ENV, config_path_from_env, load,
    load_from_path, load_from_str,
};
pub use mapping::{MappingIssue, PathMapping, RawPathMapping};
pub use model::{
    AppConfig, BackendKind, EmailConfig, GlobalScanConfig, LoggingSettings, NotificationKind,
    ServiceConfig, WebhookConfig,
};
pub use validate::validate;
