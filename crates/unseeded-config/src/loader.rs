//! Configuration file discovery and parsing.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::model::AppConfig;
use crate::validate::validate;

/// Primary environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "UNSEEDED_CONFIG_PATH";
/// Fallback environment variable kept for existing container deployments.
pub const LEGACY_CONFIG_PATH_ENV: &str = "CONFIG_PATH";
/// Path used when neither environment variable is set.
pub const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

/// Resolve the configuration file location from the environment.
#[must_use]
pub fn config_path_from_env() -> PathBuf {
    config_path_from_values(
        std::env::var(CONFIG_PATH_ENV).ok(),
        std::env::var(LEGACY_CONFIG_PATH_ENV).ok(),
    )
}

fn config_path_from_values(primary: Option<String>, legacy: Option<String>) -> PathBuf {
    primary
        .into_iter()
        .chain(legacy)
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Load and validate the configuration named by the environment.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or validated.
pub fn load() -> ConfigResult<AppConfig> {
    load_from_path(config_path_from_env())
}

/// Load and validate a configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or validated.
pub fn load_from_path(path: impl AsRef<Path>) -> ConfigResult<AppConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents, path)
}

/// Parse and validate a configuration document; `origin` is used for error context.
///
/// # Errors
///
/// Returns an error if the document is empty, malformed, or fails validation.
pub fn load_from_str(contents: &str, origin: &Path) -> ConfigResult<AppConfig> {
    let parse_error = |source: serde_yaml::Error| ConfigError::Parse {
        path: origin.to_path_buf(),
        source,
    };

    if is_blank_document(contents) {
        return Err(ConfigError::Empty {
            path: origin.to_path_buf(),
        });
    }

    let document: serde_yaml::Value = serde_yaml::from_str(contents).map_err(parse_error)?;
    if document.is_null() {
        return Err(ConfigError::Empty {
            path: origin.to_path_buf(),
        });
    }

    let config: AppConfig = serde_yaml::from_value(document).map_err(parse_error)?;
    validate(&config)?;
    Ok(config)
}

fn is_blank_document(contents: &str) -> bool {
    contents
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#') || line == "---")
}
