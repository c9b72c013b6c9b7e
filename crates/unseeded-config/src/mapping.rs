//! Path mapping rules between a backend's view of the filesystem and the host.
//!
//! Two spellings are accepted in YAML:
//!
//! ```yaml
//! path_mapping:
//!   - remote: /data            # explicit form
//!     local: /mnt/user/data
//!   - "T:\\": /download        # shorthand form: { <local>: <remote> }
//! ```
//!
//! The shorthand key is always the host-side (local) prefix and the value is
//! the backend-side (remote) prefix. Both spellings resolve to [`PathMapping`].
//! Any other shape still parses, so one bad rule never rejects the document;
//! it surfaces as [`MappingIssue::Malformed`] when resolved.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

const RESERVED_KEYS: [&str; 2] = ["remote", "local"];

/// A resolved mapping rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapping {
    /// Prefix as reported by the torrent backend (usually a container path).
    pub remote: String,
    /// Equivalent prefix on the host running the scan.
    pub local: String,
}

impl PathMapping {
    /// Build a mapping from its remote and local prefixes.
    #[must_use]
    pub fn new(remote: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
            local: local.into(),
        }
    }
}

/// Mapping rule as written in the configuration document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPathMapping {
    /// `{ remote: ..., local: ... }`
    Explicit {
        /// Backend-side prefix.
        remote: String,
        /// Host-side prefix.
        local: String,
    },
    /// `{ <local>: <remote> }` with exactly one entry.
    Shorthand(BTreeMap<String, String>),
    /// Anything else: null prefixes, non-string values, bare scalars.
    Malformed(serde_yaml::Value),
}

/// Reasons a configured mapping rule cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingIssue {
    /// Shorthand mappings must contain exactly one entry.
    #[error("shorthand path mapping must contain exactly one entry")]
    EntryCount {
        /// Number of entries found.
        entries: usize,
    },
    /// Shorthand key collides with the explicit form's field names.
    #[error("shorthand path mapping uses a reserved key")]
    ReservedKey {
        /// The reserved key that was used.
        key: String,
    },
    /// The remote prefix is empty.
    #[error("path mapping remote prefix is empty")]
    EmptyRemote,
    /// The rule is neither an explicit pair nor a single-entry shorthand map.
    #[error("path mapping is not a remote/local pair")]
    Malformed {
        /// YAML kind of the offending rule.
        found: &'static str,
    },
}

impl RawPathMapping {
    /// Explicit rule constructor.
    #[must_use]
    pub fn explicit(remote: impl Into<String>, local: impl Into<String>) -> Self {
        Self::Explicit {
            remote: remote.into(),
            local: local.into(),
        }
    }

    /// Shorthand rule constructor, spelled the way it appears in YAML.
    #[must_use]
    pub fn shorthand(local: impl Into<String>, remote: impl Into<String>) -> Self {
        Self::Shorthand(BTreeMap::from([(local.into(), remote.into())]))
    }

    /// Resolve the rule into its typed form.
    ///
    /// # Errors
    ///
    /// Returns a [`MappingIssue`] when the rule is malformed.
    pub fn resolve(&self) -> Result<PathMapping, MappingIssue> {
        let mapping = match self {
            Self::Explicit { remote, local } => PathMapping::new(remote, local),
            Self::Shorthand(entries) => {
                let mut iter = entries.iter();
                let (Some((local, remote)), None) = (iter.next(), iter.next()) else {
                    return Err(MappingIssue::EntryCount {
                        entries: entries.len(),
                    });
                };
                if RESERVED_KEYS.contains(&local.as_str()) {
                    return Err(MappingIssue::ReservedKey { key: local.clone() });
                }
                PathMapping::new(remote, local)
            }
            Self::Malformed(value) => {
                return Err(MappingIssue::Malformed {
                    found: yaml_kind(value),
                });
            }
        };

        if mapping.remote.trim().is_empty() {
            return Err(MappingIssue::EmptyRemote);
        }
        Ok(mapping)
    }
}

const fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    use serde_yaml::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged",
    }
}
