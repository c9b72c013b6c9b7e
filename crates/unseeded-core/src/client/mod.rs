//! Torrent backend adapters.
//!
//! Each adapter authenticates against one configured service and lists its
//! torrents as [`TorrentRecord`]s. [`collect_seeded`] then turns those records
//! into host paths using the service's mapping rules.

mod qbittorrent;
mod transmission;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::cookie::Jar;
use tracing::debug;
use unseeded_config::{BackendKind, PathMapping, ServiceConfig};
use url::Url;

use crate::error::{BackendError, BackendResult};
use crate::index::SeededPaths;
use crate::path::{join, normalize, translate_with_rules};

pub use qbittorrent::QbittorrentClient;
pub use transmission::TransmissionClient;

/// One torrent as reported by a backend, before path translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentRecord {
    /// Torrent name; the single file or the top directory of the content.
    pub name: String,
    /// Save directory in the backend's own filesystem view.
    pub save_dir: String,
}

impl TorrentRecord {
    /// Build a record from its name and save directory.
    #[must_use]
    pub fn new(name: impl Into<String>, save_dir: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            save_dir: save_dir.into(),
        }
    }
}

/// An authenticated session with a torrent backend.
#[async_trait]
pub trait TorrentClient: Send + Sync {
    /// List every torrent known to the backend.
    async fn list_torrents(&self) -> BackendResult<Vec<TorrentRecord>>;
}

/// Opens [`TorrentClient`] sessions for configured services.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Authenticate against `service` and return a session.
    async fn connect(&self, service: &ServiceConfig) -> BackendResult<Box<dyn TorrentClient>>;
}

/// Connector speaking the qBittorrent WebUI API and Transmission RPC over HTTP.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpConnector;

#[async_trait]
impl Connector for HttpConnector {
    async fn connect(&self, service: &ServiceConfig) -> BackendResult<Box<dyn TorrentClient>> {
        match service.kind {
            BackendKind::Qbittorrent => Ok(Box::new(QbittorrentClient::connect(service).await?)),
            BackendKind::Transmission => {
                Ok(Box::new(TransmissionClient::connect(service).await?))
            }
        }
    }
}

/// Translate backend records into host scan roots and content paths.
#[must_use]
pub fn collect_seeded(records: &[TorrentRecord], mappings: &[PathMapping]) -> SeededPaths {
    let mut seeded = SeededPaths::default();
    for record in records {
        if record.save_dir.trim().is_empty() {
            debug!(torrent = %record.name, "torrent has no save directory; skipping");
            continue;
        }
        let save_dir = translate_with_rules(&record.save_dir, mappings);
        seeded.scan_roots.insert(normalize(&save_dir));
        seeded.content.insert(&join(&save_dir, &record.name));
    }
    seeded
}

/// Base URL for a service: `host` may be a bare host name or carry a scheme.
pub(crate) fn base_url(service: &ServiceConfig) -> BackendResult<Url> {
    let host = service.host.trim();
    let raw = if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{host}")
    };
    let mut url = Url::parse(&raw).map_err(|_| BackendError::InvalidEndpoint {
        value: raw.clone(),
    })?;
    url.set_port(Some(service.port))
        .map_err(|()| BackendError::InvalidEndpoint { value: raw })?;
    Ok(url)
}

/// Append an absolute API path to the base URL, keeping any reverse-proxy prefix.
pub(crate) fn endpoint(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    let prefix = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{prefix}/{}", path.trim_start_matches('/')));
    url
}

pub(crate) fn http_client(
    service: &ServiceConfig,
    operation: &'static str,
    cookies: Option<Arc<Jar>>,
) -> BackendResult<Client> {
    let mut builder = Client::builder()
        .connect_timeout(service.connect_timeout())
        .timeout(service.read_timeout());
    if let Some(jar) = cookies {
        builder = builder.cookie_provider(jar);
    }
    builder
        .build()
        .map_err(|source| BackendError::Connection { operation, source })
}
