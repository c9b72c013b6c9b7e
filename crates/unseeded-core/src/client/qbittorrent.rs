//! qBittorrent WebUI API v2 adapter.
//!
//! The session cookie lives in a per-client jar, so servers that rename it
//! (`QBT_SID_<port>` and friends) work the same as the default `SID`.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::REFERER;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};
use unseeded_config::ServiceConfig;
use url::Url;

use super::{TorrentClient, TorrentRecord, base_url, endpoint, http_client};
use crate::error::{BackendError, BackendResult};

const LOGIN_PATH: &str = "/api/v2/auth/login";
const VERSION_PATH: &str = "/api/v2/app/version";
const TORRENTS_PATH: &str = "/api/v2/torrents/info";

#[derive(Debug, Deserialize)]
struct TorrentInfo {
    name: String,
    save_path: String,
}

/// Authenticated qBittorrent session.
#[derive(Debug)]
pub struct QbittorrentClient {
    http: Client,
    base: Url,
}

impl QbittorrentClient {
    /// Log in (when credentials are configured) and confirm the API answers.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::AuthenticationRejected`] when the WebUI refuses
    /// the credentials, and a connection error when it cannot be reached.
    pub async fn connect(service: &ServiceConfig) -> BackendResult<Self> {
        let base = base_url(service)?;
        let jar = Arc::new(Jar::default());
        let http = http_client(service, "auth.login", Some(Arc::clone(&jar)))?;

        if let Some(username) = service.username.as_deref() {
            login(&http, &base, username, service).await?;
            if jar.cookies(&endpoint(&base, TORRENTS_PATH)).is_none() {
                return Err(BackendError::UnexpectedResponse {
                    operation: "auth.login",
                    detail: "login succeeded without a session cookie".to_string(),
                });
            }
        }

        let client = Self { http, base };
        let version = client.api_version().await?;
        info!(service = %service.name, version = %version, "connected to qbittorrent");
        Ok(client)
    }

    async fn api_version(&self) -> BackendResult<String> {
        const OPERATION: &str = "app.version";
        let response = self
            .get(VERSION_PATH)
            .send()
            .await
            .map_err(|source| BackendError::Connection {
                operation: OPERATION,
                source,
            })?;
        let response = check_status(response, OPERATION)?;
        let version = response
            .text()
            .await
            .map_err(|source| BackendError::Connection {
                operation: OPERATION,
                source,
            })?;
        Ok(version.trim().to_string())
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(endpoint(&self.base, path))
            .header(REFERER, self.base.as_str())
    }
}

#[async_trait]
impl TorrentClient for QbittorrentClient {
    async fn list_torrents(&self) -> BackendResult<Vec<TorrentRecord>> {
        const OPERATION: &str = "torrents.info";
        let response = self
            .get(TORRENTS_PATH)
            .send()
            .await
            .map_err(|source| BackendError::DataFetch {
                operation: OPERATION,
                source,
            })?;
        let response = check_status(response, OPERATION)?;
        let torrents: Vec<TorrentInfo> =
            response.json().await.map_err(|source| BackendError::DataFetch {
                operation: OPERATION,
                source,
            })?;
        debug!(count = torrents.len(), "listed qbittorrent torrents");
        Ok(torrents
            .into_iter()
            .map(|torrent| TorrentRecord::new(torrent.name, torrent.save_path))
            .collect())
    }
}

async fn login(
    http: &Client,
    base: &Url,
    username: &str,
    service: &ServiceConfig,
) -> BackendResult<()> {
    const OPERATION: &str = "auth.login";
    let form = [
        ("username", username),
        ("password", service.password.as_deref().unwrap_or_default()),
    ];
    let response = http
        .post(endpoint(base, LOGIN_PATH))
        .header(REFERER, base.as_str())
        .form(&form)
        .send()
        .await
        .map_err(|source| BackendError::Connection {
            operation: OPERATION,
            source,
        })?;
    let response = check_status(response, OPERATION)?;
    let body = response
        .text()
        .await
        .map_err(|source| BackendError::Connection {
            operation: OPERATION,
            source,
        })?;

    match body.trim() {
        "Ok." => Ok(()),
        "Fails." => Err(BackendError::AuthenticationRejected {
            operation: OPERATION,
        }),
        other => Err(BackendError::UnexpectedResponse {
            operation: OPERATION,
            detail: other.to_string(),
        }),
    }
}

fn check_status(response: Response, operation: &'static str) -> BackendResult<Response> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
            Err(BackendError::AuthenticationRejected { operation })
        }
        status => Err(BackendError::UnexpectedResponse {
            operation,
            detail: status.to_string(),
        }),
    }
}
