//! Transmission RPC adapter.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, error, info};
use unseeded_config::ServiceConfig;
use url::Url;

use super::{TorrentClient, TorrentRecord, base_url, endpoint, http_client};
use crate::error::{BackendError, BackendResult, FailureStage};

const DEFAULT_RPC_PATH: &str = "/transmission/rpc";
const SESSION_HEADER: &str = "X-Transmission-Session-Id";
const MAX_ATTEMPTS: usize = 2;

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: String,
    arguments: Option<T>,
}

#[derive(Debug, Deserialize)]
struct SessionInfo {
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TorrentList {
    #[serde(default)]
    torrents: Vec<TorrentFields>,
}

#[derive(Debug, Deserialize)]
struct TorrentFields {
    name: String,
    #[serde(rename = "downloadDir")]
    download_dir: String,
}

/// Transmission RPC session; the CSRF session id is refreshed on `409`.
#[derive(Debug)]
pub struct TransmissionClient {
    http: Client,
    rpc: Url,
    credentials: Option<(String, Option<String>)>,
    session_id: Mutex<Option<String>>,
}

impl TransmissionClient {
    /// Perform the `session-get` handshake.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::AuthenticationRejected`] on HTTP 401 and a
    /// connection error when the RPC endpoint cannot be reached.
    pub async fn connect(service: &ServiceConfig) -> BackendResult<Self> {
        let base = base_url(service)?;
        let rpc_path = service
            .rpc_path
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .unwrap_or(DEFAULT_RPC_PATH);
        let client = Self {
            http: http_client(service, "session-get", None)?,
            rpc: endpoint(&base, rpc_path),
            credentials: service
                .username
                .clone()
                .map(|username| (username, service.password.clone())),
            session_id: Mutex::new(None),
        };

        let session: SessionInfo = client
            .call(
                "session-get",
                json!({ "fields": ["version"] }),
                FailureStage::Connect,
            )
            .await?;
        info!(
            service = %service.name,
            version = session.version.as_deref().unwrap_or("unknown"),
            "connected to transmission"
        );
        Ok(client)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        arguments: Value,
        stage: FailureStage,
    ) -> BackendResult<T> {
        let transport = |source: reqwest::Error| match stage {
            FailureStage::Connect => BackendError::Connection {
                operation: method,
                source,
            },
            FailureStage::Fetch => BackendError::DataFetch {
                operation: method,
                source,
            },
        };
        let body = json!({ "method": method, "arguments": arguments });

        for _ in 0..MAX_ATTEMPTS {
            let mut request = self.http.post(self.rpc.clone()).json(&body);
            if let Some((username, password)) = &self.credentials {
                request = request.basic_auth(username, password.as_deref());
            }
            let session_id = self.lock_session().clone();
            if let Some(session_id) = session_id {
                request = request.header(SESSION_HEADER, session_id);
            }

            let response = request.send().await.map_err(&transport)?;
            match response.status() {
                StatusCode::CONFLICT => {
                    let session_id = response
                        .headers()
                        .get(SESSION_HEADER)
                        .and_then(|value| value.to_str().ok())
                        .map(str::to_string)
                        .ok_or_else(|| BackendError::UnexpectedResponse {
                            operation: method,
                            detail: "409 without session id".to_string(),
                        })?;
                    debug!(method, "refreshing transmission session id");
                    *self.lock_session() = Some(session_id);
                }
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    return Err(BackendError::AuthenticationRejected { operation: method });
                }
                status if status.is_success() => {
                    let payload: RpcResponse<T> = response.json().await.map_err(&transport)?;
                    if payload.result != "success" {
                        return Err(BackendError::UnexpectedResponse {
                            operation: method,
                            detail: payload.result,
                        });
                    }
                    return payload
                        .arguments
                        .ok_or_else(|| BackendError::UnexpectedResponse {
                            operation: method,
                            detail: "missing arguments".to_string(),
                        });
                }
                status => {
                    return Err(BackendError::UnexpectedResponse {
                        operation: method,
                        detail: status.to_string(),
                    });
                }
            }
        }

        Err(BackendError::UnexpectedResponse {
            operation: method,
            detail: "session id rejected after refresh".to_string(),
        })
    }

    fn lock_session(&self) -> MutexGuard<'_, Option<String>> {
        match self.session_id.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("transmission session mutex poisoned; continuing with recovered guard");
                poisoned.into_inner()
            }
        }
    }
}

#[async_trait]
impl TorrentClient for TransmissionClient {
    async fn list_torrents(&self) -> BackendResult<Vec<TorrentRecord>> {
        let list: TorrentList = self
            .call(
                "torrent-get",
                json!({ "fields": ["name", "downloadDir"] }),
                FailureStage::Fetch,
            )
            .await?;
        debug!(count = list.torrents.len(), "listed transmission torrents");
        Ok(list
            .torrents
            .into_iter()
            .map(|torrent| TorrentRecord::new(torrent.name, torrent.download_dir))
            .collect())
    }
}
