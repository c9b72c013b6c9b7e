//! Webhook delivery with bounded retry.

use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::Client;
use serde::Serialize;
use tokio::time::sleep;
use tracing::{info, warn};
use unseeded_config::WebhookConfig;
use url::Url;

use crate::error::{NotifyError, NotifyResult};

/// Title used when the configuration does not set one.
pub const DEFAULT_TITLE: &str = "Unseeded notification";
const MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(2);

#[derive(Debug, Serialize)]
struct Payload<'a> {
    title: &'a str,
    text: &'a str,
}

/// Posts `{"title", "text"}` JSON to a configured endpoint.
///
/// The HTTP client is built on first delivery and reused afterwards.
/// Transport errors and `5xx` responses are retried with exponential
/// backoff; other statuses fail immediately.
#[derive(Debug)]
pub struct WebhookNotifier {
    url: Url,
    title: String,
    timeout: Duration,
    backoff_base: Duration,
    client: OnceCell<Client>,
}

impl WebhookNotifier {
    /// Build a notifier from its configuration block.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::InvalidUrl`] when the URL does not parse.
    pub fn from_config(config: &WebhookConfig) -> NotifyResult<Self> {
        let url = Url::parse(config.url.trim()).map_err(|_| NotifyError::InvalidUrl {
            value: config.url.clone(),
        })?;
        let title = config
            .title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .unwrap_or(DEFAULT_TITLE)
            .to_string();
        Ok(Self {
            url,
            title,
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
            backoff_base: DEFAULT_BACKOFF_BASE,
            client: OnceCell::new(),
        })
    }

    /// Override the delay before the first retry; later retries double it.
    #[must_use]
    pub const fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    fn client(&self) -> NotifyResult<&Client> {
        self.client.get_or_try_init(|| {
            Client::builder()
                .timeout(self.timeout)
                .user_agent(concat!("unseeded/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|source| NotifyError::ClientBuild { source })
        })
    }

    /// Deliver `text` to the webhook.
    ///
    /// # Errors
    ///
    /// Returns the last failure once every attempt has been used, or the
    /// first non-retryable status.
    pub async fn send(&self, text: &str) -> NotifyResult<()> {
        let client = self.client()?;
        let payload = Payload {
            title: &self.title,
            text,
        };

        let mut attempt = 1;
        loop {
            let last_error = match client.post(self.url.clone()).json(&payload).send().await {
                Ok(response) if response.status().is_success() => {
                    info!(attempt, "webhook notification delivered");
                    return Ok(());
                }
                Ok(response) if response.status().is_server_error() => NotifyError::Status {
                    attempts: attempt,
                    status: response.status().as_u16(),
                },
                Ok(response) => {
                    return Err(NotifyError::Status {
                        attempts: attempt,
                        status: response.status().as_u16(),
                    });
                }
                Err(source) => NotifyError::Transport {
                    attempts: attempt,
                    source,
                },
            };

            if attempt >= MAX_ATTEMPTS {
                return Err(last_error);
            }
            let delay = self.backoff_base * 2_u32.pow(attempt - 1);
            warn!(
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %last_error,
                "webhook delivery failed; retrying"
            );
            sleep(delay).await;
            attempt += 1;
        }
    }
}
