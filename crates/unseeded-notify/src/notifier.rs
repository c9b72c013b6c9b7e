//! Channel selection for cycle reports.

use unseeded_config::{AppConfig, NotificationKind};

use crate::email::EmailNotifier;
use crate::error::NotifyResult;
use crate::webhook::WebhookNotifier;

/// The configured delivery channel.
#[derive(Debug)]
pub enum Notifier {
    /// JSON POST with retry.
    Webhook(WebhookNotifier),
    /// Plain-text mail.
    Email(EmailNotifier),
}

impl Notifier {
    /// Build the channel named by `notification_type`.
    ///
    /// Returns `Ok(None)` when the selected channel has no configuration
    /// block; reports are then only logged.
    ///
    /// # Errors
    ///
    /// Returns an error when the selected block is present but unusable.
    pub fn from_config(config: &AppConfig) -> NotifyResult<Option<Self>> {
        match config.notification_type {
            NotificationKind::Webhook => config
                .webhook
                .as_ref()
                .map(|webhook| WebhookNotifier::from_config(webhook).map(Self::Webhook))
                .transpose(),
            NotificationKind::Email => config
                .email
                .as_ref()
                .map(|email| EmailNotifier::from_config(email).map(Self::Email))
                .transpose(),
        }
    }

    /// Channel this notifier delivers through.
    #[must_use]
    pub const fn kind(&self) -> NotificationKind {
        match self {
            Self::Webhook(_) => NotificationKind::Webhook,
            Self::Email(_) => NotificationKind::Email,
        }
    }

    /// Deliver one report.
    ///
    /// # Errors
    ///
    /// Propagates the channel's delivery error.
    pub async fn send(&self, text: &str) -> NotifyResult<()> {
        match self {
            Self::Webhook(webhook) => webhook.send(text).await,
            Self::Email(email) => email.send(text).await,
        }
    }
}
