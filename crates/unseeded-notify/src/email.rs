//! SMTP delivery.

use std::fmt::{self, Debug, Formatter};
use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;
use unseeded_config::EmailConfig;

use crate::error::{NotifyError, NotifyResult};
use crate::webhook::DEFAULT_TITLE;

const IMPLICIT_TLS_PORT: u16 = 465;

/// How the SMTP session is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    /// TLS from the first byte (SMTPS).
    Implicit,
    /// Plain connection upgraded with `STARTTLS`.
    StartTls,
}

impl SmtpSecurity {
    /// Port 465 is SMTPS; every other port negotiates `STARTTLS`.
    #[must_use]
    pub const fn for_port(port: u16) -> Self {
        if port == IMPLICIT_TLS_PORT {
            Self::Implicit
        } else {
            Self::StartTls
        }
    }
}

/// Sends reports as plain-text mail through an authenticated relay.
pub struct EmailNotifier {
    host: String,
    port: u16,
    username: String,
    password: String,
    from: Mailbox,
    to: Mailbox,
    subject: String,
    timeout: Duration,
}

impl Debug for EmailNotifier {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("EmailNotifier")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("from", &self.from)
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}

impl EmailNotifier {
    /// Build a notifier from its configuration block.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::InvalidAddress`] when the sender or recipient
    /// does not parse as a mailbox.
    pub fn from_config(config: &EmailConfig) -> NotifyResult<Self> {
        let from = mailbox("from", config.sender())?;
        let to = mailbox("to", &config.to)?;
        let subject = config
            .subject
            .as_deref()
            .map(str::trim)
            .filter(|subject| !subject.is_empty())
            .unwrap_or(DEFAULT_TITLE)
            .to_string();
        Ok(Self {
            host: config.smtp_host.trim().to_string(),
            port: config.smtp_port,
            username: config.username.clone(),
            password: config.password.clone(),
            from,
            to,
            subject,
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
        })
    }

    /// Session security chosen from the configured port.
    #[must_use]
    pub const fn security(&self) -> SmtpSecurity {
        SmtpSecurity::for_port(self.port)
    }

    /// Assemble the message for `text` without sending it.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::MessageBuild`] when lettre rejects the headers.
    pub fn message(&self, text: &str) -> NotifyResult<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(self.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(text.to_string())
            .map_err(|source| NotifyError::MessageBuild { source })
    }

    /// Deliver `text` in a single attempt.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Smtp`] when the relay cannot be reached, the
    /// TLS handshake or login fails, or the message is refused.
    pub async fn send(&self, text: &str) -> NotifyResult<()> {
        let message = self.message(text)?;
        let builder = match self.security() {
            SmtpSecurity::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host),
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
            }
        }
        .map_err(|source| NotifyError::Smtp { source })?;
        let transport = builder
            .port(self.port)
            .credentials(Credentials::new(
                self.username.clone(),
                self.password.clone(),
            ))
            .timeout(Some(self.timeout))
            .build();

        transport
            .send(message)
            .await
            .map_err(|source| NotifyError::Smtp { source })?;
        info!(
            host = %self.host,
            port = self.port,
            security = ?self.security(),
            "email notification delivered"
        );
        Ok(())
    }
}

fn mailbox(field: &'static str, value: &str) -> NotifyResult<Mailbox> {
    value
        .trim()
        .parse()
        .map_err(|_| NotifyError::InvalidAddress {
            field,
            value: value.to_string(),
        })
}
