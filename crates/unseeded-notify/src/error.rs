//! Error types for notification delivery.

use thiserror::Error;

/// Failures while delivering a notification over either channel.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The configured endpoint is not a valid URL.
    #[error("invalid webhook url")]
    InvalidUrl {
        /// Offending value.
        value: String,
    },
    /// The HTTP client could not be constructed.
    #[error("failed to build webhook client")]
    ClientBuild {
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// Every attempt failed in transit.
    #[error("webhook request failed")]
    Transport {
        /// Attempts made before giving up.
        attempts: u32,
        /// Error from the last attempt.
        source: reqwest::Error,
    },
    /// The endpoint answered with a non-success status.
    #[error("webhook rejected notification")]
    Status {
        /// Attempts made before giving up.
        attempts: u32,
        /// Last HTTP status code.
        status: u16,
    },
    /// A configured mail address does not parse.
    #[error("invalid email address")]
    InvalidAddress {
        /// Configuration field holding the address.
        field: &'static str,
        /// Offending value.
        value: String,
    },
    /// The mail message could not be assembled.
    #[error("failed to build email message")]
    MessageBuild {
        /// Underlying lettre error.
        source: lettre::error::Error,
    },
    /// The SMTP relay could not be reached or refused the message.
    #[error("smtp delivery failed")]
    Smtp {
        /// Underlying transport error.
        source: lettre::transport::smtp::Error,
    },
}

/// Convenience alias for notification results.
pub type NotifyResult<T> = Result<T, NotifyError>;
