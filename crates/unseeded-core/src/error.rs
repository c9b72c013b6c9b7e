//! Error types for backend communication.

use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};

use thiserror::Error;

/// Failure while talking to a torrent backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Host and port do not form a usable URL.
    #[error("invalid backend endpoint")]
    InvalidEndpoint {
        /// Offending endpoint text.
        value: String,
    },
    /// The backend could not be reached or the handshake failed in transit.
    #[error("backend connection failed")]
    Connection {
        /// Request that failed.
        operation: &'static str,
        /// Underlying transport error.
        source: reqwest::Error,
    },
    /// The backend refused the configured credentials.
    #[error("backend rejected credentials")]
    AuthenticationRejected {
        /// Request that was refused.
        operation: &'static str,
    },
    /// A data request failed in transit or could not be decoded.
    #[error("backend request failed")]
    DataFetch {
        /// Request that failed.
        operation: &'static str,
        /// Underlying transport or decoding error.
        source: reqwest::Error,
    },
    /// The backend answered, but not in the expected shape.
    #[error("unexpected backend response")]
    UnexpectedResponse {
        /// Request that produced the response.
        operation: &'static str,
        /// Status line or result text returned by the backend.
        detail: String,
    },
}

impl BackendError {
    /// Single-line description including context fields and the source chain.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut message = self.to_string();
        match self {
            Self::InvalidEndpoint { value } => {
                message.push_str(&format!(" ({value})"));
            }
            Self::UnexpectedResponse { operation, detail } => {
                message.push_str(&format!(" ({operation}: {detail})"));
            }
            Self::AuthenticationRejected { operation }
            | Self::Connection { operation, .. }
            | Self::DataFetch { operation, .. } => {
                message.push_str(&format!(" ({operation})"));
            }
        }
        let mut source = self.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}

/// Convenience alias for backend results.
pub type BackendResult<T> = Result<T, BackendError>;

/// Phase of a backend exchange that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Authentication or handshake.
    Connect,
    /// Listing torrents.
    Fetch,
}

/// Backend failure attributed to a configured service.
#[derive(Debug)]
pub struct ServiceFailure {
    /// Configured service name.
    pub service: String,
    /// Phase that failed.
    pub stage: FailureStage,
    /// Underlying error.
    pub error: BackendError,
}

impl ServiceFailure {
    /// Attribute an error to a service and phase.
    #[must_use]
    pub fn new(service: impl Into<String>, stage: FailureStage, error: BackendError) -> Self {
        Self {
            service: service.into(),
            stage,
            error,
        }
    }
}

impl Display for ServiceFailure {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self.stage {
            FailureStage::Connect => write!(
                formatter,
                "unable to connect to {}: {}",
                self.service,
                self.error.describe()
            ),
            FailureStage::Fetch => write!(
                formatter,
                "failed to fetch torrent data from {}: {}",
                self.service,
                self.error.describe()
            ),
        }
    }
}

impl StdError for ServiceFailure {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.error)
    }
}
