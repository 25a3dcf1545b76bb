//! Error types for data synchronization

use telemetry::CallStatus;
use thiserror::Error;

/// Result type for data-sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for provider calls
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Failure of a data provider call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Remote call rejected or failed
    #[error("{message}")]
    Backend {
        /// Message reported by the backend
        message: String,
    },

    /// Deadline exceeded
    #[error("{operation} timed out after {after_ms}ms")]
    Timeout {
        /// Operation label
        operation: &'static str,
        /// Configured deadline
        after_ms: u64,
    },

    /// Cancelled before settlement
    #[error("{operation} aborted")]
    Aborted {
        /// Operation label
        operation: &'static str,
    },

    /// Row failed validation at the provider boundary
    #[error("{0}")]
    InvalidRecord(String),
}

impl ProviderError {
    /// Backend failure with the given message
    pub fn backend(message: impl Into<String>) -> Self {
        ProviderError::Backend {
            message: message.into(),
        }
    }

    /// Telemetry status for this failure
    pub fn status(&self) -> CallStatus {
        match self {
            ProviderError::Timeout { .. } => CallStatus::Timeout,
            ProviderError::Aborted { .. } => CallStatus::Aborted,
            ProviderError::Backend { .. } | ProviderError::InvalidRecord(_) => CallStatus::Error,
        }
    }
}

impl From<books_core::Error> for ProviderError {
    fn from(err: books_core::Error) -> Self {
        ProviderError::InvalidRecord(err.to_string())
    }
}

/// Data-sync errors
#[derive(Error, Debug)]
pub enum Error {
    /// Provider call failed
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Domain record error
    #[error("Domain error: {0}")]
    Domain(#[from] books_core::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ProviderError::backend("boom").status(), CallStatus::Error);
        assert_eq!(
            ProviderError::Timeout { operation: "listAccounts", after_ms: 50 }.status(),
            CallStatus::Timeout
        );
        assert_eq!(
            ProviderError::Aborted { operation: "listAccounts" }.status(),
            CallStatus::Aborted
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(ProviderError::backend("permission denied").to_string(), "permission denied");
        assert_eq!(
            ProviderError::Timeout { operation: "listCategories", after_ms: 250 }.to_string(),
            "listCategories timed out after 250ms"
        );
    }
}
