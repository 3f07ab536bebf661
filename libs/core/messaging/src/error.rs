//! Error types for brokers and message handling.

use std::fmt;
use thiserror::Error;

/// Broker-level failures.
#[derive(Debug, Error)]
pub enum MessagingError {
    /// Broker unreachable or rejected the operation
    #[error("broker unavailable: {0}")]
    Unavailable(String),

    #[error("failed to subscribe to '{subject}': {message}")]
    Subscribe { subject: String, message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("consumer stopped: {0}")]
    ConsumerStopped(String),

    #[error("metrics setup failed: {0}")]
    Metrics(String),
}

/// How a failed message should be accounted for.
///
/// Messages are never redelivered; the category only drives log level
/// and the `category` metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Storage or downstream failure that might succeed later
    Transient,
    /// Payload can never be processed
    Permanent,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Transient => write!(f, "transient"),
            ErrorCategory::Permanent => write!(f, "permanent"),
        }
    }
}

/// Error returned by an [`EventHandler`](crate::EventHandler).
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(String),
}

impl ProcessingError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ProcessingError::InvalidPayload(_) | ProcessingError::Serialization(_) => {
                ErrorCategory::Permanent
            }
            ProcessingError::Storage(_) => ErrorCategory::Transient,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_error_category() {
        assert_eq!(
            ProcessingError::InvalidPayload("no type".into()).category(),
            ErrorCategory::Permanent
        );
        assert_eq!(
            ProcessingError::Storage("pool timed out".into()).category(),
            ErrorCategory::Transient
        );
        let bad_json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(
            ProcessingError::from(bad_json).category(),
            ErrorCategory::Permanent
        );
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ErrorCategory::Transient.to_string(), "transient");
        assert_eq!(ErrorCategory::Permanent.to_string(), "permanent");
    }
}
