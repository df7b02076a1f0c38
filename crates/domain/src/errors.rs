//! Error types used throughout the application

use retrykit_common::error::CommonError;
use retrykit_common::RetryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::upstream::UpstreamFailure;

/// Main error type for retrykit
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum RetryKitError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Retries exhausted: {0}")]
    RetriesExhausted(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for retrykit operations
pub type Result<T> = std::result::Result<T, RetryKitError>;

impl From<CommonError> for RetryKitError {
    fn from(err: CommonError) -> Self {
        match err {
            CommonError::Config { .. } | CommonError::Serialization { .. } => {
                Self::Config(err.to_string())
            }
            CommonError::Validation { .. } => Self::InvalidInput(err.to_string()),
            CommonError::Timeout { .. } => Self::Network(err.to_string()),
            CommonError::Internal { .. } => Self::Internal(err.to_string()),
        }
    }
}

impl From<UpstreamFailure> for RetryKitError {
    fn from(failure: UpstreamFailure) -> Self {
        match failure {
            UpstreamFailure::Status { .. } => Self::Upstream(failure.to_string()),
            UpstreamFailure::Transport { .. } => Self::Network(failure.to_string()),
        }
    }
}

impl From<RetryError<UpstreamFailure>> for RetryKitError {
    fn from(err: RetryError<UpstreamFailure>) -> Self {
        match err {
            RetryError::Exhausted { .. } => Self::RetriesExhausted(err.to_string()),
            RetryError::NonRetryable { source, .. } => source.into(),
            RetryError::Cancelled { .. } => Self::Internal(err.to_string()),
        }
    }
}
