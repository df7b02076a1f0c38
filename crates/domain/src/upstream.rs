//! Upstream reply and failure model
//!
//! One HTTP exchange with the flaky upstream either yields an
//! [`UpstreamReply`] (2xx) or an [`UpstreamFailure`]. Failures expose their
//! status through [`ClassifiableError`] so retry filters can inspect them
//! without knowing this type.

use std::time::Duration;

use retrykit_common::error::{ErrorClassification, ErrorSeverity};
use retrykit_common::ClassifiableError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Successful upstream response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: String,
}

impl UpstreamReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }
}

/// Transport-level failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Connection refused or reset
    Connect,
    /// Client-side timeout elapsed
    Timeout,
    /// Request could not be built or sent
    Request,
    /// Response body could not be read
    Body,
}

crate::impl_slug_conversions!(TransportKind {
    Connect => "connect",
    Timeout => "timeout",
    Request => "request",
    Body => "body",
});

/// A failed upstream attempt
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpstreamFailure {
    /// The upstream answered with a non-2xx status
    #[error("upstream responded with status {status}")]
    Status { status: u16, body: String },

    /// No usable response was received
    #[error("upstream {kind} failure: {message}")]
    Transport { kind: TransportKind, message: String },
}

impl UpstreamFailure {
    pub fn status(status: u16) -> Self {
        Self::Status { status, body: String::new() }
    }

    pub fn transport(kind: TransportKind, message: impl Into<String>) -> Self {
        Self::Transport { kind, message: message.into() }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { .. } => None,
        }
    }
}

impl ClassifiableError for UpstreamFailure {
    fn code(&self) -> Option<u16> {
        self.status_code()
    }
}

impl ErrorClassification for UpstreamFailure {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => matches!(status, 408 | 429 | 500..=599),
            Self::Transport { kind, .. } => !matches!(kind, TransportKind::Request),
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Status { status, .. } if *status >= 500 => ErrorSeverity::Warning,
            Self::Status { .. } => ErrorSeverity::Error,
            Self::Transport { .. } => ErrorSeverity::Warning,
        }
    }

    fn is_critical(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_failure_exposes_code() {
        let failure = UpstreamFailure::status(503);

        assert_eq!(failure.code(), Some(503));
        assert!(!failure.is_transport());
        assert!(failure.is_retryable());
        assert_eq!(failure.to_string(), "upstream responded with status 503");
    }

    /// Validates `UpstreamFailure::transport` classification.
    ///
    /// Assertions:
    /// - Confirms transport failures carry no code and report
    ///   `is_transport()`.
    /// - Confirms the kind slug appears in the message.
    #[test]
    fn test_transport_failure_has_no_code() {
        let failure = UpstreamFailure::transport(TransportKind::Connect, "connection refused");

        assert_eq!(failure.code(), None);
        assert!(failure.is_transport());
        assert_eq!(failure.to_string(), "upstream connect failure: connection refused");
    }

    #[test]
    fn test_not_found_is_not_retryable() {
        let failure = UpstreamFailure::status(404);
        assert!(!failure.is_retryable());
        assert_eq!(failure.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_failure_serializes_with_type_tag() {
        let json = serde_json::to_value(UpstreamFailure::status(404)).unwrap();
        assert_eq!(json["type"], "status");
        assert_eq!(json["status"], 404);
    }
}
