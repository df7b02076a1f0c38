//! Retry demonstration scenarios
//!
//! Six named entry points, each pairing one flaky upstream path with one
//! retry composition. They share a single [`ScenarioService`] and the retry
//! settings it was built with.

pub mod ports;
pub mod service;

use std::time::Duration;

use retrykit_common::RetryError;
use retrykit_domain::constants::{
    PATH_ALWAYS_FAIL, PATH_FAIL_THEN_NOT_FOUND, PATH_FAIL_TWICE, PATH_FAIL_TWICE_SLOW,
};
use retrykit_domain::{UpstreamFailure, UpstreamReply};
use serde::{Deserialize, Serialize};

pub use ports::Upstream;
pub use service::{FailureHook, ScenarioService};

/// Scenario catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioId {
    /// Unconditional retry against an endpoint that always fails
    ExhaustRetries,
    /// Per-attempt logging; the upstream recovers on the third call
    RecoverAfterFailures,
    /// Same as [`Self::RecoverAfterFailures`] with a slow upstream
    RecoverSlowServer,
    /// Per-attempt logging plus a hook that runs once after giving up
    PostFailureHook,
    /// Substitutes a fallback response after giving up
    Fallback,
    /// Retries only the configured status; anything else surfaces at once
    FilteredByStatus,
}

retrykit_domain::impl_slug_conversions!(ScenarioId {
    ExhaustRetries => "test1",
    RecoverAfterFailures => "test2",
    RecoverSlowServer => "test3",
    PostFailureHook => "test4",
    Fallback => "test5",
    FilteredByStatus => "test6",
});

impl ScenarioId {
    pub const fn all() -> [ScenarioId; 6] {
        [
            Self::ExhaustRetries,
            Self::RecoverAfterFailures,
            Self::RecoverSlowServer,
            Self::PostFailureHook,
            Self::Fallback,
            Self::FilteredByStatus,
        ]
    }

    /// Upstream path the scenario calls
    pub const fn upstream_path(&self) -> &'static str {
        match self {
            Self::ExhaustRetries | Self::PostFailureHook | Self::Fallback => PATH_ALWAYS_FAIL,
            Self::RecoverAfterFailures => PATH_FAIL_TWICE,
            Self::RecoverSlowServer => PATH_FAIL_TWICE_SLOW,
            Self::FilteredByStatus => PATH_FAIL_THEN_NOT_FOUND,
        }
    }

    /// Route the scenario is served on, e.g. `/test1`
    pub fn route(&self) -> String {
        format!("/{}", self.as_str())
    }

    /// Whether every attempt is reported to the observer
    pub const fn observes_attempts(&self) -> bool {
        matches!(
            self,
            Self::RecoverAfterFailures
                | Self::RecoverSlowServer
                | Self::PostFailureHook
                | Self::FilteredByStatus
        )
    }
}

/// How a scenario run ended
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioResolution {
    /// An attempt succeeded
    Success(UpstreamReply),
    /// The sequence failed and the fallback supplied this reply
    Recovered(UpstreamReply),
    /// The sequence failed and no fallback applies
    Failed(RetryError<UpstreamFailure>),
}

impl ScenarioResolution {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered(_))
    }

    pub fn reply(&self) -> Option<&UpstreamReply> {
        match self {
            Self::Success(reply) | Self::Recovered(reply) => Some(reply),
            Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&RetryError<UpstreamFailure>> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// Result of one scenario run
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioResult {
    pub scenario: ScenarioId,
    pub resolution: ScenarioResolution,
    /// Upstream calls made, including the first
    pub attempts: u32,
    pub elapsed: Duration,
}
