//! Per-attempt observation hooks
//!
//! The executor reports every finished attempt to an optional
//! [`AttemptObserver`]. Observers see a read-only [`AttemptRecord`] and have
//! no way to influence the retry decision.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// How one attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptStatus {
    Succeeded,
    Failed {
        /// Status-like code of the failure, `None` for transport faults
        code: Option<u16>,
        /// Rendered failure for logs
        message: String,
    },
}

impl AttemptStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Snapshot of a single attempt within a retry sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    /// 1-based attempt number
    pub attempt: u32,
    /// Wall-clock time the attempt finished
    pub at: DateTime<Utc>,
    /// Time since the sequence started
    pub elapsed: Duration,
    pub status: AttemptStatus,
    /// Delay before the next attempt, `None` when the sequence stops here
    pub next_delay: Option<Duration>,
}

/// Callback invoked after each attempt.
pub trait AttemptObserver: Send + Sync {
    fn on_attempt(&self, record: &AttemptRecord);
}

impl<F> AttemptObserver for F
where
    F: Fn(&AttemptRecord) + Send + Sync,
{
    fn on_attempt(&self, record: &AttemptRecord) {
        self(record);
    }
}

/// Observer that writes each attempt to `tracing`
#[derive(Debug, Clone)]
pub struct TracingObserver {
    operation: String,
}

impl TracingObserver {
    pub fn new(operation: impl Into<String>) -> Self {
        Self { operation: operation.into() }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }
}

impl AttemptObserver for TracingObserver {
    fn on_attempt(&self, record: &AttemptRecord) {
        match &record.status {
            AttemptStatus::Succeeded => {
                info!(
                    operation = %self.operation,
                    attempt = record.attempt,
                    at = %record.at.to_rfc3339(),
                    elapsed_ms = record.elapsed.as_millis(),
                    "Attempt succeeded"
                );
            }
            AttemptStatus::Failed { code, message } => {
                warn!(
                    operation = %self.operation,
                    attempt = record.attempt,
                    at = %record.at.to_rfc3339(),
                    code = ?code,
                    error = %message,
                    next_delay_ms = record.next_delay.map(|d| d.as_millis()),
                    "Attempt failed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn failed(attempt: u32) -> AttemptRecord {
        AttemptRecord {
            attempt,
            at: Utc::now(),
            elapsed: Duration::from_millis(5),
            status: AttemptStatus::Failed { code: Some(503), message: "503".to_string() },
            next_delay: Some(Duration::from_secs(1)),
        }
    }

    /// Validates that closures act as observers.
    ///
    /// Assertions:
    /// - Confirms the closure receives the record's attempt number.
    #[test]
    fn test_closure_observer() {
        let seen = AtomicU32::new(0);
        let observer = |record: &AttemptRecord| seen.store(record.attempt, Ordering::SeqCst);

        observer.on_attempt(&failed(2));

        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    /// Validates `TracingObserver::new` behavior for the record logging
    /// scenario.
    ///
    /// Assertion coverage: ensures the routine completes without panicking.
    #[test]
    fn test_tracing_observer_records() {
        let observer = TracingObserver::new("flaky");
        assert_eq!(observer.operation(), "flaky");

        observer.on_attempt(&failed(1));
        observer.on_attempt(&AttemptRecord {
            status: AttemptStatus::Succeeded,
            next_delay: None,
            ..failed(2)
        });
    }

    #[test]
    fn test_attempt_status_is_success() {
        assert!(AttemptStatus::Succeeded.is_success());
        assert!(!failed(1).status.is_success());
    }
}
