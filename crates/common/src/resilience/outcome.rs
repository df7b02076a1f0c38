//! Terminal results of a retry sequence and fallback composition

use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::error::{ErrorClassification, ErrorSeverity};

/// Errors surfaced when a retry sequence ends without a success value
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RetryError<E> {
    /// Every allowed attempt failed with a retryable error
    #[error("All retry attempts exhausted after {attempts} tries, last error: {last_error}")]
    Exhausted { attempts: u32, last_error: E },

    /// The retry filter rejected the failure; this is the original error
    #[error("Operation failed with non-retryable error on attempt {attempts}: {source}")]
    NonRetryable { attempts: u32, source: E },

    /// The caller abandoned the sequence
    #[error("Retry sequence cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },
}

impl<E> RetryError<E> {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. }
            | Self::NonRetryable { attempts, .. }
            | Self::Cancelled { attempts } => *attempts,
        }
    }

    /// The last failure observed, if the sequence got far enough to see one.
    pub fn last_error(&self) -> Option<&E> {
        match self {
            Self::Exhausted { last_error, .. } => Some(last_error),
            Self::NonRetryable { source, .. } => Some(source),
            Self::Cancelled { .. } => None,
        }
    }

    pub fn into_last_error(self) -> Option<E> {
        match self {
            Self::Exhausted { last_error, .. } => Some(last_error),
            Self::NonRetryable { source, .. } => Some(source),
            Self::Cancelled { .. } => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Stable label for structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Exhausted { .. } => "exhausted",
            Self::NonRetryable { .. } => "non_retryable",
            Self::Cancelled { .. } => "cancelled",
        }
    }
}

impl<E> ErrorClassification for RetryError<E> {
    fn is_retryable(&self) -> bool {
        // A fresh sequence may still succeed once the upstream recovers.
        matches!(self, Self::Exhausted { .. })
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Exhausted { .. } => ErrorSeverity::Warning,
            Self::NonRetryable { .. } => ErrorSeverity::Error,
            Self::Cancelled { .. } => ErrorSeverity::Info,
        }
    }

    fn is_critical(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// Explicit tagged result of a whole retry sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome<T, E> {
    /// An attempt succeeded
    Success { value: T, attempts: u32 },
    /// The filter rejected a failure, returned as-is
    TerminalFailure { error: E, attempts: u32 },
    /// Retryable failures persisted through the attempt ceiling
    Exhausted { last_error: E, attempts: u32 },
    /// The caller cancelled before the sequence finished
    Cancelled { attempts: u32 },
}

impl<T, E> RetryOutcome<T, E> {
    /// Number of attempts actually made, including the first.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Success { attempts, .. }
            | Self::TerminalFailure { attempts, .. }
            | Self::Exhausted { attempts, .. }
            | Self::Cancelled { attempts } => *attempts,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    pub fn is_terminal_failure(&self) -> bool {
        matches!(self, Self::TerminalFailure { .. })
    }

    /// Bind the outcome to `Result`, raising exhaustion, rejection and
    /// cancellation as [`RetryError`].
    pub fn into_result(self) -> Result<T, RetryError<E>> {
        match self {
            Self::Success { value, .. } => Ok(value),
            Self::TerminalFailure { error, attempts } => {
                Err(RetryError::NonRetryable { attempts, source: error })
            }
            Self::Exhausted { last_error, attempts } => {
                Err(RetryError::Exhausted { attempts, last_error })
            }
            Self::Cancelled { attempts } => Err(RetryError::Cancelled { attempts }),
        }
    }

    fn from_error(error: RetryError<E>) -> Self {
        match error {
            RetryError::Exhausted { attempts, last_error } => {
                Self::Exhausted { last_error, attempts }
            }
            RetryError::NonRetryable { attempts, source } => {
                Self::TerminalFailure { error: source, attempts }
            }
            RetryError::Cancelled { attempts } => Self::Cancelled { attempts },
        }
    }

    /// Run `hook` once if the sequence did not succeed, then hand the
    /// outcome back unchanged. Never called mid-sequence.
    #[must_use]
    pub fn inspect_failure<H>(self, hook: H) -> Self
    where
        H: FnOnce(&RetryError<E>),
    {
        let error = match self {
            success @ Self::Success { .. } => return success,
            Self::TerminalFailure { error, attempts } => {
                RetryError::NonRetryable { attempts, source: error }
            }
            Self::Exhausted { last_error, attempts } => {
                RetryError::Exhausted { attempts, last_error }
            }
            Self::Cancelled { attempts } => RetryError::Cancelled { attempts },
        };
        hook(&error);
        Self::from_error(error)
    }

    /// Substitute a value computed from the failure. The result stays
    /// distinguishable from a genuine success.
    pub fn recover<G>(self, fallback: G) -> Resolution<T>
    where
        G: FnOnce(RetryError<E>) -> T,
    {
        match self.into_result() {
            Ok(value) => Resolution::Completed(value),
            Err(error) => Resolution::Recovered(fallback(error)),
        }
    }

    /// Substitute a fixed value on any non-success outcome.
    pub fn recover_with_value(self, value: T) -> Resolution<T> {
        self.recover(|_| value)
    }
}

/// Final value after fallback composition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// The retry sequence itself produced the value
    Completed(T),
    /// A fallback substituted the value after the sequence gave up
    Recovered(T),
}

impl<T> Resolution<T> {
    pub fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered(_))
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Completed(value) | Self::Recovered(value) => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Completed(value) | Self::Recovered(value) => value,
        }
    }
}

/// Outcome of a retry execution together with summary statistics
#[derive(Debug)]
pub struct RetryReport<T, E> {
    pub outcome: RetryOutcome<T, E>,
    /// Sum of all inter-attempt delays actually slept
    pub total_delay: Duration,
    /// Wall-clock start of the first attempt
    pub started_at: DateTime<Utc>,
    /// Time from the first attempt to completion
    pub elapsed: Duration,
}

impl<T, E> RetryReport<T, E> {
    pub fn attempts(&self) -> u32 {
        self.outcome.attempts()
    }

    /// Get the average delay between attempts (excludes operation execution
    /// time).
    pub fn average_delay(&self) -> Duration {
        let attempts = self.attempts();
        if attempts <= 1 {
            return Duration::ZERO;
        }
        self.total_delay / (attempts - 1)
    }

    pub fn into_outcome(self) -> RetryOutcome<T, E> {
        self.outcome
    }
}
