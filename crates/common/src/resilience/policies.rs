//! Pre-defined retry filters for common scenarios
//!
//! A filter answers one question: may this failure be retried? The attempt
//! ceiling and delays live in [`RetryConfig`](super::RetryConfig); a filter
//! never sees them.

use std::collections::BTreeSet;

use super::classify::ClassifiableError;

/// Decides whether a single failure qualifies for another attempt.
pub trait RetryFilter<E> {
    fn should_retry(&self, error: &E) -> bool;
}

/// Always retry policy - retries on any error
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRetry;

impl<E> RetryFilter<E> for AlwaysRetry {
    fn should_retry(&self, _error: &E) -> bool {
        true
    }
}

/// Never retry policy - never retries
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverRetry;

impl<E> RetryFilter<E> for NeverRetry {
    fn should_retry(&self, _error: &E) -> bool {
        false
    }
}

/// Predicate-based retry policy
#[derive(Debug, Clone)]
pub struct PredicateRetry<F> {
    predicate: F,
}

impl<F> PredicateRetry<F> {
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F, E> RetryFilter<E> for PredicateRetry<F>
where
    F: Fn(&E) -> bool,
{
    fn should_retry(&self, error: &E) -> bool {
        (self.predicate)(error)
    }
}

/// Retries only failures whose code is in the configured set.
///
/// Transport faults carry no code, so they are rejected unless
/// [`retry_transport`](Self::retry_transport) opts them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCodeRetry {
    codes: BTreeSet<u16>,
    retry_transport: bool,
}

impl StatusCodeRetry {
    pub fn new<I>(codes: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        Self { codes: codes.into_iter().collect(), retry_transport: false }
    }

    /// Retry only when the failure carries exactly `code`.
    pub fn only(code: u16) -> Self {
        Self::new([code])
    }

    #[must_use]
    pub fn retry_transport(mut self, retry: bool) -> Self {
        self.retry_transport = retry;
        self
    }

    pub fn codes(&self) -> impl Iterator<Item = u16> + '_ {
        self.codes.iter().copied()
    }
}

impl<E: ClassifiableError> RetryFilter<E> for StatusCodeRetry {
    fn should_retry(&self, error: &E) -> bool {
        match error.code() {
            Some(code) => self.codes.contains(&code),
            None => self.retry_transport,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Timeout;

    impl ClassifiableError for Timeout {
        fn code(&self) -> Option<u16> {
            None
        }
    }

    #[test]
    fn test_always_and_never_retry() {
        assert!(RetryFilter::<u16>::should_retry(&AlwaysRetry, &404));
        assert!(!RetryFilter::<u16>::should_retry(&NeverRetry, &503));
    }

    /// Validates `PredicateRetry::new` behavior for the predicate retry
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures a 5xx code is retried.
    /// - Ensures a 4xx code is rejected.
    #[test]
    fn test_predicate_retry() {
        let filter = PredicateRetry::new(|code: &u16| *code >= 500);

        assert!(filter.should_retry(&503));
        assert!(!filter.should_retry(&404));
    }

    /// Validates `StatusCodeRetry::only` behavior for the retry only on 503
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures `503` is retried.
    /// - Ensures `404` is rejected.
    /// - Ensures transport faults are rejected by default.
    #[test]
    fn test_status_code_retry_only_503() {
        let filter = StatusCodeRetry::only(503);

        assert!(filter.should_retry(&503u16));
        assert!(!filter.should_retry(&404u16));
        assert!(!filter.should_retry(&Timeout));
    }

    #[test]
    fn test_status_code_retry_with_transport() {
        let filter = StatusCodeRetry::new([502, 503, 504]).retry_transport(true);

        assert!(filter.should_retry(&504u16));
        assert!(!filter.should_retry(&404u16));
        assert!(filter.should_retry(&Timeout));
        assert_eq!(filter.codes().collect::<Vec<_>>(), vec![502, 503, 504]);
    }
}
