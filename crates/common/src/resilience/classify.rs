//! Outcome classification for retryable operations
//!
//! A finished attempt is reduced to one of two shapes before the retry
//! policy sees it: [`Classification::Success`] stops the sequence, and
//! [`Classification::Failure`] hands the error to the policy's filter. The
//! filter only ever looks at failures through [`ClassifiableError`], so the
//! executor never needs to know the concrete error type.

/// Minimal capability the retry filter may inspect on a failure.
pub trait ClassifiableError {
    /// Status-like code carried by the failure, if any (for HTTP: the
    /// response status).
    fn code(&self) -> Option<u16>;

    /// Whether the failure happened below the application protocol
    /// (connection refused, timeout, broken body).
    fn is_transport(&self) -> bool {
        self.code().is_none()
    }
}

/// Bare status codes are the simplest classifiable failure.
impl ClassifiableError for u16 {
    fn code(&self) -> Option<u16> {
        Some(*self)
    }
}

impl<E: ClassifiableError + ?Sized> ClassifiableError for &E {
    fn code(&self) -> Option<u16> {
        (**self).code()
    }

    fn is_transport(&self) -> bool {
        (**self).is_transport()
    }
}

/// Label attached to one completed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification<T, E> {
    /// The attempt succeeded; stop immediately.
    Success(T),
    /// The attempt failed; the detail goes to the retry filter.
    Failure(E),
}

impl<T, E> Classification<T, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(error) => Err(error),
        }
    }
}

impl<T, E> From<Result<T, E>> for Classification<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(error) => Self::Failure(error),
        }
    }
}

/// Turns a raw attempt result into a [`Classification`].
///
/// Implementations must be pure: no I/O, no logging, no shared state. Every
/// outcome the caller does not consider a success must become a `Failure`
/// carrying enough of the original cause for filtering and logging.
pub trait OutcomeClassifier<R> {
    /// Value yielded by a successful attempt.
    type Value;
    /// Failure detail handed to the retry filter.
    type Error;

    fn classify(&self, raw: R) -> Classification<Self::Value, Self::Error>;
}

/// Classifier for operations that already return `Result`: `Ok` is success,
/// `Err` is failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultClassifier;

impl<T, E> OutcomeClassifier<Result<T, E>> for ResultClassifier {
    type Value = T;
    type Error = E;

    fn classify(&self, raw: Result<T, E>) -> Classification<T, E> {
        Classification::from(raw)
    }
}
