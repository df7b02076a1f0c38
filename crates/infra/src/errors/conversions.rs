//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use retrykit_domain::{RetryKitError, TransportKind};

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub RetryKitError);

impl From<InfraError> for RetryKitError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<RetryKitError> for InfraError {
    fn from(value: RetryKitError) -> Self {
        InfraError(value)
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → TransportKind */
/* -------------------------------------------------------------------------- */

/// Categorise a reqwest error that produced no usable response.
pub(crate) fn transport_kind(err: &HttpError) -> TransportKind {
    if err.is_timeout() {
        return TransportKind::Timeout;
    }

    #[cfg(not(target_arch = "wasm32"))]
    if err.is_connect() {
        return TransportKind::Connect;
    }

    if err.is_body() || err.is_decode() {
        return TransportKind::Body;
    }

    TransportKind::Request
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → RetryKitError */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        if value.is_builder() {
            return InfraError(RetryKitError::Config(format!("invalid HTTP client setup: {value}")));
        }
        InfraError(RetryKitError::Network(value.to_string()))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
