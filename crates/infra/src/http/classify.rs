//! Classification of raw HTTP exchanges
//!
//! The client hands every exchange, successful or not, to
//! [`HttpOutcomeClassifier`], which decides whether it counts as a success.

use retrykit_common::{Classification, OutcomeClassifier};
use retrykit_domain::{UpstreamFailure, UpstreamReply};

use crate::errors::conversions::transport_kind;

/// Status and body of a response that was fully received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// 2xx is a success; any other status or a transport error is a failure
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpOutcomeClassifier;

impl OutcomeClassifier<Result<RawResponse, reqwest::Error>> for HttpOutcomeClassifier {
    type Value = UpstreamReply;
    type Error = UpstreamFailure;

    fn classify(
        &self,
        raw: Result<RawResponse, reqwest::Error>,
    ) -> Classification<UpstreamReply, UpstreamFailure> {
        match raw {
            Ok(RawResponse { status, body }) if (200..300).contains(&status) => {
                Classification::Success(UpstreamReply::new(status, body))
            }
            Ok(RawResponse { status, body }) => {
                Classification::Failure(UpstreamFailure::Status { status, body })
            }
            Err(err) => Classification::Failure(UpstreamFailure::transport(
                transport_kind(&err),
                err.to_string(),
            )),
        }
    }
}
