//! Port interfaces for the retry scenarios
//!
//! These traits define the boundary between the scenario catalog and the
//! transport that reaches the flaky upstream.

use async_trait::async_trait;
use retrykit_domain::{UpstreamFailure, UpstreamReply};

/// One-shot access to the flaky upstream
///
/// Implementations perform exactly one exchange per call and never retry on
/// their own; retrying is the scenario's job.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// POST to `path` (relative to the upstream base URL) with an empty body
    async fn post(&self, path: &str) -> Result<UpstreamReply, UpstreamFailure>;
}
