//! Scenario runner
//!
//! Builds the retry composition for a scenario and drives it against the
//! injected [`Upstream`].

use std::sync::Arc;

use retrykit_common::{
    RetryConfig, RetryError, RetryExecutor, RetryFilter, RetryOutcome, RetryPolicy,
    StatusCodeRetry, TracingObserver,
};
use retrykit_domain::constants::{FALLBACK_BODY, FALLBACK_STATUS};
use retrykit_domain::{Result, RetrySettings, UpstreamFailure, UpstreamReply};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use super::ports::Upstream;
use super::{ScenarioId, ScenarioResolution, ScenarioResult};

/// Callback run once when the post-failure hook scenario gives up
pub type FailureHook = Arc<dyn Fn(ScenarioId, &RetryError<UpstreamFailure>) + Send + Sync>;

/// Runs the scenario catalog against one upstream
///
/// Holds no per-run state, so concurrent runs never share attempt counters
/// or delays.
pub struct ScenarioService {
    upstream: Arc<dyn Upstream>,
    config: RetryConfig,
    retry_status: u16,
    failure_hook: Option<FailureHook>,
}

impl ScenarioService {
    /// Create a service; fails if `settings` do not form a valid policy.
    pub fn new(upstream: Arc<dyn Upstream>, settings: &RetrySettings) -> Result<Self> {
        let config = settings.to_retry_config()?;
        Ok(Self { upstream, config, retry_status: settings.retry_status, failure_hook: None })
    }

    /// Also call `hook` when [`ScenarioId::PostFailureHook`] fails.
    #[must_use]
    pub fn with_failure_hook(mut self, hook: FailureHook) -> Self {
        self.failure_hook = Some(hook);
        self
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn retry_status(&self) -> u16 {
        self.retry_status
    }

    /// Run a scenario to completion.
    pub async fn run(&self, id: ScenarioId) -> ScenarioResult {
        self.run_with_cancellation(id, &CancellationToken::new()).await
    }

    /// Run a scenario, abandoning it when `token` is cancelled.
    #[instrument(skip(self, token), fields(scenario = %id))]
    pub async fn run_with_cancellation(
        &self,
        id: ScenarioId,
        token: &CancellationToken,
    ) -> ScenarioResult {
        let started = Instant::now();

        let (resolution, attempts) = match id {
            ScenarioId::FilteredByStatus => {
                let policy = RetryPolicy::with_filter(
                    self.config.clone(),
                    StatusCodeRetry::only(self.retry_status),
                );
                let outcome = self.attempt(id, policy, token).await;
                settle(outcome)
            }
            ScenarioId::PostFailureHook => {
                let outcome = self
                    .attempt(id, RetryPolicy::new(self.config.clone()), token)
                    .await
                    .inspect_failure(|err| {
                        error!(
                            scenario = %id,
                            attempts = err.attempts(),
                            error = %err,
                            "Retry sequence failed"
                        );
                        if let Some(hook) = &self.failure_hook {
                            hook(id, err);
                        }
                    });
                settle(outcome)
            }
            ScenarioId::Fallback => {
                let outcome = self.attempt(id, RetryPolicy::new(self.config.clone()), token).await;
                let attempts = outcome.attempts();
                let resolution = outcome.recover(|err| {
                    info!(scenario = %id, error = %err, "Substituting fallback response");
                    UpstreamReply::new(FALLBACK_STATUS, FALLBACK_BODY)
                });
                if resolution.is_recovered() {
                    (ScenarioResolution::Recovered(resolution.into_inner()), attempts)
                } else {
                    (ScenarioResolution::Success(resolution.into_inner()), attempts)
                }
            }
            ScenarioId::ExhaustRetries
            | ScenarioId::RecoverAfterFailures
            | ScenarioId::RecoverSlowServer => {
                let outcome = self.attempt(id, RetryPolicy::new(self.config.clone()), token).await;
                settle(outcome)
            }
        };

        let result = ScenarioResult { scenario: id, resolution, attempts, elapsed: started.elapsed() };
        info!(
            attempts = result.attempts,
            elapsed_ms = u64::try_from(result.elapsed.as_millis()).unwrap_or(u64::MAX),
            success = result.resolution.is_success(),
            recovered = result.resolution.is_recovered(),
            "Scenario finished"
        );
        result
    }

    async fn attempt<F>(
        &self,
        id: ScenarioId,
        policy: RetryPolicy<F>,
        token: &CancellationToken,
    ) -> RetryOutcome<UpstreamReply, UpstreamFailure>
    where
        F: RetryFilter<UpstreamFailure>,
    {
        let mut executor = RetryExecutor::new(policy).named(id.as_str());
        if id.observes_attempts() {
            executor = executor.with_observer(Arc::new(TracingObserver::new(id.as_str())));
        }

        let upstream = &self.upstream;
        let path = id.upstream_path();
        executor.execute_with_cancellation(token, move || upstream.post(path)).await
    }
}

impl std::fmt::Debug for ScenarioService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioService")
            .field("config", &self.config)
            .field("retry_status", &self.retry_status)
            .field("failure_hook", &self.failure_hook.is_some())
            .finish_non_exhaustive()
    }
}

fn settle(outcome: RetryOutcome<UpstreamReply, UpstreamFailure>) -> (ScenarioResolution, u32) {
    let attempts = outcome.attempts();
    let resolution = match outcome.into_result() {
        Ok(reply) => ScenarioResolution::Success(reply),
        Err(err) => ScenarioResolution::Failed(err),
    };
    (resolution, attempts)
}
