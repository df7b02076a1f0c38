//! Generic retry engine: backoff configuration, policy evaluation and the
//! attempt loop
//!
//! A retry sequence is driven by [`RetryExecutor`]. It invokes the
//! operation, asks its [`RetryPolicy`] what to do with each failure, sleeps
//! for the computed delay and loops until a success, a rejected failure, the
//! attempt ceiling or cancellation ends the sequence. The result is always an
//! explicit [`RetryOutcome`]; nothing is raised unless the caller asks for
//! [`RetryOutcome::into_result`].
//!
//! `max_attempts` counts every attempt including the first, so
//! `max_attempts = 3` means one initial call and at most two retries.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::classify::{ClassifiableError, OutcomeClassifier};
use super::observer::{AttemptObserver, AttemptRecord, AttemptStatus};
use super::outcome::{RetryOutcome, RetryReport};
use super::policies::{AlwaysRetry, RetryFilter};
use crate::error::{CommonError, CommonResult};

/// Default attempt ceiling, including the first attempt
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default fixed delay between attempts
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// Backoff strategy for calculating retry delays
#[derive(Debug, Clone)]
#[allow(unpredictable_function_pointer_comparisons)]
#[derive(PartialEq)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed(Duration),
    /// Linear backoff: initial_delay + (retry * increment)
    Linear { initial_delay: Duration, increment: Duration },
    /// Exponential backoff: initial_delay * base^retry, capped at max_delay
    Exponential { initial_delay: Duration, base: f64, max_delay: Duration },
    /// Custom backoff function
    Custom(fn(u32) -> Duration),
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        Self::Fixed(DEFAULT_DELAY)
    }
}

impl BackoffStrategy {
    /// Calculate the delay before retry number `retry` (0-based: the wait
    /// after the first failed attempt is `retry = 0`).
    pub fn calculate_delay(&self, retry: u32) -> Duration {
        match self {
            BackoffStrategy::Fixed(delay) => *delay,
            BackoffStrategy::Linear { initial_delay, increment } => {
                initial_delay.saturating_add(increment.saturating_mul(retry))
            }
            BackoffStrategy::Exponential { initial_delay, base, max_delay } => {
                let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
                let delay_ms = initial_delay.as_millis() as f64 * base.powi(exponent);
                let capped_ms = delay_ms.min(max_delay.as_millis() as f64);
                Duration::from_millis(capped_ms as u64)
            }
            BackoffStrategy::Custom(f) => f(retry),
        }
    }
}

/// Jitter type for adding randomness to retry delays
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Jitter {
    /// No jitter
    #[default]
    None,
    /// Full jitter: 0 to calculated_delay
    Full,
    /// Equal jitter: calculated_delay/2 to calculated_delay
    Equal,
    /// Decorrelated jitter: base to 3 * previous delay
    Decorrelated { base: Duration },
}

impl Jitter {
    /// Apply jitter to the calculated delay
    pub fn apply(&self, delay: Duration, retry: u32) -> Duration {
        match self {
            Jitter::None => delay,
            Jitter::Full => Duration::from_millis(random_up_to(millis(delay))),
            Jitter::Equal => {
                let half = millis(delay) / 2;
                Duration::from_millis(half + random_up_to(half))
            }
            Jitter::Decorrelated { base } => {
                let previous = if retry == 0 { *base } else { delay };
                let spread = millis(previous).saturating_mul(3).saturating_sub(millis(*base));
                Duration::from_millis(millis(*base) + random_up_to(spread))
            }
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn random_up_to(max: u64) -> u64 {
    if max == 0 {
        return 0;
    }
    rand::thread_rng().gen_range(0..=max)
}

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Backoff strategy for calculating delays
    pub backoff: BackoffStrategy,
    /// Jitter type for randomizing delays
    pub jitter: Jitter,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: BackoffStrategy::default(),
            jitter: Jitter::None,
        }
    }
}

impl RetryConfig {
    /// Create a configuration builder
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Fixed delay, no jitter. Fails when `max_attempts` is zero.
    pub fn fixed(max_attempts: u32, delay: Duration) -> CommonResult<Self> {
        Self::builder().max_attempts(max_attempts).fixed_delay(delay).build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> CommonResult<()> {
        if self.max_attempts == 0 {
            return Err(CommonError::validation_with_value(
                "max_attempts",
                "must be at least 1",
                self.max_attempts.to_string(),
            ));
        }

        match &self.backoff {
            BackoffStrategy::Exponential { base, .. } if !(base.is_finite() && *base > 0.0) => {
                Err(CommonError::validation_with_value(
                    "backoff.base",
                    "exponential base must be greater than 0",
                    base.to_string(),
                ))
            }
            _ => Ok(()),
        }
    }

    /// Delay to wait before retry number `retry` (0-based), jitter applied.
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.jitter.apply(self.backoff.calculate_delay(retry), retry)
    }
}

/// Builder for RetryConfig with fluent API
#[derive(Debug, Default)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl RetryConfigBuilder {
    pub fn new() -> Self {
        Self { config: RetryConfig::default() }
    }

    /// Total attempts including the first.
    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    /// Retries after the first attempt; `max_retries(3)` allows 4 attempts.
    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_attempts = retries.saturating_add(1);
        self
    }

    #[must_use]
    pub fn fixed_delay(mut self, delay: Duration) -> Self {
        self.config.backoff = BackoffStrategy::Fixed(delay);
        self
    }

    #[must_use]
    pub fn linear_backoff(mut self, initial_delay: Duration, increment: Duration) -> Self {
        self.config.backoff = BackoffStrategy::Linear { initial_delay, increment };
        self
    }

    #[must_use]
    pub fn exponential_backoff(
        mut self,
        initial_delay: Duration,
        base: f64,
        max_delay: Duration,
    ) -> Self {
        self.config.backoff = BackoffStrategy::Exponential { initial_delay, base, max_delay };
        self
    }

    #[must_use]
    pub fn custom_backoff(mut self, f: fn(u32) -> Duration) -> Self {
        self.config.backoff = BackoffStrategy::Custom(f);
        self
    }

    #[must_use]
    pub fn backoff(mut self, backoff: BackoffStrategy) -> Self {
        self.config.backoff = backoff;
        self
    }

    #[must_use]
    pub fn jitter(mut self, jitter: Jitter) -> Self {
        self.config.jitter = jitter;
        self
    }

    #[must_use]
    pub fn no_jitter(self) -> Self {
        self.jitter(Jitter::None)
    }

    #[must_use]
    pub fn full_jitter(self) -> Self {
        self.jitter(Jitter::Full)
    }

    #[must_use]
    pub fn equal_jitter(self) -> Self {
        self.jitter(Jitter::Equal)
    }

    #[must_use]
    pub fn decorrelated_jitter(self, base: Duration) -> Self {
        self.jitter(Jitter::Decorrelated { base })
    }

    pub fn build(self) -> CommonResult<RetryConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Why a sequence stops on a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiveUpReason {
    /// The filter does not consider this failure retryable
    Rejected,
    /// The attempt ceiling has been reached
    Exhausted,
}

/// Decision for one failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait `delay`, then attempt again
    Retry { delay: Duration },
    /// Stop and surface the failure
    GiveUp(GiveUpReason),
}

/// Immutable retry policy: attempt ceiling, delays and a failure filter.
#[derive(Debug, Clone)]
pub struct RetryPolicy<F = AlwaysRetry> {
    config: RetryConfig,
    filter: F,
}

impl RetryPolicy<AlwaysRetry> {
    /// Policy that retries every failure up to the ceiling.
    pub fn new(config: RetryConfig) -> Self {
        Self { config, filter: AlwaysRetry }
    }
}

impl Default for RetryPolicy<AlwaysRetry> {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

impl<F> RetryPolicy<F> {
    pub fn with_filter(config: RetryConfig, filter: F) -> Self {
        Self { config, filter }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts
    }

    /// Decide what to do after the `attempts_made`-th attempt failed with
    /// `error`.
    ///
    /// The filter runs before the ceiling check: a rejected failure on the
    /// last allowed attempt is still surfaced as itself, not as exhaustion.
    pub fn evaluate<E>(&self, error: &E, attempts_made: u32) -> RetryDecision
    where
        F: RetryFilter<E>,
    {
        if !self.filter.should_retry(error) {
            return RetryDecision::GiveUp(GiveUpReason::Rejected);
        }
        if attempts_made >= self.config.max_attempts {
            return RetryDecision::GiveUp(GiveUpReason::Exhausted);
        }
        RetryDecision::Retry { delay: self.config.delay_for(attempts_made.saturating_sub(1)) }
    }
}

/// Per-sequence bookkeeping. Never shared between sequences.
#[derive(Debug)]
struct RetryContext {
    id: Uuid,
    attempt: u32,
    started: Instant,
    started_at: DateTime<Utc>,
    total_delay: Duration,
}

impl RetryContext {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            attempt: 0,
            started: Instant::now(),
            started_at: Utc::now(),
            total_delay: Duration::ZERO,
        }
    }

    fn report<T, E>(&self, outcome: RetryOutcome<T, E>) -> RetryReport<T, E> {
        RetryReport {
            outcome,
            total_delay: self.total_delay,
            started_at: self.started_at,
            elapsed: self.started.elapsed(),
        }
    }
}

/// The main retry executor
pub struct RetryExecutor<F = AlwaysRetry> {
    policy: RetryPolicy<F>,
    observer: Option<Arc<dyn AttemptObserver>>,
    operation: String,
}

impl<F: fmt::Debug> fmt::Debug for RetryExecutor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("policy", &self.policy)
            .field("observer", &self.observer.is_some())
            .field("operation", &self.operation)
            .finish()
    }
}

impl<F> RetryExecutor<F> {
    /// Create a new retry executor for the given policy
    pub fn new(policy: RetryPolicy<F>) -> Self {
        Self { policy, observer: None, operation: "operation".to_string() }
    }

    /// Name used in log fields
    #[must_use]
    pub fn named(mut self, operation: impl Into<String>) -> Self {
        self.operation = operation.into();
        self
    }

    /// Attach an observer that is told about every attempt
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn AttemptObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn policy(&self) -> &RetryPolicy<F> {
        &self.policy
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Execute an operation with retry logic
    pub async fn execute<Op, Fut, T, E>(&self, operation: Op) -> RetryOutcome<T, E>
    where
        F: RetryFilter<E>,
        E: ClassifiableError + fmt::Display,
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run(None, operation).await.outcome
    }

    /// Execute with retry logic until `token` is cancelled.
    ///
    /// Cancellation releases a pending delay immediately. An attempt that is
    /// already running is allowed to finish; its result is discarded.
    pub async fn execute_with_cancellation<Op, Fut, T, E>(
        &self,
        token: &CancellationToken,
        operation: Op,
    ) -> RetryOutcome<T, E>
    where
        F: RetryFilter<E>,
        E: ClassifiableError + fmt::Display,
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run(Some(token), operation).await.outcome
    }

    /// Execute an operation yielding raw results, labelled by `classifier`.
    pub async fn execute_classified<C, R, Op, Fut>(
        &self,
        classifier: &C,
        mut operation: Op,
    ) -> RetryOutcome<C::Value, C::Error>
    where
        C: OutcomeClassifier<R>,
        C::Error: ClassifiableError + fmt::Display,
        F: RetryFilter<C::Error>,
        Op: FnMut() -> Fut,
        Fut: Future<Output = R>,
    {
        self.execute(|| {
            let attempt = operation();
            async move { classifier.classify(attempt.await).into_result() }
        })
        .await
    }

    /// Execute with retry logic and return outcome statistics.
    pub async fn execute_with_report<Op, Fut, T, E>(&self, operation: Op) -> RetryReport<T, E>
    where
        F: RetryFilter<E>,
        E: ClassifiableError + fmt::Display,
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run(None, operation).await
    }

    #[instrument(
        skip_all,
        fields(operation = %self.operation, max_attempts = self.policy.max_attempts())
    )]
    async fn run<Op, Fut, T, E>(
        &self,
        cancel: Option<&CancellationToken>,
        mut operation: Op,
    ) -> RetryReport<T, E>
    where
        F: RetryFilter<E>,
        E: ClassifiableError + fmt::Display,
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut context = RetryContext::new();

        loop {
            if is_cancelled(cancel) {
                debug!(sequence = %context.id, attempts = context.attempt, "Retry sequence cancelled");
                return context.report(RetryOutcome::Cancelled { attempts: context.attempt });
            }

            let attempt = context.attempt + 1;
            debug!(
                sequence = %context.id,
                "Executing operation (attempt {}/{})",
                attempt,
                self.policy.max_attempts()
            );

            let result = operation().await;
            context.attempt = attempt;

            if is_cancelled(cancel) {
                debug!(
                    sequence = %context.id,
                    attempt,
                    "Retry sequence cancelled during attempt, discarding result"
                );
                return context.report(RetryOutcome::Cancelled { attempts: attempt });
            }

            let error = match result {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(sequence = %context.id, "Operation succeeded after {} retries", attempt - 1);
                    }
                    self.notify(&context, AttemptStatus::Succeeded, None);
                    return context.report(RetryOutcome::Success { value, attempts: attempt });
                }
                Err(error) => error,
            };

            let decision = self.policy.evaluate(&error, attempt);
            let next_delay = match decision {
                RetryDecision::Retry { delay } => Some(delay),
                RetryDecision::GiveUp(_) => None,
            };
            self.notify(
                &context,
                AttemptStatus::Failed { code: error.code(), message: error.to_string() },
                next_delay,
            );

            match decision {
                RetryDecision::GiveUp(GiveUpReason::Rejected) => {
                    warn!(
                        sequence = %context.id,
                        attempt,
                        code = ?error.code(),
                        "Retry policy rejected failure: {}",
                        error
                    );
                    return context
                        .report(RetryOutcome::TerminalFailure { error, attempts: attempt });
                }
                RetryDecision::GiveUp(GiveUpReason::Exhausted) => {
                    warn!(
                        sequence = %context.id,
                        "All retry attempts exhausted after {} tries, last error: {}",
                        attempt,
                        error
                    );
                    return context
                        .report(RetryOutcome::Exhausted { last_error: error, attempts: attempt });
                }
                RetryDecision::Retry { delay } => {
                    warn!(
                        sequence = %context.id,
                        "Operation failed (attempt {}), retrying after {:?}: {}",
                        attempt,
                        delay,
                        error
                    );
                    if !pause(cancel, delay).await {
                        debug!(sequence = %context.id, attempts = attempt, "Retry delay cancelled");
                        return context.report(RetryOutcome::Cancelled { attempts: attempt });
                    }
                    context.total_delay += delay;
                }
            }
        }
    }

    fn notify(&self, context: &RetryContext, status: AttemptStatus, next_delay: Option<Duration>) {
        if let Some(observer) = &self.observer {
            observer.on_attempt(&AttemptRecord {
                attempt: context.attempt,
                at: Utc::now(),
                elapsed: context.started.elapsed(),
                status,
                next_delay,
            });
        }
    }
}

fn is_cancelled(token: Option<&CancellationToken>) -> bool {
    token.is_some_and(CancellationToken::is_cancelled)
}

/// Sleep for `delay`; returns `false` if cancelled first.
async fn pause(cancel: Option<&CancellationToken>, delay: Duration) -> bool {
    match cancel {
        Some(token) => {
            tokio::select! {
                biased;
                () = token.cancelled() => false,
                () = tokio::time::sleep(delay) => true,
            }
        }
        None => {
            tokio::time::sleep(delay).await;
            true
        }
    }
}
