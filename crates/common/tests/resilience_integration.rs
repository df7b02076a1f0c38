//! Integration tests for the retry engine
//!
//! Drives `RetryExecutor` through the public API with scripted operations
//! under paused tokio time, covering exhaustion, recovery, status filtering,
//! delays, concurrency and fallback composition.

#![cfg(feature = "test-utils")]

use std::sync::Arc;
use std::time::Duration;

use retrykit_common::testing::{RecordingObserver, ScriptedOperation};
use retrykit_common::{
    AttemptStatus, Resolution, RetryConfig, RetryError, RetryExecutor, RetryOutcome, RetryPolicy,
    StatusCodeRetry,
};
use tokio::time::Instant;

fn fixed(max_attempts: u32, delay: Duration) -> RetryConfig {
    RetryConfig::fixed(max_attempts, delay).expect("valid retry config")
}

/// Validates that an always-failing operation is attempted exactly
/// `max_attempts` times.
///
/// # Test Steps
/// 1. For ceilings 1 through 5, run an always-failing operation
/// 2. Verify the outcome is `Exhausted` carrying the last failure
/// 3. Confirm the operation was called exactly `max_attempts` times, never
///    one more
#[tokio::test(start_paused = true)]
async fn exhaustion_makes_exactly_max_attempts() {
    for max_attempts in 1..=5 {
        let operation = ScriptedOperation::<(), u16>::always_failing(503);
        let executor =
            RetryExecutor::new(RetryPolicy::new(fixed(max_attempts, Duration::from_millis(5))));

        let outcome = executor.execute(|| operation.call()).await;

        assert_eq!(outcome, RetryOutcome::Exhausted { last_error: 503, attempts: max_attempts });
        assert_eq!(operation.calls(), max_attempts);
    }
}

/// Validates recovery on the third attempt with no fourth attempt.
#[tokio::test(start_paused = true)]
async fn success_on_third_attempt_stops_the_sequence() {
    let operation = ScriptedOperation::new([Err(503u16), Err(503), Ok("OK"), Err(500)]);
    let executor = RetryExecutor::new(RetryPolicy::new(fixed(5, Duration::from_secs(1))));

    let outcome = executor.execute(|| operation.call()).await;

    assert_eq!(outcome, RetryOutcome::Success { value: "OK", attempts: 3 });
    assert_eq!(operation.calls(), 3);
}

/// Validates the status-filtered policy surfaces the original failure.
///
/// # Test Steps
/// 1. Retry only on 503 with a ceiling of 3
/// 2. Script 503, 503, 404
/// 3. Verify the outcome is the original 404 as a terminal failure on
///    attempt 3, not exhaustion
/// 4. Confirm binding it to `Result` yields `RetryError::NonRetryable`
#[tokio::test(start_paused = true)]
async fn filtered_policy_returns_original_404() {
    let operation = ScriptedOperation::<(), u16>::new([Err(503), Err(503), Err(404)]);
    let policy =
        RetryPolicy::with_filter(fixed(3, Duration::from_secs(1)), StatusCodeRetry::only(503));
    let executor = RetryExecutor::new(policy);

    let outcome = executor.execute(|| operation.call()).await;

    assert_eq!(outcome, RetryOutcome::TerminalFailure { error: 404, attempts: 3 });
    assert_eq!(operation.calls(), 3);
    assert!(matches!(
        outcome.into_result(),
        Err(RetryError::NonRetryable { attempts: 3, source: 404 })
    ));
}

/// Validates a rejected failure stops before the ceiling is reached.
#[tokio::test(start_paused = true)]
async fn filtered_policy_rejects_early() {
    let operation = ScriptedOperation::<(), u16>::new([Err(503), Err(404), Err(503)]);
    let policy =
        RetryPolicy::with_filter(fixed(10, Duration::from_millis(50)), StatusCodeRetry::only(503));

    let outcome = RetryExecutor::new(policy).execute(|| operation.call()).await;

    assert_eq!(outcome, RetryOutcome::TerminalFailure { error: 404, attempts: 2 });
}

/// Validates fixed delays between consecutive attempt starts.
///
/// Assertions:
/// - Confirms three attempts spaced at least 1s apart.
/// - Confirms the observer saw failure records carrying code 503.
#[tokio::test(start_paused = true)]
async fn fixed_delay_spaces_attempts() {
    let operation = ScriptedOperation::<(), u16>::always_failing(503);
    let observer = RecordingObserver::new();
    let executor = RetryExecutor::new(RetryPolicy::new(fixed(3, Duration::from_secs(1))))
        .with_observer(Arc::new(observer.clone()));

    let outcome = executor.execute(|| operation.call()).await;

    assert!(outcome.is_exhausted());
    let times = operation.call_times();
    assert_eq!(times.len(), 3);
    for pair in times.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_secs(1));
    }

    let records = observer.records();
    assert_eq!(observer.attempts(), vec![1, 2, 3]);
    assert!(records
        .iter()
        .all(|r| matches!(r.status, AttemptStatus::Failed { code: Some(503), .. })));
    assert!(records[1].elapsed >= Duration::from_secs(1));
}

/// Validates that waiting in one sequence does not hold up another.
///
/// Two sequences with 1s delays and three attempts each run concurrently;
/// together they finish in about 2s of virtual time, not 4s.
#[tokio::test(start_paused = true)]
async fn concurrent_sequences_do_not_block_each_other() {
    let executor = Arc::new(RetryExecutor::new(RetryPolicy::new(fixed(3, Duration::from_secs(1)))));
    let started = Instant::now();

    let run = |executor: Arc<RetryExecutor>| async move {
        let operation = ScriptedOperation::<(), u16>::always_failing(503);
        executor.execute(|| operation.call()).await
    };

    let (first, second) =
        futures::join!(run(Arc::clone(&executor)), run(Arc::clone(&executor)));

    assert!(first.is_exhausted());
    assert!(second.is_exhausted());
    assert!(started.elapsed() < Duration::from_secs(3));
}

/// Validates that repeated sequences share no state.
#[tokio::test(start_paused = true)]
async fn repeated_sequences_produce_identical_outcomes() {
    let executor = RetryExecutor::new(RetryPolicy::new(fixed(3, Duration::from_millis(10))));

    let first_op = ScriptedOperation::<(), u16>::always_failing(503);
    let first = executor.execute(|| first_op.call()).await;
    let second_op = ScriptedOperation::<(), u16>::always_failing(503);
    let second = executor.execute(|| second_op.call()).await;

    assert_eq!(first, second);
    assert_eq!(first_op.calls(), second_op.calls());
}

/// Validates fallback substitution after exhaustion.
///
/// # Test Steps
/// 1. Exhaust a 3-attempt policy
/// 2. Recover with a fixed degraded value
/// 3. Verify the value is marked `Recovered`, not `Completed`
#[tokio::test(start_paused = true)]
async fn fallback_replaces_exhaustion() {
    let operation = ScriptedOperation::<&str, u16>::always_failing(503);
    let executor = RetryExecutor::new(RetryPolicy::new(fixed(3, Duration::from_secs(1))));

    let resolution = executor.execute(|| operation.call()).await.recover_with_value("degraded");

    assert_eq!(resolution, Resolution::Recovered("degraded"));
    assert_eq!(operation.calls(), 3);
}

/// Validates that a fallback outside a filtered policy fires once, after the
/// policy gives up.
#[tokio::test(start_paused = true)]
async fn fallback_only_fires_after_give_up() {
    let operation = ScriptedOperation::<&str, u16>::new([Err(503), Err(503), Err(404)]);
    let policy =
        RetryPolicy::with_filter(fixed(3, Duration::from_millis(100)), StatusCodeRetry::only(503));
    let mut fallback_calls = 0;

    let resolution = RetryExecutor::new(policy)
        .execute(|| operation.call())
        .await
        .recover(|err| {
            fallback_calls += 1;
            assert_eq!(err.last_error(), Some(&404));
            "fallback"
        });

    assert_eq!(resolution, Resolution::Recovered("fallback"));
    assert_eq!(fallback_calls, 1);
    assert_eq!(operation.calls(), 3);
}
