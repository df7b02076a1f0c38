//! Integration tests for the scenario catalog
//!
//! Every test runs under paused tokio time, so the one-second delays cost
//! nothing and elapsed times are deterministic.

mod support;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use retrykit_common::RetryError;
use retrykit_core::{ScenarioId, ScenarioResolution, ScenarioService};
use retrykit_domain::constants::FALLBACK_BODY;
use retrykit_domain::{RetrySettings, TransportKind, UpstreamFailure, UpstreamReply};
use support::{service, FlakyUpstream, Unreachable};
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

fn assert_elapsed(actual: Duration, expected: Duration) {
    assert!(actual >= expected, "elapsed {actual:?} shorter than {expected:?}");
    assert!(
        actual < expected + Duration::from_millis(100),
        "elapsed {actual:?} longer than {expected:?}"
    );
}

/// Validates `ScenarioId::ExhaustRetries` behavior against an endpoint that
/// always fails.
///
/// Assertions:
/// - Confirms exactly 3 calls spaced 1 s apart.
/// - Confirms the run ends `Exhausted` carrying the last 503.
#[tokio::test(start_paused = true)]
async fn test_exhaust_retries_makes_three_attempts() {
    let upstream = FlakyUpstream::new(Duration::ZERO);
    let service = service(upstream.clone(), 3, 1_000);

    let result = service.run(ScenarioId::ExhaustRetries).await;

    assert_eq!(result.attempts, 3);
    assert_eq!(upstream.calls().len(), 3);
    assert_elapsed(result.elapsed, Duration::from_secs(2));
    match result.resolution {
        ScenarioResolution::Failed(RetryError::Exhausted { attempts, last_error }) => {
            assert_eq!(attempts, 3);
            assert_eq!(last_error, UpstreamFailure::status(503));
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_recover_after_failures_succeeds_on_third_call() {
    let upstream = FlakyUpstream::new(Duration::ZERO);
    let service = service(upstream.clone(), 3, 1_000);

    let result = service.run(ScenarioId::RecoverAfterFailures).await;

    assert_eq!(result.resolution, ScenarioResolution::Success(UpstreamReply::ok("OK")));
    assert_eq!(result.attempts, 3);
    assert_eq!(upstream.calls(), vec!["/error_twice"; 3]);
}

/// Validates `ScenarioId::RecoverSlowServer` timing with a 2 s server delay.
///
/// Assertions:
/// - Confirms success on the third call.
/// - Confirms total time is three server delays plus two retry delays.
#[tokio::test(start_paused = true)]
async fn test_recover_slow_server_accumulates_server_delay() {
    let upstream = FlakyUpstream::new(Duration::from_secs(2));
    let service = service(upstream.clone(), 3, 1_000);

    let result = service.run(ScenarioId::RecoverSlowServer).await;

    assert!(result.resolution.is_success());
    assert_eq!(result.attempts, 3);
    assert_elapsed(result.elapsed, Duration::from_secs(8));
}

/// Validates `ScenarioId::PostFailureHook` against an endpoint that always
/// fails.
///
/// Assertions:
/// - Confirms the run still reports exhaustion after 3 calls.
/// - Confirms the failure hook fires once, after the last attempt.
#[tokio::test(start_paused = true)]
async fn test_post_failure_hook_fires_once_after_exhaustion() {
    let upstream = FlakyUpstream::new(Duration::ZERO);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_by_hook = seen.clone();
    let service = service(upstream.clone(), 3, 1_000).with_failure_hook(Arc::new(
        move |id: ScenarioId, err: &RetryError<UpstreamFailure>| {
            seen_by_hook.lock().unwrap().push((id, err.attempts(), err.is_exhausted()));
        },
    ));

    let result = service.run(ScenarioId::PostFailureHook).await;

    let error = result.resolution.error().expect("failed run");
    assert!(error.is_exhausted());
    assert_eq!(error.attempts(), 3);
    assert_eq!(upstream.calls().len(), 3);
    assert_eq!(*seen.lock().unwrap(), vec![(ScenarioId::PostFailureHook, 3, true)]);
}

#[tokio::test(start_paused = true)]
async fn test_failure_hook_is_limited_to_its_scenario() {
    let upstream = FlakyUpstream::new(Duration::ZERO);
    let fired = Arc::new(Mutex::new(0));
    let fired_by_hook = fired.clone();
    let service = service(upstream, 3, 1_000).with_failure_hook(Arc::new(
        move |_: ScenarioId, _: &RetryError<UpstreamFailure>| {
            *fired_by_hook.lock().unwrap() += 1;
        },
    ));

    service.run(ScenarioId::ExhaustRetries).await;
    service.run(ScenarioId::Fallback).await;

    assert_eq!(*fired.lock().unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_fallback_is_marked_recovered() {
    let upstream = FlakyUpstream::new(Duration::ZERO);
    let service = service(upstream.clone(), 3, 1_000);

    let result = service.run(ScenarioId::Fallback).await;

    assert_eq!(
        result.resolution,
        ScenarioResolution::Recovered(UpstreamReply::new(503, FALLBACK_BODY))
    );
    assert_eq!(result.attempts, 3);
}

/// Validates `ScenarioId::FilteredByStatus` behavior for the 503/503/404
/// sequence.
///
/// Assertions:
/// - Confirms the two 503s are retried.
/// - Confirms the 404 surfaces unchanged as a non-retryable failure.
#[tokio::test(start_paused = true)]
async fn test_filtered_scenario_surfaces_not_found() {
    let upstream = FlakyUpstream::new(Duration::ZERO);
    let service = service(upstream.clone(), 3, 1_000);

    let result = service.run(ScenarioId::FilteredByStatus).await;

    assert_eq!(result.attempts, 3);
    assert_elapsed(result.elapsed, Duration::from_secs(2));
    match result.resolution {
        ScenarioResolution::Failed(RetryError::NonRetryable { attempts, source }) => {
            assert_eq!(attempts, 3);
            assert_eq!(source.status_code(), Some(404));
        }
        other => panic!("expected non-retryable 404, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_filtered_scenario_rejects_immediately_on_other_status() {
    let upstream = FlakyUpstream::new(Duration::ZERO);
    upstream.advance(2);
    let service = service(upstream.clone(), 3, 1_000);

    let started = Instant::now();
    let result = service.run(ScenarioId::FilteredByStatus).await;

    assert_eq!(result.attempts, 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
    let status = result.resolution.error().and_then(|e| e.last_error()).and_then(|e| e.status_code());
    assert_eq!(status, Some(404));
}

/// Validates `ScenarioId::FilteredByStatus` against an upstream that never
/// answers.
///
/// Assertions:
/// - Confirms a transport fault has no status, so the filter rejects it on
///   the first call.
/// - Confirms the fault surfaces unchanged as a non-retryable failure.
#[tokio::test(start_paused = true)]
async fn test_filtered_scenario_rejects_transport_fault() {
    let upstream = Unreachable::new();
    let service = service(upstream.clone(), 3, 1_000);

    let started = Instant::now();
    let result = service.run(ScenarioId::FilteredByStatus).await;

    assert_eq!(upstream.calls(), 1);
    assert_eq!(result.attempts, 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
    match result.resolution {
        ScenarioResolution::Failed(RetryError::NonRetryable { attempts, source }) => {
            assert_eq!(attempts, 1);
            assert!(matches!(source, UpstreamFailure::Transport { kind: TransportKind::Connect, .. }));
        }
        other => panic!("expected non-retryable transport fault, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_unfiltered_scenario_retries_transport_fault() {
    let upstream = Unreachable::new();
    let service = service(upstream.clone(), 3, 1_000);

    let result = service.run(ScenarioId::ExhaustRetries).await;

    assert_eq!(upstream.calls(), 3);
    assert!(result.resolution.error().is_some_and(RetryError::is_exhausted));
}

#[tokio::test(start_paused = true)]
async fn test_filter_follows_configured_status() {
    let upstream = FlakyUpstream::new(Duration::ZERO);
    let settings = RetrySettings { retry_status: 502, ..RetrySettings::default() };
    let service = ScenarioService::new(upstream.clone(), &settings).unwrap();

    let result = service.run(ScenarioId::FilteredByStatus).await;

    assert_eq!(result.attempts, 1);
    let source = result.resolution.error().and_then(|e| e.last_error()).cloned();
    assert_eq!(source, Some(UpstreamFailure::status(503)));
}

#[tokio::test(start_paused = true)]
async fn test_attempt_ceiling_follows_settings() {
    let upstream = FlakyUpstream::new(Duration::ZERO);
    let service = service(upstream.clone(), 5, 200);

    let result = service.run(ScenarioId::ExhaustRetries).await;

    assert_eq!(result.attempts, 5);
    assert_eq!(upstream.calls().len(), 5);
    assert_elapsed(result.elapsed, Duration::from_millis(800));
}

/// Validates concurrent scenario runs on one service.
///
/// Assertions:
/// - Confirms each run keeps its own attempt count.
/// - Confirms the runs overlap instead of queueing behind each other.
#[tokio::test(start_paused = true)]
async fn test_concurrent_runs_are_independent() {
    let upstream = FlakyUpstream::new(Duration::ZERO);
    let service = service(upstream.clone(), 3, 1_000);

    let started = Instant::now();
    let (first, second) = futures::join!(
        service.run(ScenarioId::ExhaustRetries),
        service.run(ScenarioId::Fallback)
    );

    assert_eq!(first.attempts, 3);
    assert_eq!(second.attempts, 3);
    assert!(second.resolution.is_recovered());
    assert_eq!(upstream.calls().len(), 6);
    assert_elapsed(started.elapsed(), Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_releases_pending_delay() {
    let upstream = FlakyUpstream::new(Duration::ZERO);
    let service = service(upstream.clone(), 3, 1_000);
    let token = CancellationToken::new();

    let started = Instant::now();
    let (result, ()) = tokio::join!(
        service.run_with_cancellation(ScenarioId::ExhaustRetries, &token),
        async {
            sleep(Duration::from_millis(1_500)).await;
            token.cancel();
        }
    );

    assert!(result.resolution.error().is_some_and(RetryError::is_cancelled));
    assert_eq!(result.attempts, 2);
    assert_eq!(upstream.calls().len(), 2);
    assert_elapsed(started.elapsed(), Duration::from_millis(1_500));
}

#[tokio::test(start_paused = true)]
async fn test_every_scenario_runs() {
    let upstream = FlakyUpstream::new(Duration::from_millis(10));
    let service = service(upstream, 3, 10);

    for id in ScenarioId::all() {
        let result = service.run(id).await;
        assert_eq!(result.scenario, id);
        assert!(result.attempts >= 1 && result.attempts <= 3, "{id}: {}", result.attempts);
    }
}
