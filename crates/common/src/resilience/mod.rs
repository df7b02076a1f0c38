//! Resilience patterns for transient failures
//!
//! This module provides a **generic, reusable** retry engine:
//! - **[`classify`]**: reduce a raw attempt result to success or failure
//! - **[`policies`]**: filters deciding which failures may be retried
//! - **[`retry`]**: backoff configuration, policy evaluation and the
//!   [`RetryExecutor`] attempt loop
//! - **[`outcome`]**: the tagged [`RetryOutcome`], its error binding and
//!   fallback composition
//! - **[`observer`]**: per-attempt hooks for logging and tests
//!
//! ## Flow
//!
//! ```text
//! caller ─▶ RetryExecutor ─▶ operation ─▶ classifier
//!              ▲                              │
//!              │ Retry { delay }              ▼
//!              └──────────────── RetryPolicy::evaluate
//!                                             │ GiveUp
//!                                             ▼
//!                         RetryOutcome ─▶ recover / into_result
//! ```
//!
//! The engine is generic over the operation's error type. The only thing a
//! filter may ask of a failure is its [`ClassifiableError::code`].

pub mod classify;
pub mod observer;
pub mod outcome;
pub mod policies;
pub mod retry;

pub use classify::{ClassifiableError, Classification, OutcomeClassifier, ResultClassifier};
pub use observer::{AttemptObserver, AttemptRecord, AttemptStatus, TracingObserver};
pub use outcome::{Resolution, RetryError, RetryOutcome, RetryReport};
pub use policies::{AlwaysRetry, NeverRetry, PredicateRetry, RetryFilter, StatusCodeRetry};
pub use retry::{
    BackoffStrategy, GiveUpReason, Jitter, RetryConfig, RetryConfigBuilder, RetryDecision,
    RetryExecutor, RetryPolicy, DEFAULT_DELAY, DEFAULT_MAX_ATTEMPTS,
};
