//! Generic building blocks shared across retrykit crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: error classification and the shared `CommonError`
//! - `runtime`: the async retry engine (classifier, policy, executor,
//!   outcomes and fallback composition)
//! - `test-utils`: scripted operations and recording observers for tests in
//!   downstream crates

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod error;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(all(feature = "runtime", any(feature = "test-utils", test)))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use error::{CommonError, CommonResult, ErrorClassification, ErrorSeverity};
#[cfg(feature = "runtime")]
pub use resilience::{
    policies, AlwaysRetry, AttemptObserver, AttemptRecord, AttemptStatus, BackoffStrategy,
    ClassifiableError, Classification, GiveUpReason, Jitter, NeverRetry, OutcomeClassifier,
    PredicateRetry, Resolution, ResultClassifier, RetryConfig, RetryConfigBuilder, RetryDecision,
    RetryError, RetryExecutor, RetryFilter, RetryOutcome, RetryPolicy, RetryReport,
    StatusCodeRetry, TracingObserver,
};
