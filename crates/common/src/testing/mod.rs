//! Testing utilities and helpers
//!
//! - **[`mocks`]**: scripted operations and recording observers for driving
//!   the retry engine deterministically
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use retrykit_common::testing::{RecordingObserver, ScriptedOperation};
//! use retrykit_common::{RetryConfig, RetryExecutor, RetryPolicy};
//!
//! # async fn demo() {
//! let operation = ScriptedOperation::new([Err(503u16), Err(503), Ok("OK")]);
//! let observer = RecordingObserver::new();
//! let config = RetryConfig::fixed(3, Duration::from_millis(1)).unwrap();
//! let executor = RetryExecutor::new(RetryPolicy::new(config))
//!     .with_observer(Arc::new(observer.clone()));
//!
//! let outcome = executor.execute(|| operation.call()).await;
//! assert!(outcome.is_success());
//! assert_eq!(observer.attempts(), vec![1, 2, 3]);
//! # }
//! ```

pub mod mocks;

pub use mocks::{RecordingObserver, ScriptedOperation};
