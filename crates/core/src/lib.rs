//! # retrykit Core
//!
//! Scenario layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The scenario catalog (`ScenarioId`) and its results
//! - The `Upstream` port the scenarios call through
//! - `ScenarioService`, which composes the retry engine per scenario
//!
//! ## Architecture Principles
//! - Only depends on `retrykit-common` and `retrykit-domain`
//! - No HTTP or platform code
//! - The upstream is injected via a trait

pub mod scenarios;

pub use scenarios::ports::Upstream;
pub use scenarios::{
    FailureHook, ScenarioId, ScenarioResolution, ScenarioResult, ScenarioService,
};
