//! # retrykit Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The reqwest-backed `HttpClient` implementing the `Upstream` port
//! - The flaky endpoint simulator (axum routes)
//! - Configuration loading (environment and TOML/JSON files)
//! - Logging setup
//!
//! ## Architecture
//! - Implements traits defined in `retrykit-core`
//! - Contains all "impure" code (network, files, environment)

pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod simulator;

// Re-export commonly used items
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder, HttpOutcomeClassifier};
pub use observability::init_tracing;
pub use simulator::{simulator_router, FlakyCounter, SimulatorState};
