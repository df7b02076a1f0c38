//! Flaky endpoint simulator
//!
//! Deterministic stand-ins for an unreliable upstream. The counter-based
//! endpoints share one [`FlakyCounter`], so interleaved calls to different
//! endpoints advance the same sequence.

mod counter;
mod routes;

use std::time::Duration;

pub use counter::FlakyCounter;
use retrykit_domain::SimulatorConfig;
pub use routes::simulator_router;

/// State behind the simulator routes
#[derive(Debug, Clone, Default)]
pub struct SimulatorState {
    pub counter: FlakyCounter,
    /// Wait applied by the slow endpoint before it counts the call
    pub slow_delay: Duration,
}

impl SimulatorState {
    pub fn new(config: &SimulatorConfig) -> Self {
        Self { counter: FlakyCounter::new(), slow_delay: config.slow_delay() }
    }

    pub fn with_counter(counter: FlakyCounter, slow_delay: Duration) -> Self {
        Self { counter, slow_delay }
    }
}
