//! Application state - dependency injection container

use std::sync::Arc;

use retrykit_core::{ScenarioService, Upstream};
use retrykit_domain::{Config, Result};
use retrykit_infra::{HttpClient, SimulatorState};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Shared state behind every route
#[derive(Clone)]
pub struct AppState {
    pub scenarios: Arc<ScenarioService>,
    /// `None` when the simulator routes are disabled
    pub simulator: Option<SimulatorState>,
    /// Cancelled on shutdown; releases pending retry delays
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(scenarios: ScenarioService, simulator: Option<SimulatorState>) -> Self {
        Self { scenarios: Arc::new(scenarios), simulator, shutdown: CancellationToken::new() }
    }

    /// Wire the HTTP upstream, scenarios and simulator from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let upstream: Arc<dyn Upstream> = Arc::new(HttpClient::from_config(&config.upstream)?);
        let scenarios = ScenarioService::new(upstream, &config.retry)?;
        let simulator = config.simulator.enabled.then(|| SimulatorState::new(&config.simulator));

        info!(
            upstream = %config.upstream.base_url,
            max_attempts = config.retry.max_attempts,
            delay_ms = config.retry.delay_ms,
            simulator = simulator.is_some(),
            "Application state initialised"
        );

        Ok(Self::new(scenarios, simulator))
    }

    #[must_use]
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }
}
