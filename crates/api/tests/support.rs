//! Shared helpers for `retrykit-api` integration tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use retrykit_api::{build_router, AppState};
use retrykit_core::{ScenarioService, Upstream};
use retrykit_domain::{Config, RetrySettings, UpstreamFailure, UpstreamReply};
use tokio::net::TcpListener;

/// Upstream that always answers with one failure status
pub struct StaticFailure {
    pub status: u16,
    pub calls: AtomicU32,
}

impl StaticFailure {
    pub fn new(status: u16) -> Arc<Self> {
        Arc::new(Self { status, calls: AtomicU32::new(0) })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Upstream for StaticFailure {
    async fn post(&self, _path: &str) -> Result<UpstreamReply, UpstreamFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(UpstreamFailure::status(self.status))
    }
}

pub fn fast_retry() -> RetrySettings {
    RetrySettings { delay_ms: 10, ..RetrySettings::default() }
}

/// App state over an injected upstream, without the simulator
pub fn state_with(upstream: Arc<dyn Upstream>) -> AppState {
    let scenarios = ScenarioService::new(upstream, &fast_retry()).expect("scenario service");
    AppState::new(scenarios, None)
}

/// Serve the full application on an ephemeral port, calling itself as the
/// upstream. Returns the base URL.
pub async fn spawn_app() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let base_url = format!("http://{}", listener.local_addr().expect("local addr"));

    let mut config = Config::default();
    config.upstream.base_url = base_url.clone();
    config.retry = fast_retry();
    config.simulator.slow_delay_ms = 20;

    let state = AppState::from_config(&config).expect("app state");
    let app = build_router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server");
    });

    base_url
}

pub fn short_delay() -> Duration {
    Duration::from_millis(10)
}
