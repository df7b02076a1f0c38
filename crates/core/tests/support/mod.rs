//! Shared test helpers for `retrykit-core` integration tests.
//!
//! `FlakyUpstream` reproduces the simulator endpoints in memory so the
//! scenarios can be exercised under paused time without a network.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use retrykit_core::{ScenarioService, Upstream};
use retrykit_domain::{RetrySettings, TransportKind, UpstreamFailure, UpstreamReply};

/// In-memory stand-in for the flaky endpoints
#[derive(Debug, Default)]
pub struct FlakyUpstream {
    counter: AtomicU64,
    slow_delay: Duration,
    calls: Mutex<Vec<String>>,
}

impl FlakyUpstream {
    pub fn new(slow_delay: Duration) -> Arc<Self> {
        Arc::new(Self { slow_delay, ..Self::default() })
    }

    /// Advance the shared counter as if `n` calls had already happened
    pub fn advance(&self, n: u64) {
        self.counter.fetch_add(n, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn tick(&self, path: &str) -> u64 {
        self.calls.lock().unwrap().push(path.to_string());
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl Upstream for FlakyUpstream {
    async fn post(&self, path: &str) -> Result<UpstreamReply, UpstreamFailure> {
        match path {
            "/error" => {
                self.calls.lock().unwrap().push(path.to_string());
                Err(UpstreamFailure::status(503))
            }
            "/error_twice" | "/error_twice_await" => {
                if path == "/error_twice_await" {
                    tokio::time::sleep(self.slow_delay).await;
                }
                if self.tick(path) % 3 == 0 {
                    Ok(UpstreamReply::ok("OK"))
                } else {
                    Err(UpstreamFailure::status(503))
                }
            }
            "/error_503_404" => {
                if self.tick(path) % 3 == 0 {
                    Err(UpstreamFailure::status(404))
                } else {
                    Err(UpstreamFailure::status(503))
                }
            }
            other => panic!("unexpected upstream path {other}"),
        }
    }
}

/// Upstream whose every call fails before a response arrives
#[derive(Debug, Default)]
pub struct Unreachable {
    calls: AtomicU64,
}

impl Unreachable {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Upstream for Unreachable {
    async fn post(&self, _path: &str) -> Result<UpstreamReply, UpstreamFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(UpstreamFailure::transport(TransportKind::Connect, "connection refused"))
    }
}

/// Service over `upstream` with the given attempt ceiling and delay
pub fn service(upstream: Arc<dyn Upstream>, max_attempts: u32, delay_ms: u64) -> ScenarioService {
    let settings = RetrySettings { max_attempts, delay_ms, ..RetrySettings::default() };
    ScenarioService::new(upstream, &settings).expect("valid retry settings")
}
