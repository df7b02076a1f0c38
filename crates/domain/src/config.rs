//! Configuration structures
//!
//! Every section has a `Default` that reproduces the reference setup: three
//! attempts one second apart against the service's own simulator, with the
//! filtered scenario retrying only on 503. Missing keys in a config file fall
//! back to these defaults.

use std::time::Duration;

use retrykit_common::error::{CommonError, CommonResult};
use retrykit_common::{BackoffStrategy, Jitter, RetryConfig};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BIND_ADDR, DEFAULT_LOG_FILTER, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRYABLE_STATUS,
    DEFAULT_RETRY_DELAY_MS, DEFAULT_SLOW_DELAY_MS, DEFAULT_UPSTREAM_URL, DEFAULT_USER_AGENT,
};

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub retry: RetrySettings,
    pub simulator: SimulatorConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> CommonResult<()> {
        if self.server.bind_addr.trim().is_empty() {
            return Err(CommonError::config_field("server.bind_addr", "must not be empty"));
        }
        if !(self.upstream.base_url.starts_with("http://")
            || self.upstream.base_url.starts_with("https://"))
        {
            return Err(CommonError::validation_with_value(
                "upstream.base_url",
                "must start with http:// or https://",
                self.upstream.base_url.clone(),
            ));
        }
        self.retry.to_retry_config().map(|_| ())
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: DEFAULT_BIND_ADDR.to_string() }
    }
}

/// Where the scenarios send their requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    /// Per-request client timeout; `None` leaves requests unbounded
    pub timeout_ms: Option<u64>,
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_URL.to_string(),
            timeout_ms: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Delay growth between attempts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackoffSettings {
    /// Same delay before every retry
    #[default]
    Fixed,
    /// Delay grows by `increment_ms` per retry
    Linear { increment_ms: u64 },
    /// Delay multiplies by `base` per retry, capped at `max_delay_ms`
    Exponential { base: f64, max_delay_ms: u64 },
}

/// Randomization applied on top of the backoff
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JitterSetting {
    #[default]
    None,
    Full,
    Equal,
    Decorrelated,
}

/// Retry policy settings shared by all scenarios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts including the first
    pub max_attempts: u32,
    /// Base delay between attempts
    pub delay_ms: u64,
    /// Status the filtered scenario treats as retryable
    pub retry_status: u16,
    pub backoff: BackoffSettings,
    pub jitter: JitterSetting,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay_ms: DEFAULT_RETRY_DELAY_MS,
            retry_status: DEFAULT_RETRYABLE_STATUS,
            backoff: BackoffSettings::Fixed,
            jitter: JitterSetting::None,
        }
    }
}

impl RetrySettings {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Build the engine configuration, validating it on the way.
    pub fn to_retry_config(&self) -> CommonResult<RetryConfig> {
        let delay = self.delay();
        let backoff = match &self.backoff {
            BackoffSettings::Fixed => BackoffStrategy::Fixed(delay),
            BackoffSettings::Linear { increment_ms } => BackoffStrategy::Linear {
                initial_delay: delay,
                increment: Duration::from_millis(*increment_ms),
            },
            BackoffSettings::Exponential { base, max_delay_ms } => BackoffStrategy::Exponential {
                initial_delay: delay,
                base: *base,
                max_delay: Duration::from_millis(*max_delay_ms),
            },
        };
        let jitter = match self.jitter {
            JitterSetting::None => Jitter::None,
            JitterSetting::Full => Jitter::Full,
            JitterSetting::Equal => Jitter::Equal,
            JitterSetting::Decorrelated => Jitter::Decorrelated { base: delay },
        };

        RetryConfig::builder()
            .max_attempts(self.max_attempts)
            .backoff(backoff)
            .jitter(jitter)
            .build()
    }
}

/// Flaky endpoint simulator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Whether the simulator routes are mounted
    pub enabled: bool,
    /// Server-side wait of the slow endpoint
    pub slow_delay_ms: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self { enabled: true, slow_delay_ms: DEFAULT_SLOW_DELAY_MS }
    }
}

impl SimulatorConfig {
    pub fn slow_delay(&self) -> Duration {
        Duration::from_millis(self.slow_delay_ms)
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence when set
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: DEFAULT_LOG_FILTER.to_string(), json: false }
    }
}
