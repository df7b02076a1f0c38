//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! workspace.

// Server defaults
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
/// Scenarios call the service's own simulator unless configured otherwise.
pub const DEFAULT_UPSTREAM_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_USER_AGENT: &str = concat!("retrykit/", env!("CARGO_PKG_VERSION"));

// Retry defaults
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;
/// Status the filtered scenario retries on
pub const DEFAULT_RETRYABLE_STATUS: u16 = 503;

// Simulator endpoints (all POST)
pub const PATH_ALWAYS_FAIL: &str = "/error";
pub const PATH_FAIL_TWICE: &str = "/error_twice";
pub const PATH_FAIL_TWICE_SLOW: &str = "/error_twice_await";
pub const PATH_FAIL_THEN_NOT_FOUND: &str = "/error_503_404";
pub const PATH_COUNTER: &str = "/counter";
pub const PATH_COUNTER_RESET: &str = "/counter/reset";

// Simulator behavior
/// Every n-th call to a counter-based endpoint takes the alternate branch
pub const SIMULATOR_PERIOD: u64 = 3;
pub const DEFAULT_SLOW_DELAY_MS: u64 = 2_000;
pub const SUCCESS_BODY: &str = "OK";

// Fallback response of the fallback scenario
pub const FALLBACK_STATUS: u16 = 503;
pub const FALLBACK_BODY: &str = "リトライオーバー";

// Response headers
pub const HEADER_RETRY_ATTEMPTS: &str = "x-retry-attempts";
pub const HEADER_RETRY_FALLBACK: &str = "x-retry-fallback";

// Logging
pub const DEFAULT_LOG_FILTER: &str = "info,retrykit=debug";
