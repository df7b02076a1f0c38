//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `RETRYKIT_BIND_ADDR` is unset, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Uses built-in defaults when no file exists
//! 5. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `RETRYKIT_BIND_ADDR`: Listen address (required for env loading)
//! - `RETRYKIT_UPSTREAM_URL`: Base URL the scenarios call
//! - `RETRYKIT_UPSTREAM_TIMEOUT_MS`: Per-request client timeout
//! - `RETRYKIT_RETRY_MAX_ATTEMPTS`: Total attempts including the first
//! - `RETRYKIT_RETRY_DELAY_MS`: Delay between attempts
//! - `RETRYKIT_RETRY_STATUS`: Status the filtered scenario retries on
//! - `RETRYKIT_SIMULATOR_ENABLED`: Mount the simulator routes (true/false)
//! - `RETRYKIT_SIMULATOR_DELAY_MS`: Wait of the slow simulator endpoint
//! - `RETRYKIT_LOG`: Log filter directive
//! - `RETRYKIT_LOG_JSON`: Emit JSON logs (true/false)
//! - `RETRYKIT_CONFIG`: Explicit config file path
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./retrykit.json` or `./retrykit.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use retrykit_domain::{Config, Result, RetryKitError};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables, then from
/// `RETRYKIT_CONFIG` or a probed config file, and finally falls back to
/// [`Config::default`]. The result is always validated.
///
/// # Errors
/// Returns `RetryKitError::Config` if a source exists but cannot be parsed,
/// and `RetryKitError::InvalidInput` if the loaded values are inconsistent.
pub fn load() -> Result<Config> {
    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            let explicit = std::env::var("RETRYKIT_CONFIG").ok().map(PathBuf::from);
            match explicit.or_else(probe_config_paths) {
                Some(path) => load_from_file(Some(path))?,
                None => {
                    tracing::info!("No configuration found, using defaults");
                    Config::default()
                }
            }
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// `RETRYKIT_BIND_ADDR` must be present; every other variable is optional
/// and falls back to its default.
///
/// # Errors
/// Returns `RetryKitError::Config` if `RETRYKIT_BIND_ADDR` is missing or a
/// numeric variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.server.bind_addr = env_var("RETRYKIT_BIND_ADDR")?;

    if let Some(url) = optional_var("RETRYKIT_UPSTREAM_URL") {
        config.upstream.base_url = url;
    }
    if let Some(timeout) = env_parse::<u64>("RETRYKIT_UPSTREAM_TIMEOUT_MS")? {
        config.upstream.timeout_ms = Some(timeout);
    }

    if let Some(attempts) = env_parse::<u32>("RETRYKIT_RETRY_MAX_ATTEMPTS")? {
        config.retry.max_attempts = attempts;
    }
    if let Some(delay) = env_parse::<u64>("RETRYKIT_RETRY_DELAY_MS")? {
        config.retry.delay_ms = delay;
    }
    if let Some(status) = env_parse::<u16>("RETRYKIT_RETRY_STATUS")? {
        config.retry.retry_status = status;
    }

    config.simulator.enabled = env_bool("RETRYKIT_SIMULATOR_ENABLED", config.simulator.enabled);
    if let Some(delay) = env_parse::<u64>("RETRYKIT_SIMULATOR_DELAY_MS")? {
        config.simulator.slow_delay_ms = delay;
    }

    if let Some(filter) = optional_var("RETRYKIT_LOG") {
        config.logging.filter = filter;
    }
    config.logging.json = env_bool("RETRYKIT_LOG_JSON", config.logging.json);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
/// Sections and keys missing from the file keep their defaults.
///
/// # Errors
/// Returns `RetryKitError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(RetryKitError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            RetryKitError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| RetryKitError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| RetryKitError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| RetryKitError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(RetryKitError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidate_files(&cwd));
        candidates.extend(candidate_files(&cwd.join("..")));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidate_files(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidate_files(dir: &Path) -> [PathBuf; 4] {
    [
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("retrykit.json"),
        dir.join("retrykit.toml"),
    ]
}

/// Get required environment variable
///
/// # Errors
/// Returns `RetryKitError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        RetryKitError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Non-empty value of an optional variable
fn optional_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse an optional variable, failing only if it is set but malformed
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional_var(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| RetryKitError::Config(format!("Invalid {}: {}", key, e)))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
