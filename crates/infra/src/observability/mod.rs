//! Logging setup
//!
//! One global `tracing` subscriber per process. `RUST_LOG` takes precedence
//! over the configured filter.

use retrykit_domain::LoggingConfig;
use tracing_subscriber::{fmt, EnvFilter};

/// Build the filter: `RUST_LOG` if set and valid, else `config.filter`.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter))
}

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already installed, which leaves the
/// existing one in place.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let builder = fmt().with_env_filter(env_filter(config)).with_target(true);

    let installed = if config.json {
        builder.json().with_current_span(true).with_span_list(true).try_init().is_ok()
    } else {
        builder.compact().try_init().is_ok()
    };

    if installed {
        tracing::debug!(filter = %config.filter, json = config.json, "Tracing initialised");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_a_no_op() {
        let config = LoggingConfig { filter: "warn".to_string(), json: true };

        init_tracing(&config);

        assert!(!init_tracing(&config));
    }
}
