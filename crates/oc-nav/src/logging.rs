//! Tracing subscriber setup for the binary and integration harnesses

use crate::config::NavConfig;
use crate::error::{NavError, NavResult};
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` when set, otherwise the configured filter
///
/// `verbosity` (from repeated `-v`) raises the fallback level.
#[must_use]
pub fn build_filter(config: &NavConfig, verbosity: u8) -> EnvFilter {
    let fallback = match verbosity {
        0 => config.log_filter.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&fallback))
        .unwrap_or_else(|err| {
            eprintln!("invalid log filter '{fallback}': {err}, using 'info'");
            EnvFilter::new("info")
        })
}

/// Install the global subscriber
///
/// Logs go to stderr so command output on stdout stays machine-readable.
///
/// # Errors
/// [`NavError::Logging`] if a global subscriber is already installed.
pub fn init(config: &NavConfig, verbosity: u8) -> NavResult<()> {
    let filter = build_filter(config, verbosity);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = if config.log_json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
    result.map_err(|err| NavError::Logging(err.to_string()))
}
