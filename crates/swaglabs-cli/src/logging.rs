//! Log subscriber setup
//!
//! `RUST_LOG` wins when set; otherwise the verbosity flags pick the level.
//! Logs go to stderr so stdout stays clean for result lines.

use crate::config::{CliConfig, LogFormat};
use crate::error::{CliError, CliResult};
use tracing_subscriber::EnvFilter;

/// Filter for `config`, honoring `RUST_LOG`
#[must_use]
pub fn env_filter(config: &CliConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.filter_directive()))
}

/// Install the global subscriber
pub fn init_logging(config: &CliConfig) -> CliResult<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(std::io::stderr)
        .with_ansi(config.color.should_color());

    let installed = match config.log_format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| CliError::config(format!("cannot install log subscriber: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Verbosity;

    #[test]
    fn test_second_init_is_an_error() {
        let config = CliConfig::new().with_verbosity(Verbosity::Quiet);
        // the first call may lose to another test
        let _ = init_logging(&config);
        assert!(init_logging(&config).is_err());
    }

    #[test]
    fn test_filter_follows_verbosity() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = CliConfig::new().with_verbosity(Verbosity::Debug);
        assert_eq!(env_filter(&config).to_string(), "debug");
    }
}
