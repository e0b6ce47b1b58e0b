//! Error types for the CLI

use std::path::PathBuf;
use thiserror::Error;

/// Result of a CLI command
pub type CliResult<T> = Result<T, CliError>;

/// Why a command did not succeed
#[derive(Debug, Error)]
pub enum CliError {
    /// Unusable settings or log setup
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong
        message: String,
    },

    /// The run finished but not every scenario passed
    #[error("Test execution failed: {unsuccessful} of {total} scenarios did not pass")]
    ScenariosFailed {
        /// Failed plus broken
        unsuccessful: usize,
        /// Scenarios that ran or were skipped
        total: usize,
    },

    /// Filter and tags selected nothing
    #[error("Invalid argument: no scenarios match the given filter and tags")]
    NothingSelected,

    /// A results directory could not be summarized
    #[error("Report generation failed for {}: {reason}", dir.display())]
    Report {
        /// Results directory
        dir: PathBuf,
        /// What was missing
        reason: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised by the suite library
    #[error("Suite error: {0}")]
    E2e(#[from] swaglabs_e2e::E2eError),

    /// JSON output could not be produced
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Configuration error with `message`
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Report error for `dir`
    #[must_use]
    pub fn report(dir: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Report {
            dir: dir.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_message() {
        let msg = CliError::config("cannot install log subscriber").to_string();
        assert!(msg.starts_with("Configuration error"));
        assert!(msg.contains("log subscriber"));
    }

    #[test]
    fn test_scenarios_failed_counts() {
        let err = CliError::ScenariosFailed {
            unsuccessful: 2,
            total: 5,
        };
        assert_eq!(
            err.to_string(),
            "Test execution failed: 2 of 5 scenarios did not pass"
        );
    }

    #[test]
    fn test_report_names_directory() {
        let msg = CliError::report("allure-results", "no scenario results").to_string();
        assert!(msg.starts_with("Report generation failed for allure-results"));
        assert!(msg.ends_with("no scenario results"));
    }

    #[test]
    fn test_io_from() {
        let err: CliError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(err.to_string().starts_with("I/O error"));
    }

    #[test]
    fn test_suite_error_from() {
        let e2e = swaglabs_e2e::E2eError::config("unknown target 'firefox'");
        let msg = CliError::from(e2e).to_string();
        assert!(msg.starts_with("Suite error"));
        assert!(msg.contains("firefox"));
    }
}
