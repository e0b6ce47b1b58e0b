//! Result and error types for the suite.

use thiserror::Error;

/// Result type for suite operations
pub type E2eResult<T> = Result<T, E2eError>;

/// Errors that can occur while driving the storefront
#[derive(Debug, Error)]
pub enum E2eError {
    /// Browser executable not found or failed to start
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Driver-level failure (protocol error, evaluation error, closed page)
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Auto-wait on a locator expired
    #[error("Locator '{selector}' not actionable after {waited_ms}ms")]
    LocatorTimeout {
        /// Selector that was waited on
        selector: String,
        /// Time spent waiting
        waited_ms: u64,
    },

    /// Operation timed out
    #[error("{what} timed out after {ms}ms")]
    Timeout {
        /// What was being waited for
        what: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// A strict locator matched more than one element
    #[error("Strict mode violation: '{selector}' resolved to {count} elements")]
    StrictModeViolation {
        /// Selector
        selector: String,
        /// Number of matches
        count: usize,
    },

    /// Index-addressed element does not exist
    #[error("No element at index {index} for '{selector}'")]
    ElementNotFound {
        /// Selector
        selector: String,
        /// Requested index
        index: usize,
    },

    /// Element exists but cannot take the requested interaction
    #[error("Element '{selector}' cannot be {action}: {reason}")]
    NotInteractable {
        /// Selector
        selector: String,
        /// Attempted action
        action: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// Selector could not be parsed
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector {
        /// Selector text
        selector: String,
        /// Parse failure
        reason: String,
    },

    /// Page content could not be interpreted (e.g. a price that is not a price)
    #[error("Unexpected content in {what}: '{content}'")]
    UnexpectedContent {
        /// What was being read
        what: String,
        /// Raw content
        content: String,
    },

    /// Assertion failed
    #[error("Assertion failed: {message} (expected {expected}, got {actual})")]
    AssertionFailed {
        /// What was asserted
        message: String,
        /// Expected value
        expected: String,
        /// Observed value
        actual: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// Fixture error (preset setup failed)
    #[error("Fixture '{preset}' failed: {message}")]
    Fixture {
        /// Preset name
        preset: String,
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Test data error
    #[error("Test data error: {message}")]
    Data {
        /// Error message
        message: String,
    },

    /// Scenario body panicked
    #[error("Scenario panicked: {message}")]
    Panicked {
        /// Panic payload
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl E2eError {
    /// Create an assertion failure
    #[must_use]
    pub fn assertion(
        message: impl Into<String>,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        Self::AssertionFailed {
            message: message.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True when the failure is a mismatch between expected and observed state,
    /// as opposed to the harness being unable to observe anything at all.
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(self, Self::AssertionFailed { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_assertion_message_carries_both_sides() {
        let err = E2eError::assertion("cart badge", 2, 1);
        let text = err.to_string();
        assert!(text.contains("cart badge"));
        assert!(text.contains("expected 2"));
        assert!(text.contains("got 1"));
        assert!(err.is_assertion());
    }

    #[test]
    fn test_locator_timeout_is_not_assertion() {
        let err = E2eError::LocatorTimeout {
            selector: ".inventory_list".into(),
            waited_ms: 5000,
        };
        assert!(!err.is_assertion());
        assert!(err.to_string().contains("5000ms"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: E2eError = io_err.into();
        assert!(err.to_string().contains("I/O"));
    }
}
