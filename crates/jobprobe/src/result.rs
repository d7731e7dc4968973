//! Result and error types for jobprobe.

use thiserror::Error;

/// Result type for jobprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving the job screens.
///
/// None of these are recovered inside the harness: a scenario stops at the
/// first error and the runner reports it.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Browser executable not found
    #[error("Browser not found. Install Chromium or set CHROMIUM_PATH")]
    BrowserNotFound,

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// A driver primitive failed for a reason other than a missing element
    #[error("Driver error during {operation}: {message}")]
    Driver {
        /// Primitive that failed (click, send_keys, ...)
        operation: String,
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

    /// Locator matched nothing at query time
    #[error("Element not found: {name} ({selector})")]
    ElementNotFound {
        /// Semantic control name
        name: String,
        /// Selector rendered with its strategy
        selector: String,
    },

    /// An explicit wait did not see its condition within the bound
    #[error("Timed out after {ms}ms waiting for {condition}")]
    Timeout {
        /// Description of the awaited condition
        condition: String,
        /// Bound in milliseconds
        ms: u64,
    },

    /// A compound helper was asked for a logical value with no control
    #[error("Option not found: no {control} choice named {value:?}")]
    OptionNotFound {
        /// Control family (e.g. "orchestrator")
        control: String,
        /// Requested logical value
        value: String,
    },

    /// Read-back value differs from the expected literal
    #[error("Assertion failed on {screen} screen, {field}: expected {expected:?}, got {actual:?}")]
    AssertionMismatch {
        /// Screen the value was read from
        screen: String,
        /// Field or rendered section
        field: String,
        /// Expected literal
        expected: String,
        /// Actual value
        actual: String,
    },

    /// The test environment does not look the way the scenarios assume
    #[error("Environment precondition violated: {what}: expected {expected:?}, got {actual:?}")]
    EnvironmentPrecondition {
        /// Which precondition
        what: String,
        /// Expected value
        expected: String,
        /// Actual value
        actual: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
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

impl ProbeError {
    /// Create a driver error
    #[must_use]
    pub fn driver(operation: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Driver {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an assertion mismatch
    #[must_use]
    pub fn mismatch(
        screen: impl Into<String>,
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::AssertionMismatch {
            screen: screen.into(),
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Short classification used in reports
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::BrowserNotFound | Self::BrowserLaunch { .. } => "browser",
            Self::Driver { .. } | Self::Navigation { .. } => "driver",
            Self::ElementNotFound { .. } => "element-not-found",
            Self::Timeout { .. } => "timeout",
            Self::OptionNotFound { .. } => "option-not-found",
            Self::AssertionMismatch { .. } => "assertion",
            Self::EnvironmentPrecondition { .. } => "environment",
            Self::Config { .. } => "config",
            Self::Io(_) | Self::Json(_) | Self::Yaml(_) => "io",
        }
    }

    /// Whether this error came from an explicit wait running out
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether this error points at the environment rather than the harness
    #[must_use]
    pub const fn is_environment(&self) -> bool {
        matches!(self, Self::EnvironmentPrecondition { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_names_condition_and_bound() {
        let err = ProbeError::Timeout {
            condition: "url contains \"/job/show\"".to_string(),
            ms: 95_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("95000ms"));
        assert!(msg.contains("/job/show"));
        assert!(err.is_timeout());
    }

    #[test]
    fn test_mismatch_carries_expected_and_actual() {
        let err = ProbeError::mismatch("edit", "thread count", "3", "1");
        let msg = err.to_string();
        assert!(msg.contains("edit screen"));
        assert!(msg.contains("thread count"));
        assert!(msg.contains("\"3\""));
        assert!(msg.contains("\"1\""));
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_environment_precondition_is_classified() {
        let err = ProbeError::EnvironmentPrecondition {
            what: "matched nodes".to_string(),
            expected: "1 Node Matched".to_string(),
            actual: "2 Nodes Matched".to_string(),
        };
        assert!(err.is_environment());
        assert_eq!(err.kind(), "environment");
        assert!(err.to_string().contains("2 Nodes Matched"));
    }

    #[test]
    fn test_element_not_found_display() {
        let err = ProbeError::ElementNotFound {
            name: "node filter input".to_string(),
            selector: "css=#schedJobNodeFilter".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Element not found: node filter input (css=#schedJobNodeFilter)"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ProbeError = io.into();
        assert!(err.to_string().starts_with("I/O error"));
    }
}
