//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// The run finished with failing scenarios
    #[error("{failed} of {total} scenarios failed")]
    ScenariosFailed {
        /// Failed scenario count
        failed: usize,
        /// Scenarios run
        total: usize,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// jobprobe library error
    #[error("{0}")]
    Probe(#[from] jobprobe::ProbeError),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CliError::config("bad config");
        assert!(err.to_string().contains("Configuration"));
        assert!(err.to_string().contains("bad config"));
    }

    #[test]
    fn test_invalid_argument_error() {
        let err = CliError::invalid_argument("unknown scenario \"x\"");
        assert!(err.to_string().contains("Invalid argument"));
    }

    #[test]
    fn test_scenarios_failed_message() {
        let err = CliError::ScenariosFailed { failed: 1, total: 2 };
        assert_eq!(err.to_string(), "1 of 2 scenarios failed");
    }

    #[test]
    fn test_probe_error_passes_through() {
        let err: CliError = jobprobe::ProbeError::config("project must not be empty").into();
        assert_eq!(
            err.to_string(),
            "Configuration error: project must not be empty"
        );
    }

    #[test]
    fn test_io_error_from() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CliError = io.into();
        assert!(err.to_string().contains("I/O"));
    }
}
