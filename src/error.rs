//! Error handling for the plot core
//!
//! Per-file and per-path failures are local and non-fatal: directory scans
//! log and skip, they never abort. Errors that reach the caller carry the
//! offending path or parameter so log lines can name it.

use thiserror::Error;

/// Result type alias for plot core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the plot core
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON configuration parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A candidate path's name does not decode as a plot file name
    #[error("Invalid plot file name '{path}': {message}")]
    PlotFile { path: String, message: String },

    /// Bad round parameters (scoop out of range, zero base target)
    #[error("Round error: {message}")]
    Round { message: String },

    /// Integrity check could not produce a result
    #[error("Integrity check failed: {message}")]
    Integrity { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Cancellation of a long-running operation
    #[error("Operation was cancelled: {operation}")]
    Cancelled { operation: String },
}

impl Error {
    /// Create a plot file parse error
    pub fn plot_file(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PlotFile {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a round parameter error
    pub fn round(message: impl Into<String>) -> Self {
        Self::Round {
            message: message.into(),
        }
    }

    /// Create an integrity check error
    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a cancellation error
    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::PlotFile { .. } => "plot_file",
            Error::Round { .. } => "round",
            Error::Integrity { .. } => "integrity",
            Error::Config { .. } => "config",
            Error::Cancelled { .. } => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_path() {
        let err = Error::plot_file("/plots/garbage", "expected four fields");
        let text = err.to_string();
        assert!(text.contains("/plots/garbage"));
        assert!(text.contains("expected four fields"));
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(Error::round("x").category(), "round");
        assert_eq!(Error::integrity("x").category(), "integrity");
        assert_eq!(Error::cancelled("x").category(), "cancelled");
    }
}
