//! Error types and handling for the CLI
//!
//! Every failure mode maps to a stable process exit code.

use jsonbind_core::{ConfigError, PathSyntaxError};
use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// None of the requested paths is defined in the document
    #[error("None of the {count} candidate path(s) is defined")]
    Undefined { count: usize },

    /// Read options could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A path argument is not valid path syntax
    #[error("Invalid path: {0}")]
    Path(#[from] PathSyntaxError),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The document is not valid JSON
    #[error("Invalid JSON in {}: {source}", path.display())]
    InvalidJson {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// JSON serialization error while writing output
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{message}")]
    Other {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl Error {
    /// Create a generic error wrapping its cause
    pub fn with_source(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Other {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Undefined { .. } => 1,
            Self::Config(_) | Self::Path(_) => 2,
            Self::FileNotFound { .. } | Self::Io(_) => 3,
            Self::InvalidJson { .. } | Self::Json(_) => 4,
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::Path(_))
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    let mut message = error.to_string();
    if let Error::Other { source: Some(source), .. } = error {
        message = format!("{}: {:#}", message, source);
    }

    if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), message)
    } else {
        format!("Error: {}", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonbind_core::JsonPath;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::Undefined { count: 2 }.exit_code(), 1);
        let syntax = JsonPath::parse("$.a[").unwrap_err();
        assert_eq!(Error::from(syntax).exit_code(), 2);
        assert_eq!(
            Error::FileNotFound {
                path: PathBuf::from("missing.json")
            }
            .exit_code(),
            3
        );
        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(
            Error::InvalidJson {
                path: PathBuf::from("doc.json"),
                source: json
            }
            .exit_code(),
            4
        );
    }

    #[test]
    fn test_format_error_includes_source() {
        let error = Error::with_source("Failed to initialize logging", anyhow::anyhow!("already set"));
        assert_eq!(
            format_error(&error, false),
            "Error: Failed to initialize logging: already set"
        );
        let plain = Error::Other {
            message: "plain".to_string(),
            source: None,
        };
        assert_eq!(format_error(&plain, false), "Error: plain");
    }
}
