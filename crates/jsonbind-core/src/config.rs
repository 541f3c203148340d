//! Run options for reads
//!
//! [`ReadOptions`] are plain data: build them in code, or load them from a
//! JSON, YAML or TOML file and let `JSONBIND_*` environment variables override
//! individual settings.
//!
//! Copyright (c) 2025 Jsonbind Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default cap on how deeply struct and array readers descend
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Errors raised while loading [`ReadOptions`]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File I/O errors
    #[error("Failed to read file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Parse errors in any supported format
    #[error("Failed to parse {format} file '{path}': {message}")]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },

    /// Unsupported file extension
    #[error("Unsupported file format for '{path}'. Expected .json, .yaml, .yml or .toml")]
    UnsupportedFormat { path: PathBuf },

    /// An environment override could not be parsed
    #[error("Invalid value '{value}' for environment variable {var}")]
    InvalidEnv { var: &'static str, value: String },
}

/// Options honored by every reader during one read call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// Stop at the first failure instead of collecting all of them
    pub fail_fast: bool,
    /// Deepest location struct and array readers will descend into
    pub max_depth: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            fail_fast: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ReadOptions {
    /// Options that collect every failure
    pub fn accumulate() -> Self {
        Self::default()
    }

    /// Options that stop at the first failure
    pub fn fail_fast() -> Self {
        Self::default().with_fail_fast(true)
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Load options from a file, choosing the format by extension
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);
        let parse_error = |format: &'static str, message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            format,
            message,
        };

        let options: ReadOptions = match extension.as_deref() {
            Some("json") => serde_json::from_str(&content).map_err(|e| parse_error("JSON", e.to_string()))?,
            Some("yaml" | "yml") => serde_yaml::from_str(&content).map_err(|e| parse_error("YAML", e.to_string()))?,
            Some("toml") => toml::from_str(&content).map_err(|e| parse_error("TOML", e.to_string()))?,
            _ => {
                return Err(ConfigError::UnsupportedFormat {
                    path: path.to_path_buf(),
                })
            }
        };

        tracing::debug!(path = %path.display(), ?options, "Loaded read options");
        Ok(options)
    }

    /// Apply `JSONBIND_FAIL_FAST` and `JSONBIND_MAX_DEPTH` if set
    pub fn apply_env_overrides(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from any variable source
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        const FAIL_FAST: &str = "JSONBIND_FAIL_FAST";
        const MAX_DEPTH: &str = "JSONBIND_MAX_DEPTH";

        if let Some(value) = lookup(FAIL_FAST) {
            self.fail_fast = match value.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => return Err(ConfigError::InvalidEnv { var: FAIL_FAST, value }),
            };
        }

        if let Some(value) = lookup(MAX_DEPTH) {
            self.max_depth = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { var: MAX_DEPTH, value })?;
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let options = ReadOptions::default();
        assert!(!options.fail_fast);
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
        assert!(ReadOptions::fail_fast().fail_fast);
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let options: ReadOptions = serde_json::from_str(r#"{"fail_fast": true}"#).unwrap();
        assert!(options.fail_fast);
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [("JSONBIND_FAIL_FAST", "yes"), ("JSONBIND_MAX_DEPTH", "8")].into();
        let options = ReadOptions::default()
            .apply_overrides(|var| vars.get(var).map(|v| v.to_string()))
            .unwrap();
        assert!(options.fail_fast);
        assert_eq!(options.max_depth, 8);
    }

    #[test]
    fn test_invalid_override() {
        let err = ReadOptions::default()
            .apply_overrides(|var| (var == "JSONBIND_MAX_DEPTH").then(|| "deep".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("JSONBIND_MAX_DEPTH"));
    }
}
