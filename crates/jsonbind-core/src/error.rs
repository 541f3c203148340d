//! Read error kinds and the builders that construct them
//!
//! Errors are plain data. Readers never raise them as panics and never log
//! them; they travel inside a [`Failure`](crate::Failure) tagged with the
//! location they were found at.
//!
//! Copyright (c) 2025 Jsonbind Team
//! Licensed under the Apache-2.0 license

use crate::value::ValueType;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A violated validation rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// The validation rule that was violated
    pub rule: String,
    /// What was expected
    pub expected: String,
    /// What was actually found
    pub actual: String,
}

impl Violation {
    pub fn new(rule: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rule '{}' violated: expected {}, but found {}",
            self.rule, self.expected, self.actual
        )
    }
}

/// Kinds of data errors a read can produce
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReadError {
    /// Nothing exists at the requested path
    #[error("Path is missing")]
    PathMissing,

    /// A node had a different type than the reader or lookup needed
    #[error("Invalid type: expected {}, found {actual}", join_types(.expected))]
    InvalidType {
        expected: Vec<ValueType>,
        actual: ValueType,
    },

    /// A numeric literal does not fit the target type
    #[error("Number '{value}' does not fit {target}")]
    NumberFormat { value: String, target: String },

    /// A validator rejected the value
    #[error("{0}")]
    Validation(Violation),

    /// The tree is nested deeper than the configured limit
    #[error("Maximum nesting depth of {limit} exceeded")]
    DepthExceeded { limit: usize },

    /// Free-form error from caller code
    #[error("{message}")]
    Custom { message: String },
}

fn join_types(types: &[ValueType]) -> String {
    types.iter().map(ToString::to_string).collect::<Vec<_>>().join(" or ")
}

impl ReadError {
    pub fn invalid_type(expected: ValueType, actual: ValueType) -> Self {
        ReadError::InvalidType {
            expected: vec![expected],
            actual,
        }
    }

    pub fn violation(rule: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        ReadError::Validation(Violation::new(rule, expected, actual))
    }

    pub fn custom(message: impl Into<String>) -> Self {
        ReadError::Custom {
            message: message.into(),
        }
    }

    /// The violated rule name, for validation errors
    pub fn rule(&self) -> Option<&str> {
        match self {
            ReadError::Validation(violation) => Some(&violation.rule),
            _ => None,
        }
    }
}

/// Constructs the errors the core itself reports
///
/// Callers can swap in their own builder on the
/// [`Environment`](crate::Environment) to change wording or map the standard
/// kinds onto their own rules.
pub trait ErrorBuilder: Send + Sync {
    /// A required path resolved to nothing
    fn path_missing(&self) -> ReadError {
        ReadError::PathMissing
    }

    /// A node had an unexpected type
    fn invalid_type(&self, expected: &[ValueType], actual: ValueType) -> ReadError {
        ReadError::InvalidType {
            expected: expected.to_vec(),
            actual,
        }
    }

    /// Numeric text could not be converted to `target`
    fn number_format(&self, value: &str, target: &str) -> ReadError {
        ReadError::NumberFormat {
            value: value.to_string(),
            target: target.to_string(),
        }
    }

    /// Nesting went past the configured limit
    fn depth_exceeded(&self, limit: usize) -> ReadError {
        ReadError::DepthExceeded { limit }
    }
}

/// The stock builder producing the [`ReadError`] variants unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorBuilder;

impl ErrorBuilder for DefaultErrorBuilder {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(ReadError::PathMissing.to_string(), "Path is missing");
        assert_eq!(
            ReadError::invalid_type(ValueType::Struct, ValueType::Number).to_string(),
            "Invalid type: expected struct, found number"
        );
        assert_eq!(
            ReadError::InvalidType {
                expected: vec![ValueType::Number, ValueType::String],
                actual: ValueType::Null,
            }
            .to_string(),
            "Invalid type: expected number or string, found null"
        );
        assert_eq!(
            ReadError::violation("min_length", "at least 3 characters", "2 characters").to_string(),
            "Rule 'min_length' violated: expected at least 3 characters, but found 2 characters"
        );
    }

    #[test]
    fn test_default_builder() {
        let builder = DefaultErrorBuilder;
        assert_eq!(builder.path_missing(), ReadError::PathMissing);
        assert_eq!(
            builder.number_format("300", "u8"),
            ReadError::NumberFormat {
                value: "300".into(),
                target: "u8".into()
            }
        );
    }

    #[test]
    fn test_serialized_kind_tag() {
        let json = serde_json::to_value(ReadError::DepthExceeded { limit: 4 }).unwrap();
        assert_eq!(json["kind"], "depth_exceeded");
        assert_eq!(json["limit"], 4);
    }
}
