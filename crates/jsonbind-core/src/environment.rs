//! Read environment
//!
//! Copyright (c) 2025 Jsonbind Team
//! Licensed under the Apache-2.0 license

use crate::config::ReadOptions;
use crate::error::{DefaultErrorBuilder, ErrorBuilder, ReadError};
use crate::location::Location;
use crate::result::Failure;
use crate::value::ValueType;
use std::fmt;
use std::sync::Arc;

/// Everything a reader may consult besides the value itself
///
/// The environment is immutable for the duration of a read and cheap to
/// clone, so one instance can be shared by concurrent reads.
#[derive(Clone)]
pub struct Environment {
    options: ReadOptions,
    errors: Arc<dyn ErrorBuilder>,
}

impl Environment {
    /// Default error builder with the given options
    pub fn new(options: ReadOptions) -> Self {
        Self {
            options,
            errors: Arc::new(DefaultErrorBuilder),
        }
    }

    /// Replace the error builder
    pub fn with_error_builder(mut self, errors: impl ErrorBuilder + 'static) -> Self {
        self.errors = Arc::new(errors);
        self
    }

    pub fn with_options(mut self, options: ReadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    pub fn fail_fast(&self) -> bool {
        self.options.fail_fast
    }

    pub fn errors(&self) -> &dyn ErrorBuilder {
        self.errors.as_ref()
    }

    /// `PathMissing` failure at `location`
    pub fn path_missing(&self, location: &Location) -> Failure {
        Failure::new(location.clone(), self.errors.path_missing())
    }

    /// `InvalidType` failure at `location`
    pub fn invalid_type(&self, location: &Location, expected: &[ValueType], actual: ValueType) -> Failure {
        Failure::new(location.clone(), self.errors.invalid_type(expected, actual))
    }

    /// `NumberFormat` failure at `location`
    pub fn number_format(&self, location: &Location, value: &str, target: &str) -> Failure {
        Failure::new(location.clone(), self.errors.number_format(value, target))
    }

    /// Refuse to descend below `location` when it is deeper than allowed
    pub fn check_depth(&self, location: &Location) -> Result<(), Failure> {
        let limit = self.options.max_depth;
        if location.depth() > limit {
            tracing::debug!(location = %location, limit, "Refusing to read past maximum depth");
            return Err(Failure::new(location.clone(), self.errors.depth_exceeded(limit)));
        }
        Ok(())
    }

    /// Wrap an arbitrary error at `location`
    pub fn failure(&self, location: &Location, error: ReadError) -> Failure {
        Failure::new(location.clone(), error)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(ReadOptions::default())
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Terse;

    impl ErrorBuilder for Terse {
        fn path_missing(&self) -> ReadError {
            ReadError::custom("required")
        }
    }

    #[test]
    fn test_custom_error_builder() {
        let env = Environment::default().with_error_builder(Terse);
        let failure = env.path_missing(&Location::root().key("name"));
        assert_eq!(failure.first().error, ReadError::custom("required"));
        // untouched methods keep their defaults
        let failure = env.invalid_type(&Location::root(), &[ValueType::String], ValueType::Null);
        assert_eq!(
            failure.first().error,
            ReadError::invalid_type(ValueType::String, ValueType::Null)
        );
    }

    #[test]
    fn test_depth_check() {
        let env = Environment::new(ReadOptions::default().with_max_depth(1));
        assert!(env.check_depth(&Location::root().key("a")).is_ok());
        let err = env.check_depth(&Location::root().key("a").index(0)).unwrap_err();
        assert_eq!(err.first().error, ReadError::DepthExceeded { limit: 1 });
    }

    #[test]
    fn test_environment_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Environment>();
    }
}
