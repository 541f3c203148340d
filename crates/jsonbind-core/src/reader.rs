//! The reader abstraction
//!
//! A [`Reader`] is a pure function from `(environment, location, value)` to a
//! [`ReadResult`]. Readers are cheap to clone, thread-safe, and compose
//! through the combinators below; every combinator preserves the
//! error-accumulation contract of the readers it wraps.
//!
//! Copyright (c) 2025 Jsonbind Team
//! Licensed under the Apache-2.0 license

use crate::environment::Environment;
use crate::error::ReadError;
use crate::location::Location;
use crate::result::{Failure, ReadResult, Success};
use crate::validator::Validator;
use crate::value::Value;
use std::fmt;
use std::sync::{Arc, OnceLock};

type ReadFn<T> = dyn Fn(&Environment, &Location, &Value) -> ReadResult<T> + Send + Sync;

/// A composable, typed reader
pub struct Reader<T> {
    read: Arc<ReadFn<T>>,
}

impl<T> Clone for Reader<T> {
    fn clone(&self) -> Self {
        Self {
            read: Arc::clone(&self.read),
        }
    }
}

impl<T> fmt::Debug for Reader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reader<{}>", std::any::type_name::<T>())
    }
}

impl<T: 'static> Reader<T> {
    /// Wrap a plain function as a reader
    pub fn from_fn<F>(read: F) -> Self
    where
        F: Fn(&Environment, &Location, &Value) -> ReadResult<T> + Send + Sync + 'static,
    {
        Self { read: Arc::new(read) }
    }

    /// A reader that ignores its input and always yields `value`
    pub fn constant(value: T) -> Self
    where
        T: Clone + Send + Sync,
    {
        Self::from_fn(move |_, location, _| Ok(Success::new(location.clone(), value.clone())))
    }

    /// Defer building the reader until its first use
    ///
    /// Needed for recursive shapes, where a reader refers to itself.
    pub fn lazy<F>(build: F) -> Self
    where
        F: Fn() -> Reader<T> + Send + Sync + 'static,
    {
        let cell: OnceLock<Reader<T>> = OnceLock::new();
        Self::from_fn(move |env, location, value| cell.get_or_init(&build).read(env, location, value))
    }

    /// Read `value`, which lives at `location`
    pub fn read(&self, env: &Environment, location: &Location, value: &Value) -> ReadResult<T> {
        (self.read)(env, location, value)
    }

    /// Read a whole document from its root
    pub fn read_root(&self, env: &Environment, value: &Value) -> ReadResult<T> {
        tracing::trace!(reader = %std::any::type_name::<T>(), fail_fast = env.fail_fast(), "Reading document");
        self.read(env, &Location::root(), value)
    }

    /// Transform successful values
    pub fn map<U, F>(self, f: F) -> Reader<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Reader::from_fn(move |env, location, value| self.read(env, location, value).map(|success| success.map(&f)))
    }

    /// Transform successful values with a conversion that may reject them
    ///
    /// A rejection becomes a failure at the location the value was read from.
    pub fn and_then<U, F>(self, f: F) -> Reader<U>
    where
        U: 'static,
        F: Fn(T) -> Result<U, ReadError> + Send + Sync + 'static,
    {
        Reader::from_fn(move |env, location, value| {
            let Success { location, value } = self.read(env, location, value)?;
            match f(value) {
                Ok(mapped) => Ok(Success::new(location, mapped)),
                Err(error) => Err(Failure::new(location, error)),
            }
        })
    }

    /// Try this reader, then `alternative` if it fails
    ///
    /// `alternative` is never evaluated after a success. When both fail the
    /// causes of this reader come first, followed by those of `alternative`.
    pub fn or(self, alternative: Reader<T>) -> Reader<T> {
        Reader::from_fn(move |env, location, value| match self.read(env, location, value) {
            Ok(success) => Ok(success),
            Err(first) => alternative
                .read(env, location, value)
                .map_err(|second| first.merge(second)),
        })
    }

    /// Turn successful values rejected by `predicate` into `None`
    pub fn filter<P>(self, predicate: P) -> Reader<Option<T>>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Reader::from_fn(move |env, location, value| {
            self.read(env, location, value)
                .map(|success| success.map(|v| if predicate(&v) { Some(v) } else { None }))
        })
    }

    /// Run `validator` on successful values, failing the read if it rejects
    pub fn validate(self, validator: Validator<T>) -> Reader<T> {
        Reader::from_fn(move |env, location, value| {
            let success = self.read(env, location, value)?;
            validator.check(env, &success.location, &success.value)?;
            Ok(success)
        })
    }

    /// Accept `null` as `None`, reading anything else with this reader
    pub fn nullable(self) -> Reader<Option<T>> {
        Reader::from_fn(move |env, location, value| match value {
            Value::Null => Ok(Success::new(location.clone(), None)),
            _ => self.read(env, location, value).map(|success| success.map(Some)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readers;
    use crate::value::ValueType;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn env() -> Environment {
        Environment::default()
    }

    fn failing(key: &'static str) -> Reader<String> {
        Reader::from_fn(move |_, location, _| Failure::err(location.key(key), ReadError::custom(key)))
    }

    #[test]
    fn test_map() {
        let reader = readers::string().map(|s| s.len());
        let success = reader.read_root(&env(), &Value::from("four")).unwrap();
        assert_eq!(success.value, 4);

        let failure = reader.read_root(&env(), &Value::from(true)).unwrap_err();
        assert_eq!(
            failure.first().error,
            ReadError::invalid_type(ValueType::String, ValueType::Boolean)
        );
    }

    #[test]
    fn test_or_does_not_evaluate_alternative_after_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let alternative = Reader::from_fn(move |_, location, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Failure::err(location.clone(), ReadError::custom("should not run"))
        });

        let reader = readers::string().or(alternative);
        let success = reader.read_root(&env(), &Value::from("first")).unwrap();
        assert_eq!(success.value, "first");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_or_falls_back() {
        let reader = failing("a").or(readers::string());
        assert_eq!(reader.read_root(&env(), &Value::from("b")).unwrap().value, "b");
    }

    #[test]
    fn test_or_concatenates_causes() {
        let failure = failing("a").or(failing("b")).read_root(&env(), &Value::Null).unwrap_err();
        let pointers: Vec<String> = failure.causes().iter().map(|c| c.location.to_pointer()).collect();
        assert_eq!(pointers, vec!["/a", "/b"]);
    }

    #[test]
    fn test_filter_turns_rejections_into_none() {
        let reader = readers::string().filter(|s| !s.trim().is_empty());
        assert_eq!(reader.read_root(&env(), &Value::from("  ")).unwrap().value, None);
        assert_eq!(
            reader.read_root(&env(), &Value::from("x")).unwrap().value,
            Some("x".to_string())
        );
        assert!(reader.read_root(&env(), &Value::from(1)).is_err());
    }

    #[test]
    fn test_validate_keeps_original_success() {
        let reader = readers::string().validate(Validator::min_length(2));
        let success = reader.read(&env(), &Location::root().key("k"), &Value::from("ok")).unwrap();
        assert_eq!(success.value, "ok");
        assert_eq!(success.location.to_pointer(), "/k");

        let failure = reader.read(&env(), &Location::root().key("k"), &Value::from("x")).unwrap_err();
        assert_eq!(failure.first().location.to_pointer(), "/k");
        assert_eq!(failure.first().error.rule(), Some("min_length"));
    }

    #[test]
    fn test_and_then_reports_at_read_location() {
        let reader = readers::string().and_then(|s| s.parse::<u32>().map_err(|_| ReadError::custom("not digits")));
        let failure = reader
            .read(&env(), &Location::root().index(3), &Value::from("abc"))
            .unwrap_err();
        assert_eq!(failure.first().location.to_pointer(), "/3");
    }

    #[test]
    fn test_nullable() {
        let reader = readers::i32().nullable();
        assert_eq!(reader.read_root(&env(), &Value::Null).unwrap().value, None);
        assert_eq!(reader.read_root(&env(), &Value::from(3)).unwrap().value, Some(3));
    }

    #[test]
    fn test_reader_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Reader<String>>();
    }
}
