//! Struct readers
//!
//! A [`StructReader`] is assembled from properties, validators that run on the
//! raw struct before any field is read, and validators that run on the read
//! values afterwards. Reading goes through these steps:
//!
//! 1. The node must be a struct within the depth limit.
//! 2. Pre-validators run; any rejection ends the read before fields are touched.
//! 3. Every property is read.
//! 4. Post-validators run, but only if every property read succeeded.
//! 5. The constructor builds the result from the collected values.
//!
//! With fail-fast on, the first failure of any step ends the read; otherwise
//! each step reports everything it found.
//!
//! Copyright (c) 2025 Jsonbind Team
//! Licensed under the Apache-2.0 license

use crate::environment::Environment;
use crate::error::ReadError;
use crate::location::{Location, PathElement};
use crate::path::JsonPath;
use crate::property::{DeclaredProperty, Property, PropertyValues};
use crate::reader::Reader;
use crate::result::{Failure, Failures, ReadResult};
use crate::value::{Value, ValueType};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

type PreCheckFn = dyn Fn(&Environment, &Location, &[(String, Value)], &[JsonPath]) -> Result<(), Failure> + Send + Sync;
type PostCheckFn = dyn Fn(&Environment, &Location, &PropertyValues) -> Result<(), Failure> + Send + Sync;

/// A check on the raw entries of a struct, run before any property is read
///
/// The check also sees every candidate path declared by the struct's
/// properties.
#[derive(Clone)]
pub struct StructValidator {
    check: Arc<PreCheckFn>,
}

impl fmt::Debug for StructValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StructValidator")
    }
}

impl StructValidator {
    pub fn from_fn<F>(check: F) -> Self
    where
        F: Fn(&Environment, &Location, &[(String, Value)], &[JsonPath]) -> Result<(), Failure> + Send + Sync + 'static,
    {
        Self { check: Arc::new(check) }
    }

    pub fn check(&self, env: &Environment, location: &Location, entries: &[(String, Value)], declared: &[JsonPath]) -> Result<(), Failure> {
        (self.check)(env, location, entries, declared)
    }

    /// Reject keys that no declared path starts with
    ///
    /// Each unknown key is reported at its own location.
    pub fn deny_unknown_keys() -> Self {
        Self::from_fn(|_, location, entries, declared| {
            let known: BTreeSet<&str> = declared
                .iter()
                .filter_map(|path| match path.elements().first() {
                    Some(PathElement::Key(name)) => Some(name.as_str()),
                    _ => None,
                })
                .collect();
            let expected = format!(
                "one of: {}",
                known.iter().copied().collect::<Vec<_>>().join(", ")
            );

            let unknown = entries
                .iter()
                .filter(|(name, _)| !known.contains(name.as_str()))
                .map(|(name, _)| {
                    Failure::new(
                        location.key(name.clone()),
                        ReadError::violation("unknown_key", expected.clone(), name.clone()),
                    )
                });
            match Failure::merge_all(unknown) {
                Some(failure) => Err(failure),
                None => Ok(()),
            }
        })
    }

    /// At least one entry
    pub fn non_empty() -> Self {
        Self::from_fn(|_, location, entries, _| {
            if !entries.is_empty() {
                return Ok(());
            }
            Err(Failure::new(
                location.clone(),
                ReadError::violation("non_empty", "at least one key", "no keys"),
            ))
        })
    }

    /// At least `min` entries
    pub fn min_keys(min: usize) -> Self {
        Self::from_fn(move |_, location, entries, _| {
            if entries.len() >= min {
                return Ok(());
            }
            Err(Failure::new(
                location.clone(),
                ReadError::violation("min_keys", format!("at least {} keys", min), format!("{} keys", entries.len())),
            ))
        })
    }

    /// At most `max` entries
    pub fn max_keys(max: usize) -> Self {
        Self::from_fn(move |_, location, entries, _| {
            if entries.len() <= max {
                return Ok(());
            }
            Err(Failure::new(
                location.clone(),
                ReadError::violation("max_keys", format!("at most {} keys", max), format!("{} keys", entries.len())),
            ))
        })
    }
}

/// A check across the values read for a struct's properties
#[derive(Clone)]
pub struct PostValidator {
    check: Arc<PostCheckFn>,
}

impl fmt::Debug for PostValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PostValidator")
    }
}

fn describe(paths: &[JsonPath]) -> String {
    paths
        .first()
        .map_or_else(|| "$".to_string(), ToString::to_string)
}

impl PostValidator {
    pub fn from_fn<F>(check: F) -> Self
    where
        F: Fn(&Environment, &Location, &PropertyValues) -> Result<(), Failure> + Send + Sync + 'static,
    {
        Self { check: Arc::new(check) }
    }

    pub fn check(&self, env: &Environment, location: &Location, values: &PropertyValues) -> Result<(), Failure> {
        (self.check)(env, location, values)
    }

    /// `first` and `second` must not both be present
    pub fn mutually_exclusive<A, B>(first: &Property<A>, second: &Property<B>) -> Self
    where
        A: Send + Sync + 'static,
        B: Send + Sync + 'static,
    {
        let (first, second) = (first.clone(), second.clone());
        let expected = format!("at most one of {} and {}", describe(first.paths()), describe(second.paths()));
        Self::from_fn(move |_, location, values| {
            if values.contains(&first) && values.contains(&second) {
                return Err(Failure::new(
                    location.clone(),
                    ReadError::violation("mutually_exclusive", expected.clone(), "both present"),
                ));
            }
            Ok(())
        })
    }

    /// `dependent` may only be present together with `dependency`
    ///
    /// The failure is reported where `dependency` should have been.
    pub fn requires<A, B>(dependent: &Property<A>, dependency: &Property<B>) -> Self
    where
        A: Send + Sync + 'static,
        B: Send + Sync + 'static,
    {
        let (dependent, dependency) = (dependent.clone(), dependency.clone());
        let expected = format!("present when {} is present", describe(dependent.paths()));
        Self::from_fn(move |_, location, values| {
            if values.contains(&dependent) && !values.contains(&dependency) {
                return Err(Failure::new(
                    dependency.location(location),
                    ReadError::violation("requires", expected.clone(), "missing"),
                ));
            }
            Ok(())
        })
    }
}

/// Builder and reader for struct-shaped values
#[derive(Clone, Default)]
pub struct StructReader {
    properties: Vec<Arc<dyn DeclaredProperty>>,
    declared: Vec<JsonPath>,
    before: Vec<StructValidator>,
    after: Vec<PostValidator>,
}

impl fmt::Debug for StructReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructReader")
            .field("declared", &self.declared)
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .finish()
    }
}

impl StructReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a property; its values are fetched back with the same handle
    pub fn property<T: Send + Sync + 'static>(mut self, property: &Property<T>) -> Self {
        self.declared.extend(property.paths().iter().cloned());
        self.properties.push(Arc::new(property.clone()));
        self
    }

    /// Add a check on the raw struct
    pub fn before(mut self, validator: StructValidator) -> Self {
        self.before.push(validator);
        self
    }

    /// Add a check on the read values
    pub fn after(mut self, validator: PostValidator) -> Self {
        self.after.push(validator);
        self
    }

    /// Finish with a constructor that turns the read values into `T`
    pub fn build<T, F>(self, construct: F) -> Reader<T>
    where
        T: 'static,
        F: Fn(&Environment, &Location, PropertyValues) -> ReadResult<T> + Send + Sync + 'static,
    {
        Reader::from_fn(move |env, location, value| {
            let values = self.read_values(env, location, value)?;
            construct(env, location, values)
        })
    }

    /// Run every step up to, but not including, the constructor
    pub fn read_values(&self, env: &Environment, location: &Location, value: &Value) -> Result<PropertyValues, Failure> {
        let Value::Struct(entries) = value else {
            return Err(env.invalid_type(location, &[ValueType::Struct], value.value_type()));
        };
        env.check_depth(location)?;

        let mut failures = Failures::new(env.fail_fast());
        for validator in &self.before {
            failures.check(validator.check(env, location, entries, &self.declared))?;
        }
        failures.finish()?;

        let mut values = PropertyValues::new(env, location.clone());
        let mut failures = Failures::new(env.fail_fast());
        for property in &self.properties {
            values.declare(property.slot_id(), property.location(location));
            failures.check(property.read_into(env, location, value, &mut values))?;
        }
        failures.finish()?;

        let mut failures = Failures::new(env.fail_fast());
        for validator in &self.after {
            failures.check(validator.check(env, location, &values))?;
        }
        failures.finish()?;

        tracing::trace!(location = %location, present = values.len(), "Struct values read");
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReadOptions;
    use crate::readers;
    use serde_json::json;

    fn env(fail_fast: bool) -> Environment {
        Environment::new(ReadOptions::default().with_fail_fast(fail_fast))
    }

    fn read(reader: &StructReader, env: &Environment, json: serde_json::Value) -> Result<PropertyValues, Failure> {
        reader.read_values(env, &Location::root(), &Value::from(json))
    }

    #[test]
    fn test_not_a_struct() {
        let failure = read(&StructReader::new(), &env(false), json!([1])).unwrap_err();
        assert_eq!(
            failure.first().error,
            ReadError::invalid_type(ValueType::Struct, ValueType::Array)
        );
    }

    #[test]
    fn test_deny_unknown_keys_reports_each_key() {
        let name = Property::required("name", readers::string()).or_path("title");
        let reader = StructReader::new()
            .property(&name)
            .before(StructValidator::deny_unknown_keys());
        let failure = read(&reader, &env(false), json!({"title": "x", "a": 1, "b": 2})).unwrap_err();
        let pointers: Vec<String> = failure.causes().iter().map(|c| c.location.to_pointer()).collect();
        assert_eq!(pointers, vec!["/a", "/b"]);
        assert_eq!(
            failure.first().error,
            ReadError::violation("unknown_key", "one of: name, title", "a")
        );
    }

    #[test]
    fn test_pre_validator_failure_skips_fields() {
        let name = Property::required("name", readers::string());
        let reader = StructReader::new().property(&name).before(StructValidator::non_empty());
        let failure = read(&reader, &env(false), json!({})).unwrap_err();
        assert_eq!(failure.len(), 1);
        assert_eq!(failure.first().error.rule(), Some("non_empty"));
    }

    #[test]
    fn test_key_count_validators() {
        let reader = StructReader::new()
            .before(StructValidator::min_keys(2))
            .before(StructValidator::max_keys(0));
        let failure = read(&reader, &env(false), json!({"a": 1})).unwrap_err();
        let rules: Vec<&str> = failure.causes().iter().filter_map(|c| c.error.rule()).collect();
        assert_eq!(rules, vec!["min_keys", "max_keys"]);

        let failure = read(&reader, &env(true), json!({"a": 1})).unwrap_err();
        assert_eq!(failure.len(), 1);
    }

    #[test]
    fn test_post_validators_skipped_after_field_failure() {
        let a = Property::required("a", readers::i32());
        let b = Property::optional("b", readers::i32());
        let reader = StructReader::new()
            .property(&a)
            .property(&b)
            .after(PostValidator::mutually_exclusive(&a, &b));
        let failure = read(&reader, &env(false), json!({"a": "x", "b": 1})).unwrap_err();
        assert_eq!(failure.len(), 1);
        assert_eq!(failure.first().location.to_pointer(), "/a");
    }

    #[test]
    fn test_mutually_exclusive_and_requires() {
        let email = Property::optional("email", readers::string());
        let phone = Property::optional("phone", readers::string());
        let region = Property::optional("region", readers::string());
        let reader = StructReader::new()
            .property(&email)
            .property(&phone)
            .property(&region)
            .after(PostValidator::mutually_exclusive(&email, &phone))
            .after(PostValidator::requires(&phone, &region));

        let failure = read(&reader, &env(false), json!({"email": "e", "phone": "p"})).unwrap_err();
        assert_eq!(failure.len(), 2);
        assert_eq!(failure.causes()[0].location.to_pointer(), "");
        assert_eq!(failure.causes()[0].error.rule(), Some("mutually_exclusive"));
        assert_eq!(failure.causes()[1].location.to_pointer(), "/region");
        assert_eq!(failure.causes()[1].error.rule(), Some("requires"));

        let values = read(&reader, &env(false), json!({"phone": "p", "region": "EU"})).unwrap();
        assert_eq!(values.get(&region).unwrap(), "EU");
    }

    #[test]
    fn test_depth_limit() {
        let env = Environment::new(ReadOptions::default().with_max_depth(1));
        let failure = StructReader::new()
            .read_values(&env, &Location::root().key("a").key("b"), &Value::from(json!({})))
            .unwrap_err();
        assert_eq!(failure.first().error, ReadError::DepthExceeded { limit: 1 });
    }
}
