//! Value validators and their composition
//!
//! A [`Validator`] inspects an already-read value and either accepts it or
//! returns a [`Failure`]. Validators combine with [`Validator::and`] and
//! [`Validator::or`]; both honor the environment's fail-fast option the same
//! way struct and array reads do.
//!
//! Copyright (c) 2025 Jsonbind Team
//! Licensed under the Apache-2.0 license

use crate::environment::Environment;
use crate::error::ReadError;
use crate::location::Location;
use crate::result::Failure;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

type CheckFn<T> = dyn Fn(&Environment, &Location, &T) -> Result<(), Failure> + Send + Sync;

/// A reusable check over values of type `T`
pub struct Validator<T: ?Sized> {
    check: Arc<CheckFn<T>>,
}

impl<T: ?Sized> Clone for Validator<T> {
    fn clone(&self) -> Self {
        Self {
            check: Arc::clone(&self.check),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Validator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validator<{}>", std::any::type_name::<T>())
    }
}

impl<T: ?Sized + 'static> Validator<T> {
    pub fn from_fn<F>(check: F) -> Self
    where
        F: Fn(&Environment, &Location, &T) -> Result<(), Failure> + Send + Sync + 'static,
    {
        Self { check: Arc::new(check) }
    }

    /// Validator from a predicate; rejection reports `rule` at the value's location
    pub fn predicate<P, A>(rule: &'static str, expected: impl Into<String>, predicate: P, describe: A) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
        A: Fn(&T) -> String + Send + Sync + 'static,
    {
        let expected = expected.into();
        Self::from_fn(move |_, location, value| {
            if predicate(value) {
                Ok(())
            } else {
                Err(Failure::new(
                    location.clone(),
                    ReadError::violation(rule, expected.clone(), describe(value)),
                ))
            }
        })
    }

    /// Run the check
    pub fn check(&self, env: &Environment, location: &Location, value: &T) -> Result<(), Failure> {
        (self.check)(env, location, value)
    }

    /// Both validators must accept
    ///
    /// With fail-fast on, `other` is skipped once `self` rejects; otherwise
    /// both run and their failures are merged.
    pub fn and(self, other: Validator<T>) -> Validator<T> {
        Validator::from_fn(move |env, location, value| match self.check(env, location, value) {
            Ok(()) => other.check(env, location, value),
            Err(left) if env.fail_fast() => Err(left),
            Err(left) => match other.check(env, location, value) {
                Ok(()) => Err(left),
                Err(right) => Err(left.merge(right)),
            },
        })
    }

    /// At least one validator must accept
    ///
    /// `other` only runs when `self` rejects; if both reject, both failures
    /// are reported.
    pub fn or(self, other: Validator<T>) -> Validator<T> {
        Validator::from_fn(move |env, location, value| match self.check(env, location, value) {
            Ok(()) => Ok(()),
            Err(left) => other.check(env, location, value).map_err(|right| left.merge(right)),
        })
    }
}

impl Validator<String> {
    /// At least `min` characters
    pub fn min_length(min: usize) -> Self {
        Self::predicate(
            "min_length",
            format!("at least {} characters", min),
            move |s: &String| s.chars().count() >= min,
            |s| format!("{} characters", s.chars().count()),
        )
    }

    /// At most `max` characters
    pub fn max_length(max: usize) -> Self {
        Self::predicate(
            "max_length",
            format!("at most {} characters", max),
            move |s: &String| s.chars().count() <= max,
            |s| format!("{} characters", s.chars().count()),
        )
    }

    /// Not empty and not only whitespace
    pub fn non_blank() -> Self {
        Self::predicate(
            "non_blank",
            "non-blank string",
            |s: &String| !s.trim().is_empty(),
            |s| format!("{:?}", s),
        )
    }

    /// Matches `pattern` somewhere in the string (anchor it to match whole)
    pub fn pattern(pattern: Regex) -> Self {
        let expected = format!("string matching /{}/", pattern.as_str());
        Self::predicate("pattern", expected, move |s: &String| pattern.is_match(s), |s| format!("{:?}", s))
    }
}

impl<T> Validator<T>
where
    T: PartialOrd + fmt::Display + Send + Sync + 'static,
{
    /// Within `min..=max`
    pub fn range(min: T, max: T) -> Self {
        let expected = format!("value between {} and {}", min, max);
        Self::predicate("range", expected, move |v: &T| *v >= min && *v <= max, |v| v.to_string())
    }

    /// At least `min`
    pub fn minimum(min: T) -> Self {
        let expected = format!("value of at least {}", min);
        Self::predicate("minimum", expected, move |v: &T| *v >= min, |v| v.to_string())
    }

    /// At most `max`
    pub fn maximum(max: T) -> Self {
        let expected = format!("value of at most {}", max);
        Self::predicate("maximum", expected, move |v: &T| *v <= max, |v| v.to_string())
    }
}

impl<T> Validator<T>
where
    T: PartialEq + fmt::Debug + Send + Sync + 'static,
{
    /// Equal to one of `allowed`
    pub fn one_of(allowed: Vec<T>) -> Self {
        let expected = format!(
            "one of: {}",
            allowed.iter().map(|v| format!("{:?}", v)).collect::<Vec<_>>().join(", ")
        );
        Self::predicate("one_of", expected, move |v: &T| allowed.contains(v), |v| format!("{:?}", v))
    }
}

impl<U: 'static> Validator<Vec<U>> {
    /// At least `min` items
    pub fn min_items(min: usize) -> Self {
        Self::predicate(
            "min_items",
            format!("at least {} items", min),
            move |items: &Vec<U>| items.len() >= min,
            |items| format!("{} items", items.len()),
        )
    }

    /// At most `max` items
    pub fn max_items(max: usize) -> Self {
        Self::predicate(
            "max_items",
            format!("at most {} items", max),
            move |items: &Vec<U>| items.len() <= max,
            |items| format!("{} items", items.len()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReadOptions;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn env(fail_fast: bool) -> Environment {
        Environment::new(ReadOptions::default().with_fail_fast(fail_fast))
    }

    fn invalid(rule: &'static str) -> Validator<i32> {
        Validator::from_fn(move |_, location, _| {
            Err(Failure::new(location.clone(), ReadError::violation(rule, "valid", "invalid")))
        })
    }

    fn valid() -> Validator<i32> {
        Validator::from_fn(|_, _, _| Ok(()))
    }

    fn counting(calls: &Arc<AtomicUsize>, result: bool) -> Validator<i32> {
        let calls = Arc::clone(calls);
        Validator::from_fn(move |_, location, _| {
            calls.fetch_add(1, Ordering::SeqCst);
            if result {
                Ok(())
            } else {
                Err(Failure::new(location.clone(), ReadError::violation("right", "valid", "invalid")))
            }
        })
    }

    fn rules(failure: &Failure) -> Vec<&str> {
        failure.causes().iter().filter_map(|c| c.error.rule()).collect()
    }

    #[test]
    fn test_and_fail_fast_skips_right() {
        let calls = Arc::new(AtomicUsize::new(0));
        let failure = invalid("left")
            .and(counting(&calls, true))
            .check(&env(true), &Location::root(), &1)
            .unwrap_err();
        assert_eq!(rules(&failure), vec!["left"]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_and_accumulates_both() {
        let failure = invalid("left")
            .and(invalid("right"))
            .check(&env(false), &Location::root(), &1)
            .unwrap_err();
        assert_eq!(rules(&failure), vec!["left", "right"]);
    }

    #[test]
    fn test_and_left_invalid_right_valid_accumulate() {
        let failure = invalid("left").and(valid()).check(&env(false), &Location::root(), &1).unwrap_err();
        assert_eq!(rules(&failure), vec!["left"]);
    }

    #[test]
    fn test_or_success_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        assert!(valid().or(counting(&calls, false)).check(&env(false), &Location::root(), &1).is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_or_left_invalid_right_valid() {
        assert!(invalid("left").or(valid()).check(&env(true), &Location::root(), &1).is_ok());
    }

    #[test]
    fn test_or_both_invalid_merges() {
        let failure = invalid("left")
            .or(invalid("right"))
            .check(&env(true), &Location::root(), &1)
            .unwrap_err();
        assert_eq!(rules(&failure), vec!["left", "right"]);
    }

    #[test]
    fn test_string_validators() {
        let env = env(false);
        let here = Location::root();
        assert!(Validator::min_length(2).check(&env, &here, &"ab".to_string()).is_ok());
        assert!(Validator::max_length(1).check(&env, &here, &"ab".to_string()).is_err());
        assert!(Validator::non_blank().check(&env, &here, &"  ".to_string()).is_err());

        let zip = Validator::pattern(Regex::new(r"^\d{5}$").unwrap());
        assert!(zip.check(&env, &here, &"12345".to_string()).is_ok());
        let failure = zip.check(&env, &here, &"1234".to_string()).unwrap_err();
        assert_eq!(failure.first().error.rule(), Some("pattern"));
    }

    #[test]
    fn test_numeric_and_collection_validators() {
        let env = env(false);
        let here = Location::root();
        assert!(Validator::range(1, 10).check(&env, &here, &10).is_ok());
        assert!(Validator::range(1, 10).check(&env, &here, &11).is_err());
        assert!(Validator::minimum(0.5).check(&env, &here, &0.25).is_err());
        assert!(Validator::one_of(vec!["a", "b"]).check(&env, &here, &"c").is_err());
        assert!(Validator::<Vec<u8>>::min_items(1).check(&env, &here, &Vec::new()).is_err());
        assert!(Validator::<Vec<u8>>::max_items(1).check(&env, &here, &vec![1]).is_ok());
    }
}
