//! Success/Failure algebra for reads
//!
//! A read yields either a [`Success`] carrying the value and where it was
//! found, or a [`Failure`] carrying one or more located causes. A failure is
//! never empty: every constructor takes at least one cause, and merging only
//! ever concatenates.
//!
//! Copyright (c) 2025 Jsonbind Team
//! Licensed under the Apache-2.0 license

use crate::error::ReadError;
use crate::location::Location;
use serde::Serialize;
use std::fmt;

/// Outcome of any reader
pub type ReadResult<T> = Result<Success<T>, Failure>;

/// A successfully read value and the location it was read from
#[derive(Debug, Clone, PartialEq)]
pub struct Success<T> {
    pub location: Location,
    pub value: T,
}

impl<T> Success<T> {
    pub fn new(location: Location, value: T) -> Self {
        Self { location, value }
    }

    /// Transform the value, keeping the location
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Success<U> {
        Success {
            location: self.location,
            value: f(self.value),
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// One located error inside a failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cause {
    pub location: Location,
    pub error: ReadError,
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_root() {
            write!(f, "at root: {}", self.error)
        } else {
            write!(f, "at '{}': {}", self.location, self.error)
        }
    }
}

/// A non-empty, ordered list of causes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    causes: Vec<Cause>,
}

impl Failure {
    /// A failure with a single cause
    pub fn new(location: Location, error: ReadError) -> Self {
        Self {
            causes: vec![Cause { location, error }],
        }
    }

    /// Build from a list of causes; `None` when the list is empty
    pub fn from_causes(causes: Vec<Cause>) -> Option<Self> {
        if causes.is_empty() {
            None
        } else {
            Some(Self { causes })
        }
    }

    /// Append `other`'s causes after this failure's causes
    pub fn merge(mut self, other: Failure) -> Self {
        self.causes.extend(other.causes);
        self
    }

    /// Merge a sequence of failures in order; `None` when it is empty
    pub fn merge_all<I: IntoIterator<Item = Failure>>(failures: I) -> Option<Self> {
        failures.into_iter().reduce(Failure::merge)
    }

    pub fn causes(&self) -> &[Cause] {
        &self.causes
    }

    pub fn into_causes(self) -> Vec<Cause> {
        self.causes
    }

    /// Number of causes, always at least one
    pub fn len(&self) -> usize {
        self.causes.len()
    }

    /// The first cause in discovery order
    pub fn first(&self) -> &Cause {
        &self.causes[0]
    }

    /// Shortcut for `Err(Failure::new(..))`
    pub fn err<T>(location: Location, error: ReadError) -> ReadResult<T> {
        Err(Self::new(location, error))
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let [cause] = self.causes.as_slice() {
            return write!(f, "Read failed {}", cause);
        }
        write!(f, "Read failed with {} errors:", self.causes.len())?;
        for (i, cause) in self.causes.iter().enumerate() {
            write!(f, "\n{}. {}", i + 1, cause)?;
        }
        Ok(())
    }
}

impl std::error::Error for Failure {}

/// Collects failures under the fail-fast discipline of one read
///
/// With fail-fast on, the first recorded failure is handed back immediately
/// so the caller can return it; otherwise failures are kept in order.
#[derive(Debug)]
pub(crate) struct Failures {
    fail_fast: bool,
    collected: Vec<Failure>,
}

impl Failures {
    pub(crate) fn new(fail_fast: bool) -> Self {
        Self {
            fail_fast,
            collected: Vec::new(),
        }
    }

    /// Record `failure`; returns it back as an error when reading must stop
    pub(crate) fn record(&mut self, failure: Failure) -> Result<(), Failure> {
        if self.fail_fast {
            return Err(failure);
        }
        self.collected.push(failure);
        Ok(())
    }

    /// Pass a successful value through, recording a failure instead
    pub(crate) fn check<T>(&mut self, result: Result<T, Failure>) -> Result<Option<T>, Failure> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(failure) => self.record(failure).map(|()| None),
        }
    }

    /// Everything collected so far, merged in recording order
    pub(crate) fn finish(self) -> Result<(), Failure> {
        match Failure::merge_all(self.collected) {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }
}
