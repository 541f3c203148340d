//! Path resolution against a value tree
//!
//! Resolution classifies every (tree, path) pair into exactly one outcome:
//! the node is defined, the path runs out of tree, or an intermediate node is
//! not the container the next step needs. The terminal node's own type is
//! never judged here; that is the reader's job.
//!
//! Copyright (c) 2025 Jsonbind Team
//! Licensed under the Apache-2.0 license

use crate::environment::Environment;
use crate::location::{Location, PathElement};
use crate::path::JsonPath;
use crate::result::Failure;
use crate::value::{Value, ValueType};

/// A node that was found, with where it was found
#[derive(Debug, Clone, PartialEq)]
pub struct Defined<'a> {
    pub location: Location,
    pub value: &'a Value,
}

/// Why a path did not lead to a node
#[derive(Debug, Clone, PartialEq)]
pub enum Undefined {
    /// A key or index does not exist; `location` includes the missing step
    PathMissing { location: Location },
    /// The node at `location` cannot be stepped into
    InvalidType {
        location: Location,
        expected: ValueType,
        actual: ValueType,
    },
}

impl Undefined {
    pub fn location(&self) -> &Location {
        match self {
            Undefined::PathMissing { location } | Undefined::InvalidType { location, .. } => location,
        }
    }

    pub fn is_invalid_type(&self) -> bool {
        matches!(self, Undefined::InvalidType { .. })
    }

    /// Turn the outcome into a failure using the environment's error builders
    pub fn to_failure(&self, env: &Environment) -> Failure {
        match self {
            Undefined::PathMissing { location } => env.path_missing(location),
            Undefined::InvalidType {
                location,
                expected,
                actual,
            } => env.invalid_type(location, &[*expected], *actual),
        }
    }
}

/// Outcome of resolving a single path
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<'a> {
    Defined(Defined<'a>),
    Undefined(Undefined),
}

impl<'a> Lookup<'a> {
    pub fn is_defined(&self) -> bool {
        matches!(self, Lookup::Defined(_))
    }

    pub fn into_result(self) -> Result<Defined<'a>, Undefined> {
        match self {
            Lookup::Defined(defined) => Ok(defined),
            Lookup::Undefined(undefined) => Err(undefined),
        }
    }
}

/// Walk `path` from `tree`, whose own location is `base`
pub fn resolve<'a>(tree: &'a Value, base: &Location, path: &JsonPath) -> Lookup<'a> {
    let mut location = base.clone();
    let mut current = tree;

    for element in path.elements() {
        let next = match (element, current) {
            (PathElement::Key(name), Value::Struct(_)) => current.get(name),
            (PathElement::Index(index), Value::Array(items)) => items.get(*index),
            (PathElement::Key(_), other) => {
                return Lookup::Undefined(Undefined::InvalidType {
                    location,
                    expected: ValueType::Struct,
                    actual: other.value_type(),
                })
            }
            (PathElement::Index(_), other) => {
                return Lookup::Undefined(Undefined::InvalidType {
                    location,
                    expected: ValueType::Array,
                    actual: other.value_type(),
                })
            }
        };

        location = location.append(element.clone());
        match next {
            Some(value) => current = value,
            None => return Lookup::Undefined(Undefined::PathMissing { location }),
        }
    }

    Lookup::Defined(Defined {
        location,
        value: current,
    })
}

/// Try each candidate path in order and return the first defined node
///
/// When no candidate is defined, every candidate's outcome is returned in
/// declaration order so that callers can report all of them.
pub fn resolve_any<'a>(tree: &'a Value, base: &Location, paths: &[JsonPath]) -> Result<Defined<'a>, Vec<Undefined>> {
    let mut undefined = Vec::with_capacity(paths.len());
    for path in paths {
        match resolve(tree, base, path) {
            Lookup::Defined(defined) => return Ok(defined),
            Lookup::Undefined(outcome) => undefined.push(outcome),
        }
    }
    Err(undefined)
}
