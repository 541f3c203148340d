//! Field read policies
//!
//! Six policies decide what happens when a field's lookup finds an explicit
//! `null`, finds nothing, or cannot step through an intermediate node:
//!
//! | Policy | Found null | Found other | Not found | Invalid container |
//! |---|---|---|---|---|
//! | `Required` | read | read | `PathMissing` | `InvalidType` |
//! | `Defaultable` | default | read | default | `InvalidType` |
//! | `Optional` | read | read | null | `InvalidType` |
//! | `OptionalWithDefault` | read | read | default | `InvalidType` |
//! | `Nullable` | null | read | null | `InvalidType` |
//! | `NullableWithDefault` | null | read | default | `InvalidType` |
//!
//! All six run through [`read_field`], which only knows the two behavior
//! slots each policy maps to.
//!
//! Copyright (c) 2025 Jsonbind Team
//! Licensed under the Apache-2.0 license

use crate::environment::Environment;
use crate::error::ReadError;
use crate::location::Location;
use crate::lookup::{Defined, Undefined};
use crate::reader::Reader;
use crate::result::{Failure, ReadResult, Success};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Produces a default value on demand
pub type Supplier<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// Presence/nullability behavior of one field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldPolicy {
    Required,
    Defaultable,
    Optional,
    OptionalWithDefault,
    Nullable,
    NullableWithDefault,
}

impl FieldPolicy {
    pub const ALL: [FieldPolicy; 6] = [
        FieldPolicy::Required,
        FieldPolicy::Defaultable,
        FieldPolicy::Optional,
        FieldPolicy::OptionalWithDefault,
        FieldPolicy::Nullable,
        FieldPolicy::NullableWithDefault,
    ];

    /// Whether this policy can only be used together with a default supplier
    pub fn needs_default(self) -> bool {
        matches!(
            self,
            FieldPolicy::Defaultable | FieldPolicy::OptionalWithDefault | FieldPolicy::NullableWithDefault
        )
    }

    /// Bind the policy's two slots, resolving `Default` against `default`
    ///
    /// Fails when the policy needs a default and none was supplied.
    pub fn slots<T>(self, default: Option<&Supplier<T>>) -> Result<(WhenNull<'_, T>, WhenMissing<'_, T>), ReadError> {
        let required_default = || {
            default.ok_or_else(|| ReadError::custom(format!("No default value configured for {} field", self)))
        };
        let slots = match self {
            FieldPolicy::Required => (WhenNull::Read, WhenMissing::Fail),
            FieldPolicy::Defaultable => {
                let default = required_default()?;
                (WhenNull::Default(default), WhenMissing::Default(default))
            }
            FieldPolicy::Optional => (WhenNull::Read, WhenMissing::Null),
            FieldPolicy::OptionalWithDefault => (WhenNull::Read, WhenMissing::Default(required_default()?)),
            FieldPolicy::Nullable => (WhenNull::Null, WhenMissing::Null),
            FieldPolicy::NullableWithDefault => (WhenNull::Null, WhenMissing::Default(required_default()?)),
        };
        Ok(slots)
    }
}

impl fmt::Display for FieldPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldPolicy::Required => "required",
            FieldPolicy::Defaultable => "defaultable",
            FieldPolicy::Optional => "optional",
            FieldPolicy::OptionalWithDefault => "optional_with_default",
            FieldPolicy::Nullable => "nullable",
            FieldPolicy::NullableWithDefault => "nullable_with_default",
        };
        f.write_str(name)
    }
}

/// What to do when the field is present with an explicit `null`
pub enum WhenNull<'a, T> {
    /// Hand the `null` to the reader
    Read,
    /// Treat as absent
    Null,
    /// Use the default
    Default(&'a Supplier<T>),
}

/// What to do when no candidate path leads to a node
pub enum WhenMissing<'a, T> {
    /// Report every candidate as a failure
    Fail,
    /// Treat as absent
    Null,
    /// Use the default
    Default(&'a Supplier<T>),
}

/// Apply a field's policy slots to its lookup outcome
///
/// `outcome` is the result of resolving all candidate paths relative to
/// `base`. A `None` value means the field is intentionally absent.
pub fn read_field<T: 'static>(
    env: &Environment,
    base: &Location,
    outcome: Result<Defined<'_>, Vec<Undefined>>,
    reader: &Reader<T>,
    when_null: WhenNull<'_, T>,
    when_missing: WhenMissing<'_, T>,
) -> ReadResult<Option<T>> {
    match outcome {
        Ok(Defined { location, value }) => match (value, when_null) {
            (Value::Null, WhenNull::Null) => Ok(Success::new(location, None)),
            (Value::Null, WhenNull::Default(default)) => Ok(Success::new(location, Some(default()))),
            _ => reader.read(env, &location, value).map(|success| success.map(Some)),
        },
        Err(undefined) => {
            if let WhenMissing::Fail = when_missing {
                let failures = undefined.iter().map(|outcome| outcome.to_failure(env));
                return Err(Failure::merge_all(failures).unwrap_or_else(|| env.path_missing(base)));
            }

            let invalid = undefined
                .iter()
                .filter(|outcome| outcome.is_invalid_type())
                .map(|outcome| outcome.to_failure(env));
            if let Some(failure) = Failure::merge_all(invalid) {
                return Err(failure);
            }

            let location = undefined.first().map_or_else(|| base.clone(), |outcome| outcome.location().clone());
            match when_missing {
                WhenMissing::Default(default) => Ok(Success::new(location, Some(default()))),
                _ => Ok(Success::new(location, None)),
            }
        }
    }
}
