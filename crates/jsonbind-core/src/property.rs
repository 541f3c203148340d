//! Property declarations and the values read for them
//!
//! A [`Property`] names where a field lives (one or more candidate paths),
//! how to read it, and which [`FieldPolicy`] governs its presence. It is an
//! immutable value; the methods that refine it return a new property.
//!
//! Values read by a struct or tuple reader are collected in
//! [`PropertyValues`], keyed by the identity of the property that produced
//! them. A property that resolved to "absent" has no entry.
//!
//! Copyright (c) 2025 Jsonbind Team
//! Licensed under the Apache-2.0 license

use crate::environment::Environment;
use crate::error::ReadError;
use crate::location::Location;
use crate::lookup::resolve_any;
use crate::path::JsonPath;
use crate::policy::{read_field, FieldPolicy, Supplier};
use crate::reader::Reader;
use crate::result::{Failure, ReadResult, Success};
use crate::validator::Validator;
use crate::value::Value;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Identity of a property or tuple item within one reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

impl SlotId {
    pub(crate) fn of<T: ?Sized>(inner: &Arc<T>) -> Self {
        SlotId(Arc::as_ptr(inner) as *const () as usize)
    }
}

/// Something whose read value can be fetched back from [`PropertyValues`]
pub trait Slot<T> {
    fn slot_id(&self) -> SlotId;
}

struct PropertyInner<T> {
    paths: Vec<JsonPath>,
    reader: Reader<T>,
    policy: FieldPolicy,
    default: Option<Supplier<T>>,
    validator: Option<Validator<T>>,
}

impl<T> Clone for PropertyInner<T> {
    fn clone(&self) -> Self {
        Self {
            paths: self.paths.clone(),
            reader: self.reader.clone(),
            policy: self.policy,
            default: self.default.clone(),
            validator: self.validator.clone(),
        }
    }
}

/// How to read one field of a struct
pub struct Property<T> {
    inner: Arc<PropertyInner<T>>,
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("paths", &self.inner.paths)
            .field("policy", &self.inner.policy)
            .field("validated", &self.inner.validator.is_some())
            .finish()
    }
}

impl<T: Send + Sync + 'static> Property<T> {
    fn with_policy(path: impl Into<JsonPath>, reader: Reader<T>, policy: FieldPolicy, default: Option<Supplier<T>>) -> Self {
        Self {
            inner: Arc::new(PropertyInner {
                paths: vec![path.into()],
                reader,
                policy,
                default,
                validator: None,
            }),
        }
    }

    /// Must be present; `null` goes to the reader
    pub fn required(path: impl Into<JsonPath>, reader: Reader<T>) -> Self {
        Self::with_policy(path, reader, FieldPolicy::Required, None)
    }

    /// Falls back to `default` when missing or `null`
    pub fn defaultable<D>(path: impl Into<JsonPath>, reader: Reader<T>, default: D) -> Self
    where
        D: Fn() -> T + Send + Sync + 'static,
    {
        Self::with_policy(path, reader, FieldPolicy::Defaultable, Some(Arc::new(default)))
    }

    /// May be missing; `null` goes to the reader
    pub fn optional(path: impl Into<JsonPath>, reader: Reader<T>) -> Self {
        Self::with_policy(path, reader, FieldPolicy::Optional, None)
    }

    /// Falls back to `default` when missing; `null` goes to the reader
    pub fn optional_with_default<D>(path: impl Into<JsonPath>, reader: Reader<T>, default: D) -> Self
    where
        D: Fn() -> T + Send + Sync + 'static,
    {
        Self::with_policy(path, reader, FieldPolicy::OptionalWithDefault, Some(Arc::new(default)))
    }

    /// May be missing or `null`
    pub fn nullable(path: impl Into<JsonPath>, reader: Reader<T>) -> Self {
        Self::with_policy(path, reader, FieldPolicy::Nullable, None)
    }

    /// Falls back to `default` when missing; `null` means absent
    pub fn nullable_with_default<D>(path: impl Into<JsonPath>, reader: Reader<T>, default: D) -> Self
    where
        D: Fn() -> T + Send + Sync + 'static,
    {
        Self::with_policy(path, reader, FieldPolicy::NullableWithDefault, Some(Arc::new(default)))
    }

    /// A copy of this property with `path` as a further candidate
    ///
    /// Candidates are tried in order and the first defined one is read.
    pub fn or_path(&self, path: impl Into<JsonPath>) -> Self {
        let mut inner = PropertyInner::clone(&self.inner);
        inner.paths.push(path.into());
        Self { inner: Arc::new(inner) }
    }

    /// A copy of this property that also runs `validator` on present values
    pub fn validate(&self, validator: Validator<T>) -> Self {
        let mut inner = PropertyInner::clone(&self.inner);
        inner.validator = Some(match inner.validator.take() {
            Some(existing) => existing.and(validator),
            None => validator,
        });
        Self { inner: Arc::new(inner) }
    }

    pub fn paths(&self) -> &[JsonPath] {
        &self.inner.paths
    }

    pub fn policy(&self) -> FieldPolicy {
        self.inner.policy
    }

    /// Where this property would be reported missing inside a struct at `base`
    pub fn location(&self, base: &Location) -> Location {
        self.inner.paths.first().map_or_else(|| base.clone(), |path| path.locate(base))
    }

    /// Read this property from `tree`, the struct located at `base`
    ///
    /// `None` means the field is absent under its policy. The validator only
    /// runs on present values.
    pub fn read(&self, env: &Environment, base: &Location, tree: &Value) -> ReadResult<Option<T>> {
        let inner = &*self.inner;
        let (when_null, when_missing) = inner
            .policy
            .slots(inner.default.as_ref())
            .map_err(|error| env.failure(&self.location(base), error))?;

        let outcome = resolve_any(tree, base, &inner.paths);
        let success = read_field(env, base, outcome, &inner.reader, when_null, when_missing)?;

        if let (Some(validator), Some(value)) = (&inner.validator, &success.value) {
            validator.check(env, &success.location, value)?;
        }
        Ok(success)
    }
}

impl<T> Slot<T> for Property<T> {
    fn slot_id(&self) -> SlotId {
        SlotId::of(&self.inner)
    }
}

/// A property with its value type erased, as held by a struct reader
pub(crate) trait DeclaredProperty: Send + Sync {
    fn slot_id(&self) -> SlotId;
    fn location(&self, base: &Location) -> Location;
    fn read_into(&self, env: &Environment, base: &Location, tree: &Value, values: &mut PropertyValues) -> Result<(), Failure>;
}

impl<T: Send + Sync + 'static> DeclaredProperty for Property<T> {
    fn slot_id(&self) -> SlotId {
        Slot::slot_id(self)
    }

    fn location(&self, base: &Location) -> Location {
        Property::location(self, base)
    }

    fn read_into(&self, env: &Environment, base: &Location, tree: &Value, values: &mut PropertyValues) -> Result<(), Failure> {
        let Success { value, .. } = self.read(env, base, tree)?;
        if let Some(value) = value {
            values.insert(Slot::slot_id(self), value);
        }
        Ok(())
    }
}

/// Values produced for the properties of one struct or tuple read
pub struct PropertyValues {
    location: Location,
    missing: ReadError,
    declared: HashMap<SlotId, Location>,
    values: HashMap<SlotId, Box<dyn Any + Send + Sync>>,
}

impl PropertyValues {
    /// Misses are reported with the error `env` builds for a missing path
    pub(crate) fn new(env: &Environment, location: Location) -> Self {
        Self {
            location,
            missing: env.errors().path_missing(),
            declared: HashMap::new(),
            values: HashMap::new(),
        }
    }

    /// Remember where `id` lives so that a later miss can be reported there
    pub(crate) fn declare(&mut self, id: SlotId, location: Location) {
        self.declared.insert(id, location);
    }

    pub(crate) fn insert<T: Send + Sync + 'static>(&mut self, id: SlotId, value: T) {
        self.values.insert(id, Box::new(value));
    }

    /// Location of the struct or array these values were read from
    pub fn location(&self) -> &Location {
        &self.location
    }

    fn missing(&self, id: SlotId) -> Failure {
        let location = self.declared.get(&id).unwrap_or(&self.location);
        Failure::new(location.clone(), self.missing.clone())
    }

    /// The value read for `slot`, or a path-missing failure if it is absent
    pub fn get<T: 'static>(&self, slot: &impl Slot<T>) -> Result<&T, Failure> {
        self.get_opt(slot).ok_or_else(|| self.missing(slot.slot_id()))
    }

    /// The value read for `slot`, if present
    pub fn get_opt<T: 'static>(&self, slot: &impl Slot<T>) -> Option<&T> {
        self.values.get(&slot.slot_id()).and_then(|value| value.downcast_ref::<T>())
    }

    /// Move the value read for `slot` out, or fail as a missing path
    pub fn take<T: 'static>(&mut self, slot: &impl Slot<T>) -> Result<T, Failure> {
        let id = slot.slot_id();
        self.take_opt(slot).ok_or_else(|| self.missing(id))
    }

    /// Move the value read for `slot` out, if present
    pub fn take_opt<T: 'static>(&mut self, slot: &impl Slot<T>) -> Option<T> {
        let id = slot.slot_id();
        match self.values.remove(&id)?.downcast::<T>() {
            Ok(value) => Some(*value),
            Err(other) => {
                self.values.insert(id, other);
                None
            }
        }
    }

    pub fn contains<T>(&self, slot: &impl Slot<T>) -> bool {
        self.values.contains_key(&slot.slot_id())
    }

    /// Number of present values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for PropertyValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyValues")
            .field("location", &self.location)
            .field("present", &self.values.len())
            .finish()
    }
}
