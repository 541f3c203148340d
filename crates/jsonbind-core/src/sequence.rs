//! Readers for arrays and string-keyed maps
//!
//! Homogeneous arrays read through [`list`] or [`set`], string-keyed maps
//! through [`map`]. Heterogeneous arrays use a [`TupleReader`]: a fixed prefix
//! of typed [`Item`] positions, optionally followed by a tail read with a
//! single reader.
//!
//! Each element is read at its own location (`/3`, `/name`), and all of them
//! honor fail-fast the same way struct reads do.
//!
//! Copyright (c) 2025 Jsonbind Team
//! Licensed under the Apache-2.0 license

use crate::environment::Environment;
use crate::error::ReadError;
use crate::location::Location;
use crate::property::{PropertyValues, Slot, SlotId};
use crate::reader::Reader;
use crate::result::{Failure, Failures, ReadResult, Success};
use crate::value::{Value, ValueType};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

fn elements<'a>(env: &Environment, location: &Location, value: &'a Value) -> Result<&'a [Value], Failure> {
    let Value::Array(items) = value else {
        return Err(env.invalid_type(location, &[ValueType::Array], value.value_type()));
    };
    env.check_depth(location)?;
    Ok(items)
}

/// Read every element with `item`, keeping order
pub fn list<T: 'static>(item: Reader<T>) -> Reader<Vec<T>> {
    Reader::from_fn(move |env, location, value| {
        let nodes = elements(env, location, value)?;
        let mut failures = Failures::new(env.fail_fast());
        let mut items = Vec::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            if let Some(success) = failures.check(item.read(env, &location.index(index), node))? {
                items.push(success.value);
            }
        }
        failures.finish()?;
        Ok(Success::new(location.clone(), items))
    })
}

/// Read every element with `item`, dropping duplicates
pub fn set<T>(item: Reader<T>) -> Reader<HashSet<T>>
where
    T: Eq + Hash + 'static,
{
    list(item).map(|items| items.into_iter().collect())
}

/// Read every entry of a struct with `entry`, keyed by name
///
/// A key that appears more than once keeps its last value.
pub fn map<T: 'static>(entry: Reader<T>) -> Reader<BTreeMap<String, T>> {
    Reader::from_fn(move |env, location, value| {
        let Value::Struct(entries) = value else {
            return Err(env.invalid_type(location, &[ValueType::Struct], value.value_type()));
        };
        env.check_depth(location)?;

        let mut failures = Failures::new(env.fail_fast());
        let mut read = BTreeMap::new();
        for (name, node) in entries {
            if let Some(success) = failures.check(entry.read(env, &location.key(name.clone()), node))? {
                read.insert(name.clone(), success.value);
            }
        }
        failures.finish()?;
        Ok(Success::new(location.clone(), read))
    })
}

struct ItemInner<T> {
    reader: Reader<T>,
    optional: bool,
}

/// One position in the prefix of a [`TupleReader`]
pub struct Item<T> {
    inner: Arc<ItemInner<T>>,
}

impl<T> Clone for Item<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Item<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("reader", &self.inner.reader)
            .field("optional", &self.inner.optional)
            .finish()
    }
}

impl<T: Send + Sync + 'static> Item<T> {
    /// A position that must exist
    pub fn new(reader: Reader<T>) -> Self {
        Self {
            inner: Arc::new(ItemInner { reader, optional: false }),
        }
    }

    /// A position the array may be too short to contain
    pub fn optional(reader: Reader<T>) -> Self {
        Self {
            inner: Arc::new(ItemInner { reader, optional: true }),
        }
    }
}

impl<T> Slot<T> for Item<T> {
    fn slot_id(&self) -> SlotId {
        SlotId::of(&self.inner)
    }
}

trait DeclaredItem: Send + Sync {
    fn slot_id(&self) -> SlotId;
    fn is_optional(&self) -> bool;
    fn read_into(&self, env: &Environment, location: &Location, value: &Value, values: &mut PropertyValues) -> Result<(), Failure>;
}

impl<T: Send + Sync + 'static> DeclaredItem for Item<T> {
    fn slot_id(&self) -> SlotId {
        Slot::slot_id(self)
    }

    fn is_optional(&self) -> bool {
        self.inner.optional
    }

    fn read_into(&self, env: &Environment, location: &Location, value: &Value, values: &mut PropertyValues) -> Result<(), Failure> {
        let success = self.inner.reader.read(env, location, value)?;
        values.insert(Slot::slot_id(self), success.value);
        Ok(())
    }
}

/// Builder and reader for arrays with positional item types
///
/// `R` is the type of the tail elements; without a tail reader any element
/// past the prefix is a `max_items` violation.
pub struct TupleReader<R = Value> {
    items: Vec<Arc<dyn DeclaredItem>>,
    rest: Option<Reader<R>>,
}

impl<R> Clone for TupleReader<R> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            rest: self.rest.clone(),
        }
    }
}

impl<R> fmt::Debug for TupleReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TupleReader")
            .field("items", &self.items.len())
            .field("rest", &self.rest)
            .finish()
    }
}

impl TupleReader<Value> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            rest: None,
        }
    }
}

impl Default for TupleReader<Value> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: 'static> TupleReader<R> {
    /// Append the next prefix position
    pub fn item<T: Send + Sync + 'static>(mut self, item: &Item<T>) -> Self {
        self.items.push(Arc::new(item.clone()));
        self
    }

    /// Read every element after the prefix with `reader`
    pub fn rest<S: 'static>(self, reader: Reader<S>) -> TupleReader<S> {
        TupleReader {
            items: self.items,
            rest: Some(reader),
        }
    }

    /// Finish with a constructor taking the prefix values and the tail
    pub fn build<T, F>(self, construct: F) -> Reader<T>
    where
        T: 'static,
        F: Fn(&Environment, &Location, PropertyValues, Vec<R>) -> ReadResult<T> + Send + Sync + 'static,
    {
        Reader::from_fn(move |env, location, value| {
            let (values, rest) = self.read_values(env, location, value)?;
            construct(env, location, values, rest)
        })
    }

    /// Read the prefix and the tail without constructing
    pub fn read_values(&self, env: &Environment, location: &Location, value: &Value) -> Result<(PropertyValues, Vec<R>), Failure> {
        let nodes = elements(env, location, value)?;
        let mut failures = Failures::new(env.fail_fast());
        let mut values = PropertyValues::new(env, location.clone());

        for (index, item) in self.items.iter().enumerate() {
            let at = location.index(index);
            values.declare(item.slot_id(), at.clone());
            match nodes.get(index) {
                Some(node) => {
                    failures.check(item.read_into(env, &at, node, &mut values))?;
                }
                None if item.is_optional() => {}
                None => failures.record(env.path_missing(&at))?,
            }
        }

        let mut rest = Vec::new();
        let prefix = self.items.len();
        match &self.rest {
            Some(reader) => {
                for (index, node) in nodes.iter().enumerate().skip(prefix) {
                    if let Some(success) = failures.check(reader.read(env, &location.index(index), node))? {
                        rest.push(success.value);
                    }
                }
            }
            None if nodes.len() > prefix => {
                let error = ReadError::violation(
                    "max_items",
                    format!("at most {} items", prefix),
                    format!("{} items", nodes.len()),
                );
                failures.record(Failure::new(location.index(prefix), error))?;
            }
            None => {}
        }

        failures.finish()?;
        Ok((values, rest))
    }
}
