//! Jsonbind Core - typed reading of JSON value trees
//!
//! This crate binds an already-parsed JSON tree to domain types through
//! composable readers. Every failure carries the exact location in the tree
//! where it happened, and a read either stops at the first failure or
//! accumulates all of them, depending on [`ReadOptions`].
//!
//! # Main Components
//!
//! - **Values and locations**: [`Value`], [`Location`] and [`JsonPath`]
//! - **Lookup**: resolving paths into defined or undefined outcomes
//! - **Readers**: [`Reader`] and its combinators, plus primitive [`readers`]
//! - **Field policies**: the six [`FieldPolicy`] presence rules
//! - **Composite readers**: [`StructReader`], [`TupleReader`] and the [`list`]/[`map`] readers
//! - **Validation**: [`Validator`], [`StructValidator`] and [`PostValidator`]
//!
//! # Example
//!
//! ```
//! use jsonbind_core::{readers, Environment, Property, StructReader, Success, Value};
//!
//! #[derive(Debug)]
//! struct User {
//!     name: String,
//!     age: Option<u8>,
//! }
//!
//! let name = Property::required("name", readers::string());
//! let age = Property::optional("age", readers::u8());
//! let user = StructReader::new()
//!     .property(&name)
//!     .property(&age)
//!     .build(move |_, location, mut values| {
//!         let user = User {
//!             name: values.take(&name)?,
//!             age: values.take_opt(&age),
//!         };
//!         Ok(Success::new(location.clone(), user))
//!     });
//!
//! let tree = Value::parse(r#"{"name": "Ada"}"#).unwrap();
//! let read = user.read_root(&Environment::default(), &tree).unwrap();
//! assert_eq!(read.value.name, "Ada");
//! assert_eq!(read.value.age, None);
//! ```
//!
//! Copyright (c) 2025 Jsonbind Team
//! Licensed under the Apache-2.0 license

pub mod config;
pub mod environment;
pub mod error;
pub mod location;
pub mod lookup;
pub mod path;
pub mod policy;
pub mod property;
pub mod reader;
pub mod readers;
pub mod result;
pub mod sequence;
pub mod structure;
pub mod validator;
pub mod value;

// Re-export main types for convenience
pub use config::{ConfigError, ReadOptions, DEFAULT_MAX_DEPTH};
pub use environment::Environment;
pub use error::{DefaultErrorBuilder, ErrorBuilder, ReadError, Violation};
pub use location::{Location, PathElement};
pub use lookup::{resolve, resolve_any, Defined, Lookup, Undefined};
pub use path::{JsonPath, PathSyntaxError};
pub use policy::{read_field, FieldPolicy, Supplier, WhenMissing, WhenNull};
pub use property::{Property, PropertyValues, Slot, SlotId};
pub use reader::Reader;
pub use result::{Cause, Failure, ReadResult, Success};
pub use sequence::{list, map, set, Item, TupleReader};
pub use structure::{PostValidator, StructReader, StructValidator};
pub use validator::Validator;
pub use value::{Number, Value, ValueType};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
