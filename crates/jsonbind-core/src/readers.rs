//! Readers for primitive shapes
//!
//! Copyright (c) 2025 Jsonbind Team
//! Licensed under the Apache-2.0 license

use crate::error::ReadError;
use crate::reader::Reader;
use crate::result::{Failure, Success};
use crate::value::{Number, Value, ValueType};
use serde::de::DeserializeOwned;
use std::str::FromStr;

pub use crate::sequence::{list, map, set};

/// Any string
pub fn string() -> Reader<String> {
    Reader::from_fn(|env, location, value| match value {
        Value::String(s) => Ok(Success::new(location.clone(), s.clone())),
        other => Err(env.invalid_type(location, &[ValueType::String], other.value_type())),
    })
}

/// `true` or `false`
pub fn boolean() -> Reader<bool> {
    Reader::from_fn(|env, location, value| match value {
        Value::Boolean(b) => Ok(Success::new(location.clone(), *b)),
        other => Err(env.invalid_type(location, &[ValueType::Boolean], other.value_type())),
    })
}

/// The raw numeric literal, without conversion
pub fn number() -> Reader<Number> {
    Reader::from_fn(|env, location, value| match value {
        Value::Number(n) => Ok(Success::new(location.clone(), n.clone())),
        other => Err(env.invalid_type(location, &[ValueType::Number], other.value_type())),
    })
}

/// Only `null`
pub fn null() -> Reader<()> {
    Reader::from_fn(|env, location, value| match value {
        Value::Null => Ok(Success::new(location.clone(), ())),
        other => Err(env.invalid_type(location, &[ValueType::Null], other.value_type())),
    })
}

/// The node itself, whatever its type
pub fn any() -> Reader<Value> {
    Reader::from_fn(|_, location, value| Ok(Success::new(location.clone(), value.clone())))
}

/// A number converted through `FromStr`; text that does not parse is a
/// `NumberFormat` error naming `target`
fn parsed<T>(target: &'static str) -> Reader<T>
where
    T: FromStr + 'static,
{
    Reader::from_fn(move |env, location, value| match value {
        Value::Number(n) => match n.parse::<T>() {
            Ok(parsed) => Ok(Success::new(location.clone(), parsed)),
            Err(_) => Err(env.number_format(location, n.as_str(), target)),
        },
        other => Err(env.invalid_type(location, &[ValueType::Number], other.value_type())),
    })
}

macro_rules! integer_readers {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            #[doc = concat!("An integer that fits `", stringify!($ty), "`")]
            pub fn $name() -> Reader<$ty> {
                parsed::<$ty>(stringify!($ty))
            }
        )*
    };
}

integer_readers! {
    i8 => i8,
    i16 => i16,
    i32 => i32,
    i64 => i64,
    u8 => u8,
    u16 => u16,
    u32 => u32,
    u64 => u64,
    usize => usize,
}

/// A finite `f64`; literals outside its range are `NumberFormat` errors
pub fn f64() -> Reader<f64> {
    float::<f64>("f64")
}

/// A finite `f32`; literals outside its range are `NumberFormat` errors
pub fn f32() -> Reader<f32> {
    float::<f32>("f32")
}

fn float<F>(target: &'static str) -> Reader<F>
where
    F: FromStr + Into<f64> + Copy + 'static,
{
    Reader::from_fn(move |env, location, value| match value {
        Value::Number(n) => match n.parse::<F>() {
            Ok(parsed) if parsed.into().is_finite() => Ok(Success::new(location.clone(), parsed)),
            _ => Err(env.number_format(location, n.as_str(), target)),
        },
        other => Err(env.invalid_type(location, &[ValueType::Number], other.value_type())),
    })
}

/// A string mapped onto one of a fixed set of values
pub fn enumeration<T>(variants: Vec<(&'static str, T)>) -> Reader<T>
where
    T: Clone + Send + Sync + 'static,
{
    let allowed = variants.iter().map(|(name, _)| *name).collect::<Vec<_>>().join(", ");
    Reader::from_fn(move |env, location, value| {
        let Value::String(s) = value else {
            return Err(env.invalid_type(location, &[ValueType::String], value.value_type()));
        };
        match variants.iter().find(|(name, _)| *name == s.as_str()) {
            Some((_, variant)) => Ok(Success::new(location.clone(), variant.clone())),
            None => Failure::err(
                location.clone(),
                ReadError::violation("one_of", format!("one of: {}", allowed), s.clone()),
            ),
        }
    })
}

/// Anything `serde` can deserialize from the equivalent JSON
pub fn deserialize<T>() -> Reader<T>
where
    T: DeserializeOwned + 'static,
{
    Reader::from_fn(|_, location, value| match serde_json::from_value::<T>(value.to_json()) {
        Ok(parsed) => Ok(Success::new(location.clone(), parsed)),
        Err(e) => Failure::err(
            location.clone(),
            ReadError::violation("deserialize", std::any::type_name::<T>(), e.to_string()),
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::location::Location;
    use serde::Deserialize;
    use serde_json::json;

    fn read<T: 'static>(reader: Reader<T>, json: serde_json::Value) -> Result<T, Failure> {
        reader
            .read_root(&Environment::default(), &Value::from(json))
            .map(Success::into_value)
    }

    #[test]
    fn test_string_and_boolean() {
        assert_eq!(read(string(), json!("hi")).unwrap(), "hi");
        assert!(read(boolean(), json!(false)).is_ok_and(|b| !b));
        let failure = read(string(), json!(null)).unwrap_err();
        assert_eq!(
            failure.first().error,
            ReadError::invalid_type(ValueType::String, ValueType::Null)
        );
    }

    #[test]
    fn test_integer_fit() {
        assert_eq!(read(u8(), json!(255)).unwrap(), 255);
        let failure = read(u8(), json!(256)).unwrap_err();
        assert_eq!(
            failure.first().error,
            ReadError::NumberFormat {
                value: "256".into(),
                target: "u8".into()
            }
        );
        assert!(read(i64(), json!(1.5)).is_err());
        assert_eq!(read(i64(), json!(-9_000_000_000i64)).unwrap(), -9_000_000_000);
    }

    #[test]
    fn test_big_integer_keeps_text_in_error() {
        let value = Value::parse("123456789012345678901234567890").unwrap();
        let failure = i64().read_root(&Environment::default(), &value).unwrap_err();
        assert_eq!(
            failure.first().error,
            ReadError::NumberFormat {
                value: "123456789012345678901234567890".into(),
                target: "i64".into()
            }
        );
        assert_eq!(
            read(number(), json!(1.25)).unwrap().as_str(),
            "1.25"
        );
    }

    #[test]
    fn test_float_range() {
        assert_eq!(read(f64(), json!(2.5)).unwrap(), 2.5);
        let value = Value::parse("1e999").unwrap();
        let failure = f64().read_root(&Environment::default(), &value).unwrap_err();
        assert_eq!(
            failure.first().error,
            ReadError::NumberFormat {
                value: "1e999".into(),
                target: "f64".into()
            }
        );
        let value = Value::parse("1e40").unwrap();
        assert!(f32().read_root(&Environment::default(), &value).is_err());
    }

    #[test]
    fn test_null_and_any() {
        assert!(read(null(), json!(null)).is_ok());
        assert!(read(null(), json!(0)).is_err());
        assert_eq!(read(any(), json!([1])).unwrap(), Value::from(json!([1])));
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Color {
        Red,
        Green,
    }

    #[test]
    fn test_enumeration() {
        let reader = enumeration(vec![("red", Color::Red), ("green", Color::Green)]);
        assert_eq!(read(reader.clone(), json!("green")).unwrap(), Color::Green);
        let failure = reader
            .read(&Environment::default(), &Location::root().key("c"), &Value::from("blue"))
            .unwrap_err();
        assert_eq!(
            failure.first().error,
            ReadError::violation("one_of", "one of: red, green", "blue")
        );
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn test_deserialize_bridge() {
        assert_eq!(read(deserialize::<Point>(), json!({"x": 1, "y": 2})).unwrap(), Point { x: 1, y: 2 });
        let failure = read(deserialize::<Point>(), json!({"x": 1})).unwrap_err();
        assert_eq!(failure.first().error.rule(), Some("deserialize"));
    }
}
