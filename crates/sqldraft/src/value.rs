//! Scalar values used for bound parameters and row cells.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Text layout used when a timestamp arrives as a string cell.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A database value: a bound `?` parameter or one cell of a [`Row`](crate::Row).
///
/// `List` is both the operand of an `IN` predicate and the shape of an
/// array-valued cell produced by drivers that collapse duplicate columns of a
/// one-to-many join.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
    List(Vec<Value>),
}

impl Value {
    /// Check if this is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short type name used in decode error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Timestamp(_) => "timestamp",
            Value::List(_) => "list",
        }
    }

    /// The current UTC time as a timestamp value.
    pub fn now() -> Self {
        Value::Timestamp(Utc::now().naive_utc())
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v.naive_utc())
    }
}

// MySQL and SQLite have no native UUID type; bind the hyphenated text form.
impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Text(v.hyphenated().to_string())
    }
}

#[cfg(feature = "rust_decimal")]
impl From<rust_decimal::Decimal> for Value {
    fn from(v: rust_decimal::Decimal) -> Self {
        Value::Text(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(v: [T; N]) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

/// Conversion from a row cell into a Rust value.
///
/// The error is a human-readable message; [`Row::try_get_column`](crate::Row::try_get_column)
/// attaches the column name.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, String>;
}

fn mismatch(expected: &str, got: &Value) -> String {
    format!("expected {expected}, got {}", got.type_name())
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, String> {
        Ok(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::Int(n) => Ok(*n != 0),
            other => Err(mismatch("bool", other)),
        }
    }
}

macro_rules! impl_from_value_int {
    ($($t:ty),*) => {
        $(
            impl FromValue for $t {
                fn from_value(value: &Value) -> Result<Self, String> {
                    match value {
                        Value::Int(n) => <$t>::try_from(*n)
                            .map_err(|_| format!("{} out of range for {}", n, stringify!($t))),
                        Value::Text(s) => s
                            .parse::<$t>()
                            .map_err(|e| format!("cannot parse {s:?} as {}: {e}", stringify!($t))),
                        other => Err(mismatch(stringify!($t), other)),
                    }
                }
            }
        )*
    };
}

impl_from_value_int!(i16, i32, i64, u16, u32, u64);

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Float(f) => Ok(*f),
            Value::Int(n) => Ok(*n as f64),
            Value::Text(s) => s
                .parse::<f64>()
                .map_err(|e| format!("cannot parse {s:?} as f64: {e}")),
            other => Err(mismatch("f64", other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            Value::Int(n) => Ok(n.to_string()),
            Value::Float(f) => Ok(f.to_string()),
            Value::Timestamp(ts) => Ok(ts.format(TIMESTAMP_FORMAT).to_string()),
            other => Err(mismatch("text", other)),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Timestamp(ts) => Ok(*ts),
            Value::Text(s) => NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
                .map_err(|e| format!("cannot parse {s:?} as timestamp: {e}")),
            other => Err(mismatch("timestamp", other)),
        }
    }
}

impl FromValue for Uuid {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Text(s) => {
                Uuid::parse_str(s).map_err(|e| format!("cannot parse {s:?} as uuid: {e}"))
            }
            other => Err(mismatch("uuid", other)),
        }
    }
}

#[cfg(feature = "rust_decimal")]
impl FromValue for rust_decimal::Decimal {
    fn from_value(value: &Value) -> Result<Self, String> {
        use std::str::FromStr;
        match value {
            Value::Text(s) => rust_decimal::Decimal::from_str(s)
                .map_err(|e| format!("cannot parse {s:?} as decimal: {e}")),
            Value::Int(n) => Ok(rust_decimal::Decimal::from(*n)),
            Value::Float(f) => rust_decimal::Decimal::try_from(*f)
                .map_err(|e| format!("cannot convert {f} to decimal: {e}")),
            other => Err(mismatch("decimal", other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            other => Err(mismatch("list", other)),
        }
    }
}
