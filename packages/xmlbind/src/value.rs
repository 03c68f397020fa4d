//! Bound values exchanged between models and the binding engine.
//!
//! A model converts itself to and from a [`Record`]: an ordered set of named
//! [`Value`]s. The deserializer builds records from XML trees and the
//! serializer walks them, so the engine never needs to know the concrete
//! Rust types behind a model.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{BindError, Result};
use crate::validate::ValidationError;
use crate::xml::XmlNode;

/// A typed scalar produced by a validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(DateTime<FixedOffset>),
}

impl Scalar {
    /// Name of the scalar kind, used in messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Int(_) | Self::UInt(_) => "integer",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::DateTime(_) => "date-time",
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::UInt(u) => write!(f, "{u}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Time(t) => write!(f, "{}", t.format("%H:%M:%S%.f")),
            Self::DateTime(dt) => f.write_str(&dt.to_rfc3339()),
        }
    }
}

/// Any value a model field can hold.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    /// Absent optional value.
    #[default]
    None,
    Scalar(Scalar),
    /// A nested model.
    Model(Record),
    /// Items of a collection field, in document order.
    List(Vec<Value>),
    /// An XML subtree kept verbatim.
    Raw(XmlNode),
}

impl Value {
    /// Check if the value is absent
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Name of the value kind, used in messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::None => "nothing",
            Value::Scalar(s) => s.kind_name(),
            Value::Model(_) => "model",
            Value::List(_) => "list",
            Value::Raw(_) => "raw element",
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(Scalar::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Model(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> Option<&XmlNode> {
        match self {
            Value::Raw(node) => Some(node),
            _ => None,
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Scalar(Scalar::Bool(b))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Scalar(Scalar::Float(f))
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Scalar(Scalar::Float(f64::from(f)))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(Scalar::Str(s))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(Scalar::Str(s.to_string()))
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Scalar(Scalar::Date(d))
    }
}

impl From<NaiveTime> for Value {
    fn from(t: NaiveTime) -> Self {
        Value::Scalar(Scalar::Time(t))
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Value::Scalar(Scalar::DateTime(dt))
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Model(r)
    }
}

impl From<XmlNode> for Value {
    fn from(node: XmlNode) -> Self {
        Value::Raw(node)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::None,
        }
    }
}

macro_rules! int_conversions {
    ($variant:ident, $wide:ty: $($t:ty),*) => {$(
        impl From<$t> for Value {
            fn from(i: $t) -> Self {
                Value::Scalar(Scalar::$variant(<$wide>::from(i)))
            }
        }

        impl FromValue for $t {
            fn from_value(value: Value) -> std::result::Result<Self, ValidationError> {
                let wide: i128 = match value {
                    Value::Scalar(Scalar::Int(i)) => i128::from(i),
                    Value::Scalar(Scalar::UInt(u)) => i128::from(u),
                    other => return Err(mismatch(stringify!($t), &other)),
                };
                <$t>::try_from(wide).map_err(|_| {
                    ValidationError::new(format!(
                        "{wide} is out of range for {}",
                        stringify!($t)
                    ))
                })
            }
        }
    )*};
}

/// Conversion from a bound [`Value`] into a Rust field type.
///
/// Used by [`Record::take`] when a model rebuilds itself from a record.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> std::result::Result<Self, ValidationError>;
}

fn mismatch(expected: &str, found: &Value) -> ValidationError {
    ValidationError::new(format!("expected {expected}, found {}", found.kind_name()))
}

int_conversions!(Int, i64: i8, i16, i32, i64);
int_conversions!(UInt, u64: u8, u16, u32, u64);

impl FromValue for Value {
    fn from_value(value: Value) -> std::result::Result<Self, ValidationError> {
        Ok(value)
    }
}

impl FromValue for Scalar {
    fn from_value(value: Value) -> std::result::Result<Self, ValidationError> {
        match value {
            Value::Scalar(s) => Ok(s),
            other => Err(mismatch("scalar", &other)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> std::result::Result<Self, ValidationError> {
        match value {
            Value::Scalar(Scalar::Bool(b)) => Ok(b),
            other => Err(mismatch("boolean", &other)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> std::result::Result<Self, ValidationError> {
        match value {
            Value::Scalar(Scalar::Float(f)) => Ok(f),
            Value::Scalar(Scalar::Int(i)) => Ok(i as f64),
            Value::Scalar(Scalar::UInt(u)) => Ok(u as f64),
            other => Err(mismatch("float", &other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> std::result::Result<Self, ValidationError> {
        match value {
            Value::Scalar(Scalar::Str(s)) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: Value) -> std::result::Result<Self, ValidationError> {
        match value {
            Value::Scalar(Scalar::Date(d)) => Ok(d),
            other => Err(mismatch("date", &other)),
        }
    }
}

impl FromValue for NaiveTime {
    fn from_value(value: Value) -> std::result::Result<Self, ValidationError> {
        match value {
            Value::Scalar(Scalar::Time(t)) => Ok(t),
            other => Err(mismatch("time", &other)),
        }
    }
}

impl FromValue for DateTime<FixedOffset> {
    fn from_value(value: Value) -> std::result::Result<Self, ValidationError> {
        match value {
            Value::Scalar(Scalar::DateTime(dt)) => Ok(dt),
            other => Err(mismatch("date-time", &other)),
        }
    }
}

impl FromValue for XmlNode {
    fn from_value(value: Value) -> std::result::Result<Self, ValidationError> {
        match value {
            Value::Raw(node) => Ok(node),
            other => Err(mismatch("raw element", &other)),
        }
    }
}

impl FromValue for Record {
    fn from_value(value: Value) -> std::result::Result<Self, ValidationError> {
        match value {
            Value::Model(r) => Ok(r),
            other => Err(mismatch("model", &other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> std::result::Result<Self, ValidationError> {
        match value {
            Value::None => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// A missing collection converts to an empty `Vec`.
impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> std::result::Result<Self, ValidationError> {
        match value {
            Value::None => Ok(Vec::new()),
            Value::List(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| {
                    T::from_value(item)
                        .map_err(|e| ValidationError::new(format!("item {i}: {}", e.message)))
                })
                .collect(),
            other => Err(mismatch("list", &other)),
        }
    }
}

/// Field values of one model instance, in declaration order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field, replacing an existing value with the same name.
    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Remove a field and return its value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let index = self.fields.iter().position(|(n, _)| n == name)?;
        Some(self.fields.remove(index).1)
    }

    /// Remove a field and convert it to a Rust type.
    ///
    /// A missing field converts from [`Value::None`], so optional and
    /// collection fields may be left out of the record.
    ///
    /// # Errors
    /// Returns `InvalidFieldValue` with the field name as path when the
    /// value has the wrong shape.
    pub fn take<T: FromValue>(&mut self, name: &str) -> Result<T> {
        let value = self.remove(name).unwrap_or_default();
        T::from_value(value).map_err(|cause| BindError::InvalidFieldValue {
            path: name.to_string(),
            cause,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
