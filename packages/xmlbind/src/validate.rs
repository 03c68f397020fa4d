//! Scalar type validation and rendering.
//!
//! The binding engine never interprets scalar text itself: it hands raw
//! strings to a [`Validator`] together with the field's [`ScalarType`] and
//! gets a typed [`Scalar`] back (and the reverse for serialization).
//! [`StandardValidator`] implements the lexical forms of the common XML
//! Schema built-in types.

use chrono::{DateTime, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::Scalar;

/// Width and signedness of an integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl IntKind {
    /// Smallest representable value.
    #[must_use]
    pub fn min(&self) -> i128 {
        match self {
            Self::I8 => i128::from(i8::MIN),
            Self::I16 => i128::from(i16::MIN),
            Self::I32 => i128::from(i32::MIN),
            Self::I64 => i128::from(i64::MIN),
            Self::U8 | Self::U16 | Self::U32 | Self::U64 => 0,
        }
    }

    /// Largest representable value.
    #[must_use]
    pub fn max(&self) -> i128 {
        match self {
            Self::I8 => i128::from(i8::MAX),
            Self::I16 => i128::from(i16::MAX),
            Self::I32 => i128::from(i32::MAX),
            Self::I64 => i128::from(i64::MAX),
            Self::U8 => i128::from(u8::MAX),
            Self::U16 => i128::from(u16::MAX),
            Self::U32 => i128::from(u32::MAX),
            Self::U64 => i128::from(u64::MAX),
        }
    }

    /// Whether negative values are representable.
    #[must_use]
    pub fn is_signed(&self) -> bool {
        self.min() < 0
    }

    /// Rust-style type name used in messages.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
        }
    }
}

/// Declared type of a scalar field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    /// Text, taken verbatim.
    String,
    /// `true`/`false`/`1`/`0`.
    Boolean,
    /// Integer with range checking.
    Integer(IntKind),
    /// 64-bit float, including `INF`, `-INF` and `NaN`.
    Float,
    /// Calendar date, `YYYY-MM-DD`.
    Date,
    /// Time of day, `HH:MM:SS[.fff]`.
    Time,
    /// RFC 3339 date-time with offset.
    DateTime,
    /// One of a fixed set of tokens.
    Enumeration(Vec<String>),
}

impl ScalarType {
    /// Human-readable type name used in messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Integer(kind) => kind.as_str(),
            Self::Float => "float",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "date-time",
            Self::Enumeration(_) => "enumeration",
        }
    }

    /// Check whether an already typed scalar fits this type.
    #[must_use]
    pub fn accepts(&self, value: &Scalar) -> bool {
        match (self, value) {
            (Self::String, Scalar::Str(_)) => true,
            (Self::Enumeration(options), Scalar::Str(s)) => options.iter().any(|o| o == s),
            (Self::Boolean, Scalar::Bool(_)) => true,
            (Self::Integer(kind), Scalar::Int(i)) => in_range(i128::from(*i), *kind),
            (Self::Integer(kind), Scalar::UInt(u)) => in_range(i128::from(*u), *kind),
            (Self::Float, Scalar::Float(_) | Scalar::Int(_) | Scalar::UInt(_)) => true,
            (Self::Date, Scalar::Date(_)) => true,
            (Self::Time, Scalar::Time(_)) => true,
            (Self::DateTime, Scalar::DateTime(_)) => true,
            _ => false,
        }
    }
}

fn in_range(value: i128, kind: IntKind) -> bool {
    value >= kind.min() && value <= kind.max()
}

/// A value rejected by a validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    /// Create a validation error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The raw text is not a valid lexical form of `ty`.
    #[must_use]
    pub fn invalid_text(raw: &str, ty: &ScalarType) -> Self {
        Self::new(format!("'{raw}' is not a valid {}", ty.name()))
    }

    /// The typed value cannot be represented as `ty`.
    #[must_use]
    pub fn unrepresentable(value: &Scalar, ty: &ScalarType) -> Self {
        Self::new(format!("{value} cannot be represented as {}", ty.name()))
    }
}

impl From<String> for ValidationError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ValidationError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Validation and rendering capability for scalar field values.
///
/// Implementations must be pure: the same input always yields the same
/// result, and `validate(render(v))` must reproduce `v` for every value
/// that `render` accepts.
pub trait Validator: Send + Sync {
    /// Turn raw XML text into a typed value.
    fn validate(&self, raw: &str, ty: &ScalarType) -> Result<Scalar, ValidationError>;

    /// Turn a typed value into XML text.
    fn render(&self, value: &Scalar, ty: &ScalarType) -> Result<String, ValidationError>;
}

/// Validator for the lexical forms of the common XML Schema types.
///
/// Strings are taken verbatim; all other types ignore surrounding whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardValidator;

impl StandardValidator {
    fn parse_integer(raw: &str, kind: IntKind) -> Option<Scalar> {
        let value: i128 = raw.parse().ok()?;
        if !in_range(value, kind) {
            return None;
        }
        if kind.is_signed() {
            i64::try_from(value).ok().map(Scalar::Int)
        } else {
            u64::try_from(value).ok().map(Scalar::UInt)
        }
    }

    fn parse_float(raw: &str) -> Option<f64> {
        match raw {
            "INF" | "+INF" => Some(f64::INFINITY),
            "-INF" => Some(f64::NEG_INFINITY),
            "NaN" => Some(f64::NAN),
            other => other.parse().ok(),
        }
    }

    fn render_float(value: f64) -> String {
        if value.is_nan() {
            "NaN".to_string()
        } else if value.is_infinite() {
            let text = if value > 0.0 { "INF" } else { "-INF" };
            text.to_string()
        } else {
            value.to_string()
        }
    }
}

impl Validator for StandardValidator {
    fn validate(&self, raw: &str, ty: &ScalarType) -> Result<Scalar, ValidationError> {
        let trimmed = raw.trim();
        let parsed = match ty {
            ScalarType::String => Some(Scalar::Str(raw.to_string())),
            ScalarType::Boolean => match trimmed {
                "true" | "1" => Some(Scalar::Bool(true)),
                "false" | "0" => Some(Scalar::Bool(false)),
                _ => None,
            },
            ScalarType::Integer(kind) => Self::parse_integer(trimmed, *kind),
            ScalarType::Float => Self::parse_float(trimmed).map(Scalar::Float),
            ScalarType::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .map(Scalar::Date),
            ScalarType::Time => NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f")
                .ok()
                .map(Scalar::Time),
            ScalarType::DateTime => DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(Scalar::DateTime),
            ScalarType::Enumeration(options) => options
                .iter()
                .find(|o| o.as_str() == trimmed)
                .map(|o| Scalar::Str(o.clone())),
        };
        parsed.ok_or_else(|| ValidationError::invalid_text(raw, ty))
    }

    fn render(&self, value: &Scalar, ty: &ScalarType) -> Result<String, ValidationError> {
        if !ty.accepts(value) {
            return Err(ValidationError::unrepresentable(value, ty));
        }
        let text = match value {
            Scalar::Str(s) => s.clone(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(i) if *ty == ScalarType::Float => Self::render_float(*i as f64),
            Scalar::UInt(u) if *ty == ScalarType::Float => Self::render_float(*u as f64),
            Scalar::Int(i) => i.to_string(),
            Scalar::UInt(u) => u.to_string(),
            Scalar::Float(f) => Self::render_float(*f),
            Scalar::Date(d) => d.format("%Y-%m-%d").to_string(),
            Scalar::Time(t) => t.format("%H:%M:%S%.f").to_string(),
            Scalar::DateTime(dt) => dt.to_rfc3339(),
        };
        Ok(text)
    }
}
