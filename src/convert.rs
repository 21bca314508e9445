//! # Scalar Conversion
//!
//! Converts textual request values (path captures, query and form values) into
//! the scalar kinds a handler parameter or an object field can declare.
//!
//! A missing value (`None`) always converts to `None`, whatever the target
//! kind. A present value that cannot be parsed fails with [`ConversionError`];
//! callers decide whether that aborts the request (directly bound scalar
//! parameters) or is skipped (object fields).
//!
//! ```rust
//! use frontdispatch::convert::{Scalar, ScalarKind};
//!
//! assert_eq!(ScalarKind::Int.convert(Some("42")).unwrap(), Some(Scalar::Int(42)));
//! assert_eq!(ScalarKind::Bool.convert(Some("TRUE")).unwrap(), Some(Scalar::Bool(true)));
//! assert_eq!(ScalarKind::Long.convert(None).unwrap(), None);
//! assert!(ScalarKind::Short.convert(Some("70000")).is_err());
//! ```

use serde_json::Value;
use std::fmt;

/// Target kind of a scalar conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// UTF-8 text, taken as-is
    Text,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// `true` / `false`, case-insensitive. Any other word, `yes` or `1`
    /// included, is a conversion error rather than `false`.
    Bool,
    /// 64-bit float
    Double,
    /// 32-bit float
    Float,
    /// 16-bit signed integer
    Short,
    /// 8-bit signed integer
    Byte,
}

impl ScalarKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Text => "text",
            ScalarKind::Int => "int",
            ScalarKind::Long => "long",
            ScalarKind::Bool => "boolean",
            ScalarKind::Double => "double",
            ScalarKind::Float => "float",
            ScalarKind::Short => "short",
            ScalarKind::Byte => "byte",
        }
    }

    /// Convert an optional raw value. `None` stays `None`.
    pub fn convert(self, raw: Option<&str>) -> Result<Option<Scalar>, ConversionError> {
        raw.map(|r| self.parse(r)).transpose()
    }

    /// Parse a present raw value into this kind.
    pub fn parse(self, raw: &str) -> Result<Scalar, ConversionError> {
        let fail = || ConversionError::new(raw, self);
        Ok(match self {
            ScalarKind::Text => Scalar::Text(raw.to_string()),
            ScalarKind::Int => Scalar::Int(raw.parse().map_err(|_| fail())?),
            ScalarKind::Long => Scalar::Long(raw.parse().map_err(|_| fail())?),
            ScalarKind::Bool => {
                if raw.eq_ignore_ascii_case("true") {
                    Scalar::Bool(true)
                } else if raw.eq_ignore_ascii_case("false") {
                    Scalar::Bool(false)
                } else {
                    return Err(fail());
                }
            }
            ScalarKind::Double => Scalar::Double(raw.parse().map_err(|_| fail())?),
            ScalarKind::Float => Scalar::Float(raw.parse().map_err(|_| fail())?),
            ScalarKind::Short => Scalar::Short(raw.parse().map_err(|_| fail())?),
            ScalarKind::Byte => Scalar::Byte(raw.parse().map_err(|_| fail())?),
        })
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A converted scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Int(i32),
    Long(i64),
    Bool(bool),
    Double(f64),
    Float(f32),
    Short(i16),
    Byte(i8),
}

impl Scalar {
    #[must_use]
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Text(_) => ScalarKind::Text,
            Scalar::Int(_) => ScalarKind::Int,
            Scalar::Long(_) => ScalarKind::Long,
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::Double(_) => ScalarKind::Double,
            Scalar::Float(_) => ScalarKind::Float,
            Scalar::Short(_) => ScalarKind::Short,
            Scalar::Byte(_) => ScalarKind::Byte,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(v) => f.write_str(v),
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Long(v) => write!(f, "{v}"),
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::Double(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Short(v) => write!(f, "{v}"),
            Scalar::Byte(v) => write!(f, "{v}"),
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        match s {
            Scalar::Text(v) => Value::String(v),
            Scalar::Int(v) => Value::from(v),
            Scalar::Long(v) => Value::from(v),
            Scalar::Bool(v) => Value::Bool(v),
            Scalar::Double(v) => Value::from(v),
            Scalar::Float(v) => Value::from(v),
            Scalar::Short(v) => Value::from(v),
            Scalar::Byte(v) => Value::from(v),
        }
    }
}

/// A raw value could not be parsed into the requested kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot convert {value:?} to {kind}")]
pub struct ConversionError {
    pub value: String,
    pub kind: ScalarKind,
}

impl ConversionError {
    #[must_use]
    pub fn new(value: &str, kind: ScalarKind) -> Self {
        Self {
            value: value.to_string(),
            kind,
        }
    }
}

/// Rust types that a scalar kind converts into.
///
/// Used by typed field setters and by [`crate::handlers::CallArguments::scalar`].
pub trait FromScalar: Sized + 'static {
    const KIND: ScalarKind;

    fn from_scalar(value: Scalar) -> Option<Self>;

    fn parse_raw(raw: &str) -> Result<Self, ConversionError> {
        Self::KIND
            .parse(raw)
            .and_then(|s| Self::from_scalar(s).ok_or_else(|| ConversionError::new(raw, Self::KIND)))
    }
}

macro_rules! from_scalar {
    ($ty:ty, $kind:ident) => {
        impl FromScalar for $ty {
            const KIND: ScalarKind = ScalarKind::$kind;

            fn from_scalar(value: Scalar) -> Option<Self> {
                match value {
                    Scalar::$kind(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

from_scalar!(String, Text);
from_scalar!(i32, Int);
from_scalar!(i64, Long);
from_scalar!(bool, Bool);
from_scalar!(f64, Double);
from_scalar!(f32, Float);
from_scalar!(i16, Short);
from_scalar!(i8, Byte);
