use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::{Decimal, prelude::ToPrimitive};

/// A runtime value produced by literals, bindings, functions and operators.
///
/// The set of variants is closed: every operator and type check matches on it
/// exhaustively.
///
/// # Numeric Representation
///
/// All numbers are held as `f64`. Bindings supplied as any integer width,
/// `f32` or [`Decimal`] are widened on the way in through the `From`
/// conversions below, so operators never see mixed-width arithmetic.
///
/// # Examples
///
/// ```
/// use sprig_lang::Value;
///
/// let null = Value::Null;
/// let boolean = Value::Boolean(true);
/// let number = Value::from(42_i32);
/// assert_eq!(number, Value::Number(42.0));
///
/// let array = Value::Array(vec![Value::from(1), Value::from("two")]);
/// assert_eq!(array.to_string(), "[1, two]");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absence of a value
    Null,

    /// Boolean (true/false)
    Boolean(bool),

    /// Number, always a 64-bit float
    Number(f64),

    /// UTF-8 string
    String(String),

    /// Point in time, normalised to UTC
    DateTime(DateTime<Utc>),

    /// Array of values (may be heterogeneous)
    Array(Vec<Value>),
}

impl Value {
    /// Human-readable name of the variant, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::DateTime(_) => "datetime",
            Value::Array(_) => "array",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

// Numeric widening. Every integer-like input collapses onto `Number(f64)`.

macro_rules! widen_into_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Number(n as f64)
                }
            }
        )*
    };
}

widen_into_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        // Decimal's range fits inside f64's, so this only loses precision
        Value::Number(d.to_f64().unwrap_or(f64::NAN))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
