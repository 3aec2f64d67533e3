/*!
The decoded value model.

A [`Value`] owns all of its content; nothing borrows from the buffer it was
decoded from.
*/

use alloc::{boxed::Box, collections::BTreeMap, string::String, vec::Vec};
use core::fmt::{self, Write};

/// Map entries, keyed by the raw bytes of a text string.
///
/// Text is not validated as UTF-8, so keys are kept as bytes.
pub type Map = BTreeMap<Vec<u8>, Value>;

/// A tagged item: the tag number and the single value it wraps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: u64,
    pub value: Box<Value>,
}

#[derive(Debug, Clone)]
pub enum Value {
    Uint(u64),
    /// A negative integer, held as its magnitude: `NegInt(1)` is -1.
    NegInt(u64),
    Slice(Vec<u8>),
    /// A text string, exactly as encoded.
    String(Vec<u8>),
    List(Vec<Value>),
    Map(Map),
    Tag(Tag),
    Bool(bool),
    Nil,
    Undefined,
    /// A single precision float; half precision items are widened to this.
    Float32(f32),
    Float64(f64),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Uint(_) => "Unsigned Integer",
            Value::NegInt(_) => "Negative Integer",
            Value::Slice(_) => "Byte String",
            Value::String(_) => "Text String",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
            Value::Tag(_) => "Tag",
            Value::Bool(_) => "Boolean",
            Value::Nil => "Null",
            Value::Undefined => "Undefined",
            Value::Float32(_) => "Float32",
            Value::Float64(_) => "Float64",
        }
    }

    /// The represented integer, for [`Value::Uint`] and [`Value::NegInt`].
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Value::Uint(n) => Some(*n as i128),
            Value::NegInt(m) => Some(-(*m as i128)),
            _ => None,
        }
    }

    /// The content of a byte or text string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Slice(b) | Value::String(b) => Some(b),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }
}

// Floats compare by bit pattern so that every value equals itself, NaNs included
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Uint(a), Value::Uint(b)) => a == b,
            (Value::NegInt(a), Value::NegInt(b)) => a == b,
            (Value::Slice(a), Value::Slice(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Tag(a), Value::Tag(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Undefined, Value::Undefined) => true,
            (Value::Float32(a), Value::Float32(b)) => a.to_bits() == b.to_bits(),
            (Value::Float64(a), Value::Float64(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Uint(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value.into_bytes())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Map(value)
    }
}

impl From<Tag> for Value {
    fn from(value: Tag) -> Self {
        Value::Tag(value)
    }
}

fn write_text(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    f.write_char('"')?;
    for c in String::from_utf8_lossy(bytes).chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

fn write_float(f: &mut fmt::Formatter<'_>, v: f64, finite: fmt::Arguments<'_>) -> fmt::Result {
    if v.is_nan() {
        f.write_str("NaN")
    } else if v.is_infinite() {
        f.write_str(if v.is_sign_positive() {
            "Infinity"
        } else {
            "-Infinity"
        })
    } else {
        f.write_fmt(finite)
    }
}

/// RFC 8949 diagnostic notation.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Uint(n) => write!(f, "{n}"),
            Value::NegInt(m) => write!(f, "-{m}"),
            Value::Slice(b) => {
                f.write_str("h'")?;
                for b in b {
                    write!(f, "{b:02x}")?;
                }
                f.write_char('\'')
            }
            Value::String(b) => write_text(f, b),
            Value::List(items) => {
                f.write_char('[')?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_char(']')
            }
            Value::Map(map) => {
                f.write_char('{')?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_text(f, k)?;
                    write!(f, ": {v}")?;
                }
                f.write_char('}')
            }
            Value::Tag(tag) => write!(f, "{}({})", tag.id, tag.value),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Nil => f.write_str("null"),
            Value::Undefined => f.write_str("undefined"),
            // Debug keeps a fractional part, so 1.0 is not mistaken for an integer
            Value::Float32(v) => write_float(f, *v as f64, format_args!("{v:?}")),
            Value::Float64(v) => write_float(f, *v, format_args!("{v:?}")),
        }
    }
}
