/*!
Conformance fixtures.

A fixture file is a JSON array of records. Records for inputs that must fail
carry a `description` and a hex `input`; records for inputs that must decode
also carry an `expect` object describing the value, e.g.

```json
{ "description": "tag - 1/max", "input": "d8ff01", "expect": { "tag": { "id": 255, "value": { "uint": 1 } } } }
```

Floats are recorded by their bit patterns so that NaN payloads survive, and
negative integers by their encoded argument (`-1` is `{"negint": 0}`).
*/

use super::decode::{self, Error};
use super::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Marker for variants that carry no data, written as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectTag {
    pub id: u64,
    pub value: Box<Expect>,
}

/// The recorded form of a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expect {
    Uint(u64),
    Negint(u64),
    ByteString(Vec<u8>),
    String(String),
    List(Vec<Expect>),
    Map(BTreeMap<String, Expect>),
    Tag(ExpectTag),
    Bool(bool),
    Null(Empty),
    Undefined(Empty),
    Float32(u32),
    Float64(u64),
}

impl From<&Value> for Expect {
    fn from(value: &Value) -> Self {
        match value {
            Value::Uint(n) => Expect::Uint(*n),
            // Magnitudes are always at least 1
            Value::NegInt(m) => Expect::Negint(m - 1),
            Value::Slice(b) => Expect::ByteString(b.clone()),
            Value::String(b) => Expect::String(String::from_utf8_lossy(b).into_owned()),
            Value::List(items) => Expect::List(items.iter().map(Expect::from).collect()),
            Value::Map(map) => Expect::Map(
                map.iter()
                    .map(|(k, v)| (String::from_utf8_lossy(k).into_owned(), Expect::from(v)))
                    .collect(),
            ),
            Value::Tag(tag) => Expect::Tag(ExpectTag {
                id: tag.id,
                value: Box::new(Expect::from(tag.value.as_ref())),
            }),
            Value::Bool(b) => Expect::Bool(*b),
            Value::Nil => Expect::Null(Empty {}),
            Value::Undefined => Expect::Undefined(Empty {}),
            Value::Float32(f) => Expect::Float32(f.to_bits()),
            Value::Float64(f) => Expect::Float64(f.to_bits()),
        }
    }
}

/// Why a record did not hold.
#[derive(Error, Debug)]
pub enum Mismatch {
    #[error("Invalid hex input: {0}")]
    InvalidInput(#[from] hex::FromHexError),

    #[error("Expected a decode error, got {0}")]
    UnexpectedSuccess(Value),

    #[error("Decode failed: {0}")]
    Decode(#[from] Error),

    #[error("Decoded {consumed} of {len} bytes")]
    Incomplete { consumed: usize, len: usize },

    #[error("Expected {expected:?}, got {actual:?}")]
    WrongValue { expected: Expect, actual: Expect },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessCase {
    pub description: String,
    pub input: String,
    pub expect: Expect,
}

impl SuccessCase {
    pub fn new(description: impl Into<String>, input: &[u8], expect: &Value) -> Self {
        Self {
            description: description.into(),
            input: hex::encode(input),
            expect: expect.into(),
        }
    }

    /// Decodes the input, which must be consumed entirely and match `expect`.
    pub fn verify(&self) -> Result<(), Mismatch> {
        let data = hex::decode(&self.input)?;
        let (value, consumed) = decode::decode(&data)?;
        if consumed != data.len() {
            return Err(Mismatch::Incomplete {
                consumed,
                len: data.len(),
            });
        }
        let actual = Expect::from(&value);
        if actual != self.expect {
            return Err(Mismatch::WrongValue {
                expected: self.expect.clone(),
                actual,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCase {
    pub description: String,
    pub input: String,
}

impl ErrorCase {
    pub fn new(description: impl Into<String>, input: &[u8]) -> Self {
        Self {
            description: description.into(),
            input: hex::encode(input),
        }
    }

    /// Decodes the input, which must fail; returns the decode error.
    pub fn verify(&self) -> Result<Error, Mismatch> {
        let data = hex::decode(&self.input)?;
        match decode::decode(&data) {
            Ok((value, _)) => Err(Mismatch::UnexpectedSuccess(value)),
            Err(e) => Ok(e),
        }
    }
}

/// A record read from a fixture file of either kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Record {
    // Listed first: an error record is a success record without `expect`
    Success(SuccessCase),
    Error(ErrorCase),
}

impl Record {
    pub fn description(&self) -> &str {
        match self {
            Record::Success(case) => &case.description,
            Record::Error(case) => &case.description,
        }
    }

    pub fn verify(&self) -> Result<(), Mismatch> {
        let r = match self {
            Record::Success(case) => case.verify(),
            Record::Error(case) => case.verify().map(|_| ()),
        };
        if let Err(e) = &r {
            debug!(description = self.description(), "Fixture mismatch: {e}");
        }
        r
    }
}

impl From<SuccessCase> for Record {
    fn from(case: SuccessCase) -> Self {
        Record::Success(case)
    }
}

impl From<ErrorCase> for Record {
    fn from(case: ErrorCase) -> Self {
        Record::Error(case)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Tag;
    use serde_json::json;

    #[test]
    fn expect_encoding() {
        let value = Value::List(vec![
            Value::Uint(1),
            Value::NegInt(1),
            Value::Slice(vec![1, 2]),
            Value::from("foo"),
            Value::Tag(Tag {
                id: 255,
                value: Box::new(Value::Bool(true)),
            }),
            Value::Nil,
            Value::Undefined,
            Value::Float32(f32::from_bits(0x7F80_2000)),
            Value::Float64(f64::INFINITY),
            Value::Map([(b"foo".to_vec(), Value::Uint(0))].into()),
        ]);
        assert_eq!(
            serde_json::to_value(Expect::from(&value)).unwrap(),
            json!({"list": [
                {"uint": 1},
                {"negint": 0},
                {"bytestring": [1, 2]},
                {"string": "foo"},
                {"tag": {"id": 255, "value": {"bool": true}}},
                {"null": {}},
                {"undefined": {}},
                {"float32": 0x7F80_2000u32},
                {"float64": 0x7FF0_0000_0000_0000u64},
                {"map": {"foo": {"uint": 0}}},
            ]})
        );
    }

    #[test]
    fn records() {
        let records: Vec<Record> = serde_json::from_value(json!([
            {"description": "tag - 1/max", "input": "d8ff01", "expect": {"tag": {"id": 255, "value": {"uint": 1}}}},
            {"description": "map key", "input": "a100"},
        ]))
        .unwrap();
        assert!(matches!(records[0], Record::Success(_)));
        assert!(matches!(records[1], Record::Error(_)));
        for record in &records {
            record.verify().unwrap();
        }
        let Record::Error(case) = &records[1] else {
            unreachable!()
        };
        assert_eq!(
            case.verify().unwrap(),
            Error::UnexpectedMajorTypeForMapKey(0)
        );
    }

    #[test]
    fn mismatches() {
        let case = SuccessCase::new("short", &[0x01, 0x02], &Value::Uint(1));
        assert!(matches!(
            case.verify(),
            Err(Mismatch::Incomplete {
                consumed: 1,
                len: 2
            })
        ));

        let mut case = SuccessCase::new("wrong", &[0x01], &Value::Uint(1));
        case.expect = Expect::Uint(2);
        assert!(matches!(case.verify(), Err(Mismatch::WrongValue { .. })));

        let case = ErrorCase::new("valid", &[0xf6]);
        assert!(matches!(
            case.verify(),
            Err(Mismatch::UnexpectedSuccess(Value::Nil))
        ));

        let case = ErrorCase {
            description: "bad hex".into(),
            input: "zz".into(),
        };
        assert!(matches!(case.verify(), Err(Mismatch::InvalidInput(_))));
    }

    #[test]
    fn round_trip_json() {
        let case = SuccessCase::new("nan", &[0xf9, 0x7c, 0x01], &Value::Float32(f32::from_bits(0x7F80_2000)));
        let text = serde_json::to_string(&case).unwrap();
        let back: SuccessCase = serde_json::from_str(&text).unwrap();
        assert_eq!(back, case);
        back.verify().unwrap();
    }
}
