/*!
Decoding of CBOR data items into owned [`Value`]s.

Every item starts with a one byte head: the top three bits are the major type
and the low five bits the minor value. Minor values 0..=23 are the argument
itself, 24..=27 announce a 1, 2, 4 or 8 byte big-endian argument, and 31 marks
an indefinite-length string or container (or, under major type 7, the break
marker that closes one).
*/

use super::float16::f16_to_f32;
use super::value::{Tag, Value};
use alloc::{boxed::Box, vec::Vec};
use thiserror::Error;
use tracing::trace;

/// Default bound on the nesting of lists, maps and tags.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// The break marker: major type 7, minor value 31.
pub(crate) const BREAK: u8 = 0xFF;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("arg len {0} greater than remaining buf len")]
    ArgumentTooShort(usize),

    #[error("unexpected minor value {0}")]
    InvalidMinorValue(u8),

    #[error("incomplete float{0} at end of buf")]
    IncompleteFloat(u8),

    #[error("slice len {0} greater than remaining buf len")]
    ContentTooShort(u64),

    #[error("expected break marker")]
    ExpectedBreakMarker,

    #[error("unexpected major type {0} in indefinite slice")]
    UnexpectedMajorTypeInIndefiniteChunk(u8),

    #[error("nested indefinite slice")]
    NestedIndefiniteChunk,

    #[error("unexpected end of payload")]
    UnexpectedEndOfPayload,

    #[error("unexpected major type {0} for map key")]
    UnexpectedMajorTypeForMapKey(u8),

    /// A chunk of an indefinite-length string failed to decode.
    #[error("decode subslice: {0}")]
    NestedChunk(Box<Error>),

    /// A negative integer with argument `u64::MAX`, whose magnitude does not fit in 64 bits.
    #[error("negative integer magnitude exceeds 64 bits")]
    NegativeIntegerOverflow,

    #[error("maximum nesting depth {0} exceeded")]
    MaxDepthExceeded(usize),
}

impl Error {
    /// Strips any [`Error::NestedChunk`] wrapping, returning the error that caused the failure.
    pub fn innermost(&self) -> &Error {
        let mut e = self;
        while let Error::NestedChunk(inner) = e {
            e = inner;
        }
        e
    }

    fn nested(self) -> Self {
        Error::NestedChunk(Box::new(self))
    }
}

/// Decoder limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Options {
    /// Maximum number of nested list, map and tag levels.
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// The argument carried by an item head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Argument {
    Value(u64),
    Indefinite,
}

/// Interprets `bytes` as a big-endian unsigned integer.
///
/// Only the low 64 bits are kept, so callers pass at most 8 bytes.
pub fn read_uint_be(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0, |acc, b| (acc << 8) | *b as u64)
}

/// Reads the argument selected by `minor` from the start of `data`, returning
/// it with the number of bytes it occupied.
pub(crate) fn read_argument(minor: u8, data: &[u8]) -> Result<(Argument, usize), Error> {
    let len = match minor {
        0..=23 => return Ok((Argument::Value(minor as u64), 0)),
        24 => 1,
        25 => 2,
        26 => 4,
        27 => 8,
        31 => return Ok((Argument::Indefinite, 0)),
        _ => return Err(Error::InvalidMinorValue(minor)),
    };
    let bytes = data.get(..len).ok_or(Error::ArgumentTooShort(len))?;
    Ok((Argument::Value(read_uint_be(bytes)), len))
}

#[inline]
pub(crate) fn split_head(initial: u8) -> (u8, u8) {
    (initial >> 5, initial & 0x1F)
}

pub(crate) struct Decoder<'a> {
    pub(crate) data: &'a [u8],
    max_depth: usize,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(data: &'a [u8], options: &Options) -> Self {
        Self {
            data,
            max_depth: options.max_depth,
        }
    }

    /// Decodes the item starting at `offset`, returning it with the offset just past its end.
    pub(crate) fn value(&self, offset: usize, depth: usize) -> Result<(Value, usize), Error> {
        let Some(&initial) = self.data.get(offset) else {
            return Err(Error::UnexpectedEndOfPayload);
        };
        let (major, minor) = split_head(initial);
        let offset = offset + 1;
        match major {
            0 => match self.argument(minor, offset)? {
                (Argument::Value(v), offset) => Ok((Value::Uint(v), offset)),
                (Argument::Indefinite, _) => Err(Error::InvalidMinorValue(minor)),
            },
            1 => match self.argument(minor, offset)? {
                (Argument::Value(v), offset) => v
                    .checked_add(1)
                    .map(|magnitude| (Value::NegInt(magnitude), offset))
                    .ok_or(Error::NegativeIntegerOverflow),
                (Argument::Indefinite, _) => Err(Error::InvalidMinorValue(minor)),
            },
            2 => self
                .string(major, minor, offset)
                .map(|(v, offset)| (Value::Slice(v), offset)),
            3 => self
                .string(major, minor, offset)
                .map(|(v, offset)| (Value::String(v), offset)),
            4 => {
                let (arg, offset) = self.argument(minor, offset)?;
                self.list(arg, offset, depth)
            }
            5 => {
                let (arg, offset) = self.argument(minor, offset)?;
                self.map(arg, offset, depth)
            }
            6 => match self.argument(minor, offset)? {
                (Argument::Value(id), offset) => self.tag(id, offset, depth),
                (Argument::Indefinite, _) => Err(Error::InvalidMinorValue(minor)),
            },
            _ => self.simple(minor, offset),
        }
    }

    /// Reads the argument for a head whose minor value is `minor`, with `offset` just past the head byte.
    pub(crate) fn argument(&self, minor: u8, offset: usize) -> Result<(Argument, usize), Error> {
        read_argument(minor, &self.data[offset..]).map(|(arg, len)| (arg, offset + len))
    }

    /// Checks that one more level of nesting is allowed below `depth`.
    pub(crate) fn descend(&self, depth: usize) -> Result<usize, Error> {
        if depth >= self.max_depth {
            trace!(
                max_depth = self.max_depth,
                "Refusing to decode beyond maximum nesting depth"
            );
            Err(Error::MaxDepthExceeded(self.max_depth))
        } else {
            Ok(depth + 1)
        }
    }

    /// Decodes the body of a byte or text string (major type 2 or 3).
    pub(crate) fn string(
        &self,
        major: u8,
        minor: u8,
        offset: usize,
    ) -> Result<(Vec<u8>, usize), Error> {
        match self.argument(minor, offset)? {
            (Argument::Value(len), offset) => self
                .content(len, offset)
                .map(|(bytes, offset)| (bytes.to_vec(), offset)),
            (Argument::Indefinite, offset) => self.chunked(major, offset),
        }
    }

    fn content(&self, len: u64, offset: usize) -> Result<(&'a [u8], usize), Error> {
        usize::try_from(len)
            .ok()
            .and_then(|l| self.data[offset..].get(..l))
            .map(|bytes| (bytes, offset + bytes.len()))
            .ok_or(Error::ContentTooShort(len))
    }

    fn chunked(&self, major: u8, mut offset: usize) -> Result<(Vec<u8>, usize), Error> {
        let mut bytes = Vec::new();
        loop {
            let Some(&initial) = self.data.get(offset) else {
                return Err(Error::ExpectedBreakMarker);
            };
            offset += 1;
            if initial == BREAK {
                return Ok((bytes, offset));
            }

            let (chunk_major, minor) = split_head(initial);
            if chunk_major != major {
                return Err(Error::UnexpectedMajorTypeInIndefiniteChunk(chunk_major));
            }
            let (len, next) = match self.argument(minor, offset).map_err(Error::nested)? {
                (Argument::Value(len), next) => (len, next),
                (Argument::Indefinite, _) => return Err(Error::NestedIndefiniteChunk),
            };
            let (chunk, next) = self.content(len, next).map_err(Error::nested)?;
            bytes.extend_from_slice(chunk);
            offset = next;
        }
    }

    fn tag(&self, id: u64, offset: usize, depth: usize) -> Result<(Value, usize), Error> {
        let depth = self.descend(depth)?;

        // An exhausted buffer surfaces as UnexpectedEndOfPayload from value()
        let (value, offset) = self.value(offset, depth)?;
        Ok((
            Value::Tag(Tag {
                id,
                value: Box::new(value),
            }),
            offset,
        ))
    }

    fn simple(&self, minor: u8, offset: usize) -> Result<(Value, usize), Error> {
        let float = |width: usize| {
            self.data
                .get(offset..offset + width)
                .map(read_uint_be)
                .ok_or(Error::IncompleteFloat((width * 8) as u8))
        };
        match minor {
            20 => Ok((Value::Bool(false), offset)),
            21 => Ok((Value::Bool(true), offset)),
            22 => Ok((Value::Nil, offset)),
            23 => Ok((Value::Undefined, offset)),
            25 => Ok((Value::Float32(f16_to_f32(float(2)? as u16)), offset + 2)),
            26 => Ok((Value::Float32(f32::from_bits(float(4)? as u32)), offset + 4)),
            27 => Ok((Value::Float64(f64::from_bits(float(8)?)), offset + 8)),
            _ => Err(Error::InvalidMinorValue(minor)),
        }
    }
}

/// Decodes the leading CBOR item of `data` with the default [`Options`].
///
/// On success returns the value and the number of bytes it occupied, which
/// may be less than `data.len()` if further items follow.
pub fn decode(data: &[u8]) -> Result<(Value, usize), Error> {
    decode_with(data, &Options::default())
}

/// Decodes the leading CBOR item of `data`.
pub fn decode_with(data: &[u8], options: &Options) -> Result<(Value, usize), Error> {
    Decoder::new(data, options).value(0, 0)
}

/// Decodes every item of a CBOR sequence (RFC 8742) until `data` is exhausted.
pub fn decode_all(data: &[u8]) -> Result<Vec<Value>, Error> {
    decode_all_with(data, &Options::default())
}

pub fn decode_all_with(data: &[u8], options: &Options) -> Result<Vec<Value>, Error> {
    let decoder = Decoder::new(data, options);
    let mut items = Vec::new();
    let mut offset = 0;
    while offset < data.len() {
        let (item, next) = decoder.value(offset, 0)?;
        items.push(item);
        offset = next;
    }
    Ok(items)
}
