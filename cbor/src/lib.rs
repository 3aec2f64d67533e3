/*!
A decoder for RFC 8949 CBOR.

[`decode`] turns the leading item of a byte buffer into an owned [`Value`],
returning the number of bytes the item occupied so that callers can walk a
buffer holding several items. Malformed or truncated input is rejected with a
typed [`Error`].

```
use tessera_cbor::{decode, Value};

let (value, len) = decode(&[0x82, 0x01, 0x20]).unwrap();
assert_eq!(len, 3);
assert_eq!(value, Value::List(vec![Value::Uint(1), Value::NegInt(1)]));
```
*/
#![cfg_attr(not(feature = "std"), no_std)]
extern crate alloc;

pub mod decode;
pub mod float16;
pub mod value;

mod decode_seq;

#[cfg(feature = "fixture")]
pub mod fixture;

pub use decode::{Error, Options, decode, decode_all, decode_with};
pub use value::{Map, Tag, Value};
