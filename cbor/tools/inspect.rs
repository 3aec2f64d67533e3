/*!
Inspect command - display CBOR data in various formats
*/

use super::io::{Input, Output};
use anyhow::Context;
use base64::prelude::*;
use clap::Parser;
use std::ops::Range;
use tessera_cbor::{
    Options, Value,
    decode::{self, DEFAULT_MAX_DEPTH},
};
use tracing::{debug, warn};

/// Inspect and display CBOR data
#[derive(Parser, Debug)]
#[command(about = "Inspect and display CBOR information", long_about = None)]
pub struct Command {
    /// Output format
    #[arg(
        long,
        default_value = "diag",
        value_name = "FORMAT",
        help = "Output format: diag/diagnostic (human-readable), json (lossy), hex"
    )]
    format: OutputFormat,

    /// Treat the input as hex text rather than binary
    #[arg(long)]
    hex: bool,

    /// Decode every item of a CBOR sequence, not just the first
    #[arg(short = 's', long)]
    sequence: bool,

    /// Maximum nesting of lists, maps and tags
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<Output>,

    /// Input CBOR file (use '-' for stdin)
    input: Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    /// CBOR Diagnostic Notation (human-readable)
    #[value(alias = "diagnostic")]
    Diag,
    /// JSON format (lossy - loses CBOR tags, types, etc.)
    Json,
    /// Hexadecimal dump of each item
    Hex,
}

impl Command {
    pub fn exec(self) -> anyhow::Result<()> {
        let data = self
            .input
            .read_bytes(self.hex)
            .with_context(|| format!("Failed to read {}", self.input))?;
        debug!(len = data.len(), "Read input");

        let options = Options {
            max_depth: self.max_depth,
        };
        let items = split_items(&data, &options, self.sequence)?;

        let output_text = items
            .iter()
            .map(|(value, range)| match self.format {
                OutputFormat::Diag => Ok(value.to_string()),
                OutputFormat::Json => serde_json::to_string_pretty(&value_to_json(value))
                    .context("Failed to format JSON"),
                OutputFormat::Hex => Ok(hex::encode(&data[range.clone()])),
            })
            .collect::<anyhow::Result<Vec<_>>>()?
            .join("\n");

        let output = self.output.unwrap_or(Output::Stdout);
        output.write_str(&output_text)?;

        // Add newline for better terminal output
        if matches!(output, Output::Stdout) {
            println!();
        }

        Ok(())
    }
}

/// Decodes the leading item, or every item when `sequence` is set, along with
/// the byte range each one occupied.
fn split_items(
    data: &[u8],
    options: &Options,
    sequence: bool,
) -> anyhow::Result<Vec<(Value, Range<usize>)>> {
    let mut items = Vec::new();
    let mut offset = 0;
    loop {
        let (value, len) = decode::decode_with(&data[offset..], options)
            .with_context(|| format!("Failed to decode item at offset {offset}"))?;
        items.push((value, offset..offset + len));
        offset += len;
        if !sequence || offset >= data.len() {
            break;
        }
    }
    if offset < data.len() {
        warn!(
            trailing = data.len() - offset,
            "Ignoring bytes after the first item, use --sequence to decode them"
        );
    }
    Ok(items)
}

/// Convert a CBOR value to JSON (lossy)
fn value_to_json(value: &Value) -> serde_json::Value {
    use serde_json::Value as Json;

    match value {
        Value::Uint(n) => Json::from(*n),
        Value::NegInt(m) => match i64::try_from(-(*m as i128)) {
            Ok(n) => Json::from(n),
            // Below i64::MIN: JSON numbers are doubles anyway
            Err(_) => Json::from(-(*m as f64)),
        },
        // Byte strings become base64 text
        Value::Slice(b) => Json::String(BASE64_URL_SAFE_NO_PAD.encode(b)),
        Value::String(b) => Json::String(String::from_utf8_lossy(b).into_owned()),
        Value::List(items) => Json::Array(items.iter().map(value_to_json).collect()),
        Value::Map(map) => Json::Object(
            map.iter()
                .map(|(k, v)| (String::from_utf8_lossy(k).into_owned(), value_to_json(v)))
                .collect(),
        ),
        Value::Tag(tag) => value_to_json(&tag.value),
        Value::Bool(b) => Json::Bool(*b),
        // JSON doesn't have undefined
        Value::Nil | Value::Undefined => Json::Null,
        // JSON doesn't support NaN/Infinity
        Value::Float32(f) => serde_json::Number::from_f64(*f as f64).map_or(Json::Null, Json::Number),
        Value::Float64(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_is_lossy() {
        // {"a": [1, -1, h'ff', 1(true), null, NaN], "b": undefined}
        let data = hex::decode("a2616186012041ffc1f5f6f97e006162f7").unwrap();
        let (value, _) = tessera_cbor::decode(&data).unwrap();
        assert_eq!(
            value_to_json(&value),
            json!({"a": [1, -1, "_w", true, null, null], "b": null})
        );
    }

    #[test]
    fn large_negative_integers() {
        assert_eq!(value_to_json(&Value::NegInt(1 << 63)), json!(i64::MIN));
        assert_eq!(
            value_to_json(&Value::NegInt(u64::MAX)),
            json!(-(u64::MAX as f64))
        );
    }

    #[test]
    fn sequences() {
        let data = hex::decode("0102f6").unwrap();
        let options = Options::default();

        let items = split_items(&data, &options, false).unwrap();
        assert_eq!(items, vec![(Value::Uint(1), 0..1)]);

        let items = split_items(&data, &options, true).unwrap();
        assert_eq!(
            items,
            vec![
                (Value::Uint(1), 0..1),
                (Value::Uint(2), 1..2),
                (Value::Nil, 2..3)
            ]
        );

        assert!(split_items(&hex::decode("0118").unwrap(), &options, true).is_err());
    }

    #[test]
    fn depth_limit() {
        let options = Options { max_depth: 1 };
        assert!(split_items(&hex::decode("8180").unwrap(), &options, false).is_err());
        assert!(split_items(&hex::decode("80").unwrap(), &options, false).is_ok());
    }
}
