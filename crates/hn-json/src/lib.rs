//! hn-json: JSON projection of a [`WaterNetwork`].
//!
//! Encoding is total for a network and deterministic: keys come out in
//! schema order (`title`, `nodes`, `links`, `patterns`, `curves`,
//! `options`, `statistics`) and indentation is purely cosmetic. Decoding is
//! schema-agnostic and yields a plain [`serde_json::Value`] tree; no typed
//! elements are rebuilt from it.

use std::path::Path;

use hn_core::{FormatError, HnResult};
use hn_network::WaterNetwork;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indent {
    /// Single line, no whitespace.
    Compact,
    /// One entry per line, nested by this many spaces.
    Spaces(usize),
}

impl Default for Indent {
    fn default() -> Self {
        Indent::Spaces(2)
    }
}

/// Field-wise JSON projection of the network.
pub fn to_value(network: &WaterNetwork) -> HnResult<Value> {
    serde_json::to_value(network).map_err(|e| FormatError::Encode(e).into())
}

pub fn encode(network: &WaterNetwork, indent: Indent) -> HnResult<String> {
    write_text(network, indent)
}

/// Re-encode a decoded tree with the same layout rules as [`encode`].
pub fn encode_value(value: &Value, indent: Indent) -> HnResult<String> {
    write_text(value, indent)
}

pub fn decode(text: &str) -> HnResult<Value> {
    serde_json::from_str(text).map_err(|source| {
        FormatError::Json {
            line: source.line(),
            column: source.column(),
            source,
        }
        .into()
    })
}

/// Write the encoded network to `path`, replacing any existing file.
pub fn write_file(path: &Path, network: &WaterNetwork, indent: Indent) -> HnResult<()> {
    let text = encode(network, indent)?;
    std::fs::write(path, text)?;
    Ok(())
}

pub fn read_file(path: &Path) -> HnResult<Value> {
    let text = std::fs::read_to_string(path)?;
    decode(&text)
}

fn write_text<T: Serialize + ?Sized>(value: &T, indent: Indent) -> HnResult<String> {
    let mut buf = Vec::with_capacity(4096);
    match indent {
        Indent::Compact => {
            serde_json::to_writer(&mut buf, value).map_err(FormatError::Encode)?;
        }
        Indent::Spaces(n) => {
            let pad = vec![b' '; n];
            let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(&pad));
            value.serialize(&mut ser).map_err(FormatError::Encode)?;
        }
    }
    String::from_utf8(buf)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
}
