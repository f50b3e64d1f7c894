//! JSON record-set encoder.

use crate::error::{CodecError, CodecResult};
use crate::record::Record;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Indentation used for pretty output.
const INDENT: &[u8] = b"\t";

/// Encode a record set as a JSON array.
///
/// # Errors
///
/// Returns an error if a record holds a non-finite number.
pub fn to_json(records: &[Record], pretty: bool) -> CodecResult<Vec<u8>> {
    let mut encoder = JsonEncoder::new().pretty(pretty);
    encoder.encode(records)?;
    Ok(encoder.into_bytes())
}

/// A JSON encoder for record sets.
///
/// Pretty output is tab-indented; compact output has no whitespace.
#[derive(Debug, Default)]
pub struct JsonEncoder {
    buffer: Vec<u8>,
    pretty: bool,
}

impl JsonEncoder {
    /// Create a new compact encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new encoder with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            pretty: false,
        }
    }

    /// Switch between pretty and compact output.
    #[must_use]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Encode any serializable value, appending to the buffer.
    pub fn encode<T: Serialize + ?Sized>(&mut self, value: &T) -> CodecResult<()> {
        let result = if self.pretty {
            let formatter = PrettyFormatter::with_indent(INDENT);
            let mut ser = Serializer::with_formatter(&mut self.buffer, formatter);
            value.serialize(&mut ser)
        } else {
            let mut ser = Serializer::new(&mut self.buffer);
            value.serialize(&mut ser)
        };
        result.map_err(|e| CodecError::encoding_failed(e.to_string()))
    }

    /// Consume this encoder and return the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Get a reference to the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }
}
