//! JSON record-set decoder.

use crate::error::{CodecError, CodecResult};
use crate::record::Record;
use crate::value::Value;

/// Decode a JSON array of objects into records.
///
/// # Errors
///
/// Returns `DecodingFailed` for malformed JSON or invalid UTF-8, and
/// `InvalidStructure` when the top level is not an array of objects.
pub fn from_json(bytes: &[u8]) -> CodecResult<Vec<Record>> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| CodecError::decoding_failed(e.to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(CodecError::invalid_structure(format!(
                "expected an array of records, found {}",
                other.kind_name()
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Object(record) => Ok(record),
            other => Err(CodecError::invalid_structure(format!(
                "element {idx} is {}, expected object",
                other.kind_name()
            ))),
        })
        .collect()
}
