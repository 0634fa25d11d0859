use indexmap::IndexMap;
use serde_json::value::{RawValue, to_raw_value};

/// One streamed event payload with every field kept as raw JSON
type RawChunk = IndexMap<String, Box<RawValue>>;

/// Replace the `model` field of a streamed chunk, leaving everything else intact
///
/// Field order is kept and every other value is re-emitted byte-for-byte.
/// A chunk without a `model` field is re-emitted unchanged.
pub fn rewrite_chunk(payload: &str, model: &str) -> serde_json::Result<String> {
    let mut chunk: RawChunk = serde_json::from_str(payload)?;

    if let Some(slot) = chunk.get_mut("model") {
        *slot = to_raw_value(model)?;
    }

    serde_json::to_string(&chunk)
}
