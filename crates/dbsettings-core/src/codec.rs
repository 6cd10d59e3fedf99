//! Value codec
//!
//! Settings are stored as JSON text. Rows written by other tools may hold
//! arbitrary strings, which decode to themselves.

use crate::Result;
use serde_json::Value;

/// A stored value that is not valid JSON
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawString(pub String);

/// Encode a value for storage
pub fn encode(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Decode a stored value, handing back the raw text if it is not JSON
pub fn decode(raw: &str) -> std::result::Result<Value, RawString> {
    if raw.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(raw).map_err(|_| RawString(raw.to_string()))
}

/// Decode a stored value, falling back to the raw string
pub fn decode_or_raw(raw: &str) -> Value {
    decode(raw).unwrap_or_else(|RawString(s)| Value::String(s))
}
