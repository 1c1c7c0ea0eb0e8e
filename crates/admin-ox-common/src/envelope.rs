//! Flattening of paginated list responses.
//!
//! Backends return lists either bare or wrapped in a pagination envelope such
//! as a Spring `Page` (`{"content": [...], "totalElements": ...}`). The
//! envelope fields are tried in [`ENVELOPE_FIELDS`] order and the first one
//! holding an array wins, so a payload carrying several of them resolves the
//! same way every time.

use serde_json::Value;

/// Envelope fields, highest priority first.
pub const ENVELOPE_FIELDS: [&str; 4] = ["content", "items", "data", "results"];

/// Return the records carried by `payload`.
///
/// Arrays come back as-is, recognised envelopes yield their inner array, and
/// everything else (absent, `null`, scalars, unknown objects) is empty.
#[must_use]
pub fn as_records(payload: Option<&Value>) -> Vec<Value> {
    match payload {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Object(map)) => ENVELOPE_FIELDS
            .iter()
            .find_map(|field| map.get(*field).and_then(Value::as_array))
            .cloned()
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Owned variant of [`as_records`] that avoids cloning the list.
#[must_use]
pub fn into_records(payload: Option<Value>) -> Vec<Value> {
    match payload {
        Some(Value::Array(items)) => items,
        Some(Value::Object(mut map)) => ENVELOPE_FIELDS
            .iter()
            .find(|field| map.get(**field).is_some_and(Value::is_array))
            .and_then(|field| map.remove(*field))
            .and_then(|value| match value {
                Value::Array(items) => Some(items),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}
