//! Identifier-safe JSON decoding.
//!
//! Snowflake-style identifiers do not survive a trip through `f64`, and some
//! do not even fit in a `u64`. The decoder reads every object field named
//! [`ID_FIELD`] from its source text, so a numeric id comes out as the exact
//! decimal string the backend wrote. Everything else decodes the way
//! `serde_json` normally does, in one pass and under its nesting limit.

use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::{Map, Number, Value, value::RawValue};
use std::fmt;

/// Object fields whose numeric values are kept as exact strings.
pub const ID_FIELD: &str = "id";

/// Decode a response body.
///
/// Returns `Ok(None)` for an empty or whitespace-only body; that is absence of
/// data, not a parse failure.
pub fn decode(body: &[u8]) -> Result<Option<Value>, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let mut deserializer = serde_json::Deserializer::from_slice(body);
    let value = AnyValue.deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(Some(value))
}

/// Any JSON value, with `id` fields routed through [`IdValue`].
struct AnyValue;

impl<'de> DeserializeSeed<'de> for AnyValue {
    type Value = Value;

    fn deserialize<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for AnyValue {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Value, E> {
        Ok(Value::Bool(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Value, E> {
        Ok(Value::from(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Value, E> {
        Ok(Value::from(value))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Value, E> {
        Ok(Number::from_f64(value).map_or(Value::Null, Value::Number))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Value, E> {
        Ok(Value::String(value.to_owned()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Value, E> {
        Ok(Value::String(value))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        AnyValue.deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element_seed(AnyValue)? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A>(self, mut access: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = Map::new();
        while let Some(key) = access.next_key::<String>()? {
            let value = if key == ID_FIELD {
                access.next_value_seed(IdValue)?
            } else {
                access.next_value_seed(AnyValue)?
            };
            map.insert(key, value);
        }
        Ok(Value::Object(map))
    }
}

/// The value of an `id` field: number literals become their exact text.
struct IdValue;

impl<'de> DeserializeSeed<'de> for IdValue {
    type Value = Value;

    fn deserialize<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = <&RawValue>::deserialize(deserializer)?;
        let text = raw.get().trim();

        // Already valid JSON, so a leading digit or minus sign means a number literal.
        if text.starts_with(|c: char| c == '-' || c.is_ascii_digit()) {
            Ok(Value::String(text.to_owned()))
        } else {
            serde_json::from_str(text).map_err(de::Error::custom)
        }
    }
}
