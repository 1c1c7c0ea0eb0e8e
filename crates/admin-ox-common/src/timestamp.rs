use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;

/// Formats accepted for timestamps that carry no offset, as produced by a
/// `LocalDateTime` on the backend.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A timestamp as the backend sent it.
///
/// Keeps the wire text so it can always be shown, plus the parsed instant when
/// the text is RFC 3339, an offset-less ISO-8601 date-time (read as UTC), or
/// integer Unix seconds. A missing or `null` timestamp is empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Timestamp {
    raw: String,
    parsed: Option<DateTime<Utc>>,
}

impl Timestamp {
    /// Parse a textual timestamp. Never fails; unparseable text is kept raw.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        let parsed = DateTime::parse_from_rfc3339(trimmed)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NAIVE_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                    .map(|naive| naive.and_utc())
            });

        Self {
            raw: text.to_string(),
            parsed,
        }
    }

    /// Create a timestamp from Unix seconds
    #[must_use]
    pub fn from_unix_timestamp_i64(secs: i64) -> Self {
        Self {
            raw: secs.to_string(),
            parsed: Utc.timestamp_opt(secs, 0).single(),
        }
    }

    /// The text exactly as received
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// True when the backend sent no timestamp at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// The parsed instant, if the text was recognised
    #[must_use]
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        self.parsed
    }

    /// Short human form (`Oct 03, 2025, 08:34`), falling back to the raw text.
    #[must_use]
    pub fn display_short(&self) -> String {
        self.parsed.map_or_else(
            || self.raw.clone(),
            |dt| dt.format("%b %d, %Y, %H:%M").to_string(),
        )
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self {
            raw: dt.to_rfc3339(),
            parsed: Some(dt),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TimestampVisitor;

        impl de::Visitor<'_> for TimestampVisitor {
            type Value = Timestamp;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an ISO-8601 string or a UNIX timestamp (int)")
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Timestamp::from_unix_timestamp_i64(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                i64::try_from(value)
                    .map(Timestamp::from_unix_timestamp_i64)
                    .map_err(|_| E::custom("unix timestamp out of range"))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Timestamp::parse(value))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Timestamp::default())
            }

            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Timestamp::default())
            }
        }

        deserializer.deserialize_any(TimestampVisitor)
    }
}
