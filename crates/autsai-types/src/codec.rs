//! Serde adapters for the loosely-typed fields the document store hands back.
//!
//! Records travel through the gateway verbatim, so the same logical field can
//! arrive as `1`, `true` or `"1"`, and timestamps show up with or without
//! seconds, fractional parts or a trailing `Z`.

/// 0/1 flags. Accepts integers, booleans and their string forms; always
/// writes an integer.
pub mod flag {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        deserializer.deserialize_any(FlagVisitor)
    }

    struct FlagVisitor;

    impl<'de> Visitor<'de> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a 0/1 flag, a boolean, or a string holding either")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<bool, E> {
            Ok(v != 0.0)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
            match v.trim() {
                "" | "0" | "false" => Ok(false),
                "1" | "true" => Ok(true),
                other => other
                    .parse::<f64>()
                    .map(|n| n != 0.0)
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self)),
            }
        }

        fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }

        fn visit_none<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }
    }
}

/// Naive timestamps as written by the booking app (`2025-01-25T10:00:00`).
pub mod timestamp {
    use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    const ACCEPTED: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];

    /// Parse any timestamp shape the store is known to hold. RFC 3339 values
    /// are converted to local time, the clock naive timestamps are read on;
    /// bare dates map to midnight.
    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Local).naive_local());
        }
        ACCEPTED
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }

    pub fn format(value: &NaiveDateTime) -> String {
        value.format(FORMAT).to_string()
    }

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("unrecognised timestamp '{}'", raw)))
    }
}

/// Structured values the store keeps as JSON text (`'["padel","tennis"]'`).
/// Deserializes from either the text or the structure itself; empty text maps
/// to the default value.
pub mod embedded {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(T::default()),
            Value::String(text) if text.trim().is_empty() => Ok(T::default()),
            Value::String(text) => serde_json::from_str(&text).map_err(serde::de::Error::custom),
            other => serde_json::from_value(other).map_err(serde::de::Error::custom),
        }
    }

    /// Serialize a structured value back to the text form the store expects.
    pub fn to_text<T: serde::Serialize>(value: &T) -> String {
        serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize)]
    struct Flagged {
        #[serde(with = "flag")]
        on: bool,
    }

    #[test]
    fn flag_accepts_every_stored_shape() {
        for raw in [r#"{"on":1}"#, r#"{"on":true}"#, r#"{"on":"1"}"#] {
            let f: Flagged = serde_json::from_str(raw).unwrap();
            assert!(f.on, "{raw}");
        }
        for raw in [r#"{"on":0}"#, r#"{"on":false}"#, r#"{"on":"0"}"#, r#"{"on":null}"#] {
            let f: Flagged = serde_json::from_str(raw).unwrap();
            assert!(!f.on, "{raw}");
        }
    }

    #[test]
    fn timestamp_shapes() {
        let expected = chrono::NaiveDate::from_ymd_opt(2025, 1, 25)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(timestamp::parse("2025-01-25T10:00:00"), Some(expected));
        assert_eq!(timestamp::parse("2025-01-25T10:00"), Some(expected));
        assert_eq!(timestamp::parse("2025-01-25 10:00:00"), Some(expected));
        assert_eq!(timestamp::parse("yesterday"), None);
    }

    #[test]
    fn offset_timestamps_land_on_the_local_clock() {
        let utc = chrono::DateTime::parse_from_rfc3339("2025-01-25T10:00:00Z").unwrap();
        let local = utc.with_timezone(&chrono::Local).naive_local();
        assert_eq!(timestamp::parse("2025-01-25T10:00:00Z"), Some(local));
        assert_eq!(timestamp::parse("2025-01-25T10:00:00.000Z"), Some(local));
        assert_eq!(timestamp::parse("2025-01-25T11:00:00+01:00"), Some(local));

        let now = chrono::Local::now();
        let stamped = now.to_rfc3339();
        assert_eq!(
            timestamp::parse(&stamped).map(|t| t.and_utc().timestamp()),
            Some(now.naive_local().and_utc().timestamp())
        );
    }

    #[derive(Deserialize)]
    struct Embedded {
        #[serde(deserialize_with = "embedded::deserialize", default)]
        sports: Vec<String>,
    }

    #[test]
    fn embedded_from_text_or_structure() {
        let a: Embedded = serde_json::from_str(r#"{"sports":"[\"padel\",\"tennis\"]"}"#).unwrap();
        let b: Embedded = serde_json::from_str(r#"{"sports":["padel","tennis"]}"#).unwrap();
        let c: Embedded = serde_json::from_str(r#"{"sports":""}"#).unwrap();
        assert_eq!(a.sports, vec!["padel", "tennis"]);
        assert_eq!(a.sports, b.sports);
        assert!(c.sports.is_empty());
    }
}
