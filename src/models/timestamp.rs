//! Serde adapters that normalize stored timestamps to `DateTime<Utc>`.
//!
//! Documents written by the hosted backend carry native timestamp objects
//! (`{seconds, nanoseconds}`, sometimes with leading underscores); older
//! records and the HTTP shell use RFC 3339 strings or epoch milliseconds.
//! Everything past the model boundary only ever sees `DateTime<Utc>`.
//! Output is always RFC 3339.

use chrono::{DateTime, Utc};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Native {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(alias = "_nanoseconds", default)]
        nanoseconds: u32,
    },
    Text(DateTime<Utc>),
    Millis(i64),
}

impl RawTimestamp {
    fn normalize(self) -> Option<DateTime<Utc>> {
        match self {
            RawTimestamp::Native {
                seconds,
                nanoseconds,
            } => DateTime::from_timestamp(seconds, nanoseconds),
            RawTimestamp::Text(dt) => Some(dt),
            RawTimestamp::Millis(ms) => DateTime::from_timestamp_millis(ms),
        }
    }
}

pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    value.serialize(serializer)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    RawTimestamp::deserialize(deserializer)?
        .normalize()
        .ok_or_else(|| D::Error::custom("timestamp out of range"))
}

/// Same as the parent module, for `Option<DateTime<Utc>>` fields.
pub mod option {
    use super::RawTimestamp;
    use chrono::{DateTime, Utc};
    use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<RawTimestamp>::deserialize(deserializer)? {
            Some(raw) => raw
                .normalize()
                .map(Some)
                .ok_or_else(|| D::Error::custom("timestamp out of range")),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Stamped {
        #[serde(with = "super")]
        at: DateTime<Utc>,
        #[serde(default, with = "super::option")]
        done: Option<DateTime<Utc>>,
    }

    fn expected() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn accepts_backend_native_object() {
        let s: Stamped =
            serde_json::from_str(r#"{"at":{"seconds":1709294400,"nanoseconds":0}}"#).unwrap();
        assert_eq!(s.at, expected());
        assert_eq!(s.done, None);
    }

    #[test]
    fn accepts_underscored_object() {
        let s: Stamped =
            serde_json::from_str(r#"{"at":{"_seconds":1709294400,"_nanoseconds":0}}"#).unwrap();
        assert_eq!(s.at, expected());
    }

    #[test]
    fn accepts_rfc3339_with_offset() {
        let s: Stamped =
            serde_json::from_str(r#"{"at":"2024-03-01T13:00:00+01:00","done":null}"#).unwrap();
        assert_eq!(s.at, expected());
        assert_eq!(s.done, None);
    }

    #[test]
    fn accepts_epoch_millis() {
        let s: Stamped =
            serde_json::from_str(r#"{"at":1709294400000,"done":1709294400000}"#).unwrap();
        assert_eq!(s.at, expected());
        assert_eq!(s.done, Some(expected()));
    }

    #[test]
    fn rejects_garbage() {
        assert!(serde_json::from_str::<Stamped>(r#"{"at":"yesterday"}"#).is_err());
    }
}
