//! Serde helpers for appointment times.
//!
//! Appointment times have minute precision. They are written as `HH:MM` and
//! accepted as either `HH:MM` or `HH:MM:SS` (seconds are dropped).

use chrono::{NaiveTime, Timelike};
use serde::{de, Deserialize, Deserializer, Serializer};

const OUTPUT_FORMAT: &str = "%H:%M";

pub fn parse_minute_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
        .and_then(truncate_to_minute)
}

pub fn truncate_to_minute(time: NaiveTime) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0)
}

pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&time.format(OUTPUT_FORMAT).to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_minute_time(&raw)
        .ok_or_else(|| de::Error::custom(format!("invalid time '{}', expected HH:MM", raw)))
}

pub mod option {
    use super::*;

    pub fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(time) => super::serialize(time, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_minute_time(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid time '{}', expected HH:MM", raw))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize, Deserialize)]
    struct Slot {
        #[serde(with = "super")]
        at: NaiveTime,
        #[serde(default, with = "super::option")]
        until: Option<NaiveTime>,
    }

    #[test]
    fn accepts_seconds_and_drops_them() {
        let slot: Slot = serde_json::from_str(r#"{"at":"09:15:42"}"#).unwrap();
        assert_eq!(slot.at, NaiveTime::from_hms_opt(9, 15, 0).unwrap());
        assert!(slot.until.is_none());
    }

    #[test]
    fn writes_hours_and_minutes() {
        let slot = Slot {
            at: NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
            until: Some(NaiveTime::from_hms_opt(15, 0, 0).unwrap()),
        };
        let json = serde_json::to_value(&slot).unwrap();
        assert_eq!(json["at"], "14:30");
        assert_eq!(json["until"], "15:00");
    }

    #[test]
    fn rejects_garbage() {
        assert!(serde_json::from_str::<Slot>(r#"{"at":"half past nine"}"#).is_err());
        assert!(parse_minute_time("25:00").is_none());
    }
}
