//! Dates in record JSON.
//!
//! Dates are written as Unix timestamps (seconds, UTC). Reading accepts
//! timestamps as well as `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and RFC 3339
//! strings, so hand-written feeds can use readable dates.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDate {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawDate {
    fn into_datetime(self) -> Option<DateTime<Utc>> {
        match self {
            Self::Int(secs) => Utc.timestamp_opt(secs, 0).single(),
            #[allow(clippy::cast_possible_truncation)]
            Self::Float(secs) => Utc.timestamp_opt(secs.trunc() as i64, 0).single(),
            Self::Text(text) => parse_date(&text),
        }
    }
}

/// Parse a textual date. Date-only values are midnight UTC.
///
/// # Examples
/// ```
/// use billy_scraper::model::date::parse_date;
///
/// let date = parse_date("2011-01-26").unwrap();
/// assert_eq!(date.timestamp(), 1_296_000_000);
/// assert!(parse_date("next tuesday").is_none());
/// ```
#[must_use]
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(date.timestamp())
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    RawDate::deserialize(deserializer)?
        .into_datetime()
        .ok_or_else(|| D::Error::custom("unrecognized date"))
}

/// Same encoding for optional dates; `null` reads as `None`.
pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(
        date: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_some(&date.timestamp()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<RawDate>::deserialize(deserializer)? {
            Some(raw) => raw
                .into_datetime()
                .map(Some)
                .ok_or_else(|| D::Error::custom("unrecognized date")),
            None => Ok(None),
        }
    }
}
