//! Conversion helpers applied when data crosses the HTTP boundary.
//!
//! Timestamps leave the service truncated to the minute and without a
//! timezone suffix. Timestamps coming in may carry a `Z`, an explicit offset,
//! or nothing at all, in which case they are read as UTC.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;

/// Output format for every timestamp written to a response.
const ISO_MINUTE_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Error type for conversion helpers.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// The string is not a recognisable ISO-8601 timestamp.
    #[error("Invalid ISO-8601 timestamp: '{0}'")]
    InvalidTimestamp(String),
    /// The request body is not valid JSON for the expected payload.
    #[error("Invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),
}

/// Formats `dt` as ISO-8601 with seconds and timezone stripped.
///
/// The wall-clock time in the value's own offset is kept, so
/// `2025-06-17T12:34:56+00:00` becomes `2025-06-17T12:34`.
pub fn datetime_to_iso<Tz: TimeZone>(dt: &DateTime<Tz>) -> String {
    dt.naive_local().format(ISO_MINUTE_FORMAT).to_string()
}

/// Parses an ISO-8601 string into a UTC timestamp.
///
/// Accepts a trailing `Z`, an explicit offset (converted to UTC), or no
/// offset at all (read as UTC). Seconds and fractional seconds are optional.
pub fn iso_to_datetime(iso: &str) -> Result<DateTime<Utc>, ConversionError> {
    let value = iso.trim();
    let invalid = || ConversionError::InvalidTimestamp(iso.to_string());

    if let Some(naive) = value.strip_suffix('Z').or_else(|| value.strip_suffix('z')) {
        return parse_naive(naive)
            .map(|dt| Utc.from_utc_datetime(&dt))
            .ok_or_else(invalid);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::<FixedOffset>::parse_from_str(value, "%Y-%m-%dT%H:%M%:z") {
        return Ok(dt.with_timezone(&Utc));
    }

    parse_naive(value)
        .map(|dt| Utc.from_utc_datetime(&dt))
        .ok_or_else(invalid)
}

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Decodes a JSON request body into a typed payload.
///
/// Timestamp fields are coerced through [`optional_iso_datetime`] by the
/// payload's own serde attributes.
pub fn json_decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ConversionError> {
    serde_json::from_slice(body).map_err(ConversionError::from)
}

/// Serde adapter for optional ISO-8601 timestamps.
///
/// `null` and `""` become `None`; combine with `#[serde(default)]` so an absent
/// field becomes `None` too. Any other value goes through [`iso_to_datetime`].
pub mod optional_iso_datetime {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, de::Error};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => super::iso_to_datetime(value).map(Some).map_err(D::Error::custom),
        }
    }
}
