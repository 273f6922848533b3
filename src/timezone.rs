//! Timezone-aware timestamp formatting
//!
//! Vendor APIs want timestamps as `YYYY-MM-DDTHH:MM:SS±HH:MM`. Inputs with
//! an offset are converted to the target zone; inputs without one are read
//! as wall-clock time in that zone.

use crate::error::{Error, Result};
use crate::types::{JsonValue, Record};
use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

/// Output format, e.g. `2021-03-01T10:00:00+01:00`
pub const ZONED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Parse `value` and render it in `tz`
pub fn to_zoned_iso(value: &str, tz: Tz) -> Result<String> {
    Ok(parse_in_zone(value, tz)?.format(ZONED_FORMAT).to_string())
}

/// Parse a timestamp into `tz`
pub fn parse_in_zone(value: &str, tz: Tz) -> Result<DateTime<Tz>> {
    let value = value.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&tz));
    }

    // Offset without seconds or with a compact offset, e.g. `10:00+01:00`
    let with_offset = match value.strip_suffix('Z') {
        Some(utc) => format!("{utc}+00:00"),
        None => value.to_string(),
    };
    if let Some(instant) = OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(&with_offset, format).ok())
    {
        return Ok(instant.with_timezone(&tz));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| invalid(value, "unrecognized timestamp format"))?;

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(zoned) => Ok(zoned),
        // Repeated hour when clocks go back: take the first occurrence
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err(invalid(value, &format!("does not exist in {tz}"))),
    }
}

/// Convert an optional timestamp, leaving absent or empty values untouched
pub fn convert_opt(value: Option<&str>, tz: Tz) -> Result<Option<String>> {
    match value {
        Some(v) if !v.trim().is_empty() => to_zoned_iso(v, tz).map(Some),
        _ => Ok(None),
    }
}

/// Convert the named string fields of a record in place. Missing, empty or
/// non-string values are left alone.
pub fn convert_fields(record: &mut Record, keys: &[&str], tz: Tz) -> Result<()> {
    for key in keys {
        if let Some(JsonValue::String(value)) = record.get(*key) {
            if let Some(converted) = convert_opt(Some(value), tz)? {
                record.insert((*key).to_string(), JsonValue::String(converted));
            }
        }
    }
    Ok(())
}

fn invalid(value: &str, reason: &str) -> Error {
    Error::invalid_parameter("timestamp", format!("'{value}' {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("2021-03-01T10:00:00", "Europe/Berlin" => "2021-03-01T10:00:00+01:00"; "naive read as local")]
    #[test_case("2021-07-01T10:00:00", "Europe/Berlin" => "2021-07-01T10:00:00+02:00"; "summer time")]
    #[test_case("2021-03-01T10:00:00Z", "Europe/Berlin" => "2021-03-01T11:00:00+01:00"; "utc converted")]
    #[test_case("2021-03-01T10:00:00.000-05:00", "UTC" => "2021-03-01T15:00:00+00:00"; "offset converted")]
    #[test_case("2021-03-01", "America/New_York" => "2021-03-01T00:00:00-05:00"; "date only")]
    #[test_case("2021-03-01 08:30", "Asia/Kolkata" => "2021-03-01T08:30:00+05:30"; "space separated")]
    #[test_case("2021-03-01T10:00+01:00", "UTC" => "2021-03-01T09:00:00+00:00"; "offset without seconds")]
    #[test_case("2021-03-01T10:00Z", "Europe/Berlin" => "2021-03-01T11:00:00+01:00"; "utc without seconds")]
    #[test_case("2021-03-01T10:00:00+0530", "UTC" => "2021-03-01T04:30:00+00:00"; "compact offset")]
    fn test_to_zoned_iso(value: &str, tz: &str) -> String {
        to_zoned_iso(value, tz.parse().unwrap()).unwrap()
    }

    #[test]
    fn test_invalid_timestamp() {
        let err = to_zoned_iso("next tuesday", Tz::UTC).unwrap_err();
        assert!(err.to_string().contains("next tuesday"));
    }

    #[test]
    fn test_nonexistent_local_time() {
        // Clocks jump from 02:00 to 03:00
        let err = to_zoned_iso("2021-03-28T02:30:00", chrono_tz::Europe::Berlin).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_ambiguous_local_time_takes_earliest() {
        let value = to_zoned_iso("2021-10-31T02:30:00", chrono_tz::Europe::Berlin).unwrap();
        assert_eq!(value, "2021-10-31T02:30:00+02:00");
    }

    #[test]
    fn test_convert_fields() {
        let mut record = serde_json::json!({
            "from": "2021-01-01T09:00:00",
            "to": "",
            "title": "2021-01-01T09:00:00",
            "max": 5
        })
        .as_object()
        .cloned()
        .unwrap();

        convert_fields(&mut record, &["from", "to", "max"], chrono_tz::Europe::Paris).unwrap();

        assert_eq!(record["from"], "2021-01-01T09:00:00+01:00");
        assert_eq!(record["to"], "");
        assert_eq!(record["title"], "2021-01-01T09:00:00");
        assert_eq!(record["max"], 5);
    }

    #[test]
    fn test_convert_opt() {
        assert_eq!(convert_opt(None, Tz::UTC).unwrap(), None);
        assert_eq!(convert_opt(Some(""), Tz::UTC).unwrap(), None);
        assert_eq!(
            convert_opt(Some("2021-01-01T00:00:00"), Tz::UTC).unwrap(),
            Some("2021-01-01T00:00:00+00:00".to_string())
        );
    }
}
