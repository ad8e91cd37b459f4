// src/core/dates.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::DateError;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// ISO-8601 timestamp → `YYYY-MM-DD` for the Members API.
///
/// Fractional seconds of any length are cut (or zero-padded) to six digits;
/// anything after them, including an offset, is discarded. Without a fraction
/// a `Z`/`±hh:mm` offset is accepted and the date is read in that offset.
pub fn format_date_for_api(input: &str) -> Result<String, DateError> {
    let trimmed = input.trim();
    let normalized = match trimmed.split_once('.') {
        Some((date_part, frac)) => {
            let mut micros: String = frac.chars().filter(|c| c.is_ascii_digit()).take(6).collect();
            while micros.len() < 6 {
                micros.push('0');
            }
            join!(date_part, ".", &micros)
        }
        None => s!(trimmed),
    };

    parse_date(&normalized)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .ok_or_else(|| DateError { input: s!(input) })
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_and_fractional() {
        assert_eq!(format_date_for_api("2007-10-27T16:26:00").unwrap(), "2007-10-27");
        assert_eq!(format_date_for_api("2021-05-11T00:00:00.1234567891").unwrap(), "2021-05-11");
        assert_eq!(format_date_for_api("2021-05-11T23:10:04.5Z").unwrap(), "2021-05-11");
        assert_eq!(format_date_for_api("2019-12-19").unwrap(), "2019-12-19");
    }

    #[test]
    fn offsets() {
        assert_eq!(format_date_for_api("2020-01-01T23:30:00Z").unwrap(), "2020-01-01");
        assert_eq!(format_date_for_api("2020-01-01T23:30:00+02:00").unwrap(), "2020-01-01");
    }

    #[test]
    fn garbage_is_error() {
        let err = format_date_for_api("yesterday").unwrap_err();
        assert_eq!(err.input, "yesterday");
        assert!(format_date_for_api("").is_err());
    }
}
