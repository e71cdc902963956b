//! Date and time utilities for spreadsheet cells

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;

const SECONDS_PER_DAY: f64 = 86_400.0;

lazy_static! {
    // 2024-01-31, 2024/01/31, optionally followed by a time and an offset
    static ref ISO_DATE: Regex = Regex::new(
        r"^(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})(?:[T ](\d{1,2}):(\d{2})(?::(\d{2})(?:\.\d+)?)?)?\s*(?:Z|[+-]\d{2}:?\d{2})?$"
    )
    .unwrap();

    // 31/01/2024, 31.01.24, 31-1-2024, optionally followed by a time
    static ref DMY_DATE: Regex = Regex::new(
        r"^(\d{1,2})[-/.](\d{1,2})[-/.](\d{4}|\d{2})(?:[T ,]+(\d{1,2}):(\d{2})(?::(\d{2}))?)?$"
    )
    .unwrap();

    static ref CLOCK_TIME: Regex = Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2}))?$").unwrap();
}

/// A calendar date read from a text cell, with the time of day when the
/// cell carried one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedDate {
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
}

impl ParsedDate {
    /// Combine into a date-time, defaulting to midnight.
    #[must_use]
    pub fn to_datetime(self) -> NaiveDateTime {
        self.date.and_time(self.time.unwrap_or(NaiveTime::MIN))
    }
}

/// Spreadsheet epoch (1899-12-30). Serial 1.0 is 1899-12-31, which keeps the
/// modern range correct despite the 1900 leap year bug.
fn excel_epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)
}

/// Convert a spreadsheet serial date (days since the epoch, fraction = time
/// of day) to a date-time, rounded to the second.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let seconds = (serial * SECONDS_PER_DAY).round();
    if seconds > i64::MAX as f64 {
        return None;
    }
    excel_epoch()?.checked_add_signed(Duration::try_seconds(seconds as i64)?)
}

/// Convert a spreadsheet time fraction (0 <= x < 1) to a time of day.
pub fn excel_serial_to_time(fraction: f64) -> Option<NaiveTime> {
    if !fraction.is_finite() || !(0.0..1.0).contains(&fraction) {
        return None;
    }
    let seconds = ((fraction * SECONDS_PER_DAY).round() as u32).min(86_399);
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
}

/// Parse a text date: ISO (`YYYY-MM-DD`) or day-first `D/M/Y` with `/`, `.`
/// or `-` separators and 2- or 4-digit years.
pub fn parse_date_str(text: &str) -> Option<ParsedDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let (year, month, day, caps) = if let Some(caps) = ISO_DATE.captures(text) {
        (
            caps[1].parse::<i32>().ok()?,
            caps[2].parse::<u32>().ok()?,
            caps[3].parse::<u32>().ok()?,
            caps,
        )
    } else if let Some(caps) = DMY_DATE.captures(text) {
        let year_text = &caps[3];
        let mut year = year_text.parse::<i32>().ok()?;
        if year_text.len() == 2 {
            year += 2000;
        }
        (
            year,
            caps[2].parse::<u32>().ok()?,
            caps[1].parse::<u32>().ok()?,
            caps,
        )
    } else {
        return None;
    };

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = match (caps.get(4), caps.get(5)) {
        (Some(hour), Some(minute)) => {
            let second = caps.get(6).map_or(Some(0), |s| s.as_str().parse().ok())?;
            Some(NaiveTime::from_hms_opt(
                hour.as_str().parse().ok()?,
                minute.as_str().parse().ok()?,
                second,
            )?)
        }
        _ => None,
    };

    Some(ParsedDate { date, time })
}

/// Parse a clock time `H:MM[:SS]` within the 24-hour range.
pub fn parse_time_str(text: &str) -> Option<NaiveTime> {
    let caps = CLOCK_TIME.captures(text.trim())?;
    let second = caps.get(3).map_or(Some(0), |s| s.as_str().parse().ok())?;
    NaiveTime::from_hms_opt(caps[1].parse().ok()?, caps[2].parse().ok()?, second)
}

/// Render a timestamp the way Swedish-locale displays do (`2024-01-31 08:05`).
pub fn format_local(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

/// Datetime helper tests.
#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_excel_serial_date() {
        // 44562 is January 1, 2022
        let dt = excel_serial_to_datetime(44562.0).unwrap();
        assert_eq!(dt.date(), date(2022, 1, 1));
        assert_eq!(dt.time(), NaiveTime::MIN);

        let dt = excel_serial_to_datetime(44562.5).unwrap();
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());

        assert!(excel_serial_to_datetime(-1.0).is_none());
        assert!(excel_serial_to_datetime(f64::NAN).is_none());
    }

    #[test]
    fn test_excel_serial_time() {
        let t = excel_serial_to_time(0.75).unwrap();
        assert_eq!(t, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        assert!(excel_serial_to_time(1.0).is_none());
        assert!(excel_serial_to_time(-0.1).is_none());
        // 23:59:59.9 rounds up but must stay inside the day
        assert_eq!(
            excel_serial_to_time(0.999_999_9).unwrap(),
            NaiveTime::from_hms_opt(23, 59, 59).unwrap()
        );
    }

    #[test]
    fn test_parse_iso_dates() {
        let parsed = parse_date_str("2024-01-02").unwrap();
        assert_eq!(parsed.date, date(2024, 1, 2));
        assert_eq!(parsed.time, None);

        let parsed = parse_date_str("2024-01-02T08:30:15Z").unwrap();
        assert_eq!(parsed.time, NaiveTime::from_hms_opt(8, 30, 15));

        let parsed = parse_date_str("2024-01-02 7:05").unwrap();
        assert_eq!(parsed.time, NaiveTime::from_hms_opt(7, 5, 0));
    }

    #[test]
    fn test_parse_day_first_dates() {
        assert_eq!(parse_date_str("31/01/2024").unwrap().date, date(2024, 1, 31));
        assert_eq!(parse_date_str("31.01.24").unwrap().date, date(2024, 1, 31));
        assert_eq!(parse_date_str("5-3-2023").unwrap().date, date(2023, 3, 5));

        let parsed = parse_date_str("05.03.2023 14:45").unwrap();
        assert_eq!(parsed.time, NaiveTime::from_hms_opt(14, 45, 0));
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date_str("").is_none());
        assert!(parse_date_str("72").is_none());
        assert!(parse_date_str("120/80").is_none());
        assert!(parse_date_str("32/01/2024").is_none());
        assert!(parse_date_str("2024-13-01").is_none());
        assert!(parse_date_str("igår").is_none());
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time_str("8:05"), NaiveTime::from_hms_opt(8, 5, 0));
        assert_eq!(parse_time_str(" 23:59:59 "), NaiveTime::from_hms_opt(23, 59, 59));
        assert!(parse_time_str("24:00").is_none());
        assert!(parse_time_str("12:60").is_none());
        assert!(parse_time_str("1200").is_none());
    }

    #[test]
    fn test_format_local() {
        let dt = date(2024, 1, 31).and_hms_opt(8, 5, 59).unwrap();
        assert_eq!(format_local(dt), "2024-01-31 08:05");
    }
}
