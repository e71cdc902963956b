//! Locale-tolerant numeric parsing.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // 120/80, 120 - 80, 120/80 mmHg
    static ref PRESSURE_PAIR: Regex =
        Regex::new(r"(?i)^(\d{2,3})\s*[/-]\s*(\d{2,3})(?:\s*mm\s*hg)?$").unwrap();
}

/// Parse a number typed with either decimal separator.
///
/// Commas become decimal points and all whitespace (including non-breaking
/// and narrow spaces used as thousands separators) is removed before
/// coercion. Unit suffixes are not stripped: `"72 bpm"` is not a number.
pub fn parse_locale_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a compound blood pressure reading into `(systolic, diastolic)`.
pub fn parse_pressure_pair(text: &str) -> Option<(u16, u16)> {
    let caps = PRESSURE_PAIR.captures(text.trim())?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_numbers() {
        assert_eq!(parse_locale_number("72"), Some(72.0));
        assert_eq!(parse_locale_number("-1.5"), Some(-1.5));
        assert_eq!(parse_locale_number(" 98 "), Some(98.0));
    }

    #[test]
    fn test_parse_swedish_numbers() {
        assert_eq!(parse_locale_number("3,4"), Some(3.4));
        assert_eq!(parse_locale_number("12 345"), Some(12345.0));
        assert_eq!(parse_locale_number("12\u{a0}345,5"), Some(12345.5));
    }

    #[test]
    fn test_parse_rejects_text() {
        assert_eq!(parse_locale_number(""), None);
        assert_eq!(parse_locale_number("   "), None);
        assert_eq!(parse_locale_number("72 bpm"), None);
        assert_eq!(parse_locale_number("1,234,5"), None);
        assert_eq!(parse_locale_number("inf"), None);
        assert_eq!(parse_locale_number("NaN"), None);
    }

    #[test]
    fn test_parse_pressure_pair() {
        assert_eq!(parse_pressure_pair("120/80"), Some((120, 80)));
        assert_eq!(parse_pressure_pair(" 135 / 85 "), Some((135, 85)));
        assert_eq!(parse_pressure_pair("118-76"), Some((118, 76)));
        assert_eq!(parse_pressure_pair("120/80 mmHg"), Some((120, 80)));
        assert_eq!(parse_pressure_pair("999/999"), Some((999, 999)));
    }

    #[test]
    fn test_parse_pressure_pair_rejects() {
        assert_eq!(parse_pressure_pair("2024-01-01"), None);
        assert_eq!(parse_pressure_pair("1200/80"), None);
        assert_eq!(parse_pressure_pair("120"), None);
        assert_eq!(parse_pressure_pair("hög"), None);
    }
}
