//! Decimal number formatting and lenient parsing.
//!
//! All formatting uses a `.` decimal separator and HALF-UP rounding (ties
//! round away from zero), so that re-exported values match what coordinate
//! and altitude strings looked like on input. Parsing additionally accepts
//! a `,` separator, since track files written under other locales use it.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;

/// A formatter for a fixed number of decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalFormat {
    places: usize,
}

impl DecimalFormat {
    pub fn new(places: usize) -> Self {
        DecimalFormat { places }
    }

    pub fn format(&self, value: f64) -> String {
        format_decimal(value, self.places)
    }
}

/// Memoized cache mapping decimal-place counts to formatters.
///
/// Safe for concurrent read/insert; shared through [`formatters()`] so that
/// a background statistics refresh and a UI query can format at the same time.
#[derive(Debug, Default)]
pub struct DecimalFormatters {
    cache: Mutex<HashMap<usize, DecimalFormat>>,
}

impl DecimalFormatters {
    pub fn get(&self, places: usize) -> DecimalFormat {
        let mut cache = self.cache.lock().expect("formatter cache poisoned");
        *cache
            .entry(places)
            .or_insert_with(|| DecimalFormat::new(places))
    }
}

static FORMATTERS: Lazy<DecimalFormatters> = Lazy::new(DecimalFormatters::default);

/// The process-wide formatter cache.
pub fn formatters() -> &'static DecimalFormatters {
    &FORMATTERS
}

/// Format a value with exactly `places` decimal digits, rounding HALF-UP.
pub fn format_decimal(value: f64, places: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let negative = value < 0.0;
    let scale = 10i128.pow(places as u32);
    let scaled = (value.abs() * scale as f64 + 0.5).floor() as i128;
    let whole = scaled / scale;
    let fraction = scaled % scale;
    let sign = if negative { "-" } else { "" };
    if places == 0 {
        format!("{}{}", sign, whole)
    } else {
        format!("{}{}.{:0width$}", sign, whole, fraction, width = places)
    }
}

/// Format a value copying the decimal-place count of an existing string.
///
/// Falls back to three places when the pattern is not a number.
pub fn format_decimal_to_match(value: f64, pattern: &str) -> String {
    format_decimal(value, decimal_places(pattern).unwrap_or(3))
}

/// Count the decimal places of a numeric string, or `None` if the string
/// does not end in a digit sequence. A string with no separator has zero
/// decimal places.
pub fn decimal_places(text: &str) -> Option<usize> {
    let value = text.trim();
    let mut digits = 0usize;
    let mut has_any_digits = false;
    for c in value.chars().rev() {
        if c.is_ascii_digit() {
            has_any_digits = true;
            digits += 1;
        } else if c == '.' || c == ',' {
            return (has_any_digits || digits == 0).then_some(digits);
        } else {
            return has_any_digits.then_some(0);
        }
    }
    has_any_digits.then_some(0)
}

/// Parse a decimal number accepting either `.` or `,` as the separator.
pub fn parse_double_lenient(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = trimmed.parse::<f64>() {
        return Some(value);
    }
    // Retry with a decimal comma, but only if nothing else unexpected is there
    if trimmed.chars().all(|c| c.is_ascii_digit() || c == '-' || c == ',') {
        return trimmed.replace(',', ".").parse::<f64>().ok();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_decimal_half_up() {
        assert_eq!(format_decimal(1.26518, 4), "1.2652");
        assert_eq!(format_decimal(1.26518, 3), "1.265");
        assert_eq!(format_decimal(1.26518, 2), "1.27");
        assert_eq!(format_decimal(1.26518, 1), "1.3");
        assert_eq!(format_decimal(1.5, 2), "1.50");
        assert_eq!(format_decimal(-1.5, 2), "-1.50");
        assert_eq!(format_decimal(0.125, 2), "0.13");
        assert_eq!(format_decimal(27.0, 0), "27");
    }

    #[test]
    fn test_format_pads_fraction() {
        assert_eq!(format_decimal(1.1, 8), "1.10000000");
        assert_eq!(format_decimal(102.25, 3), "102.250");
    }

    #[test]
    fn test_decimal_places() {
        assert_eq!(decimal_places("12.345"), Some(3));
        assert_eq!(decimal_places("12,3"), Some(1));
        assert_eq!(decimal_places("12"), Some(0));
        assert_eq!(decimal_places("12."), Some(0));
        assert_eq!(decimal_places("-7.25"), Some(2));
        assert_eq!(decimal_places(""), None);
        assert_eq!(decimal_places("abc"), None);
        // digits after a non-separator character still count as zero places
        assert_eq!(decimal_places("1x23"), Some(0));
    }

    #[test]
    fn test_format_to_match() {
        assert_eq!(format_decimal_to_match(3.14159, "2.50"), "3.14");
        assert_eq!(format_decimal_to_match(3.14159, "10"), "3");
        assert_eq!(format_decimal_to_match(3.14159, "junk"), "3.142");
    }

    #[test]
    fn test_parse_lenient() {
        assert_eq!(parse_double_lenient("12.5"), Some(12.5));
        assert_eq!(parse_double_lenient("  12,5  "), Some(12.5));
        assert_eq!(parse_double_lenient("-3,25"), Some(-3.25));
        assert_eq!(parse_double_lenient("1.3E-6"), Some(1.3e-6));
        assert_eq!(parse_double_lenient(""), None);
        assert_eq!(parse_double_lenient("12,5m"), None);
    }

    #[test]
    fn test_formatter_cache_reuse() {
        let a = formatters().get(4);
        let b = formatters().get(4);
        assert_eq!(a, b);
        assert_eq!(a.format(0.12345), "0.1235");
    }
}
