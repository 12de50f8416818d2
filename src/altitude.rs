//! Altitude values with unit conversion and original-string preservation.
//!
//! Like coordinates, an [`Altitude`] keeps the string it was parsed from and
//! hands it back when the same unit is requested, so loading and re-saving a
//! track does not churn altitude fields. A missing or unparseable altitude is
//! represented by `Option::None` rather than a sentinel value.

use serde::{Deserialize, Serialize};

use crate::numbers::{decimal_places, format_decimal, format_decimal_to_match, parse_double_lenient};
use crate::unit::Unit;

/// An altitude with its unit and, when parsed from text, the original string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Altitude {
    value: i64,
    unit: Unit,
    original: Option<String>,
}

impl Altitude {
    /// Build from a whole-number value in the given unit.
    pub fn new(value: i64, unit: Unit) -> Altitude {
        Altitude {
            value,
            unit,
            original: None,
        }
    }

    /// Parse a textual altitude, returning `None` when the text holds no
    /// usable number. Accepts both `.` and `,` decimal separators.
    pub fn parse(text: &str, unit: Unit) -> Option<Altitude> {
        let trimmed = text.trim();
        let value = parse_double_lenient(trimmed)?;
        Some(Altitude {
            value: value.round() as i64,
            unit,
            original: Some(trimmed.to_string()),
        })
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Value in metres, the standard unit for calculations.
    pub fn metric_value(&self) -> f64 {
        if self.unit.is_standard() {
            return self.value as f64;
        }
        self.value as f64 / self.unit.mult_factor_from_std
    }

    /// Value converted to the given unit, unrounded.
    pub fn value_in(&self, unit: Unit) -> f64 {
        self.metric_value() * unit.mult_factor_from_std
    }

    /// Value converted to the given unit, rounded to the nearest whole number.
    pub fn int_value_in(&self, unit: Unit) -> i64 {
        self.value_in(unit).round() as i64
    }

    /// String form in the given unit, reusing the original string when the
    /// unit matches. `None` means "whatever unit the value already has".
    pub fn string_value(&self, unit: Option<Unit>) -> String {
        match (&self.original, unit) {
            (Some(original), None) => original.clone(),
            (Some(original), Some(unit)) if unit == self.unit => original.clone(),
            (_, Some(unit)) => format_value(self.value_in(unit)),
            (None, None) => format_value(self.value as f64),
        }
    }

    /// String form in the given unit, formatted to match the decimal
    /// precision of the original string.
    pub fn formatted_value(&self, unit: Unit) -> String {
        match &self.original {
            Some(original) => format_decimal_to_match(self.value_in(unit), original),
            None => format_value(self.value_in(unit)),
        }
    }

    /// A copy shifted by the given offset, keeping this altitude's unit.
    /// The stored string is reformatted with at least `decimals` decimal
    /// places, or more if the original had them.
    pub fn add_offset(&self, offset: f64, offset_unit: Unit, decimals: usize) -> Altitude {
        let offset_in_own_unit = if offset_unit == self.unit {
            offset
        } else {
            offset / offset_unit.mult_factor_from_std * self.unit.mult_factor_from_std
        };
        let precise_value = self
            .original
            .as_deref()
            .and_then(parse_double_lenient)
            .unwrap_or(self.value as f64);
        let new_value = precise_value + offset_in_own_unit;
        let num_decimals = self
            .original
            .as_deref()
            .and_then(decimal_places)
            .unwrap_or(0)
            .max(decimals);
        Altitude {
            value: new_value.round() as i64,
            unit: self.unit,
            original: Some(format_decimal(new_value, num_decimals)),
        }
    }

    /// Interpolate between two optional altitudes, in the unit of the first.
    pub fn interpolate(
        start: Option<&Altitude>,
        end: Option<&Altitude>,
        fraction: f64,
    ) -> Option<Altitude> {
        let (start, end) = (start?, end?);
        let start_value = start.value as f64;
        let end_value = end.value_in(start.unit);
        let value = start_value + (end_value - start_value) * fraction;
        Some(Altitude::new(value.round() as i64, start.unit))
    }
}

fn format_value(value: f64) -> String {
    if value == value.trunc() {
        format!("{}", value as i64)
    } else {
        format_decimal(value, 2)
    }
}
