//! Unified error handling for the track-stats library.
//!
//! Parsing has two entry points per type: a lenient one returning `Option`
//! (malformed input simply yields no value, matching how a single bad field
//! degrades to "no data" during aggregation) and a strict `try_parse` one
//! returning `Result` with one of the variants below.

use std::fmt;

/// Why a textual coordinate or altitude value could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Input was empty or whitespace-only
    EmptyValue,
    /// More than four numeric fields found in a coordinate string
    TooManyFields { count: usize },
    /// Degree value exceeds the axis maximum (90 for latitude, 180 for longitude)
    DegreesOutOfRange { value: f64, maximum: f64 },
    /// Minutes field is 60 or more
    MinutesOutOfRange { value: i64 },
    /// Seconds field is 60 or more
    SecondsOutOfRange { value: i64 },
    /// Input contains no usable numeric fields
    NotANumber { text: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::EmptyValue => {
                write!(f, "empty value")
            }
            ParseError::TooManyFields { count } => {
                write!(f, "found {} numeric fields, maximum 4 allowed", count)
            }
            ParseError::DegreesOutOfRange { value, maximum } => {
                write!(f, "degree value {} exceeds maximum {}", value, maximum)
            }
            ParseError::MinutesOutOfRange { value } => {
                write!(f, "minutes value {} must be below 60", value)
            }
            ParseError::SecondsOutOfRange { value } => {
                write!(f, "seconds value {} must be below 60", value)
            }
            ParseError::NotANumber { text } => {
                write!(f, "'{}' is not a number", text)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Result type alias for track-stats parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ParseError::TooManyFields { count: 5 };
        assert!(err.to_string().contains("5 numeric fields"));

        let err = ParseError::DegreesOutOfRange {
            value: 91.0,
            maximum: 90.0,
        };
        assert!(err.to_string().contains("91"));
        assert!(err.to_string().contains("90"));
    }
}
