//! Latitude and longitude values with format-preserving parsing.
//!
//! A [`Coordinate`] remembers the exact string it was parsed from, so a
//! value read as `"N 1°26 59.95438"` is written back unchanged unless a
//! different format or precision is requested. Internally it keeps the exact
//! fixed-point angle (when the input was sexagesimal) alongside a decimal
//! degree value, with the sign always agreeing with the cardinal.
//!
//! Accepted inputs:
//! - whole or decimal degrees: `"65"`, `"51.4703"`, `"-1.2"`, `"1.3E-6"`
//! - degrees and minutes: `"N 51 28.218"`, `"51°59.883'"`
//! - degrees, minutes and seconds: `"S 3 59 30.0"`, `"1°26 59.95438"`
//!
//! The cardinal letter may lead or trail, or be replaced by a minus sign.

use std::fmt;

use log::debug;

use crate::angle::FractionalSeconds;
use crate::error::{ParseError, Result};
use crate::numbers::format_decimal;

// ============================================================================
// Cardinals and axes
// ============================================================================

/// Compass direction attached to a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinal {
    North,
    East,
    South,
    West,
}

impl Cardinal {
    pub fn letter(&self) -> char {
        match self {
            Cardinal::North => 'N',
            Cardinal::East => 'E',
            Cardinal::South => 'S',
            Cardinal::West => 'W',
        }
    }

    pub fn opposite(&self) -> Cardinal {
        match self {
            Cardinal::North => Cardinal::South,
            Cardinal::South => Cardinal::North,
            Cardinal::East => Cardinal::West,
            Cardinal::West => Cardinal::East,
        }
    }

    /// South and West carry negative degree values.
    pub fn is_negative(&self) -> bool {
        matches!(self, Cardinal::South | Cardinal::West)
    }
}

/// Which axis a coordinate belongs to, with its cardinal pair and range.
///
/// Latitude values outside the range are rejected; longitude values wrap
/// around the antimeridian instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis {
    pub positive: Cardinal,
    pub negative: Cardinal,
    pub max_degrees: f64,
    pub wraps: bool,
}

impl Axis {
    pub const LATITUDE: Axis = Axis {
        positive: Cardinal::North,
        negative: Cardinal::South,
        max_degrees: 90.0,
        wraps: false,
    };

    pub const LONGITUDE: Axis = Axis {
        positive: Cardinal::East,
        negative: Cardinal::West,
        max_degrees: 180.0,
        wraps: true,
    };

    fn cardinal_for_char(&self, c: char) -> Option<Cardinal> {
        if c.eq_ignore_ascii_case(&self.positive.letter()) {
            Some(self.positive)
        } else if c.eq_ignore_ascii_case(&self.negative.letter()) {
            Some(self.negative)
        } else {
            None
        }
    }
}

// ============================================================================
// Output formats
// ============================================================================

/// How to render a coordinate as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordFormat {
    /// `N001°26'59.954\"`
    DegMinSec,
    /// `N001°26.999'`
    DegMin,
    /// `N 1.26518000`
    Deg,
    /// `1.26518000` with local decimal separator
    DegWithoutCardinal,
    /// `1 26 59.954`, for exif-style output where the cardinal travels separately
    DegMinSecWithSpaces,
    /// `N`
    JustCardinal,
    /// `1.26518000` always with a `.` separator, for machine-readable exports
    DecimalForcePoint,
    /// Whatever string the coordinate was parsed from
    Original,
}

fn default_digits(format: CoordFormat) -> usize {
    match format {
        CoordFormat::DegMinSec | CoordFormat::DegMinSecWithSpaces => 3,
        CoordFormat::DegMin => 6,
        CoordFormat::JustCardinal => 0,
        _ => 8,
    }
}

// ============================================================================
// Coordinate
// ============================================================================

/// A parsed latitude or longitude.
///
/// Immutable once built. The sign of [`Coordinate::as_double`] always
/// matches the cardinal, including for values produced by wrapping.
#[derive(Debug, Clone)]
pub struct Coordinate {
    cardinal: Cardinal,
    cardinal_guessed: bool,
    value: Option<FractionalSeconds>,
    original: String,
    original_format: CoordFormat,
    as_double: f64,
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.as_double == other.as_double
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl Coordinate {
    /// Parse a coordinate string, returning `None` if it is malformed or out
    /// of range for the axis.
    pub fn parse(text: &str, axis: Axis) -> Option<Coordinate> {
        match Coordinate::try_parse(text, axis) {
            Ok(coord) => Some(coord),
            Err(err) => {
                debug!("could not parse coordinate {:?}: {}", text, err);
                None
            }
        }
    }

    /// Parse a coordinate string, reporting why it failed.
    pub fn try_parse(text: &str, axis: Axis) -> Result<Coordinate> {
        let source = text.trim();
        if source.is_empty() {
            return Err(ParseError::EmptyValue);
        }

        let explicit_cardinal = find_cardinal(source, axis);
        let scan = scan_fields(source);

        // A leading minus only counts when no cardinal letter was given
        let negative = scan.negative && explicit_cardinal.is_none();
        let cardinal = explicit_cardinal
            .unwrap_or(if negative { axis.negative } else { axis.positive });

        let fields = &scan.fields;
        let lengths = &scan.lengths;
        let (value, original_format) = match scan.num_fields {
            1 => {
                // Whole degrees only
                let format = if explicit_cardinal.is_some() {
                    CoordFormat::Deg
                } else {
                    CoordFormat::DegWithoutCardinal
                };
                (FractionalSeconds::from_deg_min_sec(fields[0], 0, 0, 0, 0), format)
            }
            2 if !scan.other_delims[1] => {
                // Decimal degrees, the fraction split across the point
                let format = if explicit_cardinal.is_some() {
                    CoordFormat::Deg
                } else {
                    CoordFormat::DegWithoutCardinal
                };
                (
                    FractionalSeconds::from_degrees(fields[0], fields[1], lengths[1]),
                    format,
                )
            }
            2 => {
                // Degrees and whole minutes, separated by a non-decimal char
                check_minutes(fields[1])?;
                (
                    FractionalSeconds::from_deg_min(fields[0], fields[1], 0, 0),
                    CoordFormat::DegMin,
                )
            }
            3 if !scan.other_delims[1] && scan.other_delims[2] => {
                // Could be exponent notation like 1.3E-6
                if let Some(parsed) = parse_just_number(source) {
                    let cardinal = if parsed < 0.0 { axis.negative } else { axis.positive };
                    let coord = Coordinate {
                        cardinal,
                        cardinal_guessed: parsed >= 0.0,
                        value: None,
                        original: source.to_string(),
                        original_format: CoordFormat::Deg,
                        as_double: parsed,
                    };
                    return check_range(coord, axis);
                }
                check_minutes(fields[1])?;
                check_seconds(fields[2])?;
                (
                    FractionalSeconds::from_deg_min_sec(fields[0], fields[1], fields[2], 0, 0),
                    CoordFormat::DegMinSec,
                )
            }
            3 if !scan.other_delims[2] => {
                // Degrees, minutes and a fraction of minutes
                check_minutes(fields[1])?;
                (
                    FractionalSeconds::from_deg_min(fields[0], fields[1], fields[2], lengths[2]),
                    CoordFormat::DegMin,
                )
            }
            3 | 4 => {
                // Degrees, minutes, seconds and an optional fraction of seconds
                check_minutes(fields[1])?;
                check_seconds(fields[2])?;
                (
                    FractionalSeconds::from_deg_min_sec(
                        fields[0], fields[1], fields[2], fields[3], lengths[3],
                    ),
                    CoordFormat::DegMinSec,
                )
            }
            n if n > 4 => return Err(ParseError::TooManyFields { count: n }),
            _ => {
                return Err(ParseError::NotANumber {
                    text: source.to_string(),
                })
            }
        };

        let mut as_double = value.as_double();
        if cardinal.is_negative() {
            as_double = -as_double;
        }
        let coord = Coordinate {
            cardinal,
            cardinal_guessed: explicit_cardinal.is_none() && !negative,
            value: Some(value),
            original: source.to_string(),
            original_format,
            as_double,
        };
        check_range(coord, axis)
    }

    /// Build a coordinate from a decimal degree value, rendered with six
    /// decimal places. Out-of-range latitudes give `None`; longitudes wrap.
    pub fn from_double(value: f64, axis: Axis) -> Option<Coordinate> {
        let value = if value.abs() > axis.max_degrees {
            if !axis.wraps {
                return None;
            }
            wrap_double(value)
        } else {
            value
        };
        let cardinal = if value < 0.0 { axis.negative } else { axis.positive };
        Some(Coordinate {
            cardinal,
            cardinal_guessed: false,
            value: None,
            original: format_decimal(value, 6),
            original_format: CoordFormat::DegWithoutCardinal,
            as_double: value,
        })
    }

    /// Linear interpolation between two coordinates, `fraction` 0.0 giving
    /// the start and 1.0 the end.
    pub fn interpolate(start: &Coordinate, end: &Coordinate, fraction: f64, axis: Axis) -> Option<Coordinate> {
        let value = start.as_double + (end.as_double - start.as_double) * fraction;
        Coordinate::from_double(value, axis)
    }

    pub fn as_double(&self) -> f64 {
        self.as_double
    }

    pub fn cardinal(&self) -> Cardinal {
        self.cardinal
    }

    /// True when the input carried neither a cardinal letter nor a minus
    /// sign, so the positive cardinal was assumed.
    pub fn cardinal_guessed(&self) -> bool {
        self.cardinal_guessed
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn original_format(&self) -> CoordFormat {
        self.original_format
    }

    /// Equivalent coordinate wrapped into [-180, 180] degrees. The original
    /// string is kept, so default-format output is unchanged.
    pub fn wrap_to_180_degrees(&self) -> Coordinate {
        let value = match self.value {
            None => {
                if self.as_double >= -180.0 && self.as_double <= 180.0 {
                    return self.clone();
                }
                let wrapped = wrap_double(self.as_double);
                let flipped = (self.as_double > 0.0) != (wrapped > 0.0);
                let cardinal = if flipped { self.cardinal.opposite() } else { self.cardinal };
                return Coordinate {
                    cardinal,
                    cardinal_guessed: self.cardinal_guessed,
                    value: None,
                    original: self.original.clone(),
                    original_format: self.original_format,
                    as_double: wrapped,
                };
            }
            Some(value) => value,
        };
        if value.is_within_180_degrees() {
            return self.clone();
        }
        let wrapped = value.wrap_to_360_degrees();
        let (wrapped, cardinal) = if wrapped.is_within_180_degrees() {
            (wrapped, self.cardinal)
        } else {
            (wrapped.invert(), self.cardinal.opposite())
        };
        let mut as_double = wrapped.as_double();
        if cardinal.is_negative() {
            as_double = -as_double;
        }
        Coordinate {
            cardinal,
            cardinal_guessed: self.cardinal_guessed,
            value: Some(wrapped),
            original: self.original.clone(),
            original_format: self.original_format,
            as_double,
        }
    }

    /// Render with the default precision for the format.
    pub fn output(&self, format: CoordFormat) -> String {
        self.output_digits(format, None)
    }

    /// Render with an explicit number of fraction digits. With `None`, the
    /// original string is reused whenever the format allows it.
    pub fn output_digits(&self, format: CoordFormat, digits: Option<usize>) -> String {
        if format == CoordFormat::Original {
            return self.original.clone();
        }
        if format == self.original_format && digits.is_none() {
            return self.original.clone();
        }
        // A plain unadorned decimal already satisfies DecimalForcePoint
        if format == CoordFormat::DecimalForcePoint
            && self.original_format == CoordFormat::DegWithoutCardinal
            && digits.is_none()
            && self.original.contains('.')
            && !self.original.contains(',')
        {
            return self.original.clone();
        }

        let num_digits = digits.unwrap_or_else(|| default_digits(format));
        let value = self
            .value
            .unwrap_or_else(|| FractionalSeconds::from_double(self.as_double, num_digits));

        match format {
            CoordFormat::DegMinSec => {
                let value = value.round_to_seconds(num_digits);
                format!(
                    "{}{}\u{00B0}{}'{}.{}\"",
                    self.cardinal.letter(),
                    three_digits(value.whole_degrees()),
                    two_digits(value.whole_minutes()),
                    two_digits(value.whole_seconds()),
                    value.fraction_seconds()
                )
            }
            CoordFormat::DegMin => {
                let value = value.round_to_minutes(num_digits);
                format!(
                    "{}{}\u{00B0}{}.{}'",
                    self.cardinal.letter(),
                    three_digits(value.whole_degrees()),
                    two_digits(value.whole_minutes()),
                    value.fraction_minutes()
                )
            }
            CoordFormat::Deg => format!(
                "{} {}",
                self.cardinal.letter(),
                format_decimal(self.as_double.abs(), num_digits)
            ),
            CoordFormat::DegWithoutCardinal | CoordFormat::DecimalForcePoint => {
                format_decimal(self.as_double, num_digits)
            }
            CoordFormat::DegMinSecWithSpaces => {
                let value = value.round_to_seconds(num_digits);
                format!(
                    "{} {} {}.{}",
                    value.whole_degrees(),
                    value.whole_minutes(),
                    value.whole_seconds(),
                    value.fraction_seconds()
                )
            }
            CoordFormat::JustCardinal => self.cardinal.letter().to_string(),
            CoordFormat::Original => self.original.clone(),
        }
    }
}

// ============================================================================
// Parsing internals
// ============================================================================

#[derive(Debug, Default)]
struct FieldScan {
    fields: [i64; 4],
    lengths: [usize; 4],
    // delimiter slots: other_delims[i] is set when any character before
    // field i was neither '.' nor ','
    other_delims: [bool; 5],
    num_fields: usize,
    negative: bool,
}

/// Split a coordinate string into up to four numeric fields, remembering
/// whether each separator was a decimal point.
fn scan_fields(source: &str) -> FieldScan {
    let mut scan = FieldScan::default();
    let mut in_numeric = false;
    for c in source.chars() {
        if c.is_ascii_digit() {
            if !in_numeric {
                in_numeric = true;
                scan.num_fields += 1;
                if scan.num_fields > 4 {
                    return scan;
                }
            }
            let idx = scan.num_fields - 1;
            // ignore trailing digits that would overflow the field
            if scan.lengths[idx] < 18 {
                scan.fields[idx] = scan.fields[idx] * 10 + (c as i64 - '0' as i64);
                scan.lengths[idx] += 1;
            }
        } else if c == '-' && scan.num_fields == 0 {
            scan.negative = true;
        } else {
            in_numeric = false;
            if c != '.' && c != ',' {
                scan.other_delims[scan.num_fields] = true;
            }
        }
    }
    scan
}

/// Cardinal letter at the start or end of the string, if it matches the axis.
fn find_cardinal(source: &str, axis: Axis) -> Option<Cardinal> {
    let first = source.chars().next()?;
    axis.cardinal_for_char(first)
        .or_else(|| source.chars().next_back().and_then(|c| axis.cardinal_for_char(c)))
}

/// The whole string as a plain number, if it parses and lands in a
/// plausible degree range.
fn parse_just_number(source: &str) -> Option<f64> {
    source
        .parse::<f64>()
        .ok()
        .filter(|v| (-180.0..=360.0).contains(v))
}

fn check_minutes(value: i64) -> Result<()> {
    if value >= 60 {
        Err(ParseError::MinutesOutOfRange { value })
    } else {
        Ok(())
    }
}

fn check_seconds(value: i64) -> Result<()> {
    if value >= 60 {
        Err(ParseError::SecondsOutOfRange { value })
    } else {
        Ok(())
    }
}

fn check_range(coord: Coordinate, axis: Axis) -> Result<Coordinate> {
    if coord.as_double.abs() <= axis.max_degrees {
        return Ok(coord);
    }
    if axis.wraps {
        return Ok(coord.wrap_to_180_degrees());
    }
    Err(ParseError::DegreesOutOfRange {
        value: coord.as_double,
        maximum: axis.max_degrees,
    })
}

fn wrap_double(value: f64) -> f64 {
    (value + 180.0).rem_euclid(360.0) - 180.0
}

fn two_digits(value: i64) -> String {
    if value <= 0 {
        "00".to_string()
    } else {
        format!("{:02}", value % 100)
    }
}

fn three_digits(value: i64) -> String {
    if value <= 0 {
        "000".to_string()
    } else {
        format!("{:03}", value % 1000)
    }
}
