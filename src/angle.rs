//! Exact fixed-point angle arithmetic.
//!
//! A [`FractionalSeconds`] holds an unsigned angle as an integer count of
//! fractional seconds of arc: `numerator = seconds * 10^divisor_digits`.
//! Keeping the numerator exact avoids the floating-point drift that shows up
//! when a coordinate is repeatedly rounded and reformatted between
//! sexagesimal display formats. Signs live on the owning coordinate, not here.

use log::debug;

/// Largest fractional-digit count the numerator can carry without risking
/// `i64` overflow for angles up to 360 degrees.
const MAX_FRACTION_DIGITS: usize = 12;

/// An angle as an exact integer numerator over a power-of-ten denominator
/// of seconds of arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FractionalSeconds {
    numerator: i64,
    divisor_digits: u8,
}

impl FractionalSeconds {
    /// Build from whole degrees and a decimal fraction of degrees,
    /// e.g. `51.4703` is `(51, 4703, 4)`.
    pub fn from_degrees(degrees: i64, deg_fraction: i64, digits: usize) -> Self {
        let (fraction, digits) = clamp_fraction(deg_fraction, digits);
        let denominator = multiplier(digits);
        FractionalSeconds {
            numerator: (degrees * denominator + fraction) * 60 * 60,
            divisor_digits: digits as u8,
        }
    }

    /// Build from degrees, minutes and a decimal fraction of minutes.
    pub fn from_deg_min(degrees: i64, minutes: i64, min_fraction: i64, digits: usize) -> Self {
        let (fraction, digits) = clamp_fraction(min_fraction, digits);
        let denominator = multiplier(digits);
        FractionalSeconds {
            numerator: ((degrees * 60 + minutes) * denominator + fraction) * 60,
            divisor_digits: digits as u8,
        }
    }

    /// Build from degrees, minutes, seconds and a decimal fraction of seconds.
    pub fn from_deg_min_sec(
        degrees: i64,
        minutes: i64,
        seconds: i64,
        sec_fraction: i64,
        digits: usize,
    ) -> Self {
        let (fraction, digits) = clamp_fraction(sec_fraction, digits);
        let denominator = multiplier(digits);
        FractionalSeconds {
            numerator: ((degrees * 60 + minutes) * 60 + seconds) * denominator + fraction,
            divisor_digits: digits as u8,
        }
    }

    /// Build from a (possibly signed) decimal degree value; the sign is
    /// discarded. Used when a coordinate was constructed numerically and a
    /// sexagesimal rendering is requested.
    pub fn from_double(degrees: f64, digits: usize) -> Self {
        let digits = digits.min(MAX_FRACTION_DIGITS);
        let value = degrees.abs() * multiplier(digits) as f64;
        FractionalSeconds {
            numerator: (value * 60.0 * 60.0).round() as i64,
            divisor_digits: digits as u8,
        }
    }

    fn from_numerator(numerator: i64, digits: u8) -> Self {
        FractionalSeconds {
            numerator,
            divisor_digits: digits,
        }
    }

    /// Whole seconds of arc, fraction discarded.
    pub fn total_seconds(&self) -> i64 {
        self.numerator / multiplier(self.divisor_digits as usize)
    }

    pub fn whole_degrees(&self) -> i64 {
        self.total_seconds() / 60 / 60
    }

    pub fn whole_minutes(&self) -> i64 {
        (self.total_seconds() / 60) % 60
    }

    pub fn whole_seconds(&self) -> i64 {
        self.total_seconds() % 60
    }

    /// The fractional part of the degrees as a zero-padded digit string.
    pub fn fraction_degrees(&self) -> String {
        fraction_string(self.numerator / 60 / 60, self.divisor_digits)
    }

    /// The fractional part of the minutes as a zero-padded digit string.
    pub fn fraction_minutes(&self) -> String {
        fraction_string(self.numerator / 60, self.divisor_digits)
    }

    /// The fractional part of the seconds as a zero-padded digit string.
    pub fn fraction_seconds(&self) -> String {
        fraction_string(self.numerator, self.divisor_digits)
    }

    pub fn as_double(&self) -> f64 {
        self.numerator as f64 / multiplier(self.divisor_digits as usize) as f64 / 3600.0
    }

    /// Round so the fraction of a degree has the given number of digits.
    pub fn round_to_degrees(&self, digits: usize) -> Self {
        self.round_to(60 * 60, digits)
    }

    /// Round so the fraction of a minute has the given number of digits.
    pub fn round_to_minutes(&self, digits: usize) -> Self {
        self.round_to(60, digits)
    }

    /// Round so the fraction of a second has the given number of digits.
    pub fn round_to_seconds(&self, digits: usize) -> Self {
        self.round_to(1, digits)
    }

    /// HALF-UP rounding at the requested resolution; widening just scales
    /// the numerator up.
    fn round_to(&self, mult_factor: i64, digits: usize) -> Self {
        let digits = digits.min(MAX_FRACTION_DIGITS);
        let current = self.divisor_digits as usize;
        if digits > current {
            let numerator = self.numerator * multiplier(digits - current);
            FractionalSeconds::from_numerator(numerator, digits as u8)
        } else if digits < current {
            let factor = multiplier(current - digits);
            let numerator = self.numerator + factor / 2 * mult_factor;
            FractionalSeconds::from_numerator(numerator / factor, digits as u8)
        } else {
            *self
        }
    }

    pub fn is_within_180_degrees(&self) -> bool {
        self.numerator <= 180 * 60 * 60 * multiplier(self.divisor_digits as usize)
    }

    pub fn wrap_to_360_degrees(&self) -> Self {
        FractionalSeconds::from_numerator(
            self.numerator % self.three_sixty_degrees(),
            self.divisor_digits,
        )
    }

    /// The complement to 360 degrees, used when wrapping flips the cardinal.
    pub fn invert(&self) -> Self {
        FractionalSeconds::from_numerator(
            self.three_sixty_degrees() - self.numerator,
            self.divisor_digits,
        )
    }

    fn three_sixty_degrees(&self) -> i64 {
        360 * 60 * 60 * multiplier(self.divisor_digits as usize)
    }
}

/// Truncate excess fractional digits so the numerator stays within `i64`.
fn clamp_fraction(mut fraction: i64, mut digits: usize) -> (i64, usize) {
    if digits > MAX_FRACTION_DIGITS {
        debug!(
            "truncating fixed-point fraction from {} to {} digits",
            digits, MAX_FRACTION_DIGITS
        );
    }
    while digits > MAX_FRACTION_DIGITS {
        digits -= 1;
        fraction /= 10;
    }
    (fraction, digits)
}

fn fraction_string(numerator: i64, divisor_digits: u8) -> String {
    if divisor_digits == 0 {
        return String::new();
    }
    let remainder = numerator % multiplier(divisor_digits as usize);
    format!("{:0width$}", remainder, width = divisor_digits as usize)
}

fn multiplier(digits: usize) -> i64 {
    10i64.pow(digits as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_decimal_degrees() {
        // 1.5 degrees expressed as (1, 5, 1 digit)
        let angle = FractionalSeconds::from_degrees(1, 5, 1);
        assert_eq!(angle.whole_degrees(), 1);
        assert_eq!(angle.whole_minutes(), 30);
        assert_eq!(angle.whole_seconds(), 0);
        assert_eq!(angle.as_double(), 1.5);
    }

    #[test]
    fn test_from_deg_min_sec() {
        let angle = FractionalSeconds::from_deg_min_sec(1, 26, 59, 95438, 5);
        assert_eq!(angle.whole_degrees(), 1);
        assert_eq!(angle.whole_minutes(), 26);
        assert_eq!(angle.whole_seconds(), 59);
        assert_eq!(angle.fraction_seconds(), "95438");
    }

    #[test]
    fn test_rounding_seconds() {
        let angle = FractionalSeconds::from_deg_min_sec(1, 26, 59, 95438, 5);

        let widened = angle.round_to_seconds(6);
        assert_eq!(widened.fraction_seconds(), "954380");

        let narrowed = angle.round_to_seconds(4);
        assert_eq!(narrowed.fraction_seconds(), "9544");

        // Rounding up at one digit carries into the next minute
        let carried = angle.round_to_seconds(1);
        assert_eq!(carried.whole_minutes(), 27);
        assert_eq!(carried.whole_seconds(), 0);
        assert_eq!(carried.fraction_seconds(), "0");
    }

    #[test]
    fn test_rounding_minutes() {
        // 51 degrees 59.883 minutes
        let angle = FractionalSeconds::from_deg_min(51, 59, 883, 3);
        let rounded = angle.round_to_minutes(0);
        assert_eq!(rounded.whole_degrees(), 52);
        assert_eq!(rounded.whole_minutes(), 0);
        assert_eq!(rounded.fraction_minutes(), "");

        let widened = angle.round_to_minutes(9);
        assert_eq!(widened.fraction_minutes(), "883000000");
    }

    #[test]
    fn test_excess_digits_truncated() {
        // 15 fractional digits get cut back without panicking
        let angle = FractionalSeconds::from_degrees(27, 123401234012340, 15);
        assert_eq!(angle.whole_degrees(), 27);
        let expected = 27.123401234012;
        assert!((angle.as_double() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_wrap_and_invert() {
        let angle = FractionalSeconds::from_degrees(200, 0, 0);
        assert!(!angle.is_within_180_degrees());
        assert_eq!(angle.wrap_to_360_degrees().whole_degrees(), 200);
        assert_eq!(angle.invert().whole_degrees(), 160);

        let wrapped = FractionalSeconds::from_degrees(370, 0, 0).wrap_to_360_degrees();
        assert_eq!(wrapped.whole_degrees(), 10);
    }

    #[test]
    fn test_from_double_round_trip() {
        let angle = FractionalSeconds::from_double(1.5, 1);
        assert_eq!(angle.whole_degrees(), 1);
        assert_eq!(angle.whole_minutes(), 30);
        assert_eq!(angle.fraction_minutes(), "0");
        assert_eq!(angle.as_double(), 1.5);
    }
}
