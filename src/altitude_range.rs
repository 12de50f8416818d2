//! Climb and descent accumulation with noise suppression.
//!
//! Raw GPS or barometric altitude wobbles by a few metres from sample to
//! sample; summing every difference would report absurd climb totals. An
//! [`AltitudeRange`] therefore tracks runs of monotonic movement and only
//! counts a reversal once the value has moved more than the wiggle tolerance
//! away from the last extreme. Sub-threshold reversals leave the run state
//! untouched ("wait and see"), so jitter around a summit collapses into a
//! single turn.
//!
//! The run state itself is a small value type with a pure transition
//! function, which keeps the state machine straightforward to test.

use crate::altitude::Altitude;
use crate::unit::Unit;

// ============================================================================
// Run state
// ============================================================================

/// Which way the current monotonic run is heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trend {
    #[default]
    Unknown,
    /// Climbing since the last minimum
    Up,
    /// Descending since the last maximum
    Down,
}

/// Climb and descent produced by a single transition, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunDelta {
    pub climb: i64,
    pub descent: i64,
}

/// State of the in-progress monotonic run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunState {
    previous_value: Option<i64>,
    extreme: i64,
    trend: Trend,
}

impl RunState {
    /// Feed one metric altitude value, returning the next state and any
    /// climb or descent that this value finalized.
    pub fn with_value(self, value: i64, tolerance: i64) -> (RunState, RunDelta) {
        let no_delta = RunDelta::default();
        let previous = match self.previous_value {
            None => {
                // first value of a segment just seeds the state
                let next = RunState {
                    previous_value: Some(value),
                    ..self
                };
                return (next, no_delta);
            }
            Some(previous) => previous,
        };
        if value == previous {
            return (self, no_delta);
        }

        let locally_up = value > previous;
        let more_than_wiggle = (value - previous).abs() > tolerance;
        match self.trend {
            Trend::Unknown => {
                if more_than_wiggle {
                    let next = RunState {
                        previous_value: Some(value),
                        extreme: previous,
                        trend: if locally_up { Trend::Up } else { Trend::Down },
                    };
                    (next, no_delta)
                } else {
                    // too small to pick a direction, wait and see
                    (self, no_delta)
                }
            }
            Trend::Up if previous > self.extreme => {
                if locally_up {
                    let next = RunState {
                        previous_value: Some(value),
                        ..self
                    };
                    (next, no_delta)
                } else if more_than_wiggle {
                    // dropped over a maximum, bank the climb up to it
                    let delta = RunDelta {
                        climb: previous - self.extreme,
                        descent: 0,
                    };
                    let next = RunState {
                        previous_value: Some(value),
                        extreme: previous,
                        trend: Trend::Down,
                    };
                    (next, delta)
                } else {
                    (self, no_delta)
                }
            }
            Trend::Down if previous < self.extreme => {
                if !locally_up {
                    let next = RunState {
                        previous_value: Some(value),
                        ..self
                    };
                    (next, no_delta)
                } else if more_than_wiggle {
                    // climbed up from a minimum, bank the descent down to it
                    let delta = RunDelta {
                        climb: 0,
                        descent: self.extreme - previous,
                    };
                    let next = RunState {
                        previous_value: Some(value),
                        extreme: previous,
                        trend: Trend::Up,
                    };
                    (next, delta)
                } else {
                    (self, no_delta)
                }
            }
            _ => (self, no_delta),
        }
    }

    /// Climb or descent of the unfinished run, not yet banked.
    pub fn pending(&self) -> RunDelta {
        match (self.previous_value, self.trend) {
            (Some(previous), Trend::Up) if previous > self.extreme => RunDelta {
                climb: previous - self.extreme,
                descent: 0,
            },
            (Some(previous), Trend::Down) if previous < self.extreme => RunDelta {
                climb: 0,
                descent: self.extreme - previous,
            },
            _ => RunDelta::default(),
        }
    }

    /// State at the start of a new segment, seeded with its first value.
    fn reseeded(value: Option<i64>) -> RunState {
        RunState {
            previous_value: value,
            ..RunState::default()
        }
    }
}

// ============================================================================
// Integer min/max range
// ============================================================================

/// Minimum and maximum of a stream of integer values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntegerRange {
    bounds: Option<(i64, i64)>,
}

impl IntegerRange {
    pub fn add_value(&mut self, value: i64) {
        self.bounds = Some(match self.bounds {
            None => (value, value),
            Some((min, max)) => (min.min(value), max.max(value)),
        });
    }

    pub fn has_values(&self) -> bool {
        self.bounds.is_some()
    }

    pub fn minimum(&self) -> Option<i64> {
        self.bounds.map(|(min, _)| min)
    }

    pub fn maximum(&self) -> Option<i64> {
        self.bounds.map(|(_, max)| max)
    }
}

// ============================================================================
// Altitude range accumulator
// ============================================================================

/// Accumulates climb, descent, minimum and maximum over a stream of
/// altitudes. Not thread-safe; each caller builds its own.
#[derive(Debug, Clone)]
pub struct AltitudeRange {
    range: IntegerRange,
    climb_metres: i64,
    descent_metres: i64,
    state: RunState,
    tolerance_metres: i64,
}

impl AltitudeRange {
    /// `tolerance_metres` is the wiggle tolerance below which a reversal is
    /// treated as noise.
    pub fn new(tolerance_metres: i64) -> AltitudeRange {
        AltitudeRange {
            range: IntegerRange::default(),
            climb_metres: 0,
            descent_metres: 0,
            state: RunState::default(),
            tolerance_metres,
        }
    }

    /// Feed the next altitude of the current segment. Missing altitudes are
    /// simply skipped.
    pub fn add_value(&mut self, altitude: Option<&Altitude>) {
        if let Some(altitude) = altitude {
            let value = altitude.metric_value() as i64;
            self.range.add_value(value);
            let (state, delta) = self.state.with_value(value, self.tolerance_metres);
            self.state = state;
            self.climb_metres += delta.climb;
            self.descent_metres += delta.descent;
        }
    }

    /// End the current segment and start a new one with the given altitude.
    /// Any unfinished run is flushed into the totals first.
    pub fn ignore_value(&mut self, altitude: Option<&Altitude>) {
        let pending = self.state.pending();
        self.climb_metres += pending.climb;
        self.descent_metres += pending.descent;
        let seed = altitude.map(|altitude| {
            let value = altitude.metric_value() as i64;
            self.range.add_value(value);
            value
        });
        self.state = RunState::reseeded(seed);
    }

    pub fn has_range(&self) -> bool {
        self.range.has_values()
    }

    pub fn minimum(&self, unit: Unit) -> Option<i64> {
        self.range
            .minimum()
            .map(|min| (min as f64 * unit.mult_factor_from_std) as i64)
    }

    pub fn maximum(&self, unit: Unit) -> Option<i64> {
        self.range
            .maximum()
            .map(|max| (max as f64 * unit.mult_factor_from_std) as i64)
    }

    /// Total climb including the unfinished run.
    pub fn climb(&self, unit: Unit) -> i64 {
        let metres = self.climb_metres + self.state.pending().climb;
        (metres as f64 * unit.mult_factor_from_std) as i64
    }

    /// Total descent including the unfinished run.
    pub fn descent(&self, unit: Unit) -> i64 {
        let metres = self.descent_metres + self.state.pending().descent;
        (metres as f64 * unit.mult_factor_from_std) as i64
    }

    /// Net height gain in metres, climb minus descent.
    pub fn metric_height_diff(&self) -> f64 {
        (self.climb(Unit::METRES) - self.descent(Unit::METRES)) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(values: &[i64], tolerance: i64) -> AltitudeRange {
        let mut range = AltitudeRange::new(tolerance);
        for &value in values {
            range.add_value(Some(&Altitude::new(value, Unit::METRES)));
        }
        range
    }

    #[test]
    fn test_monotonic_climb() {
        let range = feed(&[0, 10, 20, 30], 0);
        assert_eq!(range.climb(Unit::METRES), 30);
        assert_eq!(range.descent(Unit::METRES), 0);
        assert_eq!(range.minimum(Unit::METRES), Some(0));
        assert_eq!(range.maximum(Unit::METRES), Some(30));
    }

    #[test]
    fn test_small_dip_without_tolerance() {
        // with no tolerance every reversal counts
        let range = feed(&[0, 10, 9, 10], 0);
        assert_eq!(range.climb(Unit::METRES), 11);
        assert_eq!(range.descent(Unit::METRES), 1);
    }

    #[test]
    fn test_small_dip_absorbed_by_tolerance() {
        let range = feed(&[0, 10, 9, 10], 2);
        assert_eq!(range.climb(Unit::METRES), 10);
        assert_eq!(range.descent(Unit::METRES), 0);
    }

    #[test]
    fn test_jitter_around_summit() {
        // wobble of one metre around 100 counts as a single turn
        let range = feed(&[0, 100, 99, 100, 99, 100, 50], 3);
        assert_eq!(range.climb(Unit::METRES), 100);
        assert_eq!(range.descent(Unit::METRES), 50);
    }

    #[test]
    fn test_climb_minus_descent_equals_height_diff() {
        let values = [200, 210, 205, 230, 228, 250, 240, 260];
        let range = feed(&values, 2);
        let expected = (values[values.len() - 1] - values[0]) as f64;
        assert_eq!(range.metric_height_diff(), expected);
    }

    #[test]
    fn test_segment_boundary_flushes_pending() {
        let mut range = AltitudeRange::new(0);
        for value in [0, 10] {
            range.add_value(Some(&Altitude::new(value, Unit::METRES)));
        }
        // new segment starting lower, the drop across the gap is not a descent
        range.ignore_value(Some(&Altitude::new(2, Unit::METRES)));
        range.add_value(Some(&Altitude::new(7, Unit::METRES)));

        assert_eq!(range.climb(Unit::METRES), 15);
        assert_eq!(range.descent(Unit::METRES), 0);
        assert_eq!(range.minimum(Unit::METRES), Some(0));
        assert_eq!(range.maximum(Unit::METRES), Some(10));
    }

    #[test]
    fn test_segment_boundary_leaves_totals_unchanged() {
        // climb already includes the pending run, so flushing it at a
        // segment break must not change the totals, however often it happens
        let mut range = feed(&[0, 10], 0);
        let climb_before = range.climb(Unit::METRES);
        assert_eq!(climb_before, 10);

        range.ignore_value(None);
        assert_eq!(range.climb(Unit::METRES), climb_before);
        assert_eq!(range.descent(Unit::METRES), 0);

        range.ignore_value(None);
        assert_eq!(range.climb(Unit::METRES), climb_before);
    }

    #[test]
    fn test_missing_altitudes_skipped() {
        let mut range = AltitudeRange::new(0);
        range.add_value(Some(&Altitude::new(5, Unit::METRES)));
        range.add_value(None);
        range.add_value(Some(&Altitude::new(8, Unit::METRES)));
        assert_eq!(range.climb(Unit::METRES), 3);
        assert!(range.has_range());
    }

    #[test]
    fn test_unit_conversion_on_output() {
        let range = feed(&[0, 100], 0);
        assert_eq!(range.climb(Unit::FEET), 328);
    }

    #[test]
    fn test_pure_transition_waits_on_small_reversal() {
        let state = RunState::default();
        let (state, _) = state.with_value(0, 2);
        let (state, _) = state.with_value(10, 2);
        let before = state;
        // a sub-threshold drop leaves the state untouched
        let (state, delta) = state.with_value(9, 2);
        assert_eq!(state, before);
        assert_eq!(delta, RunDelta::default());
    }
}
