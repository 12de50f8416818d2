//! Distance, duration and altitude statistics over a point range.
//!
//! A [`RangeStats`] is a single-pass fold over an inclusive index range of a
//! track. It separates "total" figures from "moving" ones: the moving
//! variants skip the jump across a segment boundary, so a track recorded in
//! several disconnected runs reports the distance and time actually spent
//! moving. Waypoints are counted but otherwise ignored.
//!
//! [`RangeStatsWithGradients`] runs the same fold and additionally buckets
//! each inter-point stretch as gentle or steep, keeping a separate altitude
//! range per bucket. Instances are built fresh per query and are not
//! thread-safe.

use serde::Serialize;

use crate::altitude::Altitude;
use crate::altitude_range::AltitudeRange;
use crate::geo_utils::{calculate_radians_between, convert_radians_to_distance};
use crate::unit::{Unit, UnitSet};
use crate::{Track, TrackPoint};

/// Slope above which a stretch counts as steep, as a fraction (0.15 = 15%).
const STEEP_GRADIENT: f64 = 0.15;

// ============================================================================
// RangeStats
// ============================================================================

/// Accumulated statistics for a range of track points.
#[derive(Debug, Clone)]
pub struct RangeStats {
    num_points: usize,
    num_segments: usize,
    found_track_point: bool,
    total_altitude_range: AltitudeRange,
    moving_altitude_range: AltitudeRange,
    earliest_millis: Option<i64>,
    latest_millis: Option<i64>,
    moving_milliseconds: i64,
    times_incomplete: bool,
    times_out_of_sequence: bool,
    total_distance_rads: f64,
    moving_distance_rads: f64,
    prev_position: Option<(f64, f64)>,
    prev_timestamp_millis: Option<i64>,
}

impl RangeStats {
    /// An empty accumulator with the given climb/descent wiggle tolerance
    /// in metres.
    pub fn new(tolerance_metres: i64) -> RangeStats {
        RangeStats {
            num_points: 0,
            num_segments: 0,
            found_track_point: false,
            total_altitude_range: AltitudeRange::new(tolerance_metres),
            moving_altitude_range: AltitudeRange::new(tolerance_metres),
            earliest_millis: None,
            latest_millis: None,
            moving_milliseconds: 0,
            times_incomplete: false,
            times_out_of_sequence: false,
            total_distance_rads: 0.0,
            moving_distance_rads: 0.0,
            prev_position: None,
            prev_timestamp_millis: None,
        }
    }

    /// Fold the inclusive index range of the track into a fresh accumulator.
    pub fn from_track(
        track: &Track,
        start: usize,
        end: usize,
        tolerance_metres: i64,
    ) -> RangeStats {
        let mut stats = RangeStats::new(tolerance_metres);
        for i in start..=end {
            if let Some(point) = track.point(i) {
                stats.add_point(point);
            }
        }
        stats
    }

    /// Add the next point of the range.
    pub fn add_point(&mut self, point: &TrackPoint) {
        self.num_points += 1;
        // waypoints are markers, not part of the recorded line
        if point.is_waypoint {
            return;
        }
        if point.segment_start || !self.found_track_point {
            self.num_segments += 1;
        }
        self.found_track_point = true;

        let position = (point.latitude.as_double(), point.longitude.as_double());
        if let Some((prev_lat, prev_lon)) = self.prev_position {
            let rads = calculate_radians_between(prev_lat, prev_lon, position.0, position.1);
            self.total_distance_rads += rads;
            if !point.segment_start {
                self.moving_distance_rads += rads;
            }
        }

        // moving time never carries across a segment boundary, even when the
        // segment-start point itself has no timestamp
        if point.segment_start {
            self.prev_timestamp_millis = None;
        }

        match point.timestamp_millis {
            Some(millis) => {
                if self.earliest_millis.map_or(true, |t| millis < t) {
                    self.earliest_millis = Some(millis);
                }
                if self.latest_millis.map_or(true, |t| millis > t) {
                    self.latest_millis = Some(millis);
                }
                // moving time carries across points without timestamps
                if let Some(prev_millis) = self.prev_timestamp_millis {
                    let later = millis - prev_millis;
                    if later < 0 {
                        self.times_out_of_sequence = true;
                    } else {
                        self.moving_milliseconds += later;
                    }
                }
                self.prev_timestamp_millis = Some(millis);
            }
            None => self.times_incomplete = true,
        }

        if let Some(altitude) = &point.altitude {
            self.total_altitude_range.add_value(Some(altitude));
            if point.segment_start {
                self.moving_altitude_range.ignore_value(Some(altitude));
            } else {
                self.moving_altitude_range.add_value(Some(altitude));
            }
        }

        self.prev_position = Some(position);
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    pub fn num_segments(&self) -> usize {
        self.num_segments
    }

    pub fn total_altitude_range(&self) -> &AltitudeRange {
        &self.total_altitude_range
    }

    pub fn moving_altitude_range(&self) -> &AltitudeRange {
        &self.moving_altitude_range
    }

    pub fn earliest_timestamp_millis(&self) -> Option<i64> {
        self.earliest_millis
    }

    pub fn latest_timestamp_millis(&self) -> Option<i64> {
        self.latest_millis
    }

    /// Seconds between the earliest and latest timestamp in the range.
    pub fn total_duration_seconds(&self) -> i64 {
        match (self.earliest_millis, self.latest_millis) {
            (Some(earliest), Some(latest)) => (latest - earliest) / 1000,
            _ => 0,
        }
    }

    /// Seconds spent within segments, excluding gaps between them.
    pub fn moving_duration_seconds(&self) -> i64 {
        self.moving_milliseconds / 1000
    }

    pub fn timestamps_incomplete(&self) -> bool {
        self.times_incomplete
    }

    pub fn timestamps_out_of_sequence(&self) -> bool {
        self.times_out_of_sequence
    }

    pub fn total_distance(&self, unit: Unit) -> f64 {
        convert_radians_to_distance(self.total_distance_rads, unit)
    }

    pub fn moving_distance(&self, unit: Unit) -> f64 {
        convert_radians_to_distance(self.moving_distance_rads, unit)
    }

    pub fn moving_distance_kilometres(&self) -> f64 {
        self.moving_distance(Unit::KILOMETRES)
    }

    /// Net metric vertical speed over the whole range, in m/s.
    pub fn total_vertical_speed(&self) -> f64 {
        let time = self.total_duration_seconds();
        if time > 0 && self.total_altitude_range.has_range() {
            return self.total_altitude_range.metric_height_diff() / time as f64;
        }
        0.0
    }

    /// Net metric vertical speed excluding segment gaps, in m/s.
    pub fn moving_vertical_speed(&self) -> f64 {
        let time = self.moving_duration_seconds();
        if time > 0 && self.moving_altitude_range.has_range() {
            return self.moving_altitude_range.metric_height_diff() / time as f64;
        }
        0.0
    }

    /// Snapshot of the accumulated figures in the units of the given set.
    pub fn summary(&self, units: &UnitSet) -> RangeSummary {
        RangeSummary {
            num_points: self.num_points,
            num_segments: self.num_segments,
            total_distance: self.total_distance(units.distance),
            moving_distance: self.moving_distance(units.distance),
            total_duration_seconds: self.total_duration_seconds(),
            moving_duration_seconds: self.moving_duration_seconds(),
            climb: self.moving_altitude_range.climb(units.altitude),
            descent: self.moving_altitude_range.descent(units.altitude),
            min_altitude: self.total_altitude_range.minimum(units.altitude),
            max_altitude: self.total_altitude_range.maximum(units.altitude),
            timestamps_incomplete: self.times_incomplete,
            timestamps_out_of_sequence: self.times_out_of_sequence,
        }
    }
}

/// Serializable snapshot of a computed range, for export or display layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeSummary {
    pub num_points: usize,
    pub num_segments: usize,
    pub total_distance: f64,
    pub moving_distance: f64,
    pub total_duration_seconds: i64,
    pub moving_duration_seconds: i64,
    pub climb: i64,
    pub descent: i64,
    pub min_altitude: Option<i64>,
    pub max_altitude: Option<i64>,
    pub timestamps_incomplete: bool,
    pub timestamps_out_of_sequence: bool,
}

// ============================================================================
// RangeStatsWithGradients
// ============================================================================

/// Range statistics plus altitude ranges split by gradient band.
///
/// A stretch is steep when its slope exceeds 15%, or when it is shorter than
/// a millimetre (where the gradient is meaningless but clearly not gentle).
#[derive(Debug, Clone)]
pub struct RangeStatsWithGradients {
    stats: RangeStats,
    gentle_altitude_range: AltitudeRange,
    steep_altitude_range: AltitudeRange,
    prev_altitude: Option<Altitude>,
    prev_position: Option<(f64, f64)>,
    rads_since_last_altitude: f64,
}

impl RangeStatsWithGradients {
    pub fn new(tolerance_metres: i64) -> RangeStatsWithGradients {
        RangeStatsWithGradients {
            stats: RangeStats::new(tolerance_metres),
            gentle_altitude_range: AltitudeRange::new(tolerance_metres),
            steep_altitude_range: AltitudeRange::new(tolerance_metres),
            prev_altitude: None,
            prev_position: None,
            rads_since_last_altitude: 0.0,
        }
    }

    pub fn from_track(
        track: &Track,
        start: usize,
        end: usize,
        tolerance_metres: i64,
    ) -> RangeStatsWithGradients {
        let mut stats = RangeStatsWithGradients::new(tolerance_metres);
        for i in start..=end {
            if let Some(point) = track.point(i) {
                stats.add_point(point);
            }
        }
        stats
    }

    pub fn add_point(&mut self, point: &TrackPoint) {
        if !point.is_waypoint {
            self.classify_gradient(point);
        }
        self.stats.add_point(point);
    }

    fn classify_gradient(&mut self, point: &TrackPoint) {
        let position = (point.latitude.as_double(), point.longitude.as_double());
        if let Some((prev_lat, prev_lon)) = self.prev_position {
            self.rads_since_last_altitude +=
                calculate_radians_between(prev_lat, prev_lon, position.0, position.1);
        }
        self.prev_position = Some(position);

        let altitude = match &point.altitude {
            Some(altitude) => altitude,
            None => return,
        };
        if !point.segment_start {
            if let Some(prev_altitude) = &self.prev_altitude {
                let height_diff = altitude.metric_value() - prev_altitude.metric_value();
                let metric_dist =
                    convert_radians_to_distance(self.rads_since_last_altitude, Unit::METRES);
                let steep =
                    metric_dist < 0.001 || (height_diff / metric_dist).abs() > STEEP_GRADIENT;
                let band = if steep {
                    &mut self.steep_altitude_range
                } else {
                    &mut self.gentle_altitude_range
                };
                // each stretch is fed in isolation, reset then add
                band.ignore_value(Some(prev_altitude));
                band.add_value(Some(altitude));
            }
        }
        self.prev_altitude = Some(altitude.clone());
        self.rads_since_last_altitude = 0.0;
    }

    pub fn stats(&self) -> &RangeStats {
        &self.stats
    }

    pub fn gentle_altitude_range(&self) -> &AltitudeRange {
        &self.gentle_altitude_range
    }

    pub fn steep_altitude_range(&self) -> &AltitudeRange {
        &self.steep_altitude_range
    }

    /// Net gradient over the whole range in percent.
    pub fn total_gradient(&self) -> f64 {
        let dist = convert_radians_to_distance(self.stats.total_distance_rads, Unit::METRES);
        if dist > 0.0 && self.stats.total_altitude_range.has_range() {
            return self.stats.total_altitude_range.metric_height_diff() / dist * 100.0;
        }
        0.0
    }

    /// Net gradient excluding segment gaps, in percent.
    pub fn moving_gradient(&self) -> f64 {
        let dist = convert_radians_to_distance(self.stats.moving_distance_rads, Unit::METRES);
        if dist > 0.0 && self.stats.moving_altitude_range.has_range() {
            return self.stats.moving_altitude_range.metric_height_diff() / dist * 100.0;
        }
        0.0
    }
}
