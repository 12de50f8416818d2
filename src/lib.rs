//! # Track Stats
//!
//! GPS track statistics: coordinate parsing and formatting, altitude
//! profiles, distance, duration and speed analysis.
//!
//! This library provides:
//! - Sexagesimal coordinate parsing/formatting with exact fixed-point arithmetic
//! - Cumulative range statistics (distance, moving time, climb/descent)
//! - Hysteresis-filtered altitude profiles and gradient banding
//! - Point-local speed and gradient estimation over one-second windows
//!
//! ## Quick Start
//!
//! ```rust
//! use track_stats::{Axis, Coordinate, RangeStats, StatsConfig, Track, TrackPoint};
//!
//! let start = TrackPoint::new(
//!     Coordinate::parse("N 51.5074", Axis::LATITUDE).unwrap(),
//!     Coordinate::parse("W 0.1278", Axis::LONGITUDE).unwrap(),
//! )
//! .with_timestamp_millis(0);
//! let end = TrackPoint::new(
//!     Coordinate::parse("N 51.5080", Axis::LATITUDE).unwrap(),
//!     Coordinate::parse("W 0.1290", Axis::LONGITUDE).unwrap(),
//! )
//! .with_timestamp_millis(30_000);
//!
//! let track = Track::new(vec![start, end]);
//! let config = StatsConfig::default();
//! let stats = RangeStats::from_track(
//!     &track,
//!     0,
//!     track.point_count() - 1,
//!     config.tolerance_metres(),
//! );
//!
//! println!(
//!     "{:.3} km in {} s",
//!     stats.moving_distance_kilometres(),
//!     stats.moving_duration_seconds()
//! );
//! ```

// Unified error handling
pub mod error;
pub use error::{ParseError, Result};

// Measurement units and unit sets
pub mod unit;
pub use unit::{Unit, UnitSet};

// Decimal formatting and lenient number parsing
pub mod numbers;

// Exact fixed-point angle arithmetic
pub mod angle;
pub use angle::FractionalSeconds;

// Coordinate parsing and formatting
pub mod coordinate;
pub use coordinate::{Axis, Cardinal, CoordFormat, Coordinate};

// Geographic utilities (great-circle distance, bearings)
pub mod geo_utils;

// Altitude values with unit conversion
pub mod altitude;
pub use altitude::Altitude;

// Hysteresis-filtered climb/descent accumulation
pub mod altitude_range;
pub use altitude_range::AltitudeRange;

// Cumulative statistics over a range of points
pub mod range_stats;
pub use range_stats::{RangeStats, RangeStatsWithGradients, RangeSummary};

// Point-local speed and gradient estimation
pub mod speed;
pub use speed::{
    calculate_gradient, calculate_horizontal_speed, calculate_vertical_speed, Speed,
};

// ============================================================================
// Core Types
// ============================================================================

/// A single recorded point of a GPS track.
///
/// Waypoints are named markers rather than part of the recorded line; the
/// statistics modules skip them when accumulating distance and time.
/// `segment_start` marks the first point after a recording break.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPoint {
    pub latitude: Coordinate,
    pub longitude: Coordinate,
    pub altitude: Option<Altitude>,
    /// Milliseconds since the Unix epoch.
    pub timestamp_millis: Option<i64>,
    /// Horizontal speed recorded by the device, if any.
    pub h_speed: Option<Speed>,
    /// Vertical speed recorded by the device, if any.
    pub v_speed: Option<Speed>,
    pub is_waypoint: bool,
    pub segment_start: bool,
}

impl TrackPoint {
    /// Create a track point with just a position.
    pub fn new(latitude: Coordinate, longitude: Coordinate) -> TrackPoint {
        TrackPoint {
            latitude,
            longitude,
            altitude: None,
            timestamp_millis: None,
            h_speed: None,
            v_speed: None,
            is_waypoint: false,
            segment_start: false,
        }
    }

    pub fn with_altitude(mut self, altitude: Altitude) -> TrackPoint {
        self.altitude = Some(altitude);
        self
    }

    pub fn with_timestamp_millis(mut self, millis: i64) -> TrackPoint {
        self.timestamp_millis = Some(millis);
        self
    }

    pub fn as_waypoint(mut self) -> TrackPoint {
        self.is_waypoint = true;
        self
    }

    pub fn with_segment_start(mut self) -> TrackPoint {
        self.segment_start = true;
        self
    }
}

/// An ordered list of track points.
#[derive(Debug, Clone, Default)]
pub struct Track {
    points: Vec<TrackPoint>,
}

impl Track {
    pub fn new(points: Vec<TrackPoint>) -> Track {
        Track { points }
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// The point at the given index, or `None` when out of range.
    pub fn point(&self, index: usize) -> Option<&TrackPoint> {
        self.points.get(index)
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }
}

/// Configuration for statistics calculations.
#[derive(Debug, Clone)]
pub struct StatsConfig {
    /// Altitude changes at or below this threshold are treated as noise.
    /// Default: 0 (count every change)
    pub altitude_tolerance_cm: i64,

    /// Units used when rendering summaries.
    /// Default: metric
    pub unit_set: UnitSet,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            altitude_tolerance_cm: 0,
            unit_set: UnitSet::METRIC,
        }
    }
}

impl StatsConfig {
    /// The altitude tolerance in whole metres, as consumed by
    /// [`AltitudeRange`].
    pub fn tolerance_metres(&self) -> i64 {
        self.altitude_tolerance_cm / 100
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn equator_point(lon: f64) -> TrackPoint {
        TrackPoint::new(
            Coordinate::from_double(0.0, Axis::LATITUDE).unwrap(),
            Coordinate::from_double(lon, Axis::LONGITUDE).unwrap(),
        )
    }

    #[test]
    fn test_track_access() {
        let track = Track::new(vec![equator_point(0.0), equator_point(0.001)]);
        assert_eq!(track.point_count(), 2);
        assert!(track.point(1).is_some());
        assert!(track.point(2).is_none());
    }

    #[test]
    fn test_stats_config_defaults() {
        let config = StatsConfig::default();
        assert_eq!(config.altitude_tolerance_cm, 0);
        assert_eq!(config.tolerance_metres(), 0);
        assert_eq!(config.unit_set.distance, Unit::KILOMETRES);

        let config = StatsConfig {
            altitude_tolerance_cm: 250,
            ..StatsConfig::default()
        };
        assert_eq!(config.tolerance_metres(), 2);
    }

    #[test]
    fn test_stats_over_short_climb() {
        let track = Track::new(vec![
            equator_point(0.0)
                .with_altitude(Altitude::new(100, Unit::METRES))
                .with_timestamp_millis(0),
            equator_point(0.001)
                .with_altitude(Altitude::new(150, Unit::METRES))
                .with_timestamp_millis(60_000),
        ]);
        let config = StatsConfig::default();
        let stats =
            RangeStats::from_track(&track, 0, track.point_count() - 1, config.tolerance_metres());

        assert_eq!(stats.num_points(), 2);
        assert_eq!(stats.num_segments(), 1);
        assert_eq!(stats.moving_duration_seconds(), 60);
        assert_eq!(stats.total_duration_seconds(), 60);
        assert_eq!(stats.moving_altitude_range().climb(Unit::METRES), 50);
        let metres = stats.moving_distance(Unit::METRES);
        assert!((metres - 111.23).abs() < 0.2, "got {metres}");

        let summary = stats.summary(&config.unit_set);
        assert_eq!(summary.num_points, 2);
    }

    #[test]
    fn test_waypoint_builder() {
        let point = equator_point(0.0).as_waypoint();
        assert!(point.is_waypoint);
        let point = equator_point(0.0).with_segment_start();
        assert!(point.segment_start);
    }
}
