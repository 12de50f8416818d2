//! Point-local speed and gradient estimation.
//!
//! GPS points are irregularly spaced in time and often land under a second
//! apart, where speed from a single pair is dominated by jitter. The
//! estimators here search outward from the target point in both directions
//! for the nearest usable neighbours until the covered time window reaches
//! one second, summing the distance actually travelled along the way. The
//! search never crosses a segment boundary and skips waypoints. Points that
//! already carry a recorded speed value short-circuit the search.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::geo_utils::{calculate_radians_between, convert_radians_to_distance};
use crate::unit::Unit;
use crate::{Track, TrackPoint};

/// Smallest time window from which a speed is considered meaningful.
const MIN_TIME_WINDOW_MILLIS: i64 = 1000;

/// A speed value with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Speed {
    pub value: f64,
    pub unit: Unit,
}

impl Speed {
    pub fn new(value: f64, unit: Unit) -> Speed {
        Speed { value, unit }
    }

    /// Value in metres per second, the standard speed unit.
    pub fn metric_value(&self) -> f64 {
        self.value / self.unit.mult_factor_from_std
    }

    pub fn value_in(&self, unit: Unit) -> f64 {
        self.metric_value() * unit.mult_factor_from_std
    }
}

/// Estimate the horizontal speed at the given point index, in the given
/// unit. `None` when the point is missing, is a waypoint, has no timestamp,
/// or no one-second window could be assembled around it.
pub fn calculate_horizontal_speed(track: &Track, index: usize, unit: Unit) -> Option<Speed> {
    let Some(point) = track.point(index) else {
        debug!("no point at index {} to calculate speed for", index);
        return None;
    };
    if let Some(recorded) = point.h_speed {
        return Some(Speed::new(recorded.value_in(unit), unit));
    }
    let target_millis = point.timestamp_millis?;
    if point.is_waypoint {
        return None;
    }

    let mut total_radians = 0.0;
    let mut early_millis = target_millis;
    let mut late_millis = target_millis;

    // backwards over earlier timestamps
    if !point.segment_start {
        let mut i = index as i64 - 1;
        let mut q = point;
        loop {
            let p = point_at(track, i);
            if let Some(p) = p {
                let time_ok = p.timestamp_millis.map_or(false, |t| t < target_millis);
                if time_ok && !p.is_waypoint {
                    total_radians += radians_between_points(p, q);
                    early_millis = p.timestamp_millis.unwrap_or(early_millis);
                }
            }
            let stop = match p {
                None => true,
                Some(p) => p.segment_start || sufficient_time_difference(p, point),
            };
            i -= 1;
            if let Some(p) = p {
                if !p.is_waypoint {
                    q = p;
                }
            }
            if stop {
                break;
            }
        }
    }

    // forwards over later timestamps
    let mut i = index as i64 + 1;
    let mut q = point;
    loop {
        let p = point_at(track, i);
        if let Some(p) = p {
            let time_ok = p.timestamp_millis.map_or(false, |t| t >= target_millis);
            if time_ok && !p.is_waypoint && !p.segment_start {
                total_radians += radians_between_points(p, q);
                late_millis = p.timestamp_millis.unwrap_or(late_millis);
            }
        }
        let stop = match p {
            None => true,
            Some(p) => p.segment_start || sufficient_time_difference(point, p),
        };
        i += 1;
        if let Some(p) = p {
            if !p.is_waypoint {
                q = p;
            }
        }
        if stop {
            break;
        }
    }

    let milliseconds = late_millis - early_millis;
    if milliseconds < MIN_TIME_WINDOW_MILLIS {
        return None;
    }
    let metres = convert_radians_to_distance(total_radians, Unit::METRES);
    let metres_per_sec = metres / milliseconds as f64 * 1000.0;
    Some(Speed::new(metres_per_sec * unit.mult_factor_from_std, unit))
}

/// Estimate the vertical speed at the given point index. Positive means
/// climbing. Same search rules as [`calculate_horizontal_speed`], but the
/// point itself must also carry an altitude.
pub fn calculate_vertical_speed(track: &Track, index: usize, unit: Unit) -> Option<Speed> {
    let Some(point) = track.point(index) else {
        debug!("no point at index {} to calculate speed for", index);
        return None;
    };
    if let Some(recorded) = point.v_speed {
        return Some(Speed::new(recorded.value_in(unit), unit));
    }
    let target_millis = point.timestamp_millis?;
    let point_altitude = point.altitude.as_ref()?;
    if point.is_waypoint {
        return None;
    }

    let mut early_millis = target_millis;
    let mut late_millis = target_millis;
    let mut first_altitude = point_altitude.metric_value();
    let mut last_altitude = point_altitude.metric_value();

    if !point.segment_start {
        let mut i = index as i64 - 1;
        loop {
            let p = point_at(track, i);
            if let Some(p) = p {
                let time_ok = p.timestamp_millis.map_or(false, |t| t < target_millis);
                if time_ok && !p.is_waypoint {
                    early_millis = p.timestamp_millis.unwrap_or(early_millis);
                    if let Some(altitude) = &p.altitude {
                        first_altitude = altitude.metric_value();
                    }
                }
            }
            let stop = match p {
                None => true,
                Some(p) => p.segment_start || sufficient_time_difference(p, point),
            };
            i -= 1;
            if stop {
                break;
            }
        }
    }

    let mut i = index as i64 + 1;
    loop {
        let p = point_at(track, i);
        if let Some(p) = p {
            let time_ok = p.timestamp_millis.map_or(false, |t| t >= target_millis);
            if time_ok && !p.is_waypoint && !p.segment_start {
                late_millis = p.timestamp_millis.unwrap_or(late_millis);
                if let Some(altitude) = &p.altitude {
                    last_altitude = altitude.metric_value();
                }
            }
        }
        let stop = match p {
            None => true,
            Some(p) => p.segment_start || sufficient_time_difference(point, p),
        };
        i += 1;
        if stop {
            break;
        }
    }

    let milliseconds = late_millis - early_millis;
    if milliseconds < MIN_TIME_WINDOW_MILLIS {
        return None;
    }
    let metres_per_sec = (last_altitude - first_altitude) / milliseconds as f64 * 1000.0;
    Some(Speed::new(metres_per_sec * unit.mult_factor_from_std, unit))
}

/// Estimate the slope at the given point index as a percentage, using the
/// immediate in-segment neighbours that carry altitudes. Positive means
/// climbing in track direction.
pub fn calculate_gradient(track: &Track, index: usize) -> Option<f64> {
    let point = track.point(index)?;
    if point.is_waypoint {
        return None;
    }
    if let (Some(h_speed), Some(v_speed)) = (point.h_speed, point.v_speed) {
        let metres_per_sec = h_speed.metric_value();
        if metres_per_sec <= 0.0 {
            return None;
        }
        return Some(v_speed.metric_value() / metres_per_sec * 100.0);
    }
    let before = if point.segment_start {
        None
    } else {
        point_at(track, index as i64 - 1).filter(|p| !p.is_waypoint && p.altitude.is_some())
    };
    let after = point_at(track, index as i64 + 1)
        .filter(|p| !p.is_waypoint && !p.segment_start && p.altitude.is_some());

    let first = before.or(Some(point)).filter(|p| p.altitude.is_some())?;
    let last = after.or(Some(point)).filter(|p| p.altitude.is_some())?;
    if std::ptr::eq(first, last) {
        return None;
    }

    let radians = radians_between_points(first, last);
    let metres = convert_radians_to_distance(radians, Unit::METRES);
    if metres < 0.001 {
        return None;
    }
    let height_diff = altitude_metres(last)? - altitude_metres(first)?;
    Some(height_diff / metres * 100.0)
}

fn altitude_metres(point: &TrackPoint) -> Option<f64> {
    point.altitude.as_ref().map(|a| a.metric_value())
}

fn radians_between_points(a: &TrackPoint, b: &TrackPoint) -> f64 {
    calculate_radians_between(
        a.latitude.as_double(),
        a.longitude.as_double(),
        b.latitude.as_double(),
        b.longitude.as_double(),
    )
}

fn point_at(track: &Track, index: i64) -> Option<&TrackPoint> {
    if index < 0 {
        None
    } else {
        track.point(index as usize)
    }
}

/// A window is wide enough once its endpoints are a second apart. Missing
/// timestamps keep the search going.
fn sufficient_time_difference(earlier: &TrackPoint, later: &TrackPoint) -> bool {
    match (earlier.timestamp_millis, later.timestamp_millis) {
        (Some(early), Some(late)) => late - early >= MIN_TIME_WINDOW_MILLIS,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::altitude::Altitude;
    use crate::coordinate::{Axis, Coordinate};

    // equator points 0.001 degrees apart are about 111.23 m from each other
    fn make_point(lon_thousandths: i64, seconds: Option<i64>, altitude: Option<i64>) -> TrackPoint {
        let mut point = TrackPoint::new(
            Coordinate::from_double(0.0, Axis::LATITUDE).unwrap(),
            Coordinate::from_double(lon_thousandths as f64 / 1000.0, Axis::LONGITUDE).unwrap(),
        );
        point.timestamp_millis = seconds.map(|s| s * 1000);
        point.altitude = altitude.map(|a| Altitude::new(a, Unit::METRES));
        point
    }

    #[test]
    fn test_no_speed_across_segment_break() {
        let mut second = make_point(1, Some(5), None);
        second.segment_start = true;
        let track = Track::new(vec![make_point(0, Some(0), None), second]);
        // neither side can assemble a window without crossing the break
        assert!(calculate_horizontal_speed(&track, 0, Unit::METRES_PER_SEC).is_none());
        assert!(calculate_horizontal_speed(&track, 1, Unit::METRES_PER_SEC).is_none());
    }

    #[test]
    fn test_horizontal_speed_mid_track() {
        let track = Track::new(vec![
            make_point(0, Some(0), None),
            make_point(1, Some(1), None),
            make_point(2, Some(2), None),
        ]);
        let speed = calculate_horizontal_speed(&track, 1, Unit::METRES_PER_SEC).unwrap();
        assert!((speed.value - 111.23).abs() < 0.2, "got {}", speed.value);

        let kmh = calculate_horizontal_speed(&track, 1, Unit::KILOMETRES_PER_HOUR).unwrap();
        assert!((kmh.value - 111.23 * 3.6).abs() < 1.0, "got {}", kmh.value);
    }

    #[test]
    fn test_horizontal_speed_at_track_edges() {
        let track = Track::new(vec![
            make_point(0, Some(0), None),
            make_point(1, Some(1), None),
        ]);
        let first = calculate_horizontal_speed(&track, 0, Unit::METRES_PER_SEC).unwrap();
        let last = calculate_horizontal_speed(&track, 1, Unit::METRES_PER_SEC).unwrap();
        assert!((first.value - 111.23).abs() < 0.2);
        assert!((last.value - 111.23).abs() < 0.2);
    }

    #[test]
    fn test_speed_needs_one_second_window() {
        let mut late = make_point(1, None, None);
        late.timestamp_millis = Some(500);
        let track = Track::new(vec![make_point(0, Some(0), None), late]);
        assert!(calculate_horizontal_speed(&track, 0, Unit::METRES_PER_SEC).is_none());
    }

    #[test]
    fn test_speed_stops_at_segment_boundary() {
        let mut gap = make_point(10, Some(100), None);
        gap.segment_start = true;
        let track = Track::new(vec![
            make_point(0, Some(0), None),
            make_point(1, Some(1), None),
            gap,
        ]);
        // the search from index 1 must not include the jump to the new segment
        let speed = calculate_horizontal_speed(&track, 1, Unit::METRES_PER_SEC).unwrap();
        assert!((speed.value - 111.23).abs() < 0.2, "got {}", speed.value);
    }

    #[test]
    fn test_speed_skips_waypoints() {
        let mut waypoint = make_point(500, Some(1), None);
        waypoint.is_waypoint = true;
        let track = Track::new(vec![
            make_point(0, Some(0), None),
            waypoint,
            make_point(1, Some(1), None),
            make_point(2, Some(2), None),
        ]);
        let speed = calculate_horizontal_speed(&track, 2, Unit::METRES_PER_SEC).unwrap();
        assert!((speed.value - 111.23).abs() < 0.2, "got {}", speed.value);
    }

    #[test]
    fn test_speed_for_waypoint_or_untimed_point() {
        let mut waypoint = make_point(0, Some(0), None);
        waypoint.is_waypoint = true;
        let track = Track::new(vec![waypoint, make_point(1, None, None)]);
        assert!(calculate_horizontal_speed(&track, 0, Unit::METRES_PER_SEC).is_none());
        assert!(calculate_horizontal_speed(&track, 1, Unit::METRES_PER_SEC).is_none());
        assert!(calculate_horizontal_speed(&track, 9, Unit::METRES_PER_SEC).is_none());
    }

    #[test]
    fn test_vertical_speed() {
        let track = Track::new(vec![
            make_point(0, Some(0), Some(100)),
            make_point(1, Some(1), Some(110)),
            make_point(2, Some(2), Some(115)),
        ]);
        let speed = calculate_vertical_speed(&track, 1, Unit::METRES_PER_SEC).unwrap();
        // 15 metres over the two seconds around the point
        assert!((speed.value - 7.5).abs() < 1e-9, "got {}", speed.value);

        // descending gives a negative value
        let track = Track::new(vec![
            make_point(0, Some(0), Some(110)),
            make_point(1, Some(1), Some(100)),
        ]);
        let speed = calculate_vertical_speed(&track, 0, Unit::METRES_PER_SEC).unwrap();
        assert_eq!(speed.value, -10.0);
    }

    #[test]
    fn test_vertical_speed_needs_altitude() {
        let track = Track::new(vec![
            make_point(0, Some(0), None),
            make_point(1, Some(1), Some(100)),
        ]);
        assert!(calculate_vertical_speed(&track, 0, Unit::METRES_PER_SEC).is_none());
    }

    #[test]
    fn test_gradient() {
        let track = Track::new(vec![
            make_point(0, None, Some(100)),
            make_point(1, None, Some(110)),
            make_point(2, None, Some(120)),
        ]);
        // 20 m climb over about 222.5 m
        let gradient = calculate_gradient(&track, 1).unwrap();
        assert!((gradient - 8.99).abs() < 0.05, "got {}", gradient);

        // at the first point only the forward neighbour is available
        let gradient = calculate_gradient(&track, 0).unwrap();
        assert!((gradient - 8.99).abs() < 0.05, "got {}", gradient);
    }

    #[test]
    fn test_gradient_unavailable() {
        // a single point has no neighbours to compare against
        let track = Track::new(vec![make_point(0, None, Some(100))]);
        assert!(calculate_gradient(&track, 0).is_none());

        // no altitudes at all
        let track = Track::new(vec![make_point(0, None, None), make_point(1, None, None)]);
        assert!(calculate_gradient(&track, 0).is_none());
    }

    #[test]
    fn test_recorded_speeds_win_over_estimation() {
        let mut point = make_point(0, Some(0), Some(100));
        point.h_speed = Some(Speed::new(5.0, Unit::METRES_PER_SEC));
        point.v_speed = Some(Speed::new(1.0, Unit::METRES_PER_SEC));
        // a lone point has no window to estimate from, so only the recorded
        // values can produce a result
        let track = Track::new(vec![point]);
        let h_speed = calculate_horizontal_speed(&track, 0, Unit::KILOMETRES_PER_HOUR).unwrap();
        assert_eq!(h_speed.value, 18.0);
        let v_speed = calculate_vertical_speed(&track, 0, Unit::METRES_PER_SEC).unwrap();
        assert_eq!(v_speed.value, 1.0);
        let gradient = calculate_gradient(&track, 0).unwrap();
        assert_eq!(gradient, 20.0);
    }

    #[test]
    fn test_speed_conversion() {
        let speed = Speed::new(10.0, Unit::METRES_PER_SEC);
        assert_eq!(speed.value_in(Unit::KILOMETRES_PER_HOUR), 36.0);
        assert!((speed.value_in(Unit::KNOTS) - 19.438).abs() < 0.01);
    }
}
