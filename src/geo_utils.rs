//! Great-circle distance and bearing calculations.
//!
//! Distances are carried as angular distance in radians for as long as
//! possible and only converted to a linear unit at the edges, so ranges can
//! be summed without caring about the output unit. The sphere radius is the
//! quadratic mean radius of the WGS84 ellipsoid, which keeps mid-latitude
//! track distances within about 0.1% of the ellipsoidal value.

use geo::{Bearing, Haversine, Point};

use crate::coordinate::Coordinate;
use crate::unit::Unit;

/// Quadratic mean radius of the earth in metres.
pub const EARTH_RADIUS_METRES: f64 = 6_372_795.0;

/// Angular distance in radians between two positions, by the haversine
/// formula.
pub fn calculate_radians_between(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let half_dlat = (lat2_rad - lat1_rad) / 2.0;
    let half_dlon = (lon2 - lon1).to_radians() / 2.0;
    let a = half_dlat.sin().powi(2) + lat1_rad.cos() * lat2_rad.cos() * half_dlon.sin().powi(2);
    2.0 * a.sqrt().min(1.0).asin()
}

/// Angular distance between two coordinates.
pub fn radians_between(lat1: &Coordinate, lon1: &Coordinate, lat2: &Coordinate, lon2: &Coordinate) -> f64 {
    calculate_radians_between(
        lat1.as_double(),
        lon1.as_double(),
        lat2.as_double(),
        lon2.as_double(),
    )
}

/// Convert an angular distance to a linear one in the given distance unit.
pub fn convert_radians_to_distance(radians: f64, unit: Unit) -> f64 {
    radians * EARTH_RADIUS_METRES * unit.mult_factor_from_std
}

/// Convert a linear distance in the given unit back to an angular distance.
pub fn convert_distance_to_radians(distance: f64, unit: Unit) -> f64 {
    distance / EARTH_RADIUS_METRES / unit.mult_factor_from_std
}

/// Initial bearing in degrees from the first position to the second,
/// measured clockwise from north in [0, 360).
pub fn calculate_bearing_degrees(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let bearing = Haversine::bearing(Point::new(lon1, lat1), Point::new(lon2, lat2));
    bearing.rem_euclid(360.0)
}

/// Absolute difference between two bearings, folded into [0, 180].
pub fn angle_difference_degrees(angle1: f64, angle2: f64) -> f64 {
    let diff = (angle1 - angle2).rem_euclid(360.0);
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

/// How far the heading turns at the middle of three positions, in degrees.
pub fn bearing_change_degrees(
    from: (f64, f64),
    middle: (f64, f64),
    to: (f64, f64),
) -> f64 {
    let inbound = calculate_bearing_degrees(from.0, from.1, middle.0, middle.1);
    let outbound = calculate_bearing_degrees(middle.0, middle.1, to.0, to.1);
    angle_difference_degrees(inbound, outbound)
}
