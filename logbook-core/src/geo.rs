//! Geodesy: great-circle distance, initial bearing, and course deltas.
//!
//! Spherical Earth model. Inputs are not range-checked; out-of-range
//! coordinates give a well-defined but meaningless answer.

use crate::types::GeoPoint;

/// Mean Earth radius used by the haversine formula (meters).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Meters per international nautical mile.
pub const METERS_PER_NM: f64 = 1852.0;

/// Meters per second to knots.
pub const MPS_TO_KNOTS: f64 = 1.94384;

/// Meters to feet.
pub const METERS_TO_FEET: f64 = 3.28084;

/// Great-circle distance in meters (haversine).
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    EARTH_RADIUS_M * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Great-circle distance in nautical miles.
pub fn distance_nm(a: GeoPoint, b: GeoPoint) -> f64 {
    distance_meters(a, b) / METERS_PER_NM
}

/// Initial compass bearing from `a` to `b`, in [0, 360).
///
/// Identical points give 0.
pub fn bearing_degrees(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlon = (b.lon - a.lon).to_radians();
    let x = dlon.sin() * lat2.cos();
    let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    normalize_degrees(x.atan2(y).to_degrees())
}

/// Wrap an angle into [0, 360).
pub fn normalize_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Signed change from course `from` to course `to` along the shortest arc, in (-180, 180].
pub fn course_delta(from: f64, to: f64) -> f64 {
    let mut delta = (to - from) % 360.0;
    while delta > 180.0 {
        delta -= 360.0;
    }
    while delta <= -180.0 {
        delta += 360.0;
    }
    delta
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon)
    }

    #[test]
    fn test_distance_same_point() {
        let p = pt(32.3367, -86.9836);
        assert_eq!(distance_meters(p, p), 0.0);
    }

    #[test]
    fn test_distance_symmetric() {
        let pairs = [
            (pt(32.3367, -86.9836), pt(33.1783, -86.7818)),
            (pt(-33.9, 151.2), pt(51.5, -0.12)),
            (pt(0.0, 179.9), pt(0.0, -179.9)),
        ];
        for (a, b) in pairs {
            assert_eq!(distance_meters(a, b), distance_meters(b, a));
        }
    }

    #[test]
    fn test_distance_known() {
        // Selma (KSEM) to Alabaster (KEET): ~95 km
        let d = distance_meters(pt(32.3367, -86.9836), pt(33.1783, -86.7818));
        assert!(d > 90_000.0 && d < 100_000.0, "KSEM-KEET ~95 km, got {d}");
    }

    #[test]
    fn test_one_degree_latitude() {
        let d = distance_meters(pt(0.0, 0.0), pt(1.0, 0.0));
        assert!((d - 111_195.0).abs() < 10.0, "got {d}");
        assert!((distance_nm(pt(0.0, 0.0), pt(1.0, 0.0)) - 60.04).abs() < 0.1);
    }

    #[test]
    fn test_bearing_cardinal() {
        let origin = pt(0.0, 0.0);
        assert!((bearing_degrees(origin, pt(1.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((bearing_degrees(origin, pt(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((bearing_degrees(origin, pt(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((bearing_degrees(origin, pt(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_identical_points() {
        let p = pt(32.0, -86.0);
        assert_eq!(bearing_degrees(p, p), 0.0);
    }

    #[test]
    fn test_bearing_range() {
        for lat in [-80.0, -30.0, 0.0, 45.0, 89.0] {
            for lon in [-179.0, -90.0, 0.0, 90.0, 179.0] {
                let b = bearing_degrees(pt(10.0, 20.0), pt(lat, lon));
                assert!((0.0..360.0).contains(&b), "bearing {b} out of range");
            }
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
        assert!(normalize_degrees(-1e-15) < 360.0);
    }

    #[test]
    fn test_course_delta_wraps() {
        assert_eq!(course_delta(359.0, 1.0), 2.0);
        assert_eq!(course_delta(1.0, 359.0), -2.0);
        assert_eq!(course_delta(90.0, 100.0), 10.0);
        assert_eq!(course_delta(0.0, 180.0), 180.0);
        assert_eq!(course_delta(350.0, 350.0), 0.0);
    }
}
