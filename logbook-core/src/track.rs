//! Track validation and derivation of track points from raw GPS fixes.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::geo::{bearing_degrees, distance_meters, METERS_TO_FEET, MPS_TO_KNOTS};
use crate::types::{GeoPoint, LogbookError, Result, TrackPoint};

/// A raw position fix as logged by the GPS: no speed or course, altitude in meters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawFix {
    pub timestamp: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
    pub altitude_m: f64,
}

impl RawFix {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// Check that a track is non-empty with strictly increasing timestamps.
pub fn validate(points: &[TrackPoint]) -> Result<()> {
    if points.is_empty() {
        return Err(LogbookError::InvalidTrack("track is empty".into()));
    }
    for (i, pair) in points.windows(2).enumerate() {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(LogbookError::InvalidTrack(format!(
                "timestamp at point {} ({}) does not follow point {} ({})",
                i + 1,
                pair[1].timestamp,
                i,
                pair[0].timestamp
            )));
        }
    }
    Ok(())
}

/// Derive track points from consecutive raw fixes.
///
/// Each output point takes its position, timestamp, and altitude from a fix,
/// and its ground speed and course from the leg flown since the previous
/// fix. The first fix has no predecessor and produces no point.
pub fn derive(fixes: &[RawFix]) -> Result<Vec<TrackPoint>> {
    let mut points = Vec::with_capacity(fixes.len().saturating_sub(1));

    for (i, pair) in fixes.windows(2).enumerate() {
        let (prev, cur) = (&pair[0], &pair[1]);
        let elapsed = (cur.timestamp - prev.timestamp).num_milliseconds() as f64 / 1000.0;
        if elapsed <= 0.0 {
            return Err(LogbookError::InvalidTrack(format!(
                "raw fix {} ({}) does not follow fix {} ({})",
                i + 1,
                cur.timestamp,
                i,
                prev.timestamp
            )));
        }

        let meters = distance_meters(prev.position(), cur.position());
        points.push(TrackPoint {
            timestamp: cur.timestamp,
            lat: cur.lat,
            lon: cur.lon,
            altitude_ft: cur.altitude_m * METERS_TO_FEET,
            speed_kts: meters / elapsed * MPS_TO_KNOTS,
            course_deg: bearing_degrees(prev.position(), cur.position()),
        });
    }

    tracing::debug!(fixes = fixes.len(), points = points.len(), "Derived track");
    Ok(points)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 15, 16, 0, 0).unwrap()
    }

    fn fix(sec: i64, lat: f64, lon: f64, alt_m: f64) -> RawFix {
        RawFix {
            timestamp: t0() + Duration::seconds(sec),
            lat,
            lon,
            altitude_m: alt_m,
        }
    }

    fn point(sec: i64) -> TrackPoint {
        TrackPoint {
            timestamp: t0() + Duration::seconds(sec),
            lat: 32.0,
            lon: -86.0,
            altitude_ft: 1000.0,
            speed_kts: 90.0,
            course_deg: 0.0,
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(validate(&[point(0)]).is_ok());
        assert!(validate(&[point(0), point(1), point(2)]).is_ok());
    }

    #[test]
    fn test_validate_empty() {
        assert!(matches!(validate(&[]), Err(LogbookError::InvalidTrack(_))));
    }

    #[test]
    fn test_validate_non_monotonic() {
        let err = validate(&[point(0), point(2), point(2)]).unwrap_err();
        match err {
            LogbookError::InvalidTrack(msg) => assert!(msg.contains("point 2"), "{msg}"),
            other => panic!("expected InvalidTrack, got {other:?}"),
        }
        assert!(validate(&[point(5), point(4)]).is_err());
    }

    #[test]
    fn test_derive_speed_course_altitude() {
        // 0.001° of latitude north per second ≈ 111.2 m/s ≈ 216 kts
        let fixes = vec![
            fix(0, 32.000, -86.0, 100.0),
            fix(1, 32.001, -86.0, 200.0),
            fix(2, 32.002, -86.0, 300.0),
        ];
        let points = derive(&fixes).unwrap();
        assert_eq!(points.len(), 2);

        let p = &points[0];
        assert_eq!(p.timestamp, fixes[1].timestamp);
        assert!((p.speed_kts - 216.1).abs() < 0.5, "speed {}", p.speed_kts);
        assert!(p.course_deg.abs() < 1e-6, "course {}", p.course_deg);
        assert!((p.altitude_ft - 656.168).abs() < 1e-6);
    }

    #[test]
    fn test_derive_uses_elapsed_time() {
        // Same distance over two seconds gives half the speed
        let one = derive(&[fix(0, 32.0, -86.0, 0.0), fix(1, 32.001, -86.0, 0.0)]).unwrap();
        let two = derive(&[fix(0, 32.0, -86.0, 0.0), fix(2, 32.001, -86.0, 0.0)]).unwrap();
        assert!((one[0].speed_kts / 2.0 - two[0].speed_kts).abs() < 1e-9);
    }

    #[test]
    fn test_derive_eastbound_course() {
        let points = derive(&[fix(0, 0.0, 0.0, 0.0), fix(1, 0.0, 0.001, 0.0)]).unwrap();
        assert!((points[0].course_deg - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_derive_short_inputs() {
        assert!(derive(&[]).unwrap().is_empty());
        assert!(derive(&[fix(0, 32.0, -86.0, 0.0)]).unwrap().is_empty());
    }

    #[test]
    fn test_derive_rejects_repeated_timestamp() {
        let fixes = vec![fix(0, 32.0, -86.0, 0.0), fix(0, 32.001, -86.0, 0.0)];
        assert!(matches!(derive(&fixes), Err(LogbookError::InvalidTrack(_))));
    }
}
