//! Solar classifier: sunrise/sunset and day/night decisions.
//!
//! Sun times use the NOAA solar-position approximation evaluated at local
//! solar noon, with the standard 0.833° horizon depression (refraction plus
//! the solar disc radius). Accuracy is about a minute at mid latitudes.
//!
//! Sun times are keyed by UTC calendar date, so a western-hemisphere
//! sunset can fall after midnight UTC (and an eastern sunrise before it).
//! `is_night` therefore checks the neighbouring dates' windows as well.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};

use crate::types::{LogbookError, Result};

/// Zenith angle of the sun's centre at sunrise/sunset (degrees).
const SUNRISE_ZENITH: f64 = 90.833;

/// Julian date of 2000-01-01 12:00 UTC.
const J2000: f64 = 2_451_545.0;

/// Sunrise and sunset for one location and UTC date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SunTimes {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

/// Compute sunrise and sunset for `date` (UTC calendar date) at `lat`/`lon`.
///
/// Fails with `GeoTime` during polar day or polar night, where the sun
/// never crosses the horizon.
pub fn sun_times(date: NaiveDate, lat: f64, lon: f64) -> Result<SunTimes> {
    let midnight = date.and_time(NaiveTime::MIN).and_utc();
    let jd_midnight = julian_day(date);

    // Evaluate the solar position near local apparent noon.
    let t = (jd_midnight + 0.5 - lon / 360.0 - J2000) / 36_525.0;

    let l0 = (280.46646 + t * (36_000.76983 + t * 0.0003032)).rem_euclid(360.0);
    let m = 357.52911 + t * (35_999.05029 - 0.0001537 * t);
    let e = 0.016708634 - t * (0.000042037 + 0.0000001267 * t);

    let m_rad = m.to_radians();
    let center = m_rad.sin() * (1.914602 - t * (0.004817 + 0.000014 * t))
        + (2.0 * m_rad).sin() * (0.019993 - 0.000101 * t)
        + (3.0 * m_rad).sin() * 0.000289;
    let true_long = l0 + center;

    let omega = (125.04 - 1934.136 * t).to_radians();
    let apparent_long = (true_long - 0.00569 - 0.00478 * omega.sin()).to_radians();

    let seconds = 21.448 - t * (46.815 + t * (0.00059 - t * 0.001813));
    let mean_obliquity = 23.0 + (26.0 + seconds / 60.0) / 60.0;
    let obliquity = (mean_obliquity + 0.00256 * omega.cos()).to_radians();

    let declination = (obliquity.sin() * apparent_long.sin()).asin();

    let y = (obliquity / 2.0).tan().powi(2);
    let l0_rad = l0.to_radians();
    let eq_time_min = 4.0
        * (y * (2.0 * l0_rad).sin() - 2.0 * e * m_rad.sin()
            + 4.0 * e * y * m_rad.sin() * (2.0 * l0_rad).cos()
            - 0.5 * y * y * (4.0 * l0_rad).sin()
            - 1.25 * e * e * (2.0 * m_rad).sin())
        .to_degrees();

    let lat_rad = lat.to_radians();
    let cos_ha = SUNRISE_ZENITH.to_radians().cos() / (lat_rad.cos() * declination.cos())
        - lat_rad.tan() * declination.tan();
    if !cos_ha.is_finite() || !(-1.0..=1.0).contains(&cos_ha) {
        return Err(LogbookError::GeoTime { lat, lon, date });
    }
    let hour_angle = cos_ha.acos().to_degrees();

    let noon_min = 720.0 - 4.0 * lon - eq_time_min;
    let sunrise_min = noon_min - 4.0 * hour_angle;
    let sunset_min = noon_min + 4.0 * hour_angle;

    Ok(SunTimes {
        sunrise: midnight + minutes(sunrise_min),
        sunset: midnight + minutes(sunset_min),
    })
}

/// Whether `timestamp` falls outside `[sunrise - buffer, sunset + buffer]`.
///
/// The window of the timestamp's own UTC date decides, unless the previous
/// date's window (evening past 00:00 UTC) or the next date's (dawn before
/// it) covers the timestamp. The in-flight night clock uses a zero buffer;
/// night landings use a one-hour buffer.
pub fn is_night(timestamp: DateTime<Utc>, lat: f64, lon: f64, buffer: Duration) -> Result<bool> {
    let date = timestamp.date_naive();
    if sun_times(date, lat, lon)?.contains(timestamp, buffer) {
        return Ok(false);
    }

    // Neighbouring dates only extend daylight; if their sun times are
    // undefined they contribute nothing.
    let neighbours = [date.pred_opt(), date.succ_opt()];
    let lit = neighbours
        .into_iter()
        .flatten()
        .filter_map(|d| sun_times(d, lat, lon).ok())
        .any(|sun| sun.contains(timestamp, buffer));
    Ok(!lit)
}

impl SunTimes {
    /// Whether `t` lies in `[sunrise - buffer, sunset + buffer]`.
    pub fn contains(&self, t: DateTime<Utc>, buffer: Duration) -> bool {
        let after_dawn = self
            .sunrise
            .checked_sub_signed(buffer)
            .map_or(true, |dawn| t >= dawn);
        let before_dusk = self
            .sunset
            .checked_add_signed(buffer)
            .map_or(true, |dusk| t <= dusk);
        after_dawn && before_dusk
    }
}

/// Julian date at 00:00 UTC of `date`.
fn julian_day(date: NaiveDate) -> f64 {
    // 0001-01-01 (day 1 of the proleptic Gregorian era) is JD 1721425.5
    date.num_days_from_ce() as f64 + 1_721_424.5
}

fn minutes(m: f64) -> Duration {
    Duration::milliseconds((m * 60_000.0).round() as i64)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // Selma / Craig Field, Alabama
    const LAT: f64 = 32.3367;
    const LON: f64 = -86.9836;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn within(actual: DateTime<Utc>, expected: DateTime<Utc>, tolerance_min: i64) -> bool {
        (actual - expected).num_minutes().abs() <= tolerance_min
    }

    #[test]
    fn test_sun_times_selma_october() {
        // 2024-10-15 at Selma: sunrise ~06:50 CDT, sunset ~18:20 CDT
        let date = NaiveDate::from_ymd_opt(2024, 10, 15).unwrap();
        let sun = sun_times(date, LAT, LON).unwrap();
        assert!(
            within(sun.sunrise, utc(2024, 10, 15, 11, 50), 10),
            "sunrise {}",
            sun.sunrise
        );
        assert!(
            within(sun.sunset, utc(2024, 10, 15, 23, 20), 10),
            "sunset {}",
            sun.sunset
        );
    }

    #[test]
    fn test_sun_times_greenwich_equinox() {
        // Near the equinox at 0° lon on the equator: ~06:00 and ~18:00 UTC
        let date = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let sun = sun_times(date, 0.0, 0.0).unwrap();
        assert!(within(sun.sunrise, utc(2024, 3, 20, 6, 0), 15));
        assert!(within(sun.sunset, utc(2024, 3, 20, 18, 10), 15));
    }

    #[test]
    fn test_is_night_midday_and_midnight() {
        let zero = Duration::zero();
        assert!(!is_night(utc(2024, 10, 15, 18, 0), LAT, LON, zero).unwrap());
        assert!(is_night(utc(2024, 10, 15, 3, 0), LAT, LON, zero).unwrap());
    }

    #[test]
    fn test_buffer_asymmetry() {
        // ~30 minutes after sunset: night for the flight clock, day for landings
        let t = utc(2024, 10, 15, 23, 50);
        assert!(is_night(t, LAT, LON, Duration::zero()).unwrap());
        assert!(!is_night(t, LAT, LON, Duration::hours(1)).unwrap());
    }

    #[test]
    fn test_buffer_before_sunrise() {
        // ~30 minutes before sunrise
        let t = utc(2024, 10, 15, 11, 20);
        assert!(is_night(t, LAT, LON, Duration::zero()).unwrap());
        assert!(!is_night(t, LAT, LON, Duration::hours(1)).unwrap());
        // ~2 hours before sunrise is night either way
        let t = utc(2024, 10, 15, 9, 45);
        assert!(is_night(t, LAT, LON, Duration::hours(1)).unwrap());
    }

    #[test]
    fn test_summer_evening_after_midnight_utc() {
        // June 21 sunset at Selma is about 00:58 UTC on June 22
        let sun = sun_times(NaiveDate::from_ymd_opt(2024, 6, 21).unwrap(), LAT, LON).unwrap();
        assert!(
            within(sun.sunset, utc(2024, 6, 22, 0, 58), 10),
            "sunset {}",
            sun.sunset
        );

        // 19:30 CDT: still daylight for the flight clock
        let t = utc(2024, 6, 22, 0, 30);
        assert!(!is_night(t, LAT, LON, Duration::zero()).unwrap());

        // ~30 minutes after sunset: inside the landing buffer
        let t = utc(2024, 6, 22, 1, 30);
        assert!(is_night(t, LAT, LON, Duration::zero()).unwrap());
        assert!(!is_night(t, LAT, LON, Duration::hours(1)).unwrap());

        // well past sunset + buffer
        let t = utc(2024, 6, 22, 2, 30);
        assert!(is_night(t, LAT, LON, Duration::hours(1)).unwrap());
    }

    #[test]
    fn test_eastern_morning_before_midnight_utc() {
        // Tokyo sunrise in June is about 19:25 UTC on the previous date
        let (lat, lon) = (35.68, 139.69);
        assert!(!is_night(utc(2024, 6, 21, 20, 0), lat, lon, Duration::zero()).unwrap());
        assert!(is_night(utc(2024, 6, 21, 18, 0), lat, lon, Duration::zero()).unwrap());
    }

    #[test]
    fn test_window_contains() {
        let date = NaiveDate::from_ymd_opt(2024, 10, 15).unwrap();
        let sun = sun_times(date, LAT, LON).unwrap();
        assert!(sun.contains(sun.sunrise, Duration::zero()));
        assert!(sun.contains(sun.sunset, Duration::zero()));
        assert!(!sun.contains(sun.sunset + Duration::seconds(1), Duration::zero()));
        // A buffer too large to represent widens the window to everything
        assert!(sun.contains(utc(2024, 1, 1, 0, 0), Duration::milliseconds(i64::MAX)));
    }

    #[test]
    fn test_polar_day_fails() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        let err = sun_times(date, 80.0, 15.0).unwrap_err();
        assert!(matches!(err, LogbookError::GeoTime { .. }));
    }

    #[test]
    fn test_polar_night_fails() {
        let t = utc(2024, 12, 21, 12, 0);
        assert!(matches!(
            is_night(t, 80.0, 15.0, Duration::zero()),
            Err(LogbookError::GeoTime { .. })
        ));
    }

    #[test]
    fn test_julian_day_epoch() {
        let date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        assert_eq!(julian_day(date), 2_451_544.5);
    }
}
