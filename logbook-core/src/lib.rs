//! logbook-core: flight analysis library for an automatic pilot logbook.
//!
//! No I/O in the engine: tracks go in, events and a logbook summary come
//! out. The `logbook` CLI handles files, config and output.

pub mod airports;
pub mod config;
pub mod detector;
pub mod geo;
pub mod solar;
pub mod summary;
pub mod track;
pub mod types;

// Re-export commonly used types at crate root
pub use airports::AirportIndex;
pub use config::DetectorConfig;
pub use detector::{detect_events, Detector, Event};
pub use summary::{analyze_flight, summarize, FlightSummary};
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn airport(id: &str, lat: f64, lon: f64) -> Airport {
        Airport {
            id: id.into(),
            state: "AL".into(),
            site: id.into(),
            lat,
            lon,
            elevation_ft: 200.0,
        }
    }

    fn at(sec: i64, apt: (f64, f64), agl: f64, speed: f64) -> TrackPoint {
        let t0: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 10, 15, 16, 0, 0).unwrap();
        TrackPoint {
            timestamp: t0 + Duration::seconds(sec),
            lat: apt.0,
            lon: apt.1,
            altitude_ft: 200.0 + agl,
            speed_kts: speed,
            course_deg: 0.0,
        }
    }

    #[test]
    fn test_full_flight() {
        let dep = (32.0, -86.0);
        let far = (33.0, -86.0);
        let arr = (32.0, -87.0);
        let index = AirportIndex::new(vec![
            airport("KDEP", dep.0, dep.1),
            airport("KFAR", far.0, far.1),
            airport("KARR", arr.0, arr.1),
        ]);

        let points = vec![
            at(0, dep, 0.0, 0.0),
            at(60, dep, 500.0, 60.0),
            at(1800, (32.5, -86.5), 3000.0, 100.0),
            // low pass, then a touch and go at KFAR
            at(3600, far, 200.0, 60.0),
            at(3660, far, 20.0, 40.0),
            at(3700, far, 400.0, 70.0),
            // full stop at KARR
            at(7200, arr, 10.0, 40.0),
            at(7230, arr, 0.0, 5.0),
        ];

        let title = FlightTitle::parse("KDEP - KARR").unwrap();
        let (events, summary) =
            analyze_flight(&points, &index, &title, &DetectorConfig::default()).unwrap();

        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], Event::LowPass { airport_id, .. } if airport_id == "KFAR"));
        assert!(matches!(
            &events[1],
            Event::Landing { airport_id, is_full_stop: false, .. } if airport_id == "KFAR"
        ));
        assert!(matches!(
            &events[2],
            Event::Landing { airport_id, is_full_stop: true, .. } if airport_id == "KARR"
        ));

        assert_eq!(summary.total_hours, 2.0);
        assert_eq!(summary.night_hours, 0.0);
        assert_eq!(summary.route, vec!["KFAR"]);
        assert_eq!(summary.unique_airports, 2);
        assert_eq!(summary.day_landing_total(), 2);
        assert!((summary.cross_country.day_all - 1.9).abs() < 1e-9);
        assert!((summary.cross_country.day_50nm - 1.9).abs() < 1e-9);
        assert_eq!(summary.cross_country.night_all, 0.0);
        assert_eq!(
            summary.remarks(),
            "KARR: 1 day full stop landings; KFAR: 1 day touch and go landings; \
             KFAR: 1 low passes"
        );
    }

    #[test]
    fn test_builtin_table_round_trip() {
        let index = AirportIndex::builtin();
        let title = FlightTitle::parse("ksem - ksem").unwrap();
        let selma = index.require(&title.departure).unwrap();
        let points = vec![
            at(0, (selma.lat, selma.lon), 0.0, 0.0),
            at(1800, (selma.lat + 0.2, selma.lon), 2000.0, 90.0),
        ];
        let (events, summary) =
            analyze_flight(&points, &index, &title, &DetectorConfig::default()).unwrap();
        assert!(events.is_empty());
        assert_eq!(summary.departure, "KSEM");
        assert_eq!(summary.total_hours, 0.5);
        assert_eq!(summary.cross_country, crate::summary::CrossCountryTime::default());
    }
}
