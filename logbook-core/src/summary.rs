//! Flight summary aggregator: folds detector events and track bounds
//! into logbook totals.
//!
//! Pure reduction: no state survives a call. Cross-country credit follows
//! the logbook's existing accounting convention exactly, including its
//! closed-circuit `+0.1` adjustment.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::airports::AirportIndex;
use crate::config::DetectorConfig;
use crate::detector::{detect_events, Event};
use crate::geo::distance_nm;
use crate::solar;
use crate::track;
use crate::types::*;

// ---------------------------------------------------------------------------
// Summary types
// ---------------------------------------------------------------------------

/// Landing counts per airport for one lighting condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LandingTally {
    pub full_stop: BTreeMap<String, u32>,
    pub touch_and_go: BTreeMap<String, u32>,
}

impl LandingTally {
    fn record(&mut self, airport_id: &str, is_full_stop: bool) {
        let bucket = if is_full_stop {
            &mut self.full_stop
        } else {
            &mut self.touch_and_go
        };
        *bucket.entry(airport_id.to_string()).or_insert(0) += 1;
    }

    pub fn total(&self) -> u32 {
        self.full_stop.values().sum::<u32>() + self.touch_and_go.values().sum::<u32>()
    }
}

/// Cross-country hours credited per category. Zero when the category
/// does not qualify.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CrossCountryTime {
    pub day_all: f64,
    pub day_50nm: f64,
    pub night_all: f64,
    pub night_50nm: f64,
}

/// Everything derived from one flight. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightSummary {
    pub date: NaiveDate,
    pub departure: String,
    pub arrival: String,
    pub total_hours: f64,
    pub night_hours: f64,
    pub day_landings: LandingTally,
    pub night_landings: LandingTally,
    pub low_passes: BTreeMap<String, u32>,
    pub steep_turns: u32,
    pub unique_airports: usize,
    /// Intermediate airports landed at, consecutive repeats collapsed.
    pub route: Vec<String>,
    pub cross_country: CrossCountryTime,
}

impl FlightSummary {
    pub fn day_landing_total(&self) -> u32 {
        self.day_landings.total()
    }

    pub fn night_landing_total(&self) -> u32 {
        self.night_landings.total()
    }

    /// Route as written in the logbook, e.g. `"KEET - KBHM"`.
    pub fn route_string(&self) -> String {
        self.route.join(" - ")
    }

    /// Logbook remarks: per-airport landing and low-pass counts, then steep turns.
    pub fn remarks(&self) -> String {
        let airports: BTreeSet<&String> = self
            .day_landings
            .full_stop
            .keys()
            .chain(self.day_landings.touch_and_go.keys())
            .chain(self.night_landings.full_stop.keys())
            .chain(self.night_landings.touch_and_go.keys())
            .chain(self.low_passes.keys())
            .collect();

        let mut remarks = Vec::new();
        for id in airports {
            let counts = [
                (&self.day_landings.full_stop, "day full stop landings"),
                (&self.day_landings.touch_and_go, "day touch and go landings"),
                (&self.night_landings.full_stop, "night full stop landings"),
                (&self.night_landings.touch_and_go, "night touch and go landings"),
                (&self.low_passes, "low passes"),
            ];
            for (tally, label) in counts {
                if let Some(n) = tally.get(id.as_str()).filter(|n| **n > 0) {
                    remarks.push(format!("{id}: {n} {label}"));
                }
            }
        }
        if self.steep_turns > 0 {
            remarks.push(format!("Steep turns: {}", self.steep_turns));
        }
        remarks.join("; ")
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Round to one decimal place, the logbook's resolution.
pub fn round_tenth(hours: f64) -> f64 {
    (hours * 10.0).round() / 10.0
}

/// Cross-country hours credited for one qualifying category.
///
/// `total + 0.1 * ((unique - landings) - 1)` when `landings - unique > -1`,
/// plus `0.1` more for a closed-circuit flight; otherwise plain `total`.
pub fn cross_country_time(
    total_hours: f64,
    landings: u32,
    unique_airports: usize,
    closed_circuit: bool,
) -> f64 {
    let landings = i64::from(landings);
    let unique = unique_airports as i64;
    if landings - unique > -1 {
        let credited = total_hours + 0.1 * ((unique - landings) - 1) as f64;
        if closed_circuit {
            return credited + 0.1;
        }
        return credited;
    }
    total_hours
}

/// Build the flight summary from a validated track and its detected events.
pub fn summarize(
    points: &[TrackPoint],
    events: &[Event],
    airports: &AirportIndex,
    title: &FlightTitle,
    config: &DetectorConfig,
) -> Result<FlightSummary> {
    track::validate(points)?;
    if points.len() < 2 {
        return Err(LogbookError::InsufficientData {
            points: points.len(),
        });
    }
    let departure = airports.require(&title.departure)?;
    let arrival = airports.require(&title.arrival)?;
    let closed_circuit = departure.id == arrival.id;

    let first = &points[0];
    let last = &points[points.len() - 1];
    let total_hours = round_tenth(seconds(last.timestamp - first.timestamp) / 3600.0);

    let mut night_seconds = 0.0;
    for pair in points.windows(2) {
        let start = &pair[0];
        if solar::is_night(
            start.timestamp,
            start.lat,
            start.lon,
            config.in_flight_night_buffer,
        )? {
            night_seconds += seconds(pair[1].timestamp - start.timestamp);
        }
    }
    let night_hours = round_tenth(night_seconds / 3600.0);

    let mut day_landings = LandingTally::default();
    let mut night_landings = LandingTally::default();
    let mut low_passes: BTreeMap<String, u32> = BTreeMap::new();
    let mut steep_turns = 0u32;
    let mut visited: HashSet<&str> = HashSet::new();
    let mut intermediate: Vec<&str> = Vec::new();

    let mut day_xc_all = false;
    let mut day_xc_50 = false;
    let mut night_xc_all = false;
    let mut night_xc_50 = false;

    for event in events {
        match event {
            Event::Landing {
                airport_id,
                time,
                lat,
                lon,
                is_night,
                is_full_stop,
            } => {
                if *is_night {
                    night_landings.record(airport_id, *is_full_stop);
                } else {
                    day_landings.record(airport_id, *is_full_stop);
                }
                visited.insert(airport_id);

                if *airport_id == departure.id || *airport_id == arrival.id {
                    continue;
                }
                intermediate.push(airport_id);

                let far = distance_nm(departure.position(), GeoPoint::new(*lat, *lon))
                    >= config.cross_country_min_nm;
                let dark = solar::is_night(*time, *lat, *lon, config.in_flight_night_buffer)?;
                if dark {
                    night_xc_all = true;
                    night_xc_50 |= far;
                } else {
                    day_xc_all = true;
                    day_xc_50 |= far;
                }
            }
            Event::LowPass { airport_id, .. } => {
                *low_passes.entry(airport_id.clone()).or_insert(0) += 1;
            }
            Event::SteepTurn { .. } => steep_turns += 1,
        }
    }

    let mut route: Vec<String> = Vec::new();
    for id in intermediate {
        if route.last().map(String::as_str) != Some(id) {
            route.push(id.to_string());
        }
    }

    let unique_airports = visited.len();
    let day_total = day_landings.total();
    let night_total = night_landings.total();
    let credit = |qualifies: bool, landings: u32| {
        if qualifies {
            cross_country_time(total_hours, landings, unique_airports, closed_circuit)
        } else {
            0.0
        }
    };
    let cross_country = CrossCountryTime {
        day_all: credit(day_xc_all, day_total),
        day_50nm: credit(day_xc_50, day_total),
        night_all: credit(night_xc_all, night_total),
        night_50nm: credit(night_xc_50, night_total),
    };

    tracing::info!(
        total_hours,
        night_hours,
        day_landings = day_total,
        night_landings = night_total,
        unique_airports,
        "Flight summarized"
    );

    Ok(FlightSummary {
        date: first.timestamp.date_naive(),
        departure: departure.id.clone(),
        arrival: arrival.id.clone(),
        total_hours,
        night_hours,
        day_landings,
        night_landings,
        low_passes,
        steep_turns,
        unique_airports,
        route,
        cross_country,
    })
}

/// Detect events and summarize in one call.
pub fn analyze_flight(
    points: &[TrackPoint],
    airports: &AirportIndex,
    title: &FlightTitle,
    config: &DetectorConfig,
) -> Result<(Vec<Event>, FlightSummary)> {
    let events = detect_events(points, airports, config)?;
    let summary = summarize(points, &events, airports, title, config)?;
    Ok((events, summary))
}

fn seconds(d: chrono::Duration) -> f64 {
    d.num_milliseconds() as f64 / 1000.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
