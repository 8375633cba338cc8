//! Track event detector: single forward scan over a recorded flight.
//!
//! Pure logic, no I/O. Produces `Event` outputs that the summary
//! aggregator folds into logbook totals.
//!
//! Per point, in order:
//! - arm on ground speed above the arming speed
//! - landing check (full stop vs touch-and-go, day vs night)
//! - low-pass check (independent of the landing check)
//! - steep-turn accumulation against the previous point

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::airports::AirportIndex;
use crate::config::DetectorConfig;
use crate::geo::course_delta;
use crate::solar;
use crate::track;
use crate::types::*;

// ---------------------------------------------------------------------------
// Events (output)
// ---------------------------------------------------------------------------

/// Events emitted by the detector, in track order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Touchdown at an airport. `lat`/`lon` are the touchdown sample.
    Landing {
        airport_id: String,
        time: DateTime<Utc>,
        lat: f64,
        lon: f64,
        is_night: bool,
        is_full_stop: bool,
    },
    /// Overflight inside the low-pass altitude band.
    LowPass {
        airport_id: String,
        time: DateTime<Utc>,
    },
    /// A full circle flown within the steep-turn duration window.
    SteepTurn {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl Event {
    /// Timestamp the event is anchored to (turn end for steep turns).
    pub fn time(&self) -> DateTime<Utc> {
        match self {
            Event::Landing { time, .. } => *time,
            Event::LowPass { time, .. } => *time,
            Event::SteepTurn { end, .. } => *end,
        }
    }

    /// Airport the event happened at, if any.
    pub fn airport_id(&self) -> Option<&str> {
        match self {
            Event::Landing { airport_id, .. } | Event::LowPass { airport_id, .. } => {
                Some(airport_id)
            }
            Event::SteepTurn { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Scan state
// ---------------------------------------------------------------------------

/// A turn being tracked.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnProgress {
    pub start: DateTime<Utc>,
    pub start_course: f64,
    pub degrees: f64,
}

/// Mutable state carried across one scan.
#[derive(Debug, Clone, Default)]
pub struct DetectorState {
    /// Ground speed exceeded the arming speed since the last recorded landing.
    pub armed: bool,
    pub last_landing: HashMap<String, DateTime<Utc>>,
    pub last_low_pass: HashMap<String, DateTime<Utc>>,
    pub turn: Option<TurnProgress>,
}

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

/// Scans one track against an airport table.
///
/// State is reset at the start of every `scan`, so a detector can be
/// reused for several flights; it is never shared between runs.
pub struct Detector<'a> {
    airports: &'a AirportIndex,
    config: &'a DetectorConfig,
    state: DetectorState,
}

impl<'a> Detector<'a> {
    pub fn new(airports: &'a AirportIndex, config: &'a DetectorConfig) -> Self {
        Detector {
            airports,
            config,
            state: DetectorState::default(),
        }
    }

    /// State left behind by the last scan.
    pub fn state(&self) -> &DetectorState {
        &self.state
    }

    /// Scan a complete track and return every detected event in order.
    pub fn scan(&mut self, points: &[TrackPoint]) -> Result<Vec<Event>> {
        track::validate(points)?;
        self.state = DetectorState::default();

        let mut events = Vec::new();
        for i in 0..points.len() {
            self.step(points, i, &mut events)?;
        }

        tracing::info!(
            points = points.len(),
            events = events.len(),
            "Track scan complete"
        );
        Ok(events)
    }

    fn step(&mut self, points: &[TrackPoint], i: usize, events: &mut Vec<Event>) -> Result<()> {
        let point = &points[i];
        if point.speed_kts > self.config.arm_speed_kts {
            self.state.armed = true;
        }
        let armed = self.state.armed;

        let airports = self.airports;
        let mut landed = false;
        if let Some((airport, dist)) = airports.nearest(point.position()) {
            if armed && dist <= self.config.landing_radius_m {
                if let Some(e) = self.check_landing(points, i, airport)? {
                    events.push(e);
                    landed = true;
                }
                if let Some(e) = self.check_low_pass(point, airport) {
                    events.push(e);
                }
            }
        }
        if landed {
            self.state.armed = false;
        }

        if i > 0 {
            if let Some(e) = self.check_turn(&points[i - 1], point) {
                events.push(e);
            }
        }
        Ok(())
    }

    fn check_landing(
        &mut self,
        points: &[TrackPoint],
        i: usize,
        airport: &Airport,
    ) -> Result<Option<Event>> {
        let cfg = self.config;
        let point = &points[i];
        if point.speed_kts >= cfg.landing_max_speed_kts
            || point.altitude_ft >= airport.elevation_ft + cfg.landing_max_agl_ft
        {
            return Ok(None);
        }
        let last = self.state.last_landing.get(&airport.id);
        if cooling_down(last, point.timestamp, cfg.landing_cooldown) {
            return Ok(None);
        }

        // A window past the end of representable time covers the rest of the track
        let deadline = point.timestamp.checked_add_signed(cfg.full_stop_window);
        let is_full_stop = points[i..]
            .iter()
            .take_while(|p| deadline.map_or(true, |d| p.timestamp <= d))
            .any(|p| p.speed_kts < cfg.full_stop_speed_kts);
        let is_night = solar::is_night(
            point.timestamp,
            point.lat,
            point.lon,
            cfg.landing_night_buffer,
        )?;

        self.state
            .last_landing
            .insert(airport.id.clone(), point.timestamp);

        tracing::debug!(
            airport = %airport.id,
            time = %point.timestamp,
            is_full_stop,
            is_night,
            "Landing detected"
        );
        Ok(Some(Event::Landing {
            airport_id: airport.id.clone(),
            time: point.timestamp,
            lat: point.lat,
            lon: point.lon,
            is_night,
            is_full_stop,
        }))
    }

    fn check_low_pass(&mut self, point: &TrackPoint, airport: &Airport) -> Option<Event> {
        let cfg = self.config;
        let floor = airport.elevation_ft + cfg.low_pass_min_agl_ft;
        let ceiling = airport.elevation_ft + cfg.low_pass_max_agl_ft;
        if point.altitude_ft <= floor || point.altitude_ft >= ceiling {
            return None;
        }
        let last = self.state.last_low_pass.get(&airport.id);
        if cooling_down(last, point.timestamp, cfg.low_pass_cooldown) {
            return None;
        }

        self.state
            .last_low_pass
            .insert(airport.id.clone(), point.timestamp);

        tracing::debug!(
            airport = %airport.id,
            time = %point.timestamp,
            altitude_ft = point.altitude_ft,
            "Low pass detected"
        );
        Some(Event::LowPass {
            airport_id: airport.id.clone(),
            time: point.timestamp,
        })
    }

    fn check_turn(&mut self, prev: &TrackPoint, cur: &TrackPoint) -> Option<Event> {
        let cfg = self.config;
        let delta = course_delta(prev.course_deg, cur.course_deg).abs();

        if self.state.turn.is_none() {
            if delta > cfg.turn_trigger_deg {
                self.state.turn = Some(TurnProgress {
                    start: prev.timestamp,
                    start_course: prev.course_deg,
                    degrees: delta,
                });
            }
            return None;
        }

        let turn = self.state.turn.as_mut()?;
        turn.degrees += delta;
        if turn.degrees < cfg.turn_complete_deg {
            return None;
        }

        let start = turn.start;
        let start_course = turn.start_course;
        self.state.turn = None;

        let duration = cur.timestamp - start;
        if duration < cfg.steep_turn_min || duration > cfg.steep_turn_max {
            tracing::debug!(
                start = %start,
                start_course,
                seconds = duration.num_seconds(),
                "Full circle outside steep-turn window"
            );
            return None;
        }

        tracing::debug!(
            start = %start,
            start_course,
            seconds = duration.num_seconds(),
            "Steep turn detected"
        );
        Some(Event::SteepTurn {
            start,
            end: cur.timestamp,
        })
    }
}

/// A cooldown is in force while less than `cooldown` has elapsed.
fn cooling_down(
    last: Option<&DateTime<Utc>>,
    now: DateTime<Utc>,
    cooldown: chrono::Duration,
) -> bool {
    last.is_some_and(|t| now - *t < cooldown)
}

/// Scan `points` with a fresh detector.
pub fn detect_events(
    points: &[TrackPoint],
    airports: &AirportIndex,
    config: &DetectorConfig,
) -> Result<Vec<Event>> {
    Detector::new(airports, config).scan(points)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
