//! Shared types and error enum for logbook-core.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

/// All errors produced by logbook-core.
#[derive(Debug, Error)]
pub enum LogbookError {
    #[error("invalid track: {0}")]
    InvalidTrack(String),
    #[error("insufficient data: need at least 2 track points, got {points}")]
    InsufficientData { points: usize },
    #[error("sunrise/sunset undefined at ({lat:.4}, {lon:.4}) on {date}")]
    GeoTime { lat: f64, lon: f64, date: NaiveDate },
    #[error("unknown airport: {0}")]
    UnknownAirport(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LogbookError>;

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        GeoPoint { lat, lon }
    }
}

// ---------------------------------------------------------------------------
// Track points
// ---------------------------------------------------------------------------

/// One sample of a recorded flight, nominally one per second.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackPoint {
    pub timestamp: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
    pub altitude_ft: f64,
    pub speed_kts: f64,
    pub course_deg: f64,
}

impl TrackPoint {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

// ---------------------------------------------------------------------------
// Airports
// ---------------------------------------------------------------------------

/// Reference airport (or weather station) with field elevation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Airport {
    pub id: String,
    pub state: String,
    pub site: String,
    pub lat: f64,
    pub lon: f64,
    pub elevation_ft: f64,
}

impl Airport {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

// ---------------------------------------------------------------------------
// Flight title
// ---------------------------------------------------------------------------

/// Declared departure and arrival, as written in a track's title ("KSEM - KEET").
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlightTitle {
    pub departure: String,
    pub arrival: String,
}

impl FlightTitle {
    pub fn new(departure: impl Into<String>, arrival: impl Into<String>) -> Self {
        FlightTitle {
            departure: departure.into(),
            arrival: arrival.into(),
        }
    }

    /// Parse a `"DEP - ARR"` title. Returns `None` unless exactly two non-empty ids.
    pub fn parse(title: &str) -> Option<Self> {
        let parts: Vec<&str> = title.split('-').map(str::trim).collect();
        match parts.as_slice() {
            [dep, arr] if !dep.is_empty() && !arr.is_empty() => {
                Some(FlightTitle::new(dep.to_uppercase(), arr.to_uppercase()))
            }
            _ => None,
        }
    }

    /// Departure and arrival at the same field.
    pub fn is_closed_circuit(&self) -> bool {
        self.departure == self.arrival
    }
}

impl std::fmt::Display for FlightTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.departure, self.arrival)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
