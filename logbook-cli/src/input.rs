//! CSV readers for track logs and airport tables.

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use logbook_core::track::{self, RawFix};
use logbook_core::types::*;

/// One row of a cleaned track export.
#[derive(Debug, Deserialize)]
struct TrackRow {
    #[serde(rename = "Timestamp")]
    timestamp: DateTime<Utc>,
    #[serde(rename = "Speed (knots)")]
    speed_kts: f64,
    #[serde(rename = "Altitude (feet)")]
    altitude_ft: f64,
    #[serde(rename = "Course (degrees)")]
    course_deg: f64,
    #[serde(rename = "Latitude")]
    lat: f64,
    #[serde(rename = "Longitude")]
    lon: f64,
    #[serde(rename = "FlightTitle", default)]
    flight_title: Option<String>,
    #[serde(rename = "TailNumber", default)]
    tail_number: Option<String>,
}

/// One row of a raw GPS export (altitude in meters).
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Timestamp")]
    timestamp: DateTime<Utc>,
    #[serde(rename = "Longitude")]
    lon: f64,
    #[serde(rename = "Latitude")]
    lat: f64,
    #[serde(rename = "Altitude")]
    altitude_m: f64,
    #[serde(rename = "FlightTitle", default)]
    flight_title: Option<String>,
    #[serde(rename = "TailNumber", default)]
    tail_number: Option<String>,
}

/// A track loaded from disk, with the metadata columns the GPS app exports.
#[derive(Debug)]
pub struct TrackFile {
    pub points: Vec<TrackPoint>,
    pub title: Option<FlightTitle>,
    pub tail_number: Option<String>,
}

/// Read a cleaned track CSV.
pub fn read_track<R: Read>(reader: R) -> Result<TrackFile> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut points = Vec::new();
    let mut meta = Metadata::default();

    for (i, record) in rdr.deserialize::<TrackRow>().enumerate() {
        let row = record.map_err(|e| row_error(i, e))?;
        meta.observe(row.flight_title.as_deref(), row.tail_number.as_deref());
        points.push(TrackPoint {
            timestamp: row.timestamp,
            lat: row.lat,
            lon: row.lon,
            altitude_ft: row.altitude_ft,
            speed_kts: row.speed_kts,
            course_deg: row.course_deg,
        });
    }

    tracing::debug!(points = points.len(), "Read cleaned track");
    Ok(meta.finish(points))
}

/// Read a raw fix CSV and derive speed, course, and feet from it.
pub fn read_raw_track<R: Read>(reader: R) -> Result<TrackFile> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut fixes = Vec::new();
    let mut meta = Metadata::default();

    for (i, record) in rdr.deserialize::<RawRow>().enumerate() {
        let row = record.map_err(|e| row_error(i, e))?;
        meta.observe(row.flight_title.as_deref(), row.tail_number.as_deref());
        fixes.push(RawFix {
            timestamp: row.timestamp,
            lat: row.lat,
            lon: row.lon,
            altitude_m: row.altitude_m,
        });
    }

    let points = track::derive(&fixes)?;
    Ok(meta.finish(points))
}

/// Open and read a track file, raw or cleaned.
pub fn load_track(path: &Path, raw: bool) -> Result<TrackFile> {
    let file = std::fs::File::open(path)?;
    if raw {
        read_raw_track(file)
    } else {
        read_track(file)
    }
}

/// First non-empty title and tail number seen in the file.
#[derive(Default)]
struct Metadata {
    title: Option<String>,
    tail_number: Option<String>,
}

impl Metadata {
    fn observe(&mut self, title: Option<&str>, tail: Option<&str>) {
        if self.title.is_none() {
            self.title = non_empty(title);
        }
        if self.tail_number.is_none() {
            self.tail_number = non_empty(tail);
        }
    }

    fn finish(self, points: Vec<TrackPoint>) -> TrackFile {
        let title = self.title.as_deref().and_then(|t| {
            let parsed = FlightTitle::parse(t);
            if parsed.is_none() {
                tracing::warn!(title = t, "Ignoring malformed flight title");
            }
            parsed
        });
        TrackFile {
            points,
            title,
            tail_number: self.tail_number,
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}

fn row_error(index: usize, e: csv::Error) -> LogbookError {
    LogbookError::InvalidTrack(format!("row {}: {e}", index + 1))
}

// ---------------------------------------------------------------------------
// Airport tables
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct AirportRow {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "State", default)]
    state: String,
    #[serde(rename = "Site", default)]
    site: String,
    #[serde(rename = "Latitude")]
    lat: f64,
    #[serde(rename = "Longitude")]
    lon: f64,
    #[serde(rename = "Elevation")]
    elevation_ft: f64,
}

/// Read an airport table (`ID,State,Site,Latitude,Longitude,Elevation`).
pub fn read_airports<R: Read>(reader: R) -> Result<Vec<Airport>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut airports = Vec::new();
    for (i, record) in rdr.deserialize::<AirportRow>().enumerate() {
        let row = record.map_err(|e| LogbookError::Config(format!("airport row {}: {e}", i + 1)))?;
        airports.push(Airport {
            id: row.id.trim().to_uppercase(),
            state: row.state,
            site: row.site,
            lat: row.lat,
            lon: row.lon,
            elevation_ft: row.elevation_ft,
        });
    }
    Ok(airports)
}

pub fn load_airports(path: &Path) -> Result<Vec<Airport>> {
    read_airports(std::fs::File::open(path)?)
}
