//! Logbook CSV output and terminal rendering of a flight summary.

use std::fs::OpenOptions;
use std::path::Path;

use comfy_table::{Cell, Table};
use serde::Serialize;

use logbook_core::detector::Event;
use logbook_core::summary::FlightSummary;
use logbook_core::types::*;

/// Logbook columns, in the order pilots keep them.
pub const LOGBOOK_HEADER: [&str; 27] = [
    "Date",
    "Make/Model",
    "Tail #",
    "From",
    "Route",
    "To",
    "Day Land",
    "Night Land",
    "# Inst App",
    "Type/Location Inst App",
    "Airplane Single",
    "Airplane Multi",
    "Inst Act",
    "Inst Sim/Hood",
    "Inst FTD/Simulator",
    "Night",
    "Day XC (All)",
    "Day XC (>50 NM)",
    "Night XC (All)",
    "Night XC (>50 NM)",
    "PIC",
    "SOLO",
    "Ground Train Received",
    "Flight Train Received",
    "Flight Train Given",
    "Total",
    "Remarks",
];

/// Fields the pilot supplies; the track can't tell us these.
///
/// The category flags credit the whole flight to that column. Optional
/// values are left blank when not given.
#[derive(Debug, Clone, Default)]
pub struct EntryDetails {
    pub make_model: String,
    pub tail_number: String,
    pub instrument_approaches: Option<u32>,
    pub approach_type_location: String,
    pub airplane_single: bool,
    pub airplane_multi: bool,
    pub pic: bool,
    pub solo: bool,
    pub instrument_actual: Option<f64>,
    pub instrument_hood: Option<f64>,
    pub instrument_ftd: Option<f64>,
    pub ground_training_received: Option<f64>,
    pub flight_training_received: Option<f64>,
    pub flight_training_given: Option<f64>,
}

fn hours(h: f64) -> String {
    format!("{h:.1}")
}

fn optional_hours(h: Option<f64>) -> String {
    h.map(hours).unwrap_or_default()
}

/// One logbook row for `summary`.
pub fn logbook_row(summary: &FlightSummary, details: &EntryDetails) -> Vec<String> {
    let xc = &summary.cross_country;
    let credit = |flag: bool| hours(if flag { summary.total_hours } else { 0.0 });
    vec![
        summary.date.format("%m/%d/%Y").to_string(),
        details.make_model.clone(),
        details.tail_number.clone(),
        summary.departure.clone(),
        summary.route_string(),
        summary.arrival.clone(),
        summary.day_landing_total().to_string(),
        summary.night_landing_total().to_string(),
        details
            .instrument_approaches
            .map(|n| n.to_string())
            .unwrap_or_default(),
        details.approach_type_location.clone(),
        credit(details.airplane_single),
        credit(details.airplane_multi),
        optional_hours(details.instrument_actual),
        optional_hours(details.instrument_hood),
        optional_hours(details.instrument_ftd),
        hours(summary.night_hours),
        hours(xc.day_all),
        hours(xc.day_50nm),
        hours(xc.night_all),
        hours(xc.night_50nm),
        credit(details.pic),
        credit(details.solo),
        optional_hours(details.ground_training_received),
        optional_hours(details.flight_training_received),
        optional_hours(details.flight_training_given),
        hours(summary.total_hours),
        summary.remarks(),
    ]
}

/// Append a row to the logbook CSV, writing the header first if the file is new or empty.
pub fn append_logbook(path: &Path, summary: &FlightSummary, details: &EntryDetails) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let empty = file.metadata()?.len() == 0;

    let mut writer = csv::Writer::from_writer(file);
    if empty {
        writer
            .write_record(LOGBOOK_HEADER)
            .map_err(|e| LogbookError::Io(e.into()))?;
    }
    writer
        .write_record(logbook_row(summary, details))
        .map_err(|e| LogbookError::Io(e.into()))?;
    writer.flush()?;

    tracing::info!(path = %path.display(), date = %summary.date, "Appended logbook entry");
    Ok(())
}

// ---------------------------------------------------------------------------
// Terminal output
// ---------------------------------------------------------------------------

pub fn summary_table(summary: &FlightSummary) -> Table {
    let xc = &summary.cross_country;
    let route = summary.route_string();
    let remarks = summary.remarks();

    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    let rows: Vec<(&str, String)> = vec![
        ("Date", summary.date.format("%m/%d/%Y").to_string()),
        ("From", summary.departure.clone()),
        ("Route", if route.is_empty() { "-".into() } else { route }),
        ("To", summary.arrival.clone()),
        ("Total", hours(summary.total_hours)),
        ("Night", hours(summary.night_hours)),
        ("Day landings", summary.day_landing_total().to_string()),
        ("Night landings", summary.night_landing_total().to_string()),
        ("Low passes", summary.low_passes.values().sum::<u32>().to_string()),
        ("Steep turns", summary.steep_turns.to_string()),
        ("Airports visited", summary.unique_airports.to_string()),
        ("Day XC (All)", hours(xc.day_all)),
        ("Day XC (>50 NM)", hours(xc.day_50nm)),
        ("Night XC (All)", hours(xc.night_all)),
        ("Night XC (>50 NM)", hours(xc.night_50nm)),
        ("Remarks", if remarks.is_empty() { "-".into() } else { remarks }),
    ];
    for (field, value) in rows {
        table.add_row(vec![Cell::new(field), Cell::new(value)]);
    }
    table
}

pub fn events_table(events: &[Event]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Time (UTC)", "Event", "Airport", "Detail"]);

    for event in events {
        let (kind, detail) = match event {
            Event::Landing {
                is_full_stop,
                is_night,
                ..
            } => {
                let stop = if *is_full_stop { "full stop" } else { "touch and go" };
                let light = if *is_night { "night" } else { "day" };
                ("Landing", format!("{light} {stop}"))
            }
            Event::LowPass { .. } => ("Low pass", String::new()),
            Event::SteepTurn { start, end } => {
                ("Steep turn", format!("{}s", (*end - *start).num_seconds()))
            }
        };
        table.add_row(vec![
            Cell::new(event.time().format("%H:%M:%S")),
            Cell::new(kind),
            Cell::new(event.airport_id().unwrap_or("-")),
            Cell::new(detail),
        ]);
    }
    table
}

#[derive(Serialize)]
struct Report<'a> {
    summary: &'a FlightSummary,
    events: &'a [Event],
}

pub fn render_json(summary: &FlightSummary, events: &[Event]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&Report { summary, events })
}

pub fn airports_table<'a>(airports: impl Iterator<Item = &'a Airport>) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "State", "Site", "Lat", "Lon", "Elev (ft)"]);
    for apt in airports {
        table.add_row(vec![
            Cell::new(&apt.id),
            Cell::new(&apt.state),
            Cell::new(&apt.site),
            Cell::new(format!("{:.4}", apt.lat)),
            Cell::new(format!("{:.4}", apt.lon)),
            Cell::new(format!("{:.0}", apt.elevation_ft)),
        ]);
    }
    table
}
