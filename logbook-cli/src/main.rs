//! logbook: turn a recorded GPS track into a pilot logbook entry.

use std::io;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use logbook_core::airports::AirportIndex;
use logbook_core::config::{self, Config};
use logbook_core::summary::analyze_flight;
use logbook_core::types::*;

mod input;
mod report;

use report::EntryDetails;

#[derive(Parser)]
#[command(name = "logbook", version, about = "Automatic pilot logbook from GPS tracks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Airport table CSV (ID,State,Site,Latitude,Longitude,Elevation) replacing the built-in one
    #[arg(long, global = true, env = "LOGBOOK_AIRPORTS")]
    airports: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a track CSV and print the flight summary
    Analyze(AnalyzeArgs),

    /// List the active airport table
    Airports,

    /// Show the effective configuration
    Config {
        /// Write the default configuration to ~/.flight-logbook/config.yaml
        #[arg(long)]
        init: bool,
    },
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Track CSV (cleaned export, or raw fixes with --raw)
    file: PathBuf,

    /// Input holds raw fixes (Timestamp, Longitude, Latitude, Altitude in meters)
    #[arg(long)]
    raw: bool,

    /// Departure airport id (defaults to the track's FlightTitle)
    #[arg(long)]
    from: Option<String>,

    /// Arrival airport id (defaults to the track's FlightTitle)
    #[arg(long)]
    to: Option<String>,

    /// Print the summary and events as JSON
    #[arg(long)]
    json: bool,

    /// Append an entry to this logbook CSV
    #[arg(long)]
    logbook: Option<PathBuf>,

    /// Append an entry to the logbook CSV from the config file
    #[arg(long, conflicts_with = "logbook")]
    append: bool,

    /// Aircraft make/model for the logbook entry
    #[arg(long, default_value = "")]
    make_model: String,

    /// Tail number for the logbook entry (defaults to the track's TailNumber)
    #[arg(long)]
    tail: Option<String>,

    #[command(flatten)]
    entry: EntryArgs,
}

/// Logbook columns the track can't supply.
#[derive(Args)]
struct EntryArgs {
    /// Credit the flight as single-engine airplane time
    #[arg(long, help_heading = "Logbook entry")]
    single: bool,

    /// Credit the flight as multi-engine airplane time
    #[arg(long, help_heading = "Logbook entry")]
    multi: bool,

    /// Credit the flight as pilot-in-command time
    #[arg(long, help_heading = "Logbook entry")]
    pic: bool,

    /// Credit the flight as solo time
    #[arg(long, help_heading = "Logbook entry")]
    solo: bool,

    /// Number of instrument approaches
    #[arg(long, value_name = "N", help_heading = "Logbook entry")]
    inst_approaches: Option<u32>,

    /// Type and location of the instrument approaches
    #[arg(long, value_name = "TEXT", default_value = "", help_heading = "Logbook entry")]
    approach_type: String,

    /// Actual instrument hours
    #[arg(long, value_name = "HOURS", help_heading = "Logbook entry")]
    inst_actual: Option<f64>,

    /// Simulated instrument (hood) hours
    #[arg(long, value_name = "HOURS", help_heading = "Logbook entry")]
    inst_hood: Option<f64>,

    /// FTD or simulator hours
    #[arg(long, value_name = "HOURS", help_heading = "Logbook entry")]
    inst_ftd: Option<f64>,

    /// Ground training received, in hours
    #[arg(long, value_name = "HOURS", help_heading = "Logbook entry")]
    ground_training: Option<f64>,

    /// Flight training received, in hours
    #[arg(long, value_name = "HOURS", help_heading = "Logbook entry")]
    flight_training_received: Option<f64>,

    /// Flight training given, in hours
    #[arg(long, value_name = "HOURS", help_heading = "Logbook entry")]
    flight_training_given: Option<f64>,
}

impl EntryArgs {
    fn into_details(self, make_model: String, tail_number: String) -> EntryDetails {
        EntryDetails {
            make_model,
            tail_number,
            instrument_approaches: self.inst_approaches,
            approach_type_location: self.approach_type,
            airplane_single: self.single,
            airplane_multi: self.multi,
            pic: self.pic,
            solo: self.solo,
            instrument_actual: self.inst_actual,
            instrument_hood: self.inst_hood,
            instrument_ftd: self.inst_ftd,
            ground_training_received: self.ground_training,
            flight_training_received: self.flight_training_received,
            flight_training_given: self.flight_training_given,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = config::load_config();

    match cli.command {
        Commands::Analyze(args) => {
            let airports = load_airport_index(cli.airports.as_deref(), &config);
            cmd_analyze(args, &airports, &config);
        }
        Commands::Airports => {
            let airports = load_airport_index(cli.airports.as_deref(), &config);
            cmd_airports(&airports);
        }
        Commands::Config { init } => cmd_config(&config, init),
    }
}

/// Logs go to stderr so stdout stays clean for tables and JSON.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

/// The airport table: `--airports`, then the config file, then the built-in table.
fn load_airport_index(cli_path: Option<&Path>, config: &Config) -> AirportIndex {
    let path = cli_path
        .map(Path::to_path_buf)
        .or_else(|| config.airports.as_ref().map(PathBuf::from));

    let Some(path) = path else {
        return AirportIndex::builtin();
    };
    match input::load_airports(&path) {
        Ok(airports) => {
            if airports.is_empty() {
                tracing::warn!(path = %path.display(), "Airport table is empty");
            }
            tracing::info!(path = %path.display(), count = airports.len(), "Loaded airports");
            AirportIndex::new(airports)
        }
        Err(e) => fail(format!("loading airports from {}: {e}", path.display())),
    }
}

/// Departure and arrival from the flags, falling back to the track's title.
fn resolve_title(
    from: Option<&str>,
    to: Option<&str>,
    track_title: Option<&FlightTitle>,
) -> Option<FlightTitle> {
    let departure = from
        .map(|s| s.trim().to_uppercase())
        .or_else(|| track_title.map(|t| t.departure.clone()))?;
    let arrival = to
        .map(|s| s.trim().to_uppercase())
        .or_else(|| track_title.map(|t| t.arrival.clone()))?;
    Some(FlightTitle::new(departure, arrival))
}

fn cmd_analyze(args: AnalyzeArgs, airports: &AirportIndex, config: &Config) {
    let track = input::load_track(&args.file, args.raw)
        .unwrap_or_else(|e| fail(format!("reading {}: {e}", args.file.display())));

    let title = resolve_title(args.from.as_deref(), args.to.as_deref(), track.title.as_ref())
        .unwrap_or_else(|| {
            fail("no departure/arrival: pass --from and --to, or include a FlightTitle column")
        });

    let (events, summary) = analyze_flight(&track.points, airports, &title, &config.detector)
        .unwrap_or_else(|e| fail(e));

    if args.json {
        match report::render_json(&summary, &events) {
            Ok(json) => println!("{json}"),
            Err(e) => fail(e),
        }
    } else {
        println!();
        println!("Flight: {title} ({} points)", track.points.len());
        println!();
        println!("{}", report::summary_table(&summary));
        if !events.is_empty() {
            println!();
            println!("{}", report::events_table(&events));
        }
    }

    let logbook_path = args
        .logbook
        .or_else(|| args.append.then(|| PathBuf::from(&config.logbook.path)));
    if let Some(path) = logbook_path {
        let tail_number = args.tail.or(track.tail_number).unwrap_or_default();
        let details = args.entry.into_details(args.make_model, tail_number);
        if let Err(e) = report::append_logbook(&path, &summary, &details) {
            fail(format!("writing logbook {}: {e}", path.display()));
        }
        if !args.json {
            println!();
            println!("Logbook: {}", path.display());
        }
    }
}

fn cmd_airports(airports: &AirportIndex) {
    println!();
    println!("Airports: {}", airports.len());
    println!();
    if airports.is_empty() {
        return;
    }
    println!("{}", report::airports_table(airports.iter()));
}

fn cmd_config(config: &Config, init: bool) {
    if init {
        match config::save_config(&Config::default()) {
            Ok(path) => println!("Wrote default config to {}", path.display()),
            Err(e) => fail(e),
        }
        return;
    }

    println!("# {}", config::config_file().display());
    print!("{}", config::serialize_config(config));
}
