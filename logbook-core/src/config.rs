//! Detector thresholds and the config file for flight-logbook.
//!
//! Reads/writes `~/.flight-logbook/config.yaml` with detector thresholds,
//! night buffers, the logbook CSV path, and an optional airport table.

use std::path::PathBuf;

use chrono::Duration;

use crate::types::LogbookError;

// ---------------------------------------------------------------------------
// Detector thresholds
// ---------------------------------------------------------------------------

/// Every tunable threshold used by the detector and aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Max distance from the nearest airport for landings and low passes.
    pub landing_radius_m: f64,
    /// Ground speed that arms landing/low-pass detection.
    pub arm_speed_kts: f64,
    /// Landings require ground speed below this.
    pub landing_max_speed_kts: f64,
    /// Landings require altitude below field elevation plus this.
    pub landing_max_agl_ft: f64,
    /// A sample below this speed inside the look-ahead window makes a full stop.
    pub full_stop_speed_kts: f64,
    pub full_stop_window: Duration,
    pub landing_cooldown: Duration,
    /// Low-pass altitude band above field elevation (exclusive both ends).
    pub low_pass_min_agl_ft: f64,
    pub low_pass_max_agl_ft: f64,
    pub low_pass_cooldown: Duration,
    /// Course change between samples that starts turn tracking.
    pub turn_trigger_deg: f64,
    /// Accumulated course change that counts as a full circle.
    pub turn_complete_deg: f64,
    pub steep_turn_min: Duration,
    pub steep_turn_max: Duration,
    pub cross_country_min_nm: f64,
    pub in_flight_night_buffer: Duration,
    pub landing_night_buffer: Duration,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            landing_radius_m: 2000.0,
            arm_speed_kts: 45.0,
            landing_max_speed_kts: 50.0,
            landing_max_agl_ft: 100.0,
            full_stop_speed_kts: 10.0,
            full_stop_window: Duration::minutes(1),
            landing_cooldown: Duration::minutes(1),
            low_pass_min_agl_ft: 50.0,
            low_pass_max_agl_ft: 300.0,
            low_pass_cooldown: Duration::minutes(5),
            turn_trigger_deg: 5.0,
            turn_complete_deg: 345.0,
            steep_turn_min: Duration::seconds(15),
            steep_turn_max: Duration::seconds(30),
            cross_country_min_nm: 50.0,
            in_flight_night_buffer: Duration::zero(),
            landing_night_buffer: Duration::hours(1),
        }
    }
}

// ---------------------------------------------------------------------------
// Config file
// ---------------------------------------------------------------------------

/// Full configuration structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub detector: DetectorConfig,
    pub logbook: LogbookConfig,
    /// Custom airport CSV replacing the built-in table.
    pub airports: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogbookConfig {
    pub path: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            detector: DetectorConfig::default(),
            logbook: LogbookConfig {
                path: "pilot_logbook.csv".into(),
            },
            airports: None,
        }
    }
}

/// Get the config directory path (`~/.flight-logbook/`).
pub fn config_dir() -> PathBuf {
    dirs_home().join(".flight-logbook")
}

/// Get the config file path.
pub fn config_file() -> PathBuf {
    config_dir().join("config.yaml")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load config from `~/.flight-logbook/config.yaml`.
///
/// Returns default config if the file doesn't exist or can't be read.
pub fn load_config() -> Config {
    let path = config_file();
    if !path.exists() {
        return Config::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(text) => parse_config(&text),
        Err(e) => {
            tracing::warn!(path = %path.display(), "Unreadable config, using defaults: {e}");
            Config::default()
        }
    }
}

/// Save config to `~/.flight-logbook/config.yaml`.
pub fn save_config(config: &Config) -> Result<PathBuf, LogbookError> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir).map_err(|e| LogbookError::Config(e.to_string()))?;

    let path = config_file();
    std::fs::write(&path, serialize_config(config))
        .map_err(|e| LogbookError::Config(e.to_string()))?;

    Ok(path)
}

/// Parse simple YAML-like config text. Unknown keys and bad values are skipped.
pub fn parse_config(text: &str) -> Config {
    let mut config = Config::default();
    let mut current_section: Option<String> = None;

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        let is_indented = line.starts_with("  ") || line.starts_with('\t');

        let Some((key, val)) = stripped.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let val = val.trim();

        if !is_indented {
            if val.is_empty() {
                current_section = Some(key.to_string());
            } else {
                current_section = None;
                if key == "airports" {
                    config.airports = parse_string_value(val);
                }
            }
            continue;
        }

        match current_section.as_deref() {
            Some("detector") => apply_detector_key(&mut config.detector, key, val),
            Some("logbook") => {
                if key == "path" {
                    if let Some(v) = parse_string_value(val) {
                        config.logbook.path = v;
                    }
                }
            }
            _ => {}
        }
    }

    config
}

fn apply_detector_key(d: &mut DetectorConfig, key: &str, val: &str) {
    let Some(v) = parse_float_value(val) else {
        tracing::warn!(key, val, "Ignoring non-numeric detector setting");
        return;
    };
    match key {
        "landing_radius_km" => d.landing_radius_m = v * 1000.0,
        "arm_speed_kts" => d.arm_speed_kts = v,
        "landing_max_speed_kts" => d.landing_max_speed_kts = v,
        "landing_max_agl_ft" => d.landing_max_agl_ft = v,
        "full_stop_speed_kts" => d.full_stop_speed_kts = v,
        "full_stop_window_sec" => set_duration(&mut d.full_stop_window, key, v),
        "landing_cooldown_sec" => set_duration(&mut d.landing_cooldown, key, v),
        "low_pass_min_agl_ft" => d.low_pass_min_agl_ft = v,
        "low_pass_max_agl_ft" => d.low_pass_max_agl_ft = v,
        "low_pass_cooldown_sec" => set_duration(&mut d.low_pass_cooldown, key, v),
        "turn_trigger_deg" => d.turn_trigger_deg = v,
        "turn_complete_deg" => d.turn_complete_deg = v,
        "steep_turn_min_sec" => set_duration(&mut d.steep_turn_min, key, v),
        "steep_turn_max_sec" => set_duration(&mut d.steep_turn_max, key, v),
        "cross_country_min_nm" => d.cross_country_min_nm = v,
        "in_flight_night_buffer_hours" => {
            set_duration(&mut d.in_flight_night_buffer, key, v * 3600.0)
        }
        "landing_night_buffer_hours" => {
            set_duration(&mut d.landing_night_buffer, key, v * 3600.0)
        }
        _ => {}
    }
}

fn set_duration(field: &mut Duration, key: &str, secs: f64) {
    match seconds(secs) {
        Some(d) => *field = d,
        None => tracing::warn!(key, secs, "Ignoring negative or out-of-range duration setting"),
    }
}

/// Non-negative, finite seconds that fit a millisecond `Duration`.
fn seconds(v: f64) -> Option<Duration> {
    let ms = (v * 1000.0).round();
    if !ms.is_finite() || ms < 0.0 || ms >= i64::MAX as f64 {
        return None;
    }
    Duration::try_milliseconds(ms as i64)
}

fn as_seconds(d: Duration) -> f64 {
    d.num_milliseconds() as f64 / 1000.0
}

fn parse_string_value(val: &str) -> Option<String> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    // Strip quotes
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return Some(val[1..val.len() - 1].to_string());
    }
    Some(val.to_string())
}

fn parse_float_value(val: &str) -> Option<f64> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    val.parse().ok()
}

/// Serialize config to YAML-like text.
pub fn serialize_config(config: &Config) -> String {
    let d = &config.detector;
    let mut lines = vec!["# flight-logbook configuration".to_string(), String::new()];

    lines.push("detector:".into());
    lines.push(format!("  landing_radius_km: {}", d.landing_radius_m / 1000.0));
    lines.push(format!("  arm_speed_kts: {}", d.arm_speed_kts));
    lines.push(format!("  landing_max_speed_kts: {}", d.landing_max_speed_kts));
    lines.push(format!("  landing_max_agl_ft: {}", d.landing_max_agl_ft));
    lines.push(format!("  full_stop_speed_kts: {}", d.full_stop_speed_kts));
    lines.push(format!("  full_stop_window_sec: {}", as_seconds(d.full_stop_window)));
    lines.push(format!("  landing_cooldown_sec: {}", as_seconds(d.landing_cooldown)));
    lines.push(format!("  low_pass_min_agl_ft: {}", d.low_pass_min_agl_ft));
    lines.push(format!("  low_pass_max_agl_ft: {}", d.low_pass_max_agl_ft));
    lines.push(format!("  low_pass_cooldown_sec: {}", as_seconds(d.low_pass_cooldown)));
    lines.push(format!("  turn_trigger_deg: {}", d.turn_trigger_deg));
    lines.push(format!("  turn_complete_deg: {}", d.turn_complete_deg));
    lines.push(format!("  steep_turn_min_sec: {}", as_seconds(d.steep_turn_min)));
    lines.push(format!("  steep_turn_max_sec: {}", as_seconds(d.steep_turn_max)));
    lines.push(format!("  cross_country_min_nm: {}", d.cross_country_min_nm));
    lines.push(format!(
        "  in_flight_night_buffer_hours: {}",
        as_seconds(d.in_flight_night_buffer) / 3600.0
    ));
    lines.push(format!(
        "  landing_night_buffer_hours: {}",
        as_seconds(d.landing_night_buffer) / 3600.0
    ));
    lines.push(String::new());

    lines.push("logbook:".into());
    lines.push(format!("  path: \"{}\"", config.logbook.path));
    lines.push(String::new());

    match &config.airports {
        Some(path) => lines.push(format!("airports: \"{path}\"")),
        None => lines.push("airports: null".into()),
    }

    lines.join("\n") + "\n"
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
