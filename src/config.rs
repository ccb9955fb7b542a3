//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the race-dash.toml file.
//! It provides a centralized way to configure the API location, season picker, chart
//! axis windows and where view selections are persisted.

use crate::colors::Color;
use crate::series::AxisBounds;
use crate::DashError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "race-dash.toml";

/// Application configuration loaded from race-dash.toml
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Remote API settings
    pub api: ApiConfig,
    /// Season picker and driver selection defaults
    pub season: SeasonConfig,
    /// Axis windows and palettes
    pub charts: ChartsConfig,
    /// Selection persistence
    pub state: StateConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL the `/api/...` paths are appended to
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SeasonConfig {
    /// Oldest season offered
    pub first_year: i32,
    /// Number of consecutive seasons offered
    pub year_count: u32,
    /// Season shown when nothing was persisted
    pub default_year: i32,
    /// Driver codes offered by the telemetry pickers
    pub drivers: Vec<String>,
    pub default_driver: String,
    pub default_pair: (String, String),
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ChartsConfig {
    /// Smallest position axis, even when only the top few cars are charted
    pub position_floor: f64,
    /// Largest position axis (full grid)
    pub position_ceiling: f64,
    /// Spare positions below the worst observed one
    pub position_headroom: f64,
    pub compare_speed_ceiling_kph: f64,
    pub trace_speed_ceiling_kph: f64,
    /// Distance axis used before any trace has loaded
    pub distance_fallback_m: f64,
    /// Rows shown on the overview standings cards
    pub standings_rows: usize,
    /// Colors for drivers missing from the team-color table
    pub fallback_palette: Vec<Color>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct StateConfig {
    /// JSON file holding persisted view selections
    pub path: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for SeasonConfig {
    fn default() -> Self {
        SeasonConfig {
            first_year: 2020,
            year_count: 6,
            default_year: 2024,
            drivers: ["VER", "HAM", "LEC", "NOR", "SAI", "ALO"]
                .into_iter()
                .map(String::from)
                .collect(),
            default_driver: "VER".to_string(),
            default_pair: ("HAM".to_string(), "LEC".to_string()),
        }
    }
}

impl Default for ChartsConfig {
    fn default() -> Self {
        ChartsConfig {
            position_floor: 10.0,
            position_ceiling: 20.0,
            position_headroom: 1.0,
            compare_speed_ceiling_kph: 350.0,
            trace_speed_ceiling_kph: 325.0,
            distance_fallback_m: 100.0,
            standings_rows: 5,
            fallback_palette: [
                "#1e40af", "#dc2626", "#16a34a", "#9333ea", "#ea580c", "#0891b2", "#4f46e5",
                "#db2777",
            ]
            .into_iter()
            .map(Color::new)
            .collect(),
        }
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        StateConfig {
            path: PathBuf::from("race-dash-state.json"),
        }
    }
}

impl ChartsConfig {
    /// Axis window of the lap-position chart.
    pub fn position_bounds(&self) -> AxisBounds {
        AxisBounds {
            floor: self.position_floor,
            ceiling: self.position_ceiling,
            headroom: self.position_headroom,
        }
    }
}

impl Config {
    /// Load configuration from race-dash.toml file
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => match config.validate() {
                    Ok(()) => {
                        info!(
                            path = %path.display(),
                            api = %config.api.base_url,
                            "loaded configuration"
                        );
                        config
                    }
                    Err(e) => {
                        warn!(
                            path = %path.display(),
                            error = %e,
                            "rejected configuration, using defaults"
                        );
                        Self::default()
                    }
                },
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "invalid config file format, using defaults"
                    );
                    Self::default()
                }
            },
            Err(_) => {
                info!(path = %path.display(), "no config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Check the settings the pipeline relies on.
    pub fn validate(&self) -> Result<(), DashError> {
        if self.charts.fallback_palette.is_empty() {
            return Err(DashError::invalid("charts.fallback_palette is empty"));
        }
        if self.charts.position_floor > self.charts.position_ceiling {
            return Err(DashError::invalid(format!(
                "charts.position_floor {} exceeds position_ceiling {}",
                self.charts.position_floor, self.charts.position_ceiling
            )));
        }
        let last_year = self.season.first_year + self.season.year_count as i32 - 1;
        if !(self.season.first_year..=last_year).contains(&self.season.default_year) {
            return Err(DashError::invalid(format!(
                "season.default_year {} is outside {}..={}",
                self.season.default_year, self.season.first_year, last_year
            )));
        }
        Ok(())
    }

    /// Save current configuration to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        info!(path = %path.as_ref().display(), "configuration saved");
        Ok(())
    }
}
