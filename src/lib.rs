//! # Race Dash Core Library
//!
//! This library turns the JSON payloads served by a motorsport season API into
//! chart-ready structures: aligned lap/distance tables, proportional tire-stint bars,
//! gear-bucketed telemetry and a "last finished / next upcoming" race selection.
//!
//! ## Design Philosophy
//!
//! ### Pure Transforms
//! Every transform in [`series`], [`stints`], [`telemetry`], [`calendar`] and [`colors`]
//! is a synchronous function over borrowed input with no I/O and no shared state.
//! Network access lives in [`api`]; stale-response handling lives in [`dispatch`].
//!
//! ### Explicit Absence
//! Sparse data is the norm: drivers retire, laps go unrecorded, telemetry is sampled at
//! different distances per car. Missing samples are represented explicitly
//! ([`series::Cell::Absent`]) and are never folded into a zero or a null measurement.
//!
//! ### Data Flow
//! 1. **Fetch**: [`api::ApiClient`] issues a GET for an [`api::Endpoint`]
//! 2. **Parse**: the matching `api::parse_*` function validates the body into typed values
//! 3. **Transform**: pure pipeline modules build chart-ready values
//! 4. **Present**: [`views::Panel`] wraps the outcome, degrading recoverable errors to an
//!    empty panel with a short message
//!
//! ## Core Types
//!
//! - [`Sample`]: one `(index, value)` pair of a per-entity sequence
//! - [`Stint`] and [`Compound`]: a block of laps on one tire compound
//! - [`RaceEvent`] and [`RaceStatus`]: one calendar entry
//! - [`TelemetryPoint`]: one car-sensor sample on track

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod api;
pub mod calendar;
pub mod colors;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod series;
pub mod standings;
pub mod state;
pub mod stints;
pub mod telemetry;
pub mod views;

#[cfg(test)]
mod tests;

pub use error::{DashError, ErrorKind};

/// Identifier of a driver or constructor, unique within one response only.
pub type Entity = String;

/// One measurement of a per-entity sequence.
///
/// `index` is the shared ordering key (lap number, distance in meters or elapsed time).
/// `value` is `None` when the source reported an explicit null, which is different from
/// the entity having no sample at that index at all.
///
/// # Example
/// ```
/// use race_dash_lib::Sample;
///
/// // P3 on lap 12
/// let s = Sample { index: 12.0, value: Some(3.0) };
///
/// // Lap 13 was recorded but the position was unknown
/// let gap = Sample { index: 13.0, value: None };
/// # assert!(gap.value.is_none() && s.value.is_some());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub index: f64,
    pub value: Option<f64>,
}

/// Tire rubber type.
///
/// Strings the API sends that are not one of the five racing compounds decode as
/// [`Compound::Unknown`] so a single odd stint never rejects a whole strategy payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Compound {
    Soft,
    Medium,
    Hard,
    Intermediate,
    Wet,
    #[serde(other)]
    Unknown,
}

impl Compound {
    /// The compounds shown in the strategy legend, in display order.
    pub const LEGEND: [Compound; 5] = [
        Compound::Soft,
        Compound::Medium,
        Compound::Hard,
        Compound::Intermediate,
        Compound::Wet,
    ];

    /// Legend label, e.g. `"Soft"`.
    pub fn label(self) -> &'static str {
        match self {
            Compound::Soft => "Soft",
            Compound::Medium => "Medium",
            Compound::Hard => "Hard",
            Compound::Intermediate => "Intermediate",
            Compound::Wet => "Wet",
            Compound::Unknown => "Unknown",
        }
    }
}

/// A contiguous block of laps run on one compound.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stint {
    pub compound: Compound,
    pub lap_start: u32,
    pub lap_count: u32,
}

impl Stint {
    /// Last lap covered by this stint (inclusive).
    ///
    /// ```
    /// use race_dash_lib::{Compound, Stint};
    ///
    /// let stint = Stint { compound: Compound::Soft, lap_start: 1, lap_count: 20 };
    /// assert_eq!(stint.lap_end(), 20);
    /// ```
    pub fn lap_end(&self) -> u32 {
        let end = (u64::from(self.lap_start) + u64::from(self.lap_count)).saturating_sub(1);
        u32::try_from(end).unwrap_or(u32::MAX)
    }

    /// Last lap covered, or `None` when it lies past `u32::MAX` or the stint is empty.
    pub fn checked_lap_end(&self) -> Option<u32> {
        self.lap_count
            .checked_sub(1)
            .and_then(|extra| self.lap_start.checked_add(extra))
    }
}

/// Where a race sits relative to today.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceStatus {
    Finished,
    Upcoming,
    #[serde(rename = "Race Day")]
    RaceDay,
}

/// One entry of a season calendar, owned by the API and only read here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RaceEvent {
    pub round: u32,
    pub event_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub country: String,
    pub date: NaiveDate,
    /// Filled by [`calendar::with_status`] when the API leaves it out.
    #[serde(default, alias = "race_status")]
    pub status: Option<RaceStatus>,
}

/// One telemetry sample on track.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetryPoint {
    /// Track position, X axis
    pub x: f64,
    /// Track position, Y axis
    pub y: f64,
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub speed: f64,
    /// Selected gear; values outside 1..=8 are kept as-is
    pub gear: i32,
    /// Session time in seconds, when reported
    #[serde(default)]
    pub time: Option<f64>,
}
