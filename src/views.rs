//! # Chart Views
//!
//! Composes parsed payloads into the data behind each dashboard panel and decides what a
//! panel shows when its data could not be loaded.
//!
//! ## Recovery
//! A failed fetch never takes the whole dashboard down. Network and malformed-response
//! errors turn the affected panel into [`Panel::Unavailable`]; everything else is a bug
//! in the caller and is propagated.

use crate::api::{RaceResults, TireStrategy};
use crate::calendar::{select, with_status};
use crate::colors::{driver_colors, resolve, Color, DNF_COLOR, DNF_OPACITY};
use crate::config::ChartsConfig;
use crate::series::{align, lap_ticks, position_ticks, AlignedTable};
use crate::standings::{top_rows, StandingEntry, StandingRow};
use crate::stints::{legend, strategy_rows, LegendEntry, StrategyRow};
use crate::{DashError, Entity, RaceEvent, Sample};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Content of one dashboard panel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum Panel<T> {
    Loading,
    Ready(T),
    Unavailable { message: String },
}

impl<T> Panel<T> {
    /// Ready on success, Unavailable on a recoverable error.
    ///
    /// # Errors
    /// Input and storage errors are returned unchanged.
    pub fn from_result(panel: &str, result: Result<T, DashError>) -> Result<Self, DashError> {
        match result {
            Ok(data) => Ok(Panel::Ready(data)),
            Err(e) if e.is_recoverable() => {
                warn!(panel, error = %e, "panel unavailable");
                Ok(Panel::Unavailable {
                    message: format!("Unable to load {panel}"),
                })
            }
            Err(e) => Err(e),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Panel::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Panel<U> {
        match self {
            Panel::Loading => Panel::Loading,
            Panel::Ready(data) => Panel::Ready(f(data)),
            Panel::Unavailable { message } => Panel::Unavailable { message },
        }
    }

    /// Like [`Panel::map`] for transforms with preconditions.
    pub fn try_map<U>(
        self,
        f: impl FnOnce(T) -> Result<U, DashError>,
    ) -> Result<Panel<U>, DashError> {
        Ok(match self {
            Panel::Loading => Panel::Loading,
            Panel::Ready(data) => Panel::Ready(f(data)?),
            Panel::Unavailable { message } => Panel::Unavailable { message },
        })
    }
}

/// Lap-by-lap race positions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionsChart {
    pub table: AlignedTable,
    pub max_lap: u32,
    /// Bottom of the inverted position axis
    pub max_position: f64,
    pub lap_ticks: Vec<u32>,
    pub position_ticks: Vec<u32>,
    pub colors: IndexMap<Entity, Color>,
}

pub fn positions_chart(
    positions: &IndexMap<Entity, Vec<Sample>>,
    charts: &ChartsConfig,
) -> Result<PositionsChart, DashError> {
    let table = align(positions);
    let max_lap = table.max_index.max(0.0).round() as u32;
    let max_position = table.value_bound(&charts.position_bounds());

    let known = driver_colors();
    let colors = table
        .entities
        .iter()
        .enumerate()
        .map(|(i, entity)| {
            let color = resolve(entity, i, &known, &charts.fallback_palette)?;
            Ok((entity.clone(), color))
        })
        .collect::<Result<IndexMap<_, _>, DashError>>()?;

    Ok(PositionsChart {
        lap_ticks: lap_ticks(max_lap),
        position_ticks: position_ticks(max_position),
        table,
        max_lap,
        max_position,
        colors,
    })
}

/// Stacked tire-stint bars.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategyChart {
    pub event: String,
    pub total_laps: i64,
    pub legend: Vec<LegendEntry>,
    pub rows: Vec<StrategyRow>,
    pub dnf_color: Color,
    pub dnf_opacity: f64,
}

pub fn strategy_chart(strategy: &TireStrategy) -> Result<StrategyChart, DashError> {
    Ok(StrategyChart {
        event: strategy.event.clone(),
        total_laps: strategy.total_laps,
        legend: legend(),
        rows: strategy_rows(strategy)?,
        dnf_color: Color::new(DNF_COLOR),
        dnf_opacity: DNF_OPACITY,
    })
}

/// Season landing page: standings cards and the two highlighted races.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub drivers: Panel<Vec<StandingRow>>,
    pub teams: Panel<Vec<StandingRow>>,
    /// Last finished race then next upcoming one, whichever exist
    pub races: Panel<Vec<RaceEvent>>,
}

pub fn overview(
    drivers: Panel<Vec<StandingEntry>>,
    teams: Panel<Vec<StandingEntry>>,
    races: Panel<Vec<RaceEvent>>,
    now: DateTime<Utc>,
    rows: usize,
) -> Overview {
    let today = now.date_naive();
    Overview {
        drivers: drivers.map(|entries| top_rows(&entries, rows)),
        teams: teams.map(|entries| top_rows(&entries, rows)),
        races: races.map(|calendar| with_status(select(&calendar, now).into_rows(), today)),
    }
}

/// Full calendar with derived status, in date order.
pub fn calendar(mut races: Vec<RaceEvent>, now: DateTime<Utc>) -> Vec<RaceEvent> {
    races.sort_by_key(|event| event.date);
    with_status(races, now.date_naive())
}

/// Race classification in finishing order; unclassified drivers last.
pub fn results_table(mut results: RaceResults) -> RaceResults {
    results
        .results
        .sort_by_key(|row| row.position.map_or((1, 0), |p| (0, p)));
    results
}
