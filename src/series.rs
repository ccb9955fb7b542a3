//! # Series Alignment
//!
//! Lap charts and speed overlays plot several entities against one shared X axis, but the
//! API delivers one independent sequence per entity: a retired driver stops reporting laps,
//! two telemetry traces are sampled at different distances. This module reconciles those
//! sequences into one table.
//!
//! ## Alignment Rules
//! - Rows are the union of every index seen across all entities, ascending, deduplicated
//! - Every row carries one cell per entity, in input order
//! - A cell is [`Cell::Absent`] when the entity has no sample at that exact index;
//!   no interpolation is done, the renderer decides whether to bridge gaps
//! - A sample whose value is null stays distinguishable as `Cell::Present(None)`
//!
//! ## Axis Scaling
//! [`AlignedTable::max_index`] drives the X axis. [`AlignedTable::value_bound`] gives a
//! Y bound clamped into a floor/ceiling window so sparse data does not collapse the axis.

use crate::{Entity, Sample};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Value of one entity at one row of an [`AlignedTable`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    /// Entity has no sample at this index
    Absent,
    /// Entity has a sample; the measurement itself may be null
    Present(Option<f64>),
}

impl Cell {
    /// The numeric value, if the sample exists and is not null.
    pub fn value(&self) -> Option<f64> {
        match self {
            Cell::Present(v) => *v,
            Cell::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Cell::Absent)
    }
}

/// One row of the aligned table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlignedRow {
    pub index: f64,
    pub cells: IndexMap<Entity, Cell>,
}

/// Several per-entity sequences reconciled onto one ordered index.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignedTable {
    /// Column order, identical to the input map order
    pub entities: Vec<Entity>,
    pub rows: Vec<AlignedRow>,
    /// Largest index seen across all entities, 0 when there is none
    pub max_index: f64,
}

/// Floor/ceiling window for a value axis.
///
/// The positions chart uses `headroom = 1`, `floor = 10`, `ceiling = 20`: one spare
/// position below the last classified car, never fewer than ten slots, never more than
/// a full grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisBounds {
    pub floor: f64,
    pub ceiling: f64,
    pub headroom: f64,
}

/// Align per-entity sample sequences onto the union of their indices.
///
/// # Example
/// ```
/// use indexmap::IndexMap;
/// use race_dash_lib::Sample;
/// use race_dash_lib::series::{align, Cell};
///
/// let mut input = IndexMap::new();
/// input.insert("A".to_string(), vec![Sample { index: 1.0, value: Some(100.0) }]);
/// input.insert("B".to_string(), vec![
///     Sample { index: 1.0, value: Some(90.0) },
///     Sample { index: 2.0, value: Some(95.0) },
/// ]);
///
/// let table = align(&input);
/// assert_eq!(table.rows.len(), 2);
/// assert_eq!(table.rows[1].cells["A"], Cell::Absent);
/// assert_eq!(table.max_index, 2.0);
/// ```
pub fn align(sequences: &IndexMap<Entity, Vec<Sample>>) -> AlignedTable {
    let lookups: Vec<(&Entity, Vec<Sample>)> = sequences
        .iter()
        .map(|(entity, samples)| (entity, normalized(samples)))
        .collect();

    let mut indices: Vec<f64> = lookups
        .iter()
        .flat_map(|(_, samples)| samples.iter().map(|s| s.index))
        .collect();
    indices.sort_by(f64::total_cmp);
    indices.dedup_by(|a, b| a.total_cmp(b) == Ordering::Equal);

    let rows = indices
        .iter()
        .map(|&index| {
            let cells = lookups
                .iter()
                .map(|(entity, samples)| {
                    let cell = match samples.binary_search_by(|s| s.index.total_cmp(&index)) {
                        Ok(pos) => Cell::Present(samples[pos].value),
                        Err(_) => Cell::Absent,
                    };
                    ((*entity).clone(), cell)
                })
                .collect();
            AlignedRow { index, cells }
        })
        .collect();

    AlignedTable {
        entities: sequences.keys().cloned().collect(),
        rows,
        max_index: indices.last().copied().unwrap_or(0.0),
    }
}

/// Sort a sequence by index (stable) and keep the first sample of each index.
fn normalized(samples: &[Sample]) -> Vec<Sample> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.index.total_cmp(&b.index));
    sorted.dedup_by(|later, earlier| later.index.total_cmp(&earlier.index) == Ordering::Equal);
    sorted
}

impl AlignedTable {
    /// Largest non-null value over all present cells.
    pub fn max_observed(&self) -> Option<f64> {
        self.rows
            .iter()
            .flat_map(|row| row.cells.values().filter_map(Cell::value))
            .fold(None, |max, v| Some(max.map_or(v, |m: f64| m.max(v))))
    }

    /// Y-axis bound: observed maximum plus headroom, clamped into `[floor, ceiling]`.
    ///
    /// The floor is applied before the ceiling, so a misconfigured `floor > ceiling`
    /// yields the ceiling instead of panicking.
    pub fn value_bound(&self, bounds: &AxisBounds) -> f64 {
        let observed = self
            .max_observed()
            .map_or(bounds.floor, |max| max + bounds.headroom);
        observed.max(bounds.floor).min(bounds.ceiling)
    }

    /// All cells of one entity, row by row.
    pub fn column(&self, entity: &str) -> Option<Vec<Cell>> {
        if !self.entities.iter().any(|e| e == entity) {
            return None;
        }
        Some(
            self.rows
                .iter()
                .map(|row| row.cells.get(entity).copied().unwrap_or(Cell::Absent))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Lap-axis ticks: lap 1, every tenth lap, and the final lap.
///
/// ```
/// use race_dash_lib::series::lap_ticks;
///
/// assert_eq!(lap_ticks(57), vec![1, 10, 20, 30, 40, 50, 57]);
/// assert_eq!(lap_ticks(20), vec![1, 10, 20]);
/// ```
pub fn lap_ticks(max_lap: u32) -> Vec<u32> {
    if max_lap == 0 {
        return Vec::new();
    }
    let mut ticks = vec![1];
    ticks.extend((1..=max_lap / 10).map(|i| i * 10));
    ticks.push(max_lap);
    ticks.sort_unstable();
    ticks.dedup();
    ticks
}

/// Position-axis ticks `1..=bound`.
pub fn position_ticks(bound: f64) -> Vec<u32> {
    if bound < 1.0 {
        return Vec::new();
    }
    (1..=bound.floor() as u32).collect()
}
