//! # Tire Stint Segmentation
//!
//! Converts a driver's stint list into proportional bar segments for the strategy chart.
//!
//! ## Width Convention
//! Each stint's width is `lap_count / last_completed_lap`, where `last_completed_lap` is
//! the final lap of the driver's own last stint. A finisher's bar therefore sums to 1.
//! A driver who stopped early gets one extra [`SegmentKind::Dnf`] segment sized against
//! the race distance, `(total_laps - last_completed_lap) / total_laps`, drawn faded and
//! left out of the legend.
//!
//! Every bar uses this one convention; widths based on race distance are never mixed in
//! for the stint segments themselves.

use crate::api::TireStrategy;
use crate::colors::{compound_color, Color};
use crate::{Compound, DashError, Entity, Stint};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Compound(Compound),
    /// Laps the driver did not complete
    Dnf,
}

/// One block of a strategy bar.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub laps: u32,
    pub width_fraction: f64,
}

/// Split `stints` into proportional segments.
///
/// # Errors
/// [`DashError::InvalidInput`] when `total_laps <= 0`, a stint starts before lap 1 or has
/// no laps, or consecutive stints leave a gap or overlap.
///
/// # Example
/// ```
/// use race_dash_lib::{Compound, Stint};
/// use race_dash_lib::stints::{segment, SegmentKind};
///
/// let stints = [
///     Stint { compound: Compound::Soft, lap_start: 1, lap_count: 20 },
///     Stint { compound: Compound::Hard, lap_start: 21, lap_count: 10 },
/// ];
/// let segments = segment(&stints, 40).unwrap();
/// assert_eq!(segments.len(), 3);
/// assert_eq!(segments[2].kind, SegmentKind::Dnf);
/// assert_eq!(segments[2].width_fraction, 0.25);
/// ```
pub fn segment(stints: &[Stint], total_laps: i64) -> Result<Vec<Segment>, DashError> {
    if total_laps <= 0 {
        return Err(DashError::invalid(format!(
            "total_laps must be positive, got {total_laps}"
        )));
    }
    let Some(last) = stints.last() else {
        return Ok(Vec::new());
    };
    check_stints(stints).map_err(DashError::InvalidInput)?;

    let last_completed = last.lap_end();
    let mut segments: Vec<Segment> = stints
        .iter()
        .map(|stint| Segment {
            kind: SegmentKind::Compound(stint.compound),
            laps: stint.lap_count,
            width_fraction: f64::from(stint.lap_count) / f64::from(last_completed),
        })
        .collect();

    let completed = i64::from(last_completed);
    if completed < total_laps {
        let missed = total_laps - completed;
        segments.push(Segment {
            kind: SegmentKind::Dnf,
            laps: u32::try_from(missed).unwrap_or(u32::MAX),
            width_fraction: missed as f64 / total_laps as f64,
        });
    }

    Ok(segments)
}

/// Stints start at lap 1 or later, cover at least one lap and follow each other without
/// gaps or overlaps.
pub(crate) fn check_stints(stints: &[Stint]) -> Result<(), String> {
    for stint in stints {
        if stint.lap_start == 0 {
            return Err("stint laps are numbered from 1".to_string());
        }
        if stint.lap_count == 0 {
            return Err(format!("empty stint starting at lap {}", stint.lap_start));
        }
        if stint.checked_lap_end().is_none() {
            return Err(format!(
                "stint starting at lap {} runs past the last lap number",
                stint.lap_start
            ));
        }
    }
    for pair in stints.windows(2) {
        if pair[0].lap_end().checked_add(1) != Some(pair[1].lap_start) {
            return Err(format!(
                "stint starting at lap {} does not follow stint ending at lap {}",
                pair[1].lap_start,
                pair[0].lap_end()
            ));
        }
    }
    Ok(())
}

/// One driver's bar in the strategy chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategyRow {
    pub entity: Entity,
    pub driver_number: String,
    /// Upper-cased family name
    pub label: String,
    pub laps_completed: u32,
    pub did_not_finish: bool,
    pub segments: Vec<Segment>,
}

/// Legend entry for one compound.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub compound: Compound,
    pub label: String,
    pub color: Color,
}

/// The five racing compounds; DNF and unknown compounds are never listed.
pub fn legend() -> Vec<LegendEntry> {
    Compound::LEGEND
        .iter()
        .map(|&compound| LegendEntry {
            compound,
            label: compound.label().to_string(),
            color: compound_color(compound),
        })
        .collect()
}

/// Build one bar per driver, ordered by car number.
///
/// Car numbers that are not numeric sort after all numeric ones, keeping payload order.
pub fn strategy_rows(strategy: &TireStrategy) -> Result<Vec<StrategyRow>, DashError> {
    let mut rows = strategy
        .strategies
        .iter()
        .map(|(entity, driver)| {
            let segments = segment(&driver.stints, strategy.total_laps)?;
            let laps_completed = driver.stints.last().map_or(0, Stint::lap_end);
            Ok(StrategyRow {
                entity: entity.clone(),
                driver_number: driver.driver_number.clone(),
                label: family_label(&driver.driver_name, entity),
                laps_completed,
                did_not_finish: segments.iter().any(|s| s.kind == SegmentKind::Dnf),
                segments,
            })
        })
        .collect::<Result<Vec<_>, DashError>>()?;

    rows.sort_by_key(|row| {
        row.driver_number
            .trim()
            .parse::<u32>()
            .map_or((1, 0), |n| (0, n))
    });
    Ok(rows)
}

/// Last word of the name, so "Andrea Kimi Antonelli" reads ANTONELLI.
fn family_label(driver_name: &str, entity: &str) -> String {
    driver_name
        .split_whitespace()
        .last()
        .unwrap_or(entity)
        .to_uppercase()
}
