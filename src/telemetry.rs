//! # Telemetry Shaping
//!
//! Gear buckets for the track-map scatter and distance-aligned speed traces.

use crate::api::{GearShiftTelemetry, SpeedComparison, SpeedTrace, SpeedTracePoint};
use crate::colors::{gear_color, Color};
use crate::config::ChartsConfig;
use crate::series::{align, AlignedTable};
use crate::{Entity, Sample, TelemetryPoint};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Gears shown in the legend regardless of which ones the lap used.
pub const LEGEND_GEARS: [i32; 8] = [1, 2, 3, 4, 5, 6, 7, 8];

/// Group points by their literal gear value, keeping input order inside each bucket.
///
/// Never fails: gear 0 or 9 just forms its own bucket and later gets the fallback color.
pub fn bucket(points: &[TelemetryPoint]) -> BTreeMap<i32, Vec<TelemetryPoint>> {
    let mut buckets: BTreeMap<i32, Vec<TelemetryPoint>> = BTreeMap::new();
    for point in points {
        buckets.entry(point.gear).or_default().push(*point);
    }
    buckets
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GearSeries {
    pub gear: i32,
    pub color: Color,
    pub points: Vec<TelemetryPoint>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GearChart {
    pub driver_name: String,
    pub series: Vec<GearSeries>,
    pub legend: Vec<(i32, Color)>,
}

pub fn gear_chart(telemetry: &GearShiftTelemetry) -> GearChart {
    let series = bucket(&telemetry.telemetry_data)
        .into_iter()
        .map(|(gear, points)| GearSeries {
            gear,
            color: gear_color(gear),
            points,
        })
        .collect();

    GearChart {
        driver_name: telemetry.driver_name.clone(),
        series,
        legend: LEGEND_GEARS.iter().map(|&g| (g, gear_color(g))).collect(),
    }
}

/// Speed traces aligned on distance, with axis domains.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeedOverlay {
    pub table: AlignedTable,
    pub distance_domain: (f64, f64),
    pub speed_domain: (f64, f64),
}

/// Overlay two drivers' speed traces on a shared distance axis.
///
/// When the same driver is picked twice the second column is suffixed with `" (2)"` so
/// both traces survive alignment.
pub fn speed_overlay(comparison: &SpeedComparison, charts: &ChartsConfig) -> SpeedOverlay {
    let first = comparison.driver1.name.clone();
    let mut second = comparison.driver2.name.clone();
    if second == first {
        second.push_str(" (2)");
    }

    let mut traces: IndexMap<Entity, Vec<Sample>> = IndexMap::new();
    traces.insert(first, samples(&comparison.driver1.data));
    traces.insert(second, samples(&comparison.driver2.data));

    overlay(&traces, charts.compare_speed_ceiling_kph, charts)
}

/// Single-driver speed trace on a distance axis.
pub fn speed_trace(trace: &SpeedTrace, charts: &ChartsConfig) -> SpeedOverlay {
    let mut traces: IndexMap<Entity, Vec<Sample>> = IndexMap::new();
    traces.insert(trace.driver_name.clone(), samples(&trace.data));
    overlay(&traces, charts.trace_speed_ceiling_kph, charts)
}

fn overlay(
    traces: &IndexMap<Entity, Vec<Sample>>,
    speed_ceiling: f64,
    charts: &ChartsConfig,
) -> SpeedOverlay {
    let table = align(traces);
    let distance_max = if table.is_empty() {
        charts.distance_fallback_m
    } else {
        table.max_index
    };

    SpeedOverlay {
        table,
        distance_domain: (0.0, distance_max),
        speed_domain: (0.0, speed_ceiling),
    }
}

fn samples(points: &[SpeedTracePoint]) -> Vec<Sample> {
    points
        .iter()
        .map(|p| Sample {
            index: p.distance,
            value: p.speed,
        })
        .collect()
}
