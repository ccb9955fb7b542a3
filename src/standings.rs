//! Championship standings and race classification rows.

use crate::api::flex;
use serde::{Deserialize, Serialize};

/// One championship entry, driver or constructor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandingEntry {
    pub position: u32,
    pub name: String,
    pub points: f64,
}

/// A standings card row; the championship leader is highlighted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandingRow {
    pub position: u32,
    pub name: String,
    pub points: f64,
    pub leader: bool,
}

/// First `n` entries in payload order, the first one flagged as leader.
pub fn top_rows(entries: &[StandingEntry], n: usize) -> Vec<StandingRow> {
    entries
        .iter()
        .take(n)
        .enumerate()
        .map(|(i, entry)| StandingRow {
            position: entry.position,
            name: entry.name.clone(),
            points: entry.points,
            leader: i == 0,
        })
        .collect()
}

/// One line of a race classification. Unclassified drivers have no position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRow {
    #[serde(default, deserialize_with = "flex::opt_u32")]
    pub position: Option<u32>,
    pub full_name: String,
    #[serde(default)]
    pub team: String,
    #[serde(default, deserialize_with = "flex::opt_f64")]
    pub points: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "flex::opt_u32")]
    pub grid_position: Option<u32>,
    #[serde(default)]
    pub time: Option<String>,
}
