//! # Season API Fetching and Parsing
//!
//! This module owns every interaction with the remote season API: building request paths,
//! issuing HTTP GETs and turning response bodies into the typed values the pipeline works on.
//!
//! ## Endpoints
//!
//! | Endpoint | Path | Parsed into |
//! |----------|------|-------------|
//! | Driver standings | `/api/driver-standings/{year}` | `Vec<StandingEntry>` |
//! | Team standings | `/api/team-standings/{year}` | `Vec<StandingEntry>` |
//! | Calendar | `/api/races/{year}` | `Vec<RaceEvent>` |
//! | Race results | `/api/races/{year}/{round}` | [`RaceResults`] |
//! | Lap positions | `/api/race-positions/{year}/{round}` | `IndexMap<Entity, Vec<Sample>>` |
//! | Tire strategy | `/api/races/tire-strategy/{year}/{round}` | [`TireStrategy`] |
//! | Gear shifts | `/api/gear-shift/{year}/{round}/{driver}` | [`GearShiftTelemetry`] |
//! | Speed comparison | `/api/compare-speed?year&round&driver1&driver2` | [`SpeedComparison`] |
//! | Speed trace | `/api/races/{year}/{round}/{driver}` | [`SpeedTrace`] |
//!
//! ## Validation Rules
//!
//! Each `parse_*` function validates the body before anything reaches chart math:
//! - **Invalid JSON** or a top-level value of the wrong type ⇒ `MalformedResponse`
//! - **Missing or null array field** ⇒ empty sequence (a season with no results yet is normal)
//! - **Present field of the wrong shape** ⇒ `MalformedResponse`
//! - **Element that fails typed decoding** ⇒ `MalformedResponse` naming the element
//!
//! Ergast-backed endpoints send numbers as strings (`"position": "1"`); those are accepted
//! wherever a number is expected.
//!
//! ## Error Handling
//!
//! Transport failures surface as `DashError::Http`, non-2xx answers as `DashError::Status`.
//! No retries are attempted; the caller decides whether to show an empty panel.

use crate::config::ApiConfig;
use crate::standings::{ResultRow, StandingEntry};
use crate::stints::check_stints;
use crate::{DashError, Entity, RaceEvent, Sample, Stint, TelemetryPoint};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// One request the dashboard can make, identified by all of its parameters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endpoint {
    DriverStandings { year: i32 },
    TeamStandings { year: i32 },
    Races { year: i32 },
    RaceResults { year: i32, round: u32 },
    RacePositions { year: i32, round: u32 },
    TireStrategy { year: i32, round: u32 },
    GearShift { year: i32, round: u32, driver: String },
    CompareSpeed { year: i32, round: u32, driver1: String, driver2: String },
    SpeedTrace { year: i32, round: u32, driver: String },
}

impl Endpoint {
    /// Request path, without query string.
    pub fn path(&self) -> String {
        match self {
            Endpoint::DriverStandings { year } => format!("/api/driver-standings/{year}"),
            Endpoint::TeamStandings { year } => format!("/api/team-standings/{year}"),
            Endpoint::Races { year } => format!("/api/races/{year}"),
            Endpoint::RaceResults { year, round } => format!("/api/races/{year}/{round}"),
            Endpoint::RacePositions { year, round } => {
                format!("/api/race-positions/{year}/{round}")
            }
            Endpoint::TireStrategy { year, round } => {
                format!("/api/races/tire-strategy/{year}/{round}")
            }
            Endpoint::GearShift {
                year,
                round,
                driver,
            } => format!("/api/gear-shift/{year}/{round}/{driver}"),
            Endpoint::CompareSpeed { .. } => "/api/compare-speed".to_string(),
            Endpoint::SpeedTrace {
                year,
                round,
                driver,
            } => format!("/api/races/{year}/{round}/{driver}"),
        }
    }

    /// Query parameters; only the speed comparison uses them.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Endpoint::CompareSpeed {
                year,
                round,
                driver1,
                driver2,
            } => vec![
                ("year", year.to_string()),
                ("round", round.to_string()),
                ("driver1", driver1.clone()),
                ("driver2", driver2.clone()),
            ],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())?;
        let query = self.query();
        for (i, (key, value)) in query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{key}={value}")?;
        }
        Ok(())
    }
}

// -- Typed payloads --

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceResults {
    pub event_name: String,
    pub results: Vec<ResultRow>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverStrategy {
    pub driver_number: String,
    pub driver_name: String,
    pub stints: Vec<Stint>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TireStrategy {
    pub event: String,
    pub total_laps: i64,
    pub strategies: IndexMap<Entity, DriverStrategy>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GearShiftTelemetry {
    pub driver_name: String,
    pub telemetry_data: Vec<TelemetryPoint>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeedTracePoint {
    #[serde(deserialize_with = "flex::f64")]
    pub distance: f64,
    #[serde(default, deserialize_with = "flex::opt_f64")]
    pub speed: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverTrace {
    pub name: String,
    pub data: Vec<SpeedTracePoint>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeedComparison {
    pub driver1: DriverTrace,
    pub driver2: DriverTrace,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeedTrace {
    pub driver_name: String,
    pub data: Vec<SpeedTracePoint>,
}

// -- Wire shapes that differ from the typed payloads --

#[derive(Deserialize)]
struct WireDriverStanding {
    #[serde(deserialize_with = "flex::u32")]
    position: u32,
    #[serde(deserialize_with = "flex::f64")]
    points: f64,
    #[serde(rename = "Driver")]
    driver: WireDriver,
}

#[derive(Deserialize)]
struct WireDriver {
    #[serde(rename = "familyName")]
    family_name: String,
}

#[derive(Deserialize)]
struct WireTeamStanding {
    #[serde(deserialize_with = "flex::u32")]
    position: u32,
    #[serde(deserialize_with = "flex::f64")]
    points: f64,
    #[serde(rename = "Constructor")]
    constructor: WireConstructor,
}

#[derive(Deserialize)]
struct WireConstructor {
    name: String,
}

#[derive(Deserialize)]
struct WireLapPosition {
    #[serde(deserialize_with = "flex::f64")]
    lap: f64,
    #[serde(default, deserialize_with = "flex::opt_f64")]
    position: Option<f64>,
}

/// Stints arrive with any two of start, end and count.
#[derive(Deserialize)]
struct WireStint {
    compound: crate::Compound,
    #[serde(default, deserialize_with = "flex::opt_u32")]
    lap_start: Option<u32>,
    #[serde(default, deserialize_with = "flex::opt_u32")]
    lap_end: Option<u32>,
    #[serde(default, deserialize_with = "flex::opt_u32")]
    lap_count: Option<u32>,
}

impl WireStint {
    fn into_stint(self) -> Result<Stint, String> {
        let (lap_start, lap_count) = match (self.lap_start, self.lap_end, self.lap_count) {
            (Some(start), _, Some(count)) => (start, count),
            (Some(start), Some(end), None) if end >= start => {
                let count = (end - start)
                    .checked_add(1)
                    .ok_or_else(|| format!("stint {start}..={end} is too long"))?;
                (start, count)
            }
            (None, Some(end), Some(count)) if count > 0 && end >= count - 1 => {
                (end - (count - 1), count)
            }
            _ => return Err("stint needs two of lap_start, lap_end, lap_count".to_string()),
        };
        Ok(Stint {
            compound: self.compound,
            lap_start,
            lap_count,
        })
    }
}

// -- Parsing --

const DRIVER_STANDINGS: &str = "/api/driver-standings";
const TEAM_STANDINGS: &str = "/api/team-standings";
const RACES: &str = "/api/races";
const RACE_RESULTS: &str = "/api/races/{round}";
const RACE_POSITIONS: &str = "/api/race-positions";
const TIRE_STRATEGY: &str = "/api/races/tire-strategy";
const GEAR_SHIFT: &str = "/api/gear-shift";
const COMPARE_SPEED: &str = "/api/compare-speed";
const SPEED_TRACE: &str = "/api/races/{round}/{driver}";

fn parse_body(endpoint: &str, body: &str) -> Result<Value, DashError> {
    serde_json::from_str(body)
        .map_err(|e| DashError::malformed(endpoint, format!("invalid JSON: {e}")))
}

fn object<'a>(
    endpoint: &str,
    value: &'a Value,
) -> Result<&'a serde_json::Map<String, Value>, DashError> {
    value
        .as_object()
        .ok_or_else(|| DashError::malformed(endpoint, "expected a JSON object"))
}

/// Array under `field`; missing or null degrades to empty, any other shape is malformed.
fn array_field<'a>(
    endpoint: &str,
    value: &'a Value,
    field: &str,
) -> Result<&'a [Value], DashError> {
    match value.get(field) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(DashError::malformed(
            endpoint,
            format!("{field} is not an array"),
        )),
    }
}

fn string_field(endpoint: &str, value: &Value, field: &str) -> Result<String, DashError> {
    match value.get(field) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(DashError::malformed(
            endpoint,
            format!("{field} is not a string"),
        )),
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, value: &Value, what: &str) -> Result<T, DashError> {
    T::deserialize(value).map_err(|e| DashError::malformed(endpoint, format!("{what}: {e}")))
}

fn decode_all<T: DeserializeOwned>(
    endpoint: &str,
    items: &[Value],
    what: &str,
) -> Result<Vec<T>, DashError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| decode(endpoint, item, &format!("{what}[{i}]")))
        .collect()
}

/// Ergast standings: `[ { "<list_field>": [...] } ]`, first season entry only.
fn standings_list<'a>(
    endpoint: &str,
    value: &'a Value,
    list_field: &str,
) -> Result<&'a [Value], DashError> {
    let seasons = value
        .as_array()
        .ok_or_else(|| DashError::malformed(endpoint, "expected a JSON array"))?;
    match seasons.first() {
        None => Ok(&[]),
        Some(season) => array_field(endpoint, season, list_field),
    }
}

pub fn parse_driver_standings(body: &str) -> Result<Vec<StandingEntry>, DashError> {
    let value = parse_body(DRIVER_STANDINGS, body)?;
    let items = standings_list(DRIVER_STANDINGS, &value, "DriverStandings")?;
    let wire: Vec<WireDriverStanding> = decode_all(DRIVER_STANDINGS, items, "DriverStandings")?;
    Ok(wire
        .into_iter()
        .map(|w| StandingEntry {
            position: w.position,
            name: w.driver.family_name,
            points: w.points,
        })
        .collect())
}

pub fn parse_team_standings(body: &str) -> Result<Vec<StandingEntry>, DashError> {
    let value = parse_body(TEAM_STANDINGS, body)?;
    let items = standings_list(TEAM_STANDINGS, &value, "ConstructorStandings")?;
    let wire: Vec<WireTeamStanding> = decode_all(TEAM_STANDINGS, items, "ConstructorStandings")?;
    Ok(wire
        .into_iter()
        .map(|w| StandingEntry {
            position: w.position,
            name: w.constructor.name,
            points: w.points,
        })
        .collect())
}

pub fn parse_races(body: &str) -> Result<Vec<RaceEvent>, DashError> {
    let value = parse_body(RACES, body)?;
    object(RACES, &value)?;
    decode_all(RACES, array_field(RACES, &value, "races")?, "races")
}

pub fn parse_race_results(body: &str) -> Result<RaceResults, DashError> {
    let value = parse_body(RACE_RESULTS, body)?;
    object(RACE_RESULTS, &value)?;
    Ok(RaceResults {
        event_name: string_field(RACE_RESULTS, &value, "event_name")?,
        results: decode_all(
            RACE_RESULTS,
            array_field(RACE_RESULTS, &value, "race_results")?,
            "race_results",
        )?,
    })
}

/// Lap positions keyed by driver, in payload order.
pub fn parse_race_positions(body: &str) -> Result<IndexMap<Entity, Vec<Sample>>, DashError> {
    let value = parse_body(RACE_POSITIONS, body)?;
    let drivers = object(RACE_POSITIONS, &value)?;

    let mut positions = IndexMap::with_capacity(drivers.len());
    for (driver, laps) in drivers {
        let laps: &[Value] = match laps {
            Value::Null => &[],
            Value::Array(items) => items,
            _ => {
                return Err(DashError::malformed(
                    RACE_POSITIONS,
                    format!("{driver} is not an array"),
                ))
            }
        };
        let wire: Vec<WireLapPosition> = decode_all(RACE_POSITIONS, laps, driver)?;
        let samples = wire
            .into_iter()
            .map(|w| Sample {
                index: w.lap,
                value: w.position,
            })
            .collect();
        positions.insert(driver.clone(), samples);
    }
    Ok(positions)
}

pub fn parse_tire_strategy(body: &str) -> Result<TireStrategy, DashError> {
    let value = parse_body(TIRE_STRATEGY, body)?;
    object(TIRE_STRATEGY, &value)?;

    let total_laps = match value.get("total_laps") {
        Some(v) => flex::i64(v)
            .map_err(|e| DashError::malformed(TIRE_STRATEGY, format!("total_laps: {e}")))?,
        None => return Err(DashError::malformed(TIRE_STRATEGY, "missing total_laps")),
    };
    if total_laps <= 0 {
        return Err(DashError::malformed(
            TIRE_STRATEGY,
            format!("total_laps must be positive, got {total_laps}"),
        ));
    }

    let mut strategies = IndexMap::new();
    match value.get("strategies") {
        None | Some(Value::Null) => {}
        Some(Value::Object(drivers)) => {
            for (driver, entry) in drivers {
                strategies.insert(driver.clone(), parse_driver_strategy(driver, entry)?);
            }
        }
        Some(_) => {
            return Err(DashError::malformed(
                TIRE_STRATEGY,
                "strategies is not an object",
            ))
        }
    }

    Ok(TireStrategy {
        event: string_field(TIRE_STRATEGY, &value, "event")?,
        total_laps,
        strategies,
    })
}

fn parse_driver_strategy(driver: &str, entry: &Value) -> Result<DriverStrategy, DashError> {
    object(TIRE_STRATEGY, entry)?;
    let driver_number = match entry.get("driver_number") {
        None | Some(Value::Null) => String::new(),
        Some(v) => flex::string(v).map_err(|e| {
            DashError::malformed(TIRE_STRATEGY, format!("{driver}.driver_number: {e}"))
        })?,
    };
    let wire: Vec<WireStint> = decode_all(
        TIRE_STRATEGY,
        array_field(TIRE_STRATEGY, entry, "stints")?,
        &format!("{driver}.stints"),
    )?;
    let stints = wire
        .into_iter()
        .map(WireStint::into_stint)
        .collect::<Result<Vec<_>, _>>()
        .and_then(|stints| check_stints(&stints).map(|()| stints))
        .map_err(|e| DashError::malformed(TIRE_STRATEGY, format!("{driver}: {e}")))?;

    Ok(DriverStrategy {
        driver_number,
        driver_name: string_field(TIRE_STRATEGY, entry, "driver_name")?,
        stints,
    })
}

pub fn parse_gear_shift(body: &str) -> Result<GearShiftTelemetry, DashError> {
    let value = parse_body(GEAR_SHIFT, body)?;
    object(GEAR_SHIFT, &value)?;
    Ok(GearShiftTelemetry {
        driver_name: string_field(GEAR_SHIFT, &value, "driver_name")?,
        telemetry_data: decode_all(
            GEAR_SHIFT,
            array_field(GEAR_SHIFT, &value, "telemetry_data")?,
            "telemetry_data",
        )?,
    })
}

fn driver_trace(endpoint: &str, value: &Value, field: &str) -> Result<DriverTrace, DashError> {
    match value.get(field) {
        None | Some(Value::Null) => Ok(DriverTrace::default()),
        Some(trace @ Value::Object(_)) => Ok(DriverTrace {
            name: string_field(endpoint, trace, "name")?,
            data: decode_all(
                endpoint,
                array_field(endpoint, trace, "data")?,
                &format!("{field}.data"),
            )?,
        }),
        Some(_) => Err(DashError::malformed(
            endpoint,
            format!("{field} is not an object"),
        )),
    }
}

pub fn parse_compare_speed(body: &str) -> Result<SpeedComparison, DashError> {
    let value = parse_body(COMPARE_SPEED, body)?;
    object(COMPARE_SPEED, &value)?;
    Ok(SpeedComparison {
        driver1: driver_trace(COMPARE_SPEED, &value, "driver1")?,
        driver2: driver_trace(COMPARE_SPEED, &value, "driver2")?,
    })
}

pub fn parse_speed_trace(body: &str) -> Result<SpeedTrace, DashError> {
    let value = parse_body(SPEED_TRACE, body)?;
    object(SPEED_TRACE, &value)?;
    Ok(SpeedTrace {
        driver_name: string_field(SPEED_TRACE, &value, "driverName")?,
        data: decode_all(
            SPEED_TRACE,
            array_field(SPEED_TRACE, &value, "data")?,
            "data",
        )?,
    })
}

// -- Client --

/// Thin async client over the season API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, DashError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(ApiClient {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, endpoint: &Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// GET the endpoint and return the raw body of a 2xx response.
    pub async fn fetch(&self, endpoint: &Endpoint) -> Result<String, DashError> {
        debug!(%endpoint, "fetching");
        let response = self
            .http
            .get(self.url(endpoint))
            .query(&endpoint.query())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DashError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }

    pub async fn driver_standings(&self, year: i32) -> Result<Vec<StandingEntry>, DashError> {
        parse_driver_standings(&self.fetch(&Endpoint::DriverStandings { year }).await?)
    }

    pub async fn team_standings(&self, year: i32) -> Result<Vec<StandingEntry>, DashError> {
        parse_team_standings(&self.fetch(&Endpoint::TeamStandings { year }).await?)
    }

    pub async fn races(&self, year: i32) -> Result<Vec<RaceEvent>, DashError> {
        parse_races(&self.fetch(&Endpoint::Races { year }).await?)
    }

    pub async fn race_results(&self, year: i32, round: u32) -> Result<RaceResults, DashError> {
        parse_race_results(&self.fetch(&Endpoint::RaceResults { year, round }).await?)
    }

    pub async fn race_positions(
        &self,
        year: i32,
        round: u32,
    ) -> Result<IndexMap<Entity, Vec<Sample>>, DashError> {
        parse_race_positions(&self.fetch(&Endpoint::RacePositions { year, round }).await?)
    }

    pub async fn tire_strategy(&self, year: i32, round: u32) -> Result<TireStrategy, DashError> {
        parse_tire_strategy(&self.fetch(&Endpoint::TireStrategy { year, round }).await?)
    }

    pub async fn gear_shift(
        &self,
        year: i32,
        round: u32,
        driver: &str,
    ) -> Result<GearShiftTelemetry, DashError> {
        let endpoint = Endpoint::GearShift {
            year,
            round,
            driver: driver.to_string(),
        };
        parse_gear_shift(&self.fetch(&endpoint).await?)
    }

    pub async fn compare_speed(
        &self,
        year: i32,
        round: u32,
        driver1: &str,
        driver2: &str,
    ) -> Result<SpeedComparison, DashError> {
        let endpoint = Endpoint::CompareSpeed {
            year,
            round,
            driver1: driver1.to_string(),
            driver2: driver2.to_string(),
        };
        parse_compare_speed(&self.fetch(&endpoint).await?)
    }

    pub async fn speed_trace(
        &self,
        year: i32,
        round: u32,
        driver: &str,
    ) -> Result<SpeedTrace, DashError> {
        let endpoint = Endpoint::SpeedTrace {
            year,
            round,
            driver: driver.to_string(),
        };
        parse_speed_trace(&self.fetch(&endpoint).await?)
    }
}

/// Lenient number decoding for payloads that mix JSON numbers and numeric strings.
pub(crate) mod flex {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Num(f64),
        Text(String),
    }

    fn number(n: Number) -> Result<Option<f64>, String> {
        match n {
            Number::Num(v) => Ok(Some(v)),
            Number::Text(s) if s.trim().is_empty() => Ok(None),
            Number::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| format!("{s:?} is not a number")),
        }
    }

    fn whole(v: f64) -> Result<u32, String> {
        if v.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&v) {
            Ok(v as u32)
        } else {
            Err(format!("{v} is not a non-negative whole number"))
        }
    }

    pub fn f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        number(Number::deserialize(d)?)
            .map_err(D::Error::custom)?
            .ok_or_else(|| D::Error::custom("empty number"))
    }

    pub fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        match Option::<Number>::deserialize(d)? {
            Some(n) => number(n).map_err(D::Error::custom),
            None => Ok(None),
        }
    }

    pub fn u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        whole(f64(d)?).map_err(D::Error::custom)
    }

    pub fn opt_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        opt_f64(d)?
            .map(whole)
            .transpose()
            .map_err(D::Error::custom)
    }

    /// Whole number from a JSON value, accepting `57`, `57.0` and `"57"`.
    pub fn i64(value: &Value) -> Result<i64, String> {
        let v = match value {
            Value::Number(n) => n.as_f64().ok_or("not a finite number")?,
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("{s:?} is not a number"))?,
            _ => return Err("expected a number".to_string()),
        };
        if v.fract() != 0.0 {
            return Err(format!("{v} is not a whole number"));
        }
        Ok(v as i64)
    }

    /// Identifier that may arrive as a number or a string.
    pub fn string(value: &Value) -> Result<String, String> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            _ => Err("expected a string or number".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Compound, ErrorKind, RaceStatus};
    use chrono::NaiveDate;

    #[test]
    fn endpoint_paths() {
        assert_eq!(
            Endpoint::DriverStandings { year: 2024 }.path(),
            "/api/driver-standings/2024"
        );
        assert_eq!(
            Endpoint::TireStrategy { year: 2024, round: 5 }.path(),
            "/api/races/tire-strategy/2024/5"
        );
        assert_eq!(
            Endpoint::GearShift {
                year: 2023,
                round: 1,
                driver: "VER".into()
            }
            .path(),
            "/api/gear-shift/2023/1/VER"
        );
        let compare = Endpoint::CompareSpeed {
            year: 2024,
            round: 3,
            driver1: "HAM".into(),
            driver2: "LEC".into(),
        };
        assert_eq!(
            compare.to_string(),
            "/api/compare-speed?year=2024&round=3&driver1=HAM&driver2=LEC"
        );
        assert!(Endpoint::Races { year: 2024 }.query().is_empty());
    }

    #[test]
    fn client_joins_base_url() {
        let client = ApiClient::new(&ApiConfig {
            base_url: "http://localhost:8000/".into(),
            timeout_secs: 1,
        })
        .unwrap();
        assert_eq!(
            client.url(&Endpoint::Races { year: 2022 }),
            "http://localhost:8000/api/races/2022"
        );
    }

    #[test]
    fn driver_standings_accept_ergast_strings() {
        let body = r#"[{"season":"2024","round":"24","DriverStandings":[
            {"position":"1","positionText":"1","points":"437","wins":"9","Driver":{"driverId":"max_verstappen","familyName":"Verstappen"}},
            {"position":"2","points":374,"Driver":{"familyName":"Norris"}}
        ]}]"#;
        let standings = parse_driver_standings(body).unwrap();
        assert_eq!(standings.len(), 2);
        assert_eq!(standings[0].position, 1);
        assert_eq!(standings[0].name, "Verstappen");
        assert_eq!(standings[0].points, 437.0);
        assert_eq!(standings[1].points, 374.0);
    }

    #[test]
    fn empty_or_missing_standings_degrade() {
        assert!(parse_driver_standings("[]").unwrap().is_empty());
        assert!(parse_team_standings(r#"[{"season":"2026"}]"#)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn standings_of_wrong_shape_are_malformed() {
        let err = parse_team_standings(r#"{"ConstructorStandings":[]}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);

        let err = parse_team_standings(r#"[{"ConstructorStandings":"none"}]"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);

        let err = parse_driver_standings("not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn team_standings_use_constructor_name() {
        let body = r#"[{"ConstructorStandings":[
            {"position":"1","points":"666","Constructor":{"name":"McLaren"}}
        ]}]"#;
        let standings = parse_team_standings(body).unwrap();
        assert_eq!(standings[0].name, "McLaren");
        assert_eq!(standings[0].points, 666.0);
    }

    #[test]
    fn races_parse_with_optional_status() {
        let body = r#"{"races":[
            {"round":1,"name":"Bahrain Grand Prix","event_name":"Bahrain Grand Prix","date":"2024-03-02","country":"Bahrain","location":"Sakhir"},
            {"round":2,"event_name":"Saudi Arabian Grand Prix","date":"2024-03-09","location":"Jeddah","race_status":"Race Day"}
        ]}"#;
        let races = parse_races(body).unwrap();
        assert_eq!(races.len(), 2);
        assert_eq!(races[0].date, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!(races[0].status, None);
        assert_eq!(races[1].status, Some(RaceStatus::RaceDay));
        assert_eq!(races[1].country, "");
    }

    #[test]
    fn races_missing_field_is_empty_but_wrong_type_is_malformed() {
        assert!(parse_races("{}").unwrap().is_empty());
        assert!(parse_races(r#"{"races":null}"#).unwrap().is_empty());
        assert!(parse_races(r#"{"races":{"round":1}}"#).is_err());
        assert!(parse_races(r#"{"races":[{"round":1}]}"#).is_err());
    }

    #[test]
    fn race_results_rows() {
        let body = r#"{"event_name":"Monaco Grand Prix","race_results":[
            {"position":1.0,"fullName":"Charles Leclerc","team":"Ferrari","points":25.0,"status":"Finished","gridPosition":1.0,"time":"0 days 02:23:15"},
            {"position":null,"fullName":"Sergio Perez","team":"Red Bull Racing","points":0,"status":"Accident"}
        ]}"#;
        let results = parse_race_results(body).unwrap();
        assert_eq!(results.event_name, "Monaco Grand Prix");
        assert_eq!(results.results[0].position, Some(1));
        assert_eq!(results.results[0].grid_position, Some(1));
        assert_eq!(results.results[1].position, None);
        assert_eq!(results.results[1].status.as_deref(), Some("Accident"));
    }

    #[test]
    fn race_positions_keep_driver_order_and_nulls() {
        let body = r#"{
            "VER":[{"lap":1,"position":1},{"lap":2,"position":1}],
            "ALB":[{"lap":1,"position":null}],
            "SAR":null
        }"#;
        let positions = parse_race_positions(body).unwrap();
        let drivers: Vec<&String> = positions.keys().collect();
        assert_eq!(drivers, vec!["VER", "ALB", "SAR"]);
        assert_eq!(positions["VER"].len(), 2);
        assert_eq!(positions["ALB"][0].value, None);
        assert!(positions["SAR"].is_empty());

        assert!(parse_race_positions(r#"{"VER":{"lap":1}}"#).is_err());
        assert!(parse_race_positions("[]").is_err());
    }

    #[test]
    fn tire_strategy_derives_missing_stint_fields() {
        let body = r#"{"event":"Bahrain Grand Prix","total_laps":57,"strategies":{
            "1":{"driver_number":"1","driver_name":"Max Verstappen","stints":[
                {"compound":"SOFT","lap_start":1,"lap_end":17,"lap_count":17},
                {"compound":"HARD","lap_start":18,"lap_end":57}
            ]},
            "44":{"driver_number":44,"driver_name":"Lewis Hamilton","stints":[
                {"compound":"MEDIUM","lap_end":20,"lap_count":20},
                {"compound":"TEST_UNKNOWN","lap_start":21,"lap_count":5}
            ]}
        }}"#;
        let strategy = parse_tire_strategy(body).unwrap();
        assert_eq!(strategy.total_laps, 57);
        assert_eq!(strategy.event, "Bahrain Grand Prix");

        let ver = &strategy.strategies["1"];
        assert_eq!(ver.stints[1].lap_count, 40);
        assert_eq!(ver.stints[1].compound, Compound::Hard);

        let ham = &strategy.strategies["44"];
        assert_eq!(ham.driver_number, "44");
        assert_eq!(ham.stints[0].lap_start, 1);
        assert_eq!(ham.stints[1].compound, Compound::Unknown);
    }

    #[test]
    fn tire_strategy_requires_total_laps() {
        let err = parse_tire_strategy(r#"{"event":"x","strategies":{}}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);

        let strategy = parse_tire_strategy(r#"{"event":"x","total_laps":"58"}"#).unwrap();
        assert_eq!(strategy.total_laps, 58);
        assert!(strategy.strategies.is_empty());

        let err = parse_tire_strategy(
            r#"{"total_laps":57,"strategies":{"1":{"stints":[{"compound":"SOFT","lap_start":1}]}}}"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn tire_strategy_rejects_impossible_laps() {
        let with_stints = |total_laps: &str, stints: &str| {
            parse_tire_strategy(&format!(
                r#"{{"event":"x","total_laps":{total_laps},"strategies":{{
                    "1":{{"driver_number":"1","driver_name":"Max Verstappen","stints":{stints}}}
                }}}}"#
            ))
        };
        let malformed = |result: Result<TireStrategy, DashError>| {
            matches!(result, Err(e) if e.kind() == ErrorKind::MalformedResponse)
        };

        assert!(malformed(with_stints("0", "[]")));
        assert!(malformed(with_stints("-4", "[]")));
        // Gap between lap 10 and lap 12
        assert!(malformed(with_stints(
            "57",
            r#"[{"compound":"SOFT","lap_start":1,"lap_count":10},
                {"compound":"HARD","lap_start":12,"lap_count":19}]"#
        )));
        assert!(malformed(with_stints(
            "57",
            r#"[{"compound":"SOFT","lap_start":0,"lap_count":10}]"#
        )));
        assert!(malformed(with_stints(
            "57",
            r#"[{"compound":"SOFT","lap_start":4294967295,"lap_count":2}]"#
        )));
        assert!(malformed(with_stints(
            "57",
            r#"[{"compound":"SOFT","lap_start":0,"lap_end":4294967295}]"#
        )));
        assert!(malformed(with_stints(
            "57",
            r#"[{"compound":"SOFT","lap_end":4294967295,"lap_count":0}]"#
        )));

        let ok = with_stints(
            "57",
            r#"[{"compound":"SOFT","lap_end":4294967295,"lap_count":1}]"#,
        )
        .unwrap();
        assert_eq!(ok.strategies["1"].stints[0].lap_start, u32::MAX);
    }

    #[test]
    fn gear_shift_points() {
        let body = r#"{"driver_name":"Max Verstappen","telemetry_data":[
            {"x":100.5,"y":-20.0,"distance":0.0,"speed":280,"gear":7,"time":0.0},
            {"x":101.0,"y":-19.0,"distance":3.5,"speed":282,"gear":8}
        ]}"#;
        let telemetry = parse_gear_shift(body).unwrap();
        assert_eq!(telemetry.driver_name, "Max Verstappen");
        assert_eq!(telemetry.telemetry_data.len(), 2);
        assert_eq!(telemetry.telemetry_data[1].gear, 8);
        assert_eq!(telemetry.telemetry_data[1].time, None);

        assert!(parse_gear_shift(r#"{"driver_name":"x"}"#)
            .unwrap()
            .telemetry_data
            .is_empty());
    }

    #[test]
    fn compare_speed_missing_driver_degrades() {
        let body = r#"{"driver1":{"name":"Lewis Hamilton","data":[{"distance":0.0,"speed":281.0}]}}"#;
        let comparison = parse_compare_speed(body).unwrap();
        assert_eq!(comparison.driver1.data.len(), 1);
        assert_eq!(comparison.driver2, DriverTrace::default());

        assert!(parse_compare_speed(r#"{"driver1":[1,2]}"#).is_err());
    }

    #[test]
    fn speed_trace_uses_camel_case_name() {
        let body = r#"{"driverName":"Lando Norris","data":[{"distance":"12.5","speed":null}]}"#;
        let trace = parse_speed_trace(body).unwrap();
        assert_eq!(trace.driver_name, "Lando Norris");
        assert_eq!(trace.data[0].distance, 12.5);
        assert_eq!(trace.data[0].speed, None);
    }
}
