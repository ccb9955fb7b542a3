//! # End-to-End Pipeline Tests
//!
//! Raw response bodies go through the matching parser and on into chart assembly, the way
//! the dashboard consumes them. Each test covers one view.

use crate::api::{
    parse_compare_speed, parse_driver_standings, parse_gear_shift, parse_race_positions,
    parse_races, parse_tire_strategy, Endpoint,
};
use crate::colors::{Color, LIGHT_GRAY};
use crate::config::{ChartsConfig, Config};
use crate::dispatch::Dispatcher;
use crate::series::Cell;
use crate::state::{FileStore, SelectionStore, Tab, ViewSelection};
use crate::stints::SegmentKind;
use crate::telemetry::speed_overlay;
use crate::views::{self, Panel};
use crate::{Compound, ErrorKind, RaceEvent, RaceStatus};
use chrono::{TimeZone, Utc};
use tempfile::tempdir;

/// Positions for two drivers where one retires after lap 2.
///
/// The retired driver's later laps must show up as absent cells, not as position 0.
#[test]
fn retired_driver_leaves_absent_cells() {
    let body = r#"{
        "VER": [{"lap": 1, "position": 1}, {"lap": 2, "position": 1}, {"lap": 3, "position": 1}],
        "HUL": [{"lap": 1, "position": 14}, {"lap": 2, "position": 16}]
    }"#;
    let positions = parse_race_positions(body).unwrap();
    let chart = views::positions_chart(&positions, &ChartsConfig::default()).unwrap();

    assert_eq!(chart.table.rows.len(), 3);
    assert_eq!(chart.table.rows[2].cells["HUL"], Cell::Absent);
    assert_eq!(chart.table.rows[2].cells["VER"], Cell::Present(Some(1.0)));
    assert_eq!(chart.max_position, 17.0, "worst position 16 plus one");
    assert_eq!(chart.lap_ticks, vec![1, 3]);
    // White team livery is drawn light gray
    assert_eq!(chart.colors["HUL"], Color::new(LIGHT_GRAY));
}

/// Drivers keep their payload position, so unknown drivers get palette colors by where
/// they appear in the response, not by name.
#[test]
fn fallback_colors_follow_payload_order() {
    let body = r#"{
        "ZHO": [{"lap": 1, "position": 18}],
        "VER": [{"lap": 1, "position": 1}],
        "BEA": [{"lap": 1, "position": 12}]
    }"#;
    let positions = parse_race_positions(body).unwrap();
    let chart = views::positions_chart(&positions, &ChartsConfig::default()).unwrap();

    assert_eq!(chart.table.entities, vec!["ZHO", "VER", "BEA"]);
    let columns: Vec<&str> = chart.colors.keys().map(String::as_str).collect();
    assert_eq!(columns, vec!["ZHO", "VER", "BEA"]);

    let palette = &ChartsConfig::default().fallback_palette;
    assert_eq!(chart.colors["ZHO"], palette[0]);
    assert_eq!(chart.colors["VER"].as_str(), "#3671C6");
    assert_eq!(chart.colors["BEA"], palette[2]);
}

/// Strategy payload with a finisher, a retirement and an unsorted driver order.
#[test]
fn strategy_payload_to_chart() {
    let body = r#"{
        "event": "Bahrain Grand Prix",
        "total_laps": 57,
        "strategies": {
            "HAM": {
                "driver_number": "44",
                "driver_name": "Lewis Hamilton",
                "stints": [
                    {"compound": "SOFT", "lap_start": 1, "lap_end": 18},
                    {"compound": "HARD", "lap_start": 19, "lap_end": 57}
                ]
            },
            "VER": {
                "driver_number": 1,
                "driver_name": "Max Verstappen",
                "stints": [
                    {"compound": "MEDIUM", "lap_start": 1, "lap_count": 30}
                ]
            }
        }
    }"#;
    let strategy = parse_tire_strategy(body).unwrap();
    let chart = views::strategy_chart(&strategy).unwrap();

    assert_eq!(chart.event, "Bahrain Grand Prix");
    let labels: Vec<&str> = chart.rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["VERSTAPPEN", "HAMILTON"]);

    let ver = &chart.rows[0];
    assert!(ver.did_not_finish);
    assert_eq!(ver.segments.len(), 2);
    assert_eq!(ver.segments[0].width_fraction, 1.0);
    assert_eq!(ver.segments[1].kind, SegmentKind::Dnf);
    assert_eq!(ver.segments[1].laps, 27);

    let ham = &chart.rows[1];
    assert!(!ham.did_not_finish);
    assert_eq!(ham.laps_completed, 57);
    let total: f64 = ham.segments.iter().map(|s| s.width_fraction).sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert_eq!(
        ham.segments[1].kind,
        SegmentKind::Compound(Compound::Hard)
    );
}

/// Impossible lap data from the server empties the strategy panel instead of failing.
#[test]
fn impossible_strategy_becomes_unavailable_panel() {
    let zero_laps = r#"{"event": "Cancelled", "total_laps": 0, "strategies": {
        "VER": {"driver_number": "1", "driver_name": "Max Verstappen",
                "stints": [{"compound": "SOFT", "lap_start": 1, "lap_count": 3}]}
    }}"#;
    let gap = r#"{"event": "Monaco Grand Prix", "total_laps": 78, "strategies": {
        "LEC": {"driver_number": "16", "driver_name": "Charles Leclerc", "stints": [
            {"compound": "MEDIUM", "lap_start": 1, "lap_count": 10},
            {"compound": "HARD", "lap_start": 12, "lap_count": 19}
        ]}
    }}"#;
    let overflow = r#"{"event": "Monaco Grand Prix", "total_laps": 78, "strategies": {
        "LEC": {"driver_number": "16", "driver_name": "Charles Leclerc",
                "stints": [{"compound": "SOFT", "lap_start": 4294967295, "lap_count": 2}]}
    }}"#;

    for body in [zero_laps, gap, overflow] {
        let chart = Panel::from_result("tire strategy", parse_tire_strategy(body))
            .and_then(|panel| panel.try_map(|s| views::strategy_chart(&s)))
            .unwrap();
        assert_eq!(
            chart,
            Panel::Unavailable {
                message: "Unable to load tire strategy".to_string()
            }
        );
    }
}

/// Malformed bodies degrade to an unavailable panel instead of failing the view.
#[test]
fn malformed_body_becomes_unavailable_panel() {
    let err = parse_races(r#"{"races": {"round": 1}}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedResponse);

    let panel: Panel<Vec<RaceEvent>> = Panel::from_result("races", Err(err)).unwrap();
    assert_eq!(
        panel,
        Panel::Unavailable {
            message: "Unable to load races".to_string()
        }
    );
}

/// Overview built from raw standings and calendar bodies.
#[test]
fn overview_from_raw_bodies() {
    let standings = r#"[{"DriverStandings": [
        {"position": "1", "points": "437", "Driver": {"familyName": "Verstappen"}},
        {"position": "2", "points": "374", "Driver": {"familyName": "Norris"}}
    ]}]"#;
    let races = r#"{"races": [
        {"round": 2, "event_name": "Saudi Arabian Grand Prix", "date": "2024-03-09"},
        {"round": 1, "event_name": "Bahrain Grand Prix", "date": "2024-03-02"},
        {"round": 3, "event_name": "Australian Grand Prix", "date": "2024-03-24"}
    ]}"#;
    let now = Utc.with_ymd_and_hms(2024, 3, 9, 15, 0, 0).unwrap();

    let view = views::overview(
        Panel::from_result("driver standings", parse_driver_standings(standings)).unwrap(),
        Panel::Loading,
        Panel::from_result("races", parse_races(races)).unwrap(),
        now,
        5,
    );

    let drivers = view.drivers.ready().unwrap();
    assert_eq!(drivers[0].name, "Verstappen");
    assert!(drivers[0].leader);
    assert_eq!(view.teams, Panel::Loading);

    // Race day counts as already started
    let picked = view.races.ready().unwrap();
    assert_eq!(picked[0].round, 2);
    assert_eq!(picked[0].status, Some(RaceStatus::RaceDay));
    assert_eq!(picked[1].round, 3);
}

/// Comparing a driver against themself keeps both traces.
#[test]
fn self_comparison_keeps_two_columns() {
    let body = r#"{
        "driver1": {"name": "VER", "data": [{"distance": 0, "speed": 280}, {"distance": 50, "speed": 300}]},
        "driver2": {"name": "VER", "data": [{"distance": 25, "speed": 290}]}
    }"#;
    let comparison = parse_compare_speed(body).unwrap();
    let overlay = speed_overlay(&comparison, &ChartsConfig::default());

    assert_eq!(overlay.table.entities, vec!["VER", "VER (2)"]);
    assert_eq!(overlay.table.rows.len(), 3);
    assert_eq!(overlay.distance_domain, (0.0, 50.0));
    assert_eq!(overlay.speed_domain, (0.0, 350.0));
}

/// Gear telemetry with an out-of-range gear keeps every point.
#[test]
fn gear_payload_to_chart() {
    let body = r#"{"driver_name": "Charles Leclerc", "telemetry_data": [
        {"x": 0.0, "y": 0.0, "gear": 3},
        {"x": 1.0, "y": 0.5, "gear": 8},
        {"x": 2.0, "y": 1.5, "gear": 3},
        {"x": 3.0, "y": 1.0, "gear": 0}
    ]}"#;
    let chart = crate::telemetry::gear_chart(&parse_gear_shift(body).unwrap());

    let gears: Vec<i32> = chart.series.iter().map(|s| s.gear).collect();
    assert_eq!(gears, vec![0, 3, 8]);
    let points: usize = chart.series.iter().map(|s| s.points.len()).sum();
    assert_eq!(points, 4);
    assert_eq!(chart.legend.len(), 8);
}

/// A response that arrives after the driver changed is dropped.
#[test]
fn stale_gear_response_is_dropped() {
    let mut dispatcher = Dispatcher::new();
    let gear = |driver: &str| Endpoint::GearShift {
        year: 2024,
        round: 8,
        driver: driver.to_string(),
    };
    let first = dispatcher.issue(gear("VER"));
    let second = dispatcher.issue(gear("LEC"));

    let body = r#"{"driver_name": "Max Verstappen", "telemetry_data": []}"#;
    assert!(dispatcher.accept(&first, parse_gear_shift(body)).is_none());
    assert!(dispatcher
        .accept(&second, parse_gear_shift(body))
        .is_some());
}

/// Selections survive a restart through the file store, keyed by season and round.
#[test]
fn selection_round_trip_through_file_store() {
    let dir = tempdir().unwrap();
    let mut config = Config::default();
    config.state.path = dir.path().join("state.json");

    let mut store = SelectionStore::new(FileStore::new(&config.state.path));
    let selection = ViewSelection {
        year: 2021,
        round: Some(22),
        tab: Tab::Positions,
        ..ViewSelection::defaults(&config.season)
    };
    store.save(&selection).unwrap();

    let reopened = SelectionStore::new(FileStore::new(&config.state.path));
    let resolved = reopened.resolve(None, Some(22), &config.season).unwrap();
    assert_eq!(resolved, selection);

    // A different round of the same season starts from the defaults
    let other = reopened.resolve(None, Some(1), &config.season).unwrap();
    assert_eq!(other.year, 2021);
    assert_eq!(other.tab, Tab::Results);
}
