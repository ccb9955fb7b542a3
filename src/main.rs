//! # Race Dash Entry Point
//!
//! Command-line front end over the race-data pipeline. Each subcommand fetches what one
//! dashboard view needs, runs it through the pure transforms and prints the chart-ready
//! result as JSON on stdout.
//!
//! Season, round and driver picks left off the command line are taken from the persisted
//! selection and then from the configuration defaults. The resolved selection is saved
//! back so the next run starts where this one ended.

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};
use race_dash_lib::api::{ApiClient, Endpoint};
use race_dash_lib::config::{Config, SeasonConfig, CONFIG_FILE};
use race_dash_lib::dispatch::{Dispatcher, Ticket};
use race_dash_lib::state::{FileStore, SelectionStore, Tab, ViewSelection};
use race_dash_lib::views::{self, Panel};
use race_dash_lib::{calendar, telemetry, DashError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "race-dash", version, about = "Race data as chart-ready JSON")]
struct Cli {
    /// Config file [default: race-dash.toml]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Season, e.g. 2024
    #[arg(long, global = true)]
    year: Option<i32>,

    /// Round within the season
    #[arg(long, global = true)]
    round: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the default configuration to the config file
    InitConfig {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
    /// Seasons and drivers offered by the pickers
    Seasons,
    /// Standings leaders and the last/next race
    Overview,
    /// Full season calendar
    Races,
    /// Race classification
    Results,
    /// Lap-by-lap positions
    Positions,
    /// Tire stints per driver
    Strategy,
    /// Track map bucketed by gear
    Gears {
        #[arg(long)]
        driver: Option<String>,
    },
    /// Two drivers' speed over distance
    Compare {
        #[arg(long)]
        driver1: Option<String>,
        #[arg(long)]
        driver2: Option<String>,
    },
    /// One driver's speed over distance
    Trace {
        #[arg(long)]
        driver: Option<String>,
    },
}

impl Command {
    fn tab(&self) -> Option<Tab> {
        match self {
            Command::InitConfig { .. }
            | Command::Seasons
            | Command::Overview
            | Command::Races => None,
            Command::Results => Some(Tab::Results),
            Command::Positions => Some(Tab::Positions),
            Command::Strategy => Some(Tab::Strategy),
            Command::Gears { .. } | Command::Compare { .. } | Command::Trace { .. } => {
                Some(Tab::Telemetry)
            }
        }
    }
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(run(cli, config))
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let mut store = SelectionStore::new(FileStore::new(&config.state.path));
    let mut selection = match store.resolve(cli.year, cli.round, &config.season) {
        Ok(selection) => selection,
        Err(e) => {
            // An unreadable store must not block the dashboard
            warn!(error = %e, "selection store unavailable, using defaults");
            ViewSelection {
                year: cli.year.unwrap_or(config.season.default_year),
                round: cli.round,
                ..ViewSelection::defaults(&config.season)
            }
        }
    };
    apply_overrides(&mut selection, &cli.command, &config.season)?;

    let client = ApiClient::new(&config.api)?;
    let mut dispatcher = Dispatcher::new();
    let year = selection.year;

    match &cli.command {
        Command::InitConfig { force } => return init_config(cli.config.as_deref(), *force),
        Command::Seasons => print_json(&SeasonPicker {
            years: calendar::season_years(config.season.first_year, config.season.year_count),
            default_year: config.season.default_year,
            drivers: &config.season.drivers,
            selected: &selection,
        })?,
        Command::Overview => {
            let drivers = dispatcher.issue(Endpoint::DriverStandings { year });
            let teams = dispatcher.issue(Endpoint::TeamStandings { year });
            let races = dispatcher.issue(Endpoint::Races { year });
            let (d, t, r) = tokio::join!(
                client.driver_standings(year),
                client.team_standings(year),
                client.races(year),
            );
            let view = views::overview(
                panel(&dispatcher, &drivers, "driver standings", d)?,
                panel(&dispatcher, &teams, "team standings", t)?,
                panel(&dispatcher, &races, "races", r)?,
                Utc::now(),
                config.charts.standings_rows,
            );
            print_json(&view)?;
        }
        Command::Races => {
            let ticket = dispatcher.issue(Endpoint::Races { year });
            let races = panel(&dispatcher, &ticket, "races", client.races(year).await)?;
            print_json(&races.map(|races| views::calendar(races, Utc::now())))?;
        }
        Command::Results => {
            let round = require_round(&selection)?;
            let ticket = dispatcher.issue(Endpoint::RaceResults { year, round });
            let results = client.race_results(year, round).await;
            let results = panel(&dispatcher, &ticket, "results", results)?;
            print_json(&results.map(views::results_table))?;
        }
        Command::Positions => {
            let round = require_round(&selection)?;
            let ticket = dispatcher.issue(Endpoint::RacePositions { year, round });
            let positions = client.race_positions(year, round).await;
            let chart = panel(&dispatcher, &ticket, "positions", positions)?
                .try_map(|p| views::positions_chart(&p, &config.charts))?;
            print_json(&chart)?;
        }
        Command::Strategy => {
            let round = require_round(&selection)?;
            let ticket = dispatcher.issue(Endpoint::TireStrategy { year, round });
            let strategy = client.tire_strategy(year, round).await;
            let chart = panel(&dispatcher, &ticket, "tire strategy", strategy)?
                .try_map(|s| views::strategy_chart(&s))?;
            print_json(&chart)?;
        }
        Command::Gears { .. } => {
            let round = require_round(&selection)?;
            let driver = selection.driver.clone();
            let ticket = dispatcher.issue(Endpoint::GearShift {
                year,
                round,
                driver: driver.clone(),
            });
            let data = client.gear_shift(year, round, &driver).await;
            let chart = panel(&dispatcher, &ticket, "gear shifts", data)?
                .map(|t| telemetry::gear_chart(&t));
            print_json(&chart)?;
        }
        Command::Compare { .. } => {
            let round = require_round(&selection)?;
            let (driver1, driver2) = selection.pair.clone();
            let ticket = dispatcher.issue(Endpoint::CompareSpeed {
                year,
                round,
                driver1: driver1.clone(),
                driver2: driver2.clone(),
            });
            let data = client.compare_speed(year, round, &driver1, &driver2).await;
            let chart = panel(&dispatcher, &ticket, "speed comparison", data)?
                .map(|c| telemetry::speed_overlay(&c, &config.charts));
            print_json(&chart)?;
        }
        Command::Trace { .. } => {
            let round = require_round(&selection)?;
            let driver = selection.driver.clone();
            let ticket = dispatcher.issue(Endpoint::SpeedTrace {
                year,
                round,
                driver: driver.clone(),
            });
            let data = client.speed_trace(year, round, &driver).await;
            let chart = panel(&dispatcher, &ticket, "speed trace", data)?
                .map(|t| telemetry::speed_trace(&t, &config.charts));
            print_json(&chart)?;
        }
    }

    if let Err(e) = store.save(&selection) {
        warn!(error = %e, "could not persist selection");
    } else {
        info!(key = %selection.key(), "selection saved");
    }
    Ok(())
}

#[derive(Serialize)]
struct SeasonPicker<'a> {
    years: Vec<i32>,
    default_year: i32,
    drivers: &'a [String],
    selected: &'a ViewSelection,
}

fn init_config(path: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or(Path::new(CONFIG_FILE));
    if path.exists() && !force {
        bail!("{} already exists; pass --force to replace it", path.display());
    }
    Config::default().save(path)
}

/// Copy the picks given on the command line into the selection.
fn apply_overrides(
    selection: &mut ViewSelection,
    command: &Command,
    season: &SeasonConfig,
) -> anyhow::Result<()> {
    if let Some(tab) = command.tab() {
        selection.tab = tab;
    }
    match command {
        Command::Gears { driver: Some(d) } | Command::Trace { driver: Some(d) } => {
            selection.driver = offered_driver(d, season)?;
        }
        Command::Compare { driver1, driver2 } => {
            if let Some(d) = driver1 {
                selection.pair.0 = offered_driver(d, season)?;
            }
            if let Some(d) = driver2 {
                selection.pair.1 = offered_driver(d, season)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Upper-cased driver code, if the telemetry pickers offer it.
fn offered_driver(code: &str, season: &SeasonConfig) -> anyhow::Result<String> {
    let code = code.trim().to_uppercase();
    if !season.drivers.contains(&code) {
        bail!(
            "driver {code} is not offered; choose one of {}",
            season.drivers.join(", ")
        );
    }
    Ok(code)
}

fn require_round(selection: &ViewSelection) -> anyhow::Result<u32> {
    match selection.round {
        Some(round) => Ok(round),
        None => bail!(
            "no round selected for {}; pass --round (see `race-dash races --year {}`)",
            selection.year,
            selection.year
        ),
    }
}

/// Wrap a response in a panel, dropping it if a newer request replaced it.
fn panel<T>(
    dispatcher: &Dispatcher,
    ticket: &Ticket,
    name: &str,
    result: Result<T, DashError>,
) -> anyhow::Result<Panel<T>> {
    let Some(result) = dispatcher.accept(ticket, result) else {
        return Ok(Panel::Loading);
    };
    Panel::from_result(name, result).with_context(|| format!("building {name}"))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
