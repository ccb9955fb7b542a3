//! # View Selection State
//!
//! The season, round, tab and driver picks that survive navigation. Selections are plain
//! values keyed by season (`"2024"`) or season-round (`"2024-5"`) and persisted through a
//! [`KeyValueStore`], so nothing lives in process-wide state.
//!
//! ## Storage
//! - [`MemoryStore`]: per-session, used in tests and one-shot runs
//! - [`FileStore`]: one JSON object on disk, rewritten on every save
//!
//! A corrupted entry is logged and treated as missing; the defaults take over.

use crate::config::SeasonConfig;
use crate::DashError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Race detail tab.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Results,
    Positions,
    Strategy,
    Telemetry,
}

/// Storage key of a selection.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SelectionKey(String);

impl SelectionKey {
    pub fn season(year: i32) -> Self {
        SelectionKey(year.to_string())
    }

    pub fn race(year: i32, round: u32) -> Self {
        SelectionKey(format!("{year}-{round}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything the user picked for one season or race.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewSelection {
    pub year: i32,
    pub round: Option<u32>,
    #[serde(default)]
    pub tab: Tab,
    pub driver: String,
    pub pair: (String, String),
}

impl ViewSelection {
    pub fn defaults(season: &SeasonConfig) -> Self {
        ViewSelection {
            year: season.default_year,
            round: None,
            tab: Tab::default(),
            driver: season.default_driver.clone(),
            pair: season.default_pair.clone(),
        }
    }

    pub fn key(&self) -> SelectionKey {
        match self.round {
            Some(round) => SelectionKey::race(self.year, round),
            None => SelectionKey::season(self.year),
        }
    }
}

/// String key-value persistence.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, DashError>;
    fn put(&mut self, key: &str, value: String) -> Result<(), DashError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, DashError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: String) -> Result<(), DashError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Key-value pairs kept as one JSON object in a file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, DashError> {
        match fs::read(&self.path) {
            Ok(data) => Ok(serde_json::from_slice(&data)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, DashError> {
        Ok(self.read_all()?.remove(key))
    }

    fn put(&mut self, key: &str, value: String) -> Result<(), DashError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value);
        fs::write(&self.path, serde_json::to_vec_pretty(&entries)?)?;
        Ok(())
    }
}

/// Pointer to the most recently saved selection.
const LAST_KEY: &str = "last";

/// Typed access to persisted selections.
#[derive(Debug)]
pub struct SelectionStore<S> {
    store: S,
}

impl<S: KeyValueStore> SelectionStore<S> {
    pub fn new(store: S) -> Self {
        SelectionStore { store }
    }

    pub fn load(&self, key: &SelectionKey) -> Result<Option<ViewSelection>, DashError> {
        self.decode(key.as_str())
    }

    /// The last selection saved under any key.
    pub fn load_last(&self) -> Result<Option<ViewSelection>, DashError> {
        match self.store.get(LAST_KEY)? {
            Some(key) => self.decode(&key),
            None => Ok(None),
        }
    }

    pub fn save(&mut self, selection: &ViewSelection) -> Result<(), DashError> {
        let key = selection.key();
        self.store
            .put(key.as_str(), serde_json::to_string(selection)?)?;
        self.store.put(LAST_KEY, key.to_string())?;
        debug!(%key, "selection saved");
        Ok(())
    }

    /// Selection for the requested season/round: the stored one for that key, else the
    /// stored season-level one carried over to the round, else the defaults.
    ///
    /// With no year given the last saved selection decides the season.
    pub fn resolve(
        &self,
        year: Option<i32>,
        round: Option<u32>,
        season: &SeasonConfig,
    ) -> Result<ViewSelection, DashError> {
        let last = self.load_last()?;
        let year = year
            .or_else(|| last.as_ref().map(|s| s.year))
            .unwrap_or(season.default_year);

        if let Some(round) = round {
            if let Some(stored) = self.load(&SelectionKey::race(year, round))? {
                return Ok(stored);
            }
        }
        let mut selection = match self.load(&SelectionKey::season(year))? {
            Some(stored) => stored,
            None => ViewSelection {
                year,
                ..ViewSelection::defaults(season)
            },
        };
        if round.is_some() {
            selection.round = round;
        }
        Ok(selection)
    }

    fn decode(&self, key: &str) -> Result<Option<ViewSelection>, DashError> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(selection) => Ok(Some(selection)),
            Err(e) => {
                warn!(key, error = %e, "ignoring unreadable selection");
                Ok(None)
            }
        }
    }
}
