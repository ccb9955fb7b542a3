//! # Request Dispatch
//!
//! A new selection (season, round, driver, tab) issues a new request while older ones may
//! still be in flight. Nothing is cancelled; instead every request carries a [`Ticket`] and
//! its response is only accepted if the ticket's parameters are still the ones its slot
//! is waiting on. Two requests with identical parameters are interchangeable.
//!
//! Slots are per endpoint kind, so a gear-shift request never supersedes a strategy
//! request, but a gear-shift request for HAM supersedes one for VER.
//!
//! The `race-dash` binary runs one view per invocation and accepts each response right
//! after issuing it, so nothing is ever dropped there. Discarding only happens for a
//! caller that keeps one `Dispatcher` across several selection changes.

use crate::api::Endpoint;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// The view state a response is written into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    DriverStandings,
    TeamStandings,
    Races,
    RaceResults,
    RacePositions,
    TireStrategy,
    GearShift,
    CompareSpeed,
    SpeedTrace,
}

impl Endpoint {
    pub fn slot(&self) -> Slot {
        match self {
            Endpoint::DriverStandings { .. } => Slot::DriverStandings,
            Endpoint::TeamStandings { .. } => Slot::TeamStandings,
            Endpoint::Races { .. } => Slot::Races,
            Endpoint::RaceResults { .. } => Slot::RaceResults,
            Endpoint::RacePositions { .. } => Slot::RacePositions,
            Endpoint::TireStrategy { .. } => Slot::TireStrategy,
            Endpoint::GearShift { .. } => Slot::GearShift,
            Endpoint::CompareSpeed { .. } => Slot::CompareSpeed,
            Endpoint::SpeedTrace { .. } => Slot::SpeedTrace,
        }
    }
}

/// Receipt for one issued request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
    pub endpoint: Endpoint,
}

impl Ticket {
    pub fn slot(&self) -> Slot {
        self.endpoint.slot()
    }
}

/// Tracks the latest request per slot and filters out stale responses.
#[derive(Debug, Default)]
pub struct Dispatcher {
    latest: HashMap<Slot, Endpoint>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `endpoint` as the current request of its slot.
    pub fn issue(&mut self, endpoint: Endpoint) -> Ticket {
        if let Some(previous) = self.latest.insert(endpoint.slot(), endpoint.clone()) {
            if previous != endpoint {
                debug!(superseded = %previous, by = %endpoint, "selection changed");
            }
        }
        Ticket { endpoint }
    }

    /// True if the ticket's parameters are still what its slot is waiting on.
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.latest.get(&ticket.slot()) == Some(&ticket.endpoint)
    }

    /// Pass the response through if its ticket is current, drop it otherwise.
    pub fn accept<T>(&self, ticket: &Ticket, response: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(response)
        } else {
            debug!(endpoint = %ticket.endpoint, "discarding stale response");
            None
        }
    }

    /// Parameters of the request a slot is currently waiting on.
    pub fn pending(&self, slot: Slot) -> Option<&Endpoint> {
        self.latest.get(&slot)
    }
}
