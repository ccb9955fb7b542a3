//! # Season Calendar Selection
//!
//! The overview page shows exactly two races: the most recent one that already happened
//! and the next one to come. The full calendar stays available through the race list.
//!
//! An event's moment is its calendar date at 00:00 UTC. On race day that moment has
//! already passed, so the event counts as finished for selection even though its
//! [`RaceStatus`] reads `RaceDay`.

use crate::{RaceEvent, RaceStatus};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// The two races worth showing "now". Either side may be missing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceSelection {
    pub last_finished: Option<RaceEvent>,
    pub next_upcoming: Option<RaceEvent>,
}

impl RaceSelection {
    /// Rows to display, past race first. Missing sides are omitted, not padded.
    pub fn into_rows(self) -> Vec<RaceEvent> {
        self.last_finished
            .into_iter()
            .chain(self.next_upcoming)
            .collect()
    }
}

fn starts_at(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Pick the last event strictly before `now` and the first event at or after it.
///
/// Ties on date keep calendar order: the later-listed of two same-day past events wins
/// `last_finished`, the earlier-listed of two same-day future events wins `next_upcoming`.
///
/// # Example
/// ```
/// use chrono::{NaiveDate, TimeZone, Utc};
/// use race_dash_lib::RaceEvent;
/// use race_dash_lib::calendar::select;
///
/// let race = |round, m| RaceEvent {
///     round,
///     event_name: format!("Round {round}"),
///     location: String::new(),
///     country: String::new(),
///     date: NaiveDate::from_ymd_opt(2024, m, 1).unwrap(),
///     status: None,
/// };
/// let calendar = [race(1, 3), race(2, 6), race(3, 9)];
/// let now = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
///
/// let picked = select(&calendar, now);
/// assert_eq!(picked.last_finished.unwrap().round, 2);
/// assert_eq!(picked.next_upcoming.unwrap().round, 3);
/// ```
pub fn select(calendar: &[RaceEvent], now: DateTime<Utc>) -> RaceSelection {
    let mut sorted: Vec<&RaceEvent> = calendar.iter().collect();
    sorted.sort_by_key(|event| event.date);

    let next_upcoming = sorted
        .iter()
        .find(|event| starts_at(event.date) >= now)
        .map(|event| (*event).clone());
    let last_finished = sorted
        .iter()
        .rev()
        .find(|event| starts_at(event.date) < now)
        .map(|event| (*event).clone());

    RaceSelection {
        last_finished,
        next_upcoming,
    }
}

impl RaceStatus {
    /// Status of a race held on `date`, seen from `today`.
    pub fn on(date: NaiveDate, today: NaiveDate) -> Self {
        match date.cmp(&today) {
            std::cmp::Ordering::Less => RaceStatus::Finished,
            std::cmp::Ordering::Equal => RaceStatus::RaceDay,
            std::cmp::Ordering::Greater => RaceStatus::Upcoming,
        }
    }
}

/// Fill in the status of events the API sent without one.
pub fn with_status(mut events: Vec<RaceEvent>, today: NaiveDate) -> Vec<RaceEvent> {
    for event in &mut events {
        if event.status.is_none() {
            event.status = Some(RaceStatus::on(event.date, today));
        }
    }
    events
}

/// Seasons offered in the year picker, oldest first.
pub fn season_years(first_year: i32, count: u32) -> Vec<i32> {
    (0..count as i32).map(|offset| first_year + offset).collect()
}
