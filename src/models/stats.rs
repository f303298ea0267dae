//! Per-user aggregate statistics delivered by the backend.
//!
//! The client treats these as trusted read-only snapshots and never mutates
//! them; presentation values (rank order, badges) are derived in
//! [`crate::ranking`]. The aggregation helpers here exist for the offline
//! backend, which has to produce the same shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Entry, Principal, Profile};
use crate::ranking::{SHEETS_PER_ROLL, SHEETS_PER_WIPE};
use crate::time_utils::Time;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Aggregate statistics for one user over one time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub principal: Principal,
    pub profile: Profile,
    /// Entries inside the window
    #[serde(default)]
    pub entries: Vec<Entry>,
    /// Number of entries
    #[serde(default)]
    pub total_poops: u64,
    /// Sum of `number_of_wipes` over entries
    #[serde(default)]
    pub total_wipes: u64,
    /// Whole rolls used, as the backend rounds them
    #[serde(default)]
    pub total_toilet_paper_rolls: u64,
    #[serde(default)]
    pub avg_wipes_per_poop: f64,
}

impl UserStats {
    pub fn new(principal: Principal, profile: Profile) -> Self {
        Self {
            principal,
            profile,
            entries: Vec::new(),
            total_poops: 0,
            total_wipes: 0,
            total_toilet_paper_rolls: 0,
            avg_wipes_per_poop: 0.0,
        }
    }

    /// Aggregate the entries recorded at or after `since` (all entries when `None`).
    pub fn from_entries(
        principal: Principal,
        profile: Profile,
        entries: &[Entry],
        since: Option<Time>,
    ) -> Self {
        let mut stats = Self::new(principal, profile);
        for entry in entries {
            if since.is_none_or(|start| entry.timestamp >= start) {
                stats.record(entry.clone());
            }
        }
        stats
    }

    /// Fold one entry into the aggregate.
    pub fn record(&mut self, entry: Entry) {
        self.total_poops += 1;
        self.total_wipes += entry.number_of_wipes;
        self.total_toilet_paper_rolls = self.total_wipes * SHEETS_PER_WIPE / SHEETS_PER_ROLL;
        self.avg_wipes_per_poop = self.total_wipes as f64 / self.total_poops as f64;
        self.entries.push(entry);
    }

    /// Time of the most recent entry in the window.
    pub fn last_entry_at(&self) -> Option<DateTime<Utc>> {
        self.entries
            .iter()
            .max_by_key(|e| e.timestamp)
            .map(Entry::recorded_at)
    }
}

/// Which aggregate window a leaderboard is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    #[default]
    AllTime,
    Today,
}

/// Ranked aggregate snapshot.
///
/// Older backend revisions return a bare array (all-time only); newer ones
/// return both windows. Both shapes deserialize into this type, with
/// `today == None` for the single-window shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RankedStatsWire")]
pub struct RankedStats {
    pub all_time: Vec<UserStats>,
    pub today: Option<Vec<UserStats>>,
}

impl RankedStats {
    pub fn window(&self, window: Window) -> &[UserStats] {
        match window {
            Window::AllTime => &self.all_time,
            Window::Today => self.today.as_deref().unwrap_or(&[]),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RankedStatsWire {
    Windowed {
        #[serde(rename = "allTime")]
        all_time: Vec<UserStats>,
        today: Option<Vec<UserStats>>,
    },
    Single(Vec<UserStats>),
}

impl From<RankedStatsWire> for RankedStats {
    fn from(wire: RankedStatsWire) -> Self {
        match wire {
            RankedStatsWire::Windowed { all_time, today } => Self { all_time, today },
            RankedStatsWire::Single(all_time) => Self {
                all_time,
                today: None,
            },
        }
    }
}

/// The caller's own totals for the current day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    #[serde(default)]
    pub total_poops: u64,
    #[serde(default)]
    pub total_wipes: u64,
    #[serde(default)]
    pub total_toilet_paper_rolls: u64,
    #[serde(default)]
    pub avg_wipes_per_poop: f64,
}

impl From<&UserStats> for DailyStats {
    fn from(stats: &UserStats) -> Self {
        Self {
            total_poops: stats.total_poops,
            total_wipes: stats.total_wipes,
            total_toilet_paper_rolls: stats.total_toilet_paper_rolls,
            avg_wipes_per_poop: stats.avg_wipes_per_poop,
        }
    }
}
