// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard derivation: rank order, leader badges and display values.
//!
//! Inputs are backend aggregates for a single window. Totals are trusted as
//! delivered; only presentation values are computed here.
//!
//! Ties for a leader title go to the first user in input order.

use serde::Serialize;
use std::fmt;

use crate::models::{Principal, Profile, UserStats};
use crate::time_utils::format_utc_rfc3339;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub const SHEETS_PER_WIPE: u64 = 3;
pub const SHEETS_PER_ROLL: u64 = 200;

/// Toilet paper rolls consumed by `total_wipes`.
pub fn toilet_paper_rolls(total_wipes: u64) -> f64 {
    (total_wipes as f64 * SHEETS_PER_WIPE as f64) / SHEETS_PER_ROLL as f64
}

/// Rolls rounded to one decimal place for display.
pub fn format_rolls(total_wipes: u64) -> String {
    format!("{:.1}", toilet_paper_rolls(total_wipes))
}

/// Average wipes per poop, or "not applicable" for users with no poops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AvgWipes {
    PerPoop(f64),
    NotApplicable,
}

impl AvgWipes {
    pub fn value(self) -> Option<f64> {
        match self {
            AvgWipes::PerPoop(avg) => Some(avg),
            AvgWipes::NotApplicable => None,
        }
    }
}

impl fmt::Display for AvgWipes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvgWipes::PerPoop(avg) => write!(f, "{:.1}", avg),
            AvgWipes::NotApplicable => f.write_str("--"),
        }
    }
}

pub fn avg_wipes(total_wipes: u64, total_poops: u64) -> AvgWipes {
    if total_poops == 0 {
        return AvgWipes::NotApplicable;
    }
    AvgWipes::PerPoop(total_wipes as f64 / total_poops as f64)
}

/// Descending by poops, then by wipes. Stable for users equal on both.
pub fn rank_order(stats: &[UserStats]) -> Vec<&UserStats> {
    let mut ordered: Vec<&UserStats> = stats.iter().collect();
    ordered.sort_by(|a, b| {
        b.total_poops
            .cmp(&a.total_poops)
            .then_with(|| b.total_wipes.cmp(&a.total_wipes))
    });
    ordered
}

/// Leader titles for one window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Badges {
    pub king_pooper: Option<Principal>,
    pub king_wiper: Option<Principal>,
    pub efficient_wiper: Option<Principal>,
    /// Same user holds both king titles with at least one poop
    pub is_mvp: bool,
}

impl Badges {
    pub fn compute(stats: &[UserStats]) -> Self {
        let king_pooper = first_max_by(stats, |s| s.total_poops);
        let king_wiper = first_max_by(stats, |s| s.total_wipes);

        let is_mvp = match (king_pooper, king_wiper) {
            (Some(pooper), Some(wiper)) => {
                pooper.principal == wiper.principal && pooper.total_poops > 0
            }
            _ => false,
        };

        Self {
            king_pooper: king_pooper.map(|s| s.principal.clone()),
            king_wiper: king_wiper.map(|s| s.principal.clone()),
            efficient_wiper: efficient_wiper(stats).map(|s| s.principal.clone()),
            is_mvp,
        }
    }
}

fn first_max_by(stats: &[UserStats], key: impl Fn(&UserStats) -> u64) -> Option<&UserStats> {
    stats.iter().fold(None, |best, candidate| match best {
        Some(current) if key(candidate) <= key(current) => Some(current),
        _ => Some(candidate),
    })
}

/// Lowest average among users with at least one poop; first wins on ties.
fn efficient_wiper(stats: &[UserStats]) -> Option<&UserStats> {
    stats
        .iter()
        .filter_map(|s| avg_wipes(s.total_wipes, s.total_poops).value().map(|avg| (s, avg)))
        .fold(None::<(&UserStats, f64)>, |best, (candidate, avg)| match best {
            Some((current, best_avg)) if avg >= best_avg => Some((current, best_avg)),
            _ => Some((candidate, avg)),
        })
        .map(|(s, _)| s)
}

/// One leaderboard row, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StandingRow {
    /// 1-based position
    pub rank: usize,
    pub principal: Principal,
    pub profile: Profile,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_poops: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_wipes: u64,
    pub toilet_paper_rolls: String,
    pub avg_wipes_per_poop: String,
    pub is_king_pooper: bool,
    pub is_king_wiper: bool,
    pub is_efficient_wiper: bool,
    pub is_mvp: bool,
    pub last_entry_at: Option<String>,
}

/// Leaderboard for one window, or an explicit "no data" marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Standings {
    NoData,
    Ranked { rows: Vec<StandingRow>, badges: Badges },
}

impl Standings {
    pub fn compute(stats: &[UserStats]) -> Self {
        if stats.is_empty() {
            return Standings::NoData;
        }

        let badges = Badges::compute(stats);
        let holds = |title: &Option<Principal>, principal: &Principal| {
            title.as_ref() == Some(principal)
        };

        let rows = rank_order(stats)
            .into_iter()
            .enumerate()
            .map(|(index, user)| {
                let is_king_pooper = holds(&badges.king_pooper, &user.principal);
                let is_king_wiper = holds(&badges.king_wiper, &user.principal);
                StandingRow {
                    rank: index + 1,
                    principal: user.principal.clone(),
                    profile: user.profile.clone(),
                    total_poops: user.total_poops,
                    total_wipes: user.total_wipes,
                    toilet_paper_rolls: format_rolls(user.total_wipes),
                    avg_wipes_per_poop: avg_wipes(user.total_wipes, user.total_poops)
                        .to_string(),
                    is_king_pooper,
                    is_king_wiper,
                    is_efficient_wiper: holds(&badges.efficient_wiper, &user.principal),
                    is_mvp: badges.is_mvp && is_king_pooper,
                    last_entry_at: user.last_entry_at().map(format_utc_rfc3339),
                }
            })
            .collect();

        Standings::Ranked { rows, badges }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Standings::NoData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, poops: u64, wipes: u64) -> UserStats {
        let mut stats = UserStats::new(Principal::new(id), Profile::placeholder(id));
        stats.total_poops = poops;
        stats.total_wipes = wipes;
        stats
    }

    fn order(stats: &[UserStats]) -> Vec<(u64, u64)> {
        rank_order(stats)
            .iter()
            .map(|s| (s.total_poops, s.total_wipes))
            .collect()
    }

    #[test]
    fn test_sort_by_poops_then_wipes() {
        let stats = vec![user("a", 5, 20), user("b", 5, 15), user("c", 3, 30)];
        assert_eq!(order(&stats), vec![(5, 20), (5, 15), (3, 30)]);

        let shuffled = vec![user("c", 3, 30), user("b", 5, 15), user("a", 5, 20)];
        assert_eq!(order(&shuffled), vec![(5, 20), (5, 15), (3, 30)]);
    }

    #[test]
    fn test_sort_is_stable_for_full_ties() {
        let stats = vec![user("x", 2, 2), user("y", 2, 2), user("z", 2, 2)];
        let ids: Vec<&str> = rank_order(&stats)
            .iter()
            .map(|s| s.principal.as_str())
            .collect();
        assert_eq!(ids, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_kings_take_first_on_ties() {
        let stats = vec![user("a", 4, 10), user("b", 4, 12), user("c", 1, 12)];
        let badges = Badges::compute(&stats);

        assert_eq!(badges.king_pooper, Some(Principal::new("a")));
        assert_eq!(badges.king_wiper, Some(Principal::new("b")));
        assert!(!badges.is_mvp);
    }

    #[test]
    fn test_mvp_requires_same_user_with_activity() {
        let stats = vec![user("a", 6, 30), user("b", 2, 5)];
        let badges = Badges::compute(&stats);
        assert_eq!(badges.king_pooper, badges.king_wiper);
        assert!(badges.is_mvp);

        let idle = vec![user("a", 0, 0), user("b", 0, 0)];
        let badges = Badges::compute(&idle);
        assert_eq!(badges.king_pooper, Some(Principal::new("a")));
        assert_eq!(badges.king_wiper, Some(Principal::new("a")));
        assert!(!badges.is_mvp);
    }

    #[test]
    fn test_efficient_wiper_skips_idle_users() {
        let stats = vec![user("idle", 0, 0), user("a", 4, 12), user("b", 2, 4), user("c", 1, 2)];
        let badges = Badges::compute(&stats);
        // b and c both average 2.0; b comes first
        assert_eq!(badges.efficient_wiper, Some(Principal::new("b")));

        let badges = Badges::compute(&[user("idle", 0, 0)]);
        assert_eq!(badges.efficient_wiper, None);
    }

    #[test]
    fn test_display_values() {
        assert_eq!(toilet_paper_rolls(200), 3.0);
        assert_eq!(format_rolls(200), "3.0");
        assert_eq!(format_rolls(100), "1.5");

        assert_eq!(avg_wipes(0, 0), AvgWipes::NotApplicable);
        assert_eq!(avg_wipes(9, 0).to_string(), "--");
        assert_eq!(avg_wipes(10, 4), AvgWipes::PerPoop(2.5));
        assert_eq!(avg_wipes(10, 3).to_string(), "3.3");
    }

    #[test]
    fn test_empty_input_is_no_data() {
        assert!(rank_order(&[]).is_empty());
        assert_eq!(Badges::compute(&[]), Badges::default());
        assert_eq!(Standings::compute(&[]), Standings::NoData);
    }

    #[test]
    fn test_standings_rows_carry_badges() {
        let stats = vec![user("b", 2, 4), user("a", 6, 40)];
        let Standings::Ranked { rows, badges } = Standings::compute(&stats) else {
            panic!("expected ranked standings");
        };

        assert!(badges.is_mvp);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].principal, Principal::new("a"));
        assert!(rows[0].is_king_pooper && rows[0].is_king_wiper && rows[0].is_mvp);
        assert_eq!(rows[0].toilet_paper_rolls, "0.6");
        assert_eq!(rows[1].avg_wipes_per_poop, "2.0");
        assert!(rows[1].is_efficient_wiper);
        assert!(!rows[1].is_mvp);
    }

    #[test]
    fn test_standings_serialize_with_status_tag() {
        let json = serde_json::to_value(Standings::NoData).unwrap();
        assert_eq!(json["status"], "no_data");

        let json = serde_json::to_value(Standings::compute(&[user("a", 1, 1)])).unwrap();
        assert_eq!(json["status"], "ranked");
        assert_eq!(json["rows"][0]["principal"], "a");
    }
}
