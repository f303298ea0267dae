// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod entry;
pub mod stats;
pub mod user;

pub use entry::{parse_wipe_count, Entry, WipeCountInput, MAX_WIPES_PER_ENTRY};
pub use stats::{DailyStats, RankedStats, UserStats, Window};
pub use user::{
    Principal, Profile, BACKGROUND_OPTIONS, COLOR_OPTIONS, EMOJI_OPTIONS, MAX_DISPLAY_NAME_CHARS,
};
