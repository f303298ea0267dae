// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes: session view, profile setup, entries and standings.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{
    DailyStats, Profile, WipeCountInput, Window, BACKGROUND_OPTIONS, COLOR_OPTIONS,
    EMOJI_OPTIONS, MAX_DISPLAY_NAME_CHARS,
};
use crate::ranking::{avg_wipes, format_rolls, Standings};
use crate::session::{Notice, SessionView};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Routes that work without an identity.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/view", get(get_view))
        .route("/api/profile/options", get(get_profile_options))
}

/// API routes (require authentication).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/profile", post(create_profile))
        .route("/api/entries", post(create_entry))
        .route("/api/standings", get(get_standings))
        .route("/api/stats/daily", get(get_daily_stats))
        .route("/api/notices", get(get_notices))
}

// ─── Session View ────────────────────────────────────────────

/// Which screen to show, plus the signed-in principal and profile.
async fn get_view(State(state): State<Arc<AppState>>) -> Json<SessionView> {
    Json(state.session.view())
}

// ─── Profile ─────────────────────────────────────────────────

/// Palettes and defaults for the profile setup form.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileOptionsResponse {
    pub emojis: Vec<String>,
    pub colors: Vec<String>,
    pub backgrounds: Vec<String>,
    pub max_display_name_chars: usize,
    pub preview: Profile,
}

fn owned(options: &[&str]) -> Vec<String> {
    options.iter().map(|o| o.to_string()).collect()
}

async fn get_profile_options() -> Json<ProfileOptionsResponse> {
    Json(ProfileOptionsResponse {
        emojis: owned(EMOJI_OPTIONS),
        colors: owned(COLOR_OPTIONS),
        backgrounds: owned(BACKGROUND_OPTIONS),
        max_display_name_chars: MAX_DISPLAY_NAME_CHARS,
        preview: Profile::placeholder(""),
    })
}

/// Register the caller's profile and return the refreshed view.
async fn create_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(profile): Json<Profile>,
) -> Result<(StatusCode, Json<SessionView>)> {
    tracing::info!(principal = %user.principal, "Creating profile");
    state.session.register(profile).await?;
    Ok((StatusCode::CREATED, Json(state.session.view())))
}

// ─── Entries ─────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryRequest {
    number_of_wipes: WipeCountInput,
}

async fn create_entry(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateEntryRequest>,
) -> Result<StatusCode> {
    tracing::debug!(principal = %user.principal, "Logging entry");
    state.session.log_entry(&req.number_of_wipes).await?;
    Ok(StatusCode::CREATED)
}

// ─── Standings ───────────────────────────────────────────────

#[derive(Deserialize)]
struct StandingsQuery {
    #[serde(default)]
    window: Window,
}

/// Standings for one window.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StandingsResponse {
    pub window: Window,
    #[serde(flatten)]
    pub standings: Standings,
}

async fn get_standings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StandingsQuery>,
) -> Result<Json<StandingsResponse>> {
    let standings = state.session.standings(query.window).await?;
    Ok(Json(StandingsResponse {
        window: query.window,
        standings,
    }))
}

// ─── Daily Stats ─────────────────────────────────────────────

/// Caller's totals for today with display values.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DailyStatsResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_poops: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_wipes: u64,
    pub toilet_paper_rolls: String,
    pub avg_wipes_per_poop: String,
}

impl From<DailyStats> for DailyStatsResponse {
    fn from(stats: DailyStats) -> Self {
        Self {
            total_poops: stats.total_poops,
            total_wipes: stats.total_wipes,
            toilet_paper_rolls: format_rolls(stats.total_wipes),
            avg_wipes_per_poop: avg_wipes(stats.total_wipes, stats.total_poops).to_string(),
        }
    }
}

async fn get_daily_stats(State(state): State<Arc<AppState>>) -> Result<Json<DailyStatsResponse>> {
    let stats = state.session.daily_stats().await?;
    Ok(Json(stats.into()))
}

// ─── Notices ─────────────────────────────────────────────────

async fn get_notices(State(state): State<Arc<AppState>>) -> Json<Vec<Notice>> {
    Json(state.session.drain_notices())
}
