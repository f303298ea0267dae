// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client session.
//!
//! The session owns the three readiness signals (identity, connection,
//! profile query), the identity-keyed [`QueryCache`] and the notice queue.
//! It drives the asynchronous bootstrap after a sign-in and exposes the
//! actions the view server offers.
//!
//! Every identity change bumps an epoch. Asynchronous work captures a
//! [`Ticket`] (epoch + principal) before its first await and only applies
//! its result if the ticket is still current; stale results are dropped
//! without a notice. The state mutex is never held across an await.

use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use validator::Validate;

use crate::cache::{CachedQuery, QueryCache, QueryKind};
use crate::config::Config;
use crate::error::AppError;
use crate::models::{
    parse_wipe_count, DailyStats, Principal, Profile, RankedStats, WipeCountInput, Window,
};
use crate::ranking::Standings;
use crate::readiness::{resolve, ConnectionState, IdentityState, ProfileQuery, Screen};
use crate::services::{Connection, Connector, Identity, RetryPolicy};

/// Oldest notices are dropped beyond this many unread.
pub const MAX_NOTICES: usize = 20;

/// Tunables for the session's backend interaction.
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub retry: RetryPolicy,
    /// Fail-open timeout while loading a signed-in session (`None` disables)
    pub profile_timeout: Option<Duration>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            profile_timeout: Some(Duration::from_secs(10)),
        }
    }
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            retry: RetryPolicy::from_config(config),
            profile_timeout: config.profile_timeout,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Short user-visible message (a toast in the front-end).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Whether an asynchronous result was applied to session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// The identity changed while the request was in flight.
    Discarded,
}

/// What the front-end needs to pick and fill a top-level screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub screen: Screen,
    pub principal: Option<Principal>,
    pub profile: Option<Profile>,
}

#[derive(Default)]
struct SessionState {
    identity: IdentityState,
    connection: ConnectionState,
    profile: ProfileQuery,
    epoch: u64,
    /// Set when a signed-in bootstrap starts, cleared once the profile settles.
    loading_since: Option<Instant>,
    notices: VecDeque<Notice>,
}

impl SessionState {
    fn principal(&self) -> Option<&Principal> {
        self.identity.identity().map(|identity| &identity.principal)
    }

    /// Switch identity, resetting everything derived from the old one.
    fn switch_identity(&mut self, identity: IdentityState) -> u64 {
        self.epoch += 1;
        self.loading_since = matches!(identity, IdentityState::Present(_)).then(Instant::now);
        self.connection = match identity {
            IdentityState::Present(_) => ConnectionState::Recreating,
            _ => ConnectionState::Absent,
        };
        self.identity = identity;
        self.profile = ProfileQuery::NotStarted;
        self.epoch
    }

    fn push_notice(&mut self, notice: Notice) {
        if self.notices.len() >= MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(notice);
    }
}

/// Epoch and principal captured when an asynchronous request starts.
#[derive(Debug, Clone)]
struct Ticket {
    epoch: u64,
    principal: Principal,
}

impl Ticket {
    fn is_current(&self, state: &SessionState) -> bool {
        state.epoch == self.epoch && state.principal() == Some(&self.principal)
    }
}

/// Shared client session; clones operate on the same state.
#[derive(Clone)]
pub struct Session {
    state: Arc<Mutex<SessionState>>,
    connector: Arc<dyn Connector>,
    cache: QueryCache,
    settings: SessionSettings,
}

impl Session {
    pub fn new(connector: Arc<dyn Connector>, settings: SessionSettings) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::default())),
            connector,
            cache: QueryCache::new(),
            settings,
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ─── Identity ────────────────────────────────────────────────

    /// Leave `Initializing`: resume a stored identity or settle as signed out.
    pub async fn initialize(&self, stored: Option<Identity>) -> Screen {
        match stored {
            Some(identity) => self.sign_in(identity).await,
            None => {
                self.lock().switch_identity(IdentityState::Absent);
                Screen::Unauthenticated
            }
        }
    }

    /// Switch to `identity` and bootstrap its connection and profile.
    pub async fn sign_in(&self, identity: Identity) -> Screen {
        let principal = identity.principal.clone();
        let (epoch, previous) = {
            let mut state = self.lock();
            let previous = state.principal().cloned();
            let epoch = state.switch_identity(IdentityState::Present(identity));
            (epoch, previous)
        };

        if let Some(previous) = previous {
            self.cache.invalidate_identity(&previous);
        }
        self.cache.invalidate_identity(&principal);
        tracing::info!(principal = %principal, epoch, "Identity changed");

        match self.reconnect().await {
            Ok(FetchOutcome::Applied) => {
                if let Err(e) = self.refresh_profile().await {
                    tracing::debug!(error = %e, "Profile refresh skipped");
                }
            }
            Ok(FetchOutcome::Discarded) => {}
            Err(e) => tracing::warn!(principal = %principal, error = %e, "Connection failed"),
        }

        self.screen()
    }

    /// Drop the identity and everything cached for it.
    pub fn sign_out(&self) {
        let previous = {
            let mut state = self.lock();
            let previous = state.principal().cloned();
            state.switch_identity(IdentityState::Absent);
            previous
        };

        if let Some(principal) = previous {
            self.cache.invalidate_identity(&principal);
            tracing::info!(principal = %principal, "Signed out");
        }
    }

    pub fn current_principal(&self) -> Option<Principal> {
        self.lock().principal().cloned()
    }

    // ─── Bootstrap ───────────────────────────────────────────────

    /// (Re)create the backend connection for the current identity.
    pub async fn reconnect(&self) -> Result<FetchOutcome, AppError> {
        let (ticket, identity) = {
            let mut state = self.lock();
            let identity = state
                .identity
                .identity()
                .cloned()
                .ok_or(AppError::Unauthorized)?;
            state.connection = ConnectionState::Recreating;
            let ticket = Ticket {
                epoch: state.epoch,
                principal: identity.principal.clone(),
            };
            (ticket, identity)
        };

        let connector = &self.connector;
        let identity = &identity;
        let result = self
            .settings
            .retry
            .run("connect", move || connector.connect(identity))
            .await;

        let mut state = self.lock();
        if !ticket.is_current(&state) {
            tracing::debug!(principal = %ticket.principal, epoch = ticket.epoch, "Discarding stale connection");
            return Ok(FetchOutcome::Discarded);
        }

        match result {
            Ok(actor) => {
                state.connection =
                    ConnectionState::Ready(Connection::new(ticket.principal.clone(), actor));
                tracing::debug!(principal = %ticket.principal, "Backend connection ready");
                Ok(FetchOutcome::Applied)
            }
            Err(e) => {
                state.connection = ConnectionState::Absent;
                state.push_notice(Notice::error(format!("Failed to connect: {}", e)));
                Err(e)
            }
        }
    }

    /// Fetch the caller's profile and settle the profile query.
    ///
    /// "Not registered" resolves to no profile. Any other failure after
    /// retries settles as `Failed`, which the resolver treats as needing a
    /// profile.
    pub async fn refresh_profile(&self) -> Result<FetchOutcome, AppError> {
        let (ticket, connection) = {
            let mut state = self.lock();
            let (ticket, connection) = ready_connection(&state)?;
            state.profile = ProfileQuery::Loading;
            (ticket, connection)
        };

        let connection = &connection;
        let result = self
            .settings
            .retry
            .run("get_my_profile", move || connection.actor().get_my_profile())
            .await;

        let mut state = self.lock();
        if !ticket.is_current(&state) {
            tracing::debug!(principal = %ticket.principal, epoch = ticket.epoch, "Discarding stale profile");
            return Ok(FetchOutcome::Discarded);
        }

        state.profile = match result {
            Ok(profile) => ProfileQuery::Resolved(profile),
            Err(AppError::NotRegistered) => ProfileQuery::Resolved(None),
            Err(e) => {
                tracing::warn!(principal = %ticket.principal, error = %e, "Profile fetch failed");
                ProfileQuery::Failed
            }
        };
        match &state.profile {
            ProfileQuery::Resolved(profile) => self
                .cache
                .insert(&ticket.principal, CachedQuery::Profile(profile.clone())),
            _ => self.cache.invalidate(QueryKind::MyProfile, &ticket.principal),
        }
        state.loading_since = None;

        Ok(FetchOutcome::Applied)
    }

    // ─── Screen ──────────────────────────────────────────────────

    /// Current screen, with the fail-open timeout applied.
    pub fn screen(&self) -> Screen {
        let state = self.lock();
        self.screen_for(&state)
    }

    fn screen_for(&self, state: &SessionState) -> Screen {
        let screen = resolve(&state.identity, &state.connection, &state.profile);
        if screen != Screen::Loading || state.principal().is_none() {
            return screen;
        }

        let timed_out = self
            .settings
            .profile_timeout
            .zip(state.loading_since)
            .is_some_and(|(timeout, since)| since.elapsed() >= timeout);
        if timed_out {
            tracing::debug!(epoch = state.epoch, "Loading timed out, showing profile setup");
            return Screen::NeedsProfile;
        }
        screen
    }

    /// Screen plus the caller's profile as last cached for this identity.
    pub fn view(&self) -> SessionView {
        let state = self.lock();
        let principal = state.principal().cloned();
        let profile = principal
            .as_ref()
            .and_then(|p| self.cache.profile(p))
            .flatten();
        SessionView {
            screen: self.screen_for(&state),
            principal,
            profile,
        }
    }

    pub fn drain_notices(&self) -> Vec<Notice> {
        self.lock().notices.drain(..).collect()
    }

    // ─── Actions ─────────────────────────────────────────────────

    /// Create the caller's profile, then re-fetch it.
    ///
    /// If the identity changed while the write was in flight the write
    /// still stands for the old principal, but nothing is reported to the
    /// new one and the call answers `Unauthorized`.
    pub async fn register(&self, profile: Profile) -> Result<Profile, AppError> {
        let profile = profile.normalized();
        profile.validate()?;

        let (ticket, connection) = ready_connection(&self.lock())?;

        let connection = &connection;
        let profile_ref = &profile;
        let result = self
            .settings
            .retry
            .run("register", move || connection.actor().register(profile_ref))
            .await;

        if let Err(e) = result {
            let notice = Notice::error(format!("Failed to create profile: {}", e));
            self.notify(&ticket, notice);
            return Err(e);
        }

        tracing::info!(principal = %ticket.principal, "Profile registered");
        self.cache.invalidate(QueryKind::MyProfile, &ticket.principal);
        self.cache.invalidate(QueryKind::RankedStats, &ticket.principal);
        if !self.notify(&ticket, Notice::success("Profile created! 🎉")) {
            return Err(AppError::Unauthorized);
        }

        self.refresh_profile().await?;
        Ok(profile)
    }

    /// Validate and record one entry, then invalidate the aggregates it changes.
    pub async fn log_entry(&self, input: &WipeCountInput) -> Result<(), AppError> {
        let number_of_wipes = parse_wipe_count(input)?;

        let (ticket, connection) = ready_connection(&self.lock())?;

        let connection = &connection;
        let result = self
            .settings
            .retry
            .run("create_poop_entry", move || {
                connection.actor().create_poop_entry(number_of_wipes)
            })
            .await;

        if let Err(e) = result {
            let notice = Notice::error(format!("Failed to log poop: {}", e));
            self.notify(&ticket, notice);
            return Err(e);
        }

        tracing::info!(principal = %ticket.principal, number_of_wipes, "Entry logged");
        self.cache.invalidate(QueryKind::RankedStats, &ticket.principal);
        self.cache.invalidate(QueryKind::DailyStats, &ticket.principal);
        if !self.notify(&ticket, Notice::success("Poop logged successfully! 🎉")) {
            return Err(AppError::Unauthorized);
        }
        Ok(())
    }

    /// Ranked snapshot for the caller, from cache when available.
    ///
    /// A fetch failure after retries degrades to an empty snapshot and
    /// queues a notice.
    pub async fn ranked_stats(&self) -> Result<RankedStats, AppError> {
        let (ticket, connection) = ready_connection(&self.lock())?;
        if let Some(stats) = self.cache.ranked(&ticket.principal) {
            return Ok(stats);
        }

        let connection = &connection;
        let result = self
            .settings
            .retry
            .run("get_ranked_user_stats", move || {
                connection.actor().get_ranked_user_stats()
            })
            .await;

        let stats = match result {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(principal = %ticket.principal, error = %e, "Ranking fetch failed");
                let notice = Notice::error(format!("Failed to load rankings: {}", e));
                if !self.notify(&ticket, notice) {
                    return Err(AppError::Unauthorized);
                }
                return Ok(RankedStats::default());
            }
        };

        self.apply_query(&ticket, CachedQuery::Ranked(stats.clone()))?;
        Ok(stats)
    }

    /// Ranking engine output for one window.
    pub async fn standings(&self, window: Window) -> Result<Standings, AppError> {
        let stats = self.ranked_stats().await?;
        Ok(Standings::compute(stats.window(window)))
    }

    /// The caller's totals for today, from cache when available.
    pub async fn daily_stats(&self) -> Result<DailyStats, AppError> {
        let (ticket, connection) = ready_connection(&self.lock())?;
        if let Some(stats) = self.cache.daily(&ticket.principal) {
            return Ok(stats);
        }

        let connection = &connection;
        let result = self
            .settings
            .retry
            .run("get_daily_stats", move || connection.actor().get_daily_stats())
            .await;

        let stats = match result {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(principal = %ticket.principal, error = %e, "Daily stats fetch failed");
                let notice = Notice::error(format!("Failed to load daily stats: {}", e));
                if !self.notify(&ticket, notice) {
                    return Err(AppError::Unauthorized);
                }
                return Ok(DailyStats::default());
            }
        };

        self.apply_query(&ticket, CachedQuery::Daily(stats.clone()))?;
        Ok(stats)
    }

    /// Cache a query result if the ticket is still current.
    fn apply_query(&self, ticket: &Ticket, value: CachedQuery) -> Result<(), AppError> {
        let state = self.lock();
        if !ticket.is_current(&state) {
            tracing::debug!(principal = %ticket.principal, epoch = ticket.epoch, "Discarding stale query result");
            return Err(AppError::Unauthorized);
        }
        self.cache.insert(&ticket.principal, value);
        Ok(())
    }

    /// Queue `notice` unless the identity changed since `ticket` was taken.
    fn notify(&self, ticket: &Ticket, notice: Notice) -> bool {
        let mut state = self.lock();
        if !ticket.is_current(&state) {
            tracing::debug!(
                principal = %ticket.principal,
                epoch = ticket.epoch,
                message = %notice.message,
                "Dropping notice for stale identity"
            );
            return false;
        }
        state.push_notice(notice);
        true
    }
}

/// Ticket and connection for an action that needs a ready backend.
fn ready_connection(state: &SessionState) -> Result<(Ticket, Connection), AppError> {
    let principal = state.principal().cloned().ok_or(AppError::Unauthorized)?;
    let connection = state
        .connection
        .connection()
        .filter(|c| c.is_bound_to(&principal))
        .cloned()
        .ok_or(AppError::NotReady)?;

    Ok((
        Ticket {
            epoch: state.epoch,
            principal,
        },
        connection,
    ))
}
