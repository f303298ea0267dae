// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Offline in-memory backend.
//!
//! Used when no `BACKEND_URL` is configured and by tests. Profiles and
//! entries live in process memory; aggregates are computed on read in
//! registration order. `fail_next` injects transient outages.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::AppError;
use crate::models::{DailyStats, Entry, Principal, Profile, RankedStats, UserStats};
use crate::services::backend::{Backend, Connector};
use crate::services::Identity;
use crate::time_utils::{start_of_day, to_backend_time};

struct StoredUser {
    principal: Principal,
    profile: Profile,
    entries: Vec<Entry>,
}

#[derive(Default)]
struct MemoryStore {
    users: Mutex<Vec<StoredUser>>,
    pending_outages: AtomicU32,
}

impl MemoryStore {
    fn users(&self) -> MutexGuard<'_, Vec<StoredUser>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Consume one injected outage, if any.
    fn check_outage(&self) -> Result<(), AppError> {
        let took = self
            .pending_outages
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if took {
            return Err(AppError::Backend("simulated outage".to_string()));
        }
        Ok(())
    }
}

/// Creates [`MemoryBackend`] actors over one shared store.
#[derive(Clone, Default)]
pub struct MemoryConnector {
    store: Arc<MemoryStore>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` calls (connects included) fail transiently.
    pub fn fail_next(&self, count: u32) {
        self.store.pending_outages.store(count, Ordering::SeqCst);
    }

    /// Actor for `principal` without going through identity verification.
    pub fn backend_for(&self, principal: Principal) -> MemoryBackend {
        MemoryBackend {
            principal,
            store: self.store.clone(),
        }
    }

    /// Append an entry with an explicit timestamp.
    pub fn record_entry(&self, principal: &Principal, entry: Entry) -> Result<(), AppError> {
        let mut users = self.store.users();
        let user = users
            .iter_mut()
            .find(|u| &u.principal == principal)
            .ok_or(AppError::NotRegistered)?;
        user.entries.push(entry);
        Ok(())
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, identity: &Identity) -> Result<Arc<dyn Backend>, AppError> {
        self.store.check_outage()?;
        Ok(Arc::new(self.backend_for(identity.principal.clone())))
    }
}

/// In-memory actor bound to one principal.
pub struct MemoryBackend {
    principal: Principal,
    store: Arc<MemoryStore>,
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn register(&self, profile: &Profile) -> Result<(), AppError> {
        self.store.check_outage()?;
        let mut users = self.store.users();
        // Re-registration replaces the profile and keeps the history.
        match users.iter_mut().find(|u| u.principal == self.principal) {
            Some(user) => user.profile = profile.clone(),
            None => users.push(StoredUser {
                principal: self.principal.clone(),
                profile: profile.clone(),
                entries: Vec::new(),
            }),
        }
        Ok(())
    }

    async fn get_my_profile(&self) -> Result<Option<Profile>, AppError> {
        self.store.check_outage()?;
        Ok(self
            .store
            .users()
            .iter()
            .find(|u| u.principal == self.principal)
            .map(|u| u.profile.clone()))
    }

    async fn create_poop_entry(&self, number_of_wipes: u64) -> Result<(), AppError> {
        self.store.check_outage()?;
        let mut users = self.store.users();
        let user = users
            .iter_mut()
            .find(|u| u.principal == self.principal)
            .ok_or(AppError::NotRegistered)?;
        user.entries.push(Entry {
            number_of_wipes,
            timestamp: to_backend_time(Utc::now()),
        });
        Ok(())
    }

    async fn get_ranked_user_stats(&self) -> Result<RankedStats, AppError> {
        self.store.check_outage()?;
        let today_start = start_of_day(Utc::now());
        let users = self.store.users();

        let aggregate = |since| {
            users
                .iter()
                .map(|u| {
                    UserStats::from_entries(u.principal.clone(), u.profile.clone(), &u.entries, since)
                })
                .collect::<Vec<_>>()
        };

        Ok(RankedStats {
            all_time: aggregate(None),
            today: Some(aggregate(Some(today_start))),
        })
    }

    async fn get_daily_stats(&self) -> Result<DailyStats, AppError> {
        self.store.check_outage()?;
        let today_start = start_of_day(Utc::now());
        let users = self.store.users();

        Ok(users
            .iter()
            .find(|u| u.principal == self.principal)
            .map(|u| {
                let today = UserStats::from_entries(
                    u.principal.clone(),
                    u.profile.clone(),
                    &u.entries,
                    Some(today_start),
                );
                DailyStats::from(&today)
            })
            .unwrap_or_default())
    }
}
