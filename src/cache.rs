// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity-keyed query cache.
//!
//! Every cached backend result is keyed by the query kind *and* the
//! principal it was fetched for, so a result for one identity can never be
//! read under another. Identity changes drop everything for the old
//! principal; mutations invalidate the kinds they affect.

use dashmap::DashMap;
use std::sync::Arc;

use crate::models::{DailyStats, Principal, Profile, RankedStats};

/// Which backend query a cache entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    MyProfile,
    RankedStats,
    DailyStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub kind: QueryKind,
    pub principal: Principal,
}

impl QueryKey {
    pub fn new(kind: QueryKind, principal: &Principal) -> Self {
        Self {
            kind,
            principal: principal.clone(),
        }
    }
}

/// A cached query result.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedQuery {
    /// `None` is a resolved "not registered", distinct from a missing entry.
    Profile(Option<Profile>),
    Ranked(RankedStats),
    Daily(DailyStats),
}

impl CachedQuery {
    pub fn kind(&self) -> QueryKind {
        match self {
            CachedQuery::Profile(_) => QueryKind::MyProfile,
            CachedQuery::Ranked(_) => QueryKind::RankedStats,
            CachedQuery::Daily(_) => QueryKind::DailyStats,
        }
    }
}

/// Shared cache handle; clones see the same entries.
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    entries: Arc<DashMap<QueryKey, CachedQuery>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: QueryKind, principal: &Principal) -> Option<CachedQuery> {
        self.entries
            .get(&QueryKey::new(kind, principal))
            .map(|entry| entry.value().clone())
    }

    pub fn insert(&self, principal: &Principal, value: CachedQuery) {
        self.entries
            .insert(QueryKey::new(value.kind(), principal), value);
    }

    pub fn contains(&self, kind: QueryKind, principal: &Principal) -> bool {
        self.entries.contains_key(&QueryKey::new(kind, principal))
    }

    pub fn invalidate(&self, kind: QueryKind, principal: &Principal) {
        self.entries.remove(&QueryKey::new(kind, principal));
    }

    /// Drop everything cached for `principal`.
    pub fn invalidate_identity(&self, principal: &Principal) {
        self.entries.retain(|key, _| &key.principal != principal);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn profile(&self, principal: &Principal) -> Option<Option<Profile>> {
        match self.get(QueryKind::MyProfile, principal)? {
            CachedQuery::Profile(profile) => Some(profile),
            _ => None,
        }
    }

    pub fn ranked(&self, principal: &Principal) -> Option<RankedStats> {
        match self.get(QueryKind::RankedStats, principal)? {
            CachedQuery::Ranked(stats) => Some(stats),
            _ => None,
        }
    }

    pub fn daily(&self, principal: &Principal) -> Option<DailyStats> {
        match self.get(QueryKind::DailyStats, principal)? {
            CachedQuery::Daily(stats) => Some(stats),
            _ => None,
        }
    }
}
