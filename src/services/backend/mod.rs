// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Backend RPC seam.
//!
//! The backend is an opaque remote service. A [`Connector`] creates an actor
//! bound to one identity; the resulting [`Connection`] remembers which
//! principal it was created for so callers can detect a stale actor after
//! an identity switch.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::{DailyStats, Principal, Profile, RankedStats};
use crate::services::Identity;

pub use http::{HttpBackend, HttpConnector};
pub use memory::{MemoryBackend, MemoryConnector};

/// Fixed RPC surface exposed by the backend, as seen by one caller.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Create (or replace, backend permitting) the caller's profile.
    async fn register(&self, profile: &Profile) -> Result<(), AppError>;

    /// The caller's profile, `None` when not registered.
    async fn get_my_profile(&self) -> Result<Option<Profile>, AppError>;

    /// Append one entry for the caller.
    async fn create_poop_entry(&self, number_of_wipes: u64) -> Result<(), AppError>;

    /// Current aggregate snapshot for all users.
    async fn get_ranked_user_stats(&self) -> Result<RankedStats, AppError>;

    /// The caller's totals for today.
    async fn get_daily_stats(&self) -> Result<DailyStats, AppError>;
}

/// Creates backend actors bound to an identity.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, identity: &Identity) -> Result<Arc<dyn Backend>, AppError>;
}

/// An actor together with the principal it was created for.
#[derive(Clone)]
pub struct Connection {
    principal: Principal,
    actor: Arc<dyn Backend>,
}

impl Connection {
    pub fn new(principal: Principal, actor: Arc<dyn Backend>) -> Self {
        Self { principal, actor }
    }

    pub fn actor(&self) -> &dyn Backend {
        self.actor.as_ref()
    }

    pub fn is_bound_to(&self, principal: &Principal) -> bool {
        &self.principal == principal
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("principal", &self.principal)
            .finish_non_exhaustive()
    }
}
