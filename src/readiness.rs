// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Readiness resolver.
//!
//! Decides which top-level screen to show from three independently
//! resolving signals: the authentication identity, the backend connection
//! and the caller's profile query. [`resolve`] is a pure, total function
//! over a snapshot of those signals; timing concerns (the fail-open
//! timeout) live in [`crate::session`].

use serde::{Deserialize, Serialize};

use crate::models::Profile;
use crate::services::{Connection, Identity};

/// Authentication state as reported by the identity collaborator.
#[derive(Debug, Clone, Default)]
pub enum IdentityState {
    /// Stored credentials have not been checked yet.
    #[default]
    Initializing,
    Absent,
    Present(Identity),
}

impl IdentityState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            IdentityState::Present(identity) => Some(identity),
            _ => None,
        }
    }
}

/// Backend connection state.
#[derive(Debug, Clone, Default)]
pub enum ConnectionState {
    #[default]
    Absent,
    /// Being rebuilt after an identity change.
    Recreating,
    Ready(Connection),
}

impl ConnectionState {
    pub fn connection(&self) -> Option<&Connection> {
        match self {
            ConnectionState::Ready(connection) => Some(connection),
            _ => None,
        }
    }
}

/// State of the "get my profile" query for the current identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProfileQuery {
    #[default]
    NotStarted,
    Loading,
    /// `None` means the caller is not registered.
    Resolved(Option<Profile>),
    Failed,
}

/// Top-level screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Loading,
    Unauthenticated,
    NeedsProfile,
    Ready,
}

/// Derive the screen from a snapshot of the three signals.
pub fn resolve(
    identity: &IdentityState,
    connection: &ConnectionState,
    profile: &ProfileQuery,
) -> Screen {
    let identity = match identity {
        IdentityState::Initializing => return Screen::Loading,
        IdentityState::Absent => return Screen::Unauthenticated,
        IdentityState::Present(identity) => identity,
    };

    // A connection built for a previous identity counts as not ready.
    let connected = connection
        .connection()
        .is_some_and(|c| c.is_bound_to(&identity.principal));
    if !connected {
        return Screen::Loading;
    }

    match profile {
        ProfileQuery::NotStarted | ProfileQuery::Loading => Screen::Loading,
        ProfileQuery::Resolved(None) | ProfileQuery::Failed => Screen::NeedsProfile,
        ProfileQuery::Resolved(Some(_)) => Screen::Ready,
    }
}
