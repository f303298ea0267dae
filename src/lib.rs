// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Throne-Tracker: a friendly competition over who visits the throne most.
//!
//! This crate provides the client core (session readiness, identity-keyed
//! query cache, ranking engine) plus a small local view server that a
//! browser front-end polls for what to render.

pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod ranking;
pub mod readiness;
pub mod routes;
pub mod services;
pub mod session;
pub mod time_utils;

use config::Config;
use services::IdentityVerifier;
use session::Session;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub session: Session,
    pub verifier: IdentityVerifier,
}
