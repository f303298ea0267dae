// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - backend access and identity.

pub mod backend;
pub mod identity;
pub mod retry;

pub use backend::{Backend, Connection, Connector, HttpConnector, MemoryConnector};
pub use identity::{create_identity_token, Identity, IdentityVerifier};
pub use retry::RetryPolicy;
