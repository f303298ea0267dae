// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::response::Response;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use throne_tracker::config::Config;
use throne_tracker::routes::create_router;
use throne_tracker::services::{IdentityVerifier, MemoryConnector};
use throne_tracker::session::{Session, SessionSettings};
use throne_tracker::AppState;

/// Create a test app backed by the offline in-memory backend.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let (app, state, _) = create_test_app_with_connector(Config::test_default());
    (app, state)
}

/// Create a test app with a specific frontend URL (drives cookie `Secure`).
#[allow(dead_code)]
pub fn create_test_app_with_frontend_url(frontend_url: &str) -> (axum::Router, Arc<AppState>) {
    let mut config = Config::test_default();
    config.frontend_url = frontend_url.to_string();
    let (app, state, _) = create_test_app_with_connector(config);
    (app, state)
}

/// Create a test app and also return the in-memory backend handle, for
/// seeding data and injecting outages.
#[allow(dead_code)]
pub fn create_test_app_with_connector(
    config: Config,
) -> (axum::Router, Arc<AppState>, MemoryConnector) {
    let connector = MemoryConnector::new();
    let session = Session::new(
        Arc::new(connector.clone()),
        SessionSettings::from_config(&config),
    );

    let state = Arc::new(AppState {
        verifier: IdentityVerifier::new(&config.identity_jwt_key),
        session,
        config,
    });

    (create_router(state.clone()), state, connector)
}

/// Create a test identity token.
#[allow(dead_code)]
pub fn create_test_jwt(principal: &str, signing_key: &[u8]) -> String {
    #[derive(Serialize)]
    struct Claims {
        sub: String,
        exp: usize,
        iat: usize,
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    let claims = Claims {
        sub: principal.to_string(),
        exp: now + 86400,
        iat: now,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .unwrap()
}

/// Sign the session in as `principal` and return its token.
#[allow(dead_code)]
pub async fn sign_in(state: &AppState, principal: &str) -> String {
    let token = create_test_jwt(principal, &state.config.identity_jwt_key);
    let identity = state.verifier.verify(&token).unwrap();
    state.session.sign_in(identity).await;
    token
}

/// Read a JSON response body.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
