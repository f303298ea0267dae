// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-in and sign-out routes.
//!
//! The identity provider hands the browser a signed identity token; the
//! front-end posts it here to switch the session's identity. The token is
//! then carried in an HttpOnly cookie for the protected API routes.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::Result;
use crate::middleware::SESSION_COOKIE;
use crate::session::SessionView;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    token: String,
}

/// Session cookie; attributes must match between creation and removal.
fn session_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::days(1))
        .build()
}

/// Verify an identity token and switch the session to it.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionView>)> {
    let token = req.token.trim().to_string();
    let identity = state.verifier.verify(&token)?;
    let principal = identity.principal.clone();

    let screen = state.session.sign_in(identity).await;
    tracing::info!(principal = %principal, ?screen, "Signed in");

    let jar = jar.add(session_cookie(token, state.config.secure_cookies()));
    Ok((jar, Json(state.session.view())))
}

/// Drop the session identity and clear the cookie.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, StatusCode) {
    state.session.sign_out();

    let mut removal = session_cookie(String::new(), state.config.secure_cookies());
    removal.make_removal();

    (jar.add(removal), StatusCode::NO_CONTENT)
}
