// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity authentication middleware.

use crate::error::AppError;
use crate::models::Principal;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Cookie carrying the identity token.
pub const SESSION_COOKIE: &str = "throne_token";

/// Authenticated caller, inserted into request extensions.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub principal: Principal,
}

/// Identity token from the session cookie, falling back to a bearer header.
pub fn request_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Middleware that requires a valid identity token for the signed-in principal.
///
/// The token must verify and name the principal the session is currently
/// signed in as; a token for any other principal is rejected.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request_token(&jar, request.headers()).ok_or(AppError::Unauthorized)?;
    let identity = state.verifier.verify(&token)?;

    if state.session.current_principal().as_ref() != Some(&identity.principal) {
        tracing::debug!(principal = %identity.principal, "Token does not match session identity");
        return Err(AppError::Unauthorized);
    }

    request.extensions_mut().insert(AuthUser {
        principal: identity.principal,
    });

    Ok(next.run(request).await)
}
