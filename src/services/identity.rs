// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity tokens issued by the external identity provider.
//!
//! Tokens are HS256 JWTs whose subject is the caller's principal. The raw
//! token is kept on the [`Identity`] so backend calls can present it.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AppError;
use crate::models::Principal;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (principal)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated identity handle.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    pub principal: Principal,
    pub expires_at: Option<DateTime<Utc>>,
    token: String,
}

impl Identity {
    pub fn new(principal: Principal, token: impl Into<String>) -> Self {
        Self {
            principal,
            expires_at: None,
            token: token.into(),
        }
    }

    /// Bearer token presented to the backend.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("principal", &self.principal)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Verifies identity tokens against the shared signing key.
#[derive(Clone)]
pub struct IdentityVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl IdentityVerifier {
    pub fn new(signing_key: &[u8]) -> Self {
        Self {
            key: DecodingKey::from_secret(signing_key),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Decode and validate a token, returning the identity it names.
    pub fn verify(&self, token: &str) -> Result<Identity, AppError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "Rejected identity token");
            AppError::InvalidToken
        })?;

        let subject = data.claims.sub.trim();
        if subject.is_empty() {
            return Err(AppError::InvalidToken);
        }

        Ok(Identity {
            principal: Principal::new(subject),
            expires_at: i64::try_from(data.claims.exp)
                .ok()
                .and_then(|exp| DateTime::from_timestamp(exp, 0)),
            token: token.to_string(),
        })
    }
}

/// Create an identity token (used by the offline identity flow and tests).
pub fn create_identity_token(principal: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: principal.to_string(),
        iat: now,
        exp: now + 24 * 60 * 60, // 1 day
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"unit_test_identity_key_32_bytes!";

    #[test]
    fn test_verify_round_trip() {
        let token = create_identity_token("rdmx6-jaaaa", KEY).unwrap();
        let identity = IdentityVerifier::new(KEY).verify(&token).unwrap();

        assert_eq!(identity.principal, Principal::new("rdmx6-jaaaa"));
        assert_eq!(identity.token(), token);
        assert!(identity.expires_at.is_some());
    }

    #[test]
    fn test_verify_rejects_wrong_key() {
        let token = create_identity_token("rdmx6-jaaaa", b"another_key_entirely_32_bytes!!!").unwrap();
        let result = IdentityVerifier::new(KEY).verify(&token);
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_verify_rejects_expired() {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let claims = Claims {
            sub: "rdmx6-jaaaa".to_string(),
            iat: 1_000,
            exp: 2_000,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(KEY),
        )
        .unwrap();

        let result = IdentityVerifier::new(KEY).verify(&token);
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_debug_hides_token() {
        let identity = Identity::new(Principal::new("p"), "secret-token");
        assert!(!format!("{:?}", identity).contains("secret-token"));
    }
}
