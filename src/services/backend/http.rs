// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP client for the backend RPC surface.
//!
//! Handles:
//! - One `POST {base}/rpc/{method}` call per RPC, JSON in and out
//! - Bearer identity token on every call
//! - Mapping HTTP failures onto the client's error taxonomy

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::error::AppError;
use crate::models::{DailyStats, Profile, RankedStats};
use crate::services::backend::{Backend, Connector};
use crate::services::Identity;

/// Body marker the backend uses for callers without a profile.
const NOT_REGISTERED_CODE: &str = "not_registered";

/// Creates [`HttpBackend`] actors sharing one connection pool.
#[derive(Clone)]
pub struct HttpConnector {
    http: reqwest::Client,
    base_url: String,
}

impl HttpConnector {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let base_url = base_url.into();
        reqwest::Url::parse(&base_url).map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Invalid backend URL {}: {}", base_url, e))
        })?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Connector for HttpConnector {
    async fn connect(&self, identity: &Identity) -> Result<Arc<dyn Backend>, AppError> {
        tracing::debug!(principal = %identity.principal, "Creating backend actor");
        Ok(Arc::new(HttpBackend {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token: identity.token().to_string(),
        }))
    }
}

/// Backend actor speaking JSON RPC over HTTP for one identity.
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpBackend {
    fn url(&self, method: &str) -> String {
        format!("{}/rpc/{}", self.base_url, method)
    }

    async fn send(
        &self,
        method: &str,
        args: serde_json::Value,
    ) -> Result<reqwest::Response, AppError> {
        let response = self
            .http
            .post(self.url(method))
            .bearer_auth(&self.token)
            .json(&args)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("{} request failed: {}", method, e)))?;

        check_response(response).await
    }

    /// RPC returning no value.
    async fn call_unit(&self, method: &str, args: serde_json::Value) -> Result<(), AppError> {
        self.send(method, args).await?;
        Ok(())
    }

    /// RPC returning a JSON value.
    async fn call_json<T: DeserializeOwned>(
        &self,
        method: &str,
        args: serde_json::Value,
    ) -> Result<T, AppError> {
        self.send(method, args)
            .await?
            .json()
            .await
            .map_err(|e| AppError::BackendRejected(format!("JSON parse error: {}", e)))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn register(&self, profile: &Profile) -> Result<(), AppError> {
        self.call_unit("register", json!({ "profile": profile })).await
    }

    async fn get_my_profile(&self) -> Result<Option<Profile>, AppError> {
        self.call_json("getMyProfile", json!({})).await
    }

    async fn create_poop_entry(&self, number_of_wipes: u64) -> Result<(), AppError> {
        self.call_unit("createPoopEntry", json!({ "numberOfWipes": number_of_wipes }))
            .await
    }

    async fn get_ranked_user_stats(&self) -> Result<RankedStats, AppError> {
        self.call_json("getRankedUserStats", json!({})).await
    }

    async fn get_daily_stats(&self) -> Result<DailyStats, AppError> {
        self.call_json("getDailyStats", json!({})).await
    }
}

/// Check response status and return error if not successful.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(error_for_status(status, &body))
}

/// Map a failed HTTP status (and body) onto the client error taxonomy.
fn error_for_status(status: StatusCode, body: &str) -> AppError {
    if status == StatusCode::NOT_FOUND || body.contains(NOT_REGISTERED_CODE) {
        return AppError::NotRegistered;
    }

    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            tracing::warn!("Backend rate limit hit (429)");
            AppError::Backend("rate limited".to_string())
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Unauthorized,
        s if s.is_server_error() => AppError::Backend(format!("HTTP {}: {}", s, body)),
        s => AppError::BackendRejected(format!("HTTP {}: {}", s, body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_registered_mapping() {
        assert!(matches!(
            error_for_status(StatusCode::NOT_FOUND, ""),
            AppError::NotRegistered
        ));
        assert!(matches!(
            error_for_status(
                StatusCode::BAD_REQUEST,
                r#"{"error":"not_registered","details":"User is not registered"}"#
            ),
            AppError::NotRegistered
        ));
    }

    #[test]
    fn test_transient_statuses() {
        let err = error_for_status(StatusCode::TOO_MANY_REQUESTS, "");
        assert!(err.is_transient());

        let err = error_for_status(StatusCode::SERVICE_UNAVAILABLE, "maintenance");
        assert!(err.is_transient());
        assert!(err.to_string().contains("maintenance"));
    }

    #[test]
    fn test_permanent_statuses() {
        assert!(matches!(
            error_for_status(StatusCode::UNAUTHORIZED, ""),
            AppError::Unauthorized
        ));

        let err = error_for_status(StatusCode::UNPROCESSABLE_ENTITY, "bad wipes");
        assert!(!err.is_transient());
        assert!(matches!(err, AppError::BackendRejected(_)));
    }

    #[test]
    fn test_connector_rejects_invalid_url() {
        let result = HttpConnector::new("not a url", Duration::from_secs(1));
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_connect_binds_token() {
        let connector =
            HttpConnector::new("http://127.0.0.1:4943/", Duration::from_secs(1)).unwrap();
        assert_eq!(connector.base_url, "http://127.0.0.1:4943");

        let identity = Identity::new(crate::models::Principal::new("p"), "tok");
        assert!(connector.connect(&identity).await.is_ok());
    }
}
