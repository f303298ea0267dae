// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    /// The backend has no profile for the caller.
    #[error("User is not registered")]
    NotRegistered,

    /// An action needs a backend connection that is still being (re)created.
    #[error("Backend connection is not ready")]
    NotReady,

    #[error("{0}")]
    Validation(String),

    /// Transient backend failure (network, rate limit, 5xx).
    #[error("Backend error: {0}")]
    Backend(String),

    /// Backend rejected the request and retrying will not help.
    #[error("Backend rejected request: {0}")]
    BackendRejected(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether a retry might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Backend(_))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let message = fields
            .iter()
            .flat_map(|(_, errs)| errs.iter())
            .next()
            .map(|err| {
                err.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string())
            })
            .unwrap_or_else(|| "Invalid input".to_string());

        AppError::Validation(message)
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::NotRegistered => (StatusCode::NOT_FOUND, "not_registered", None),
            AppError::NotReady => (StatusCode::CONFLICT, "not_ready", None),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation", Some(msg.clone()))
            }
            AppError::Backend(msg) => {
                tracing::warn!(error = %msg, "Backend unavailable");
                (StatusCode::BAD_GATEWAY, "backend_error", Some(msg.clone()))
            }
            AppError::BackendRejected(msg) => {
                (StatusCode::BAD_GATEWAY, "backend_rejected", Some(msg.clone()))
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
