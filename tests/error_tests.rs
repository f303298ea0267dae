// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use throne_tracker::error::AppError;

#[test]
fn test_only_backend_errors_are_transient() {
    assert!(AppError::Backend("timeout".to_string()).is_transient());

    assert!(!AppError::BackendRejected("bad request".to_string()).is_transient());
    assert!(!AppError::NotRegistered.is_transient());
    assert!(!AppError::Validation("Please enter a display name".to_string()).is_transient());
    assert!(!AppError::Unauthorized.is_transient());
}

#[test]
fn test_status_mapping() {
    let cases = [
        (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
        (AppError::InvalidToken, StatusCode::UNAUTHORIZED),
        (AppError::NotRegistered, StatusCode::NOT_FOUND),
        (AppError::NotReady, StatusCode::CONFLICT),
        (
            AppError::Validation("x".to_string()),
            StatusCode::BAD_REQUEST,
        ),
        (AppError::Backend("x".to_string()), StatusCode::BAD_GATEWAY),
        (
            AppError::BackendRejected("x".to_string()),
            StatusCode::BAD_GATEWAY,
        ),
        (
            AppError::Internal(anyhow::anyhow!("boom")),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (err, status) in cases {
        let label = err.to_string();
        assert_eq!(err.into_response().status(), status, "{}", label);
    }
}

#[tokio::test]
async fn test_validation_details_in_body() {
    let response =
        AppError::Validation("Please enter a valid number of wipes".to_string()).into_response();

    let body = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["error"], "validation");
    assert_eq!(json["details"], "Please enter a valid number of wipes");
}

#[tokio::test]
async fn test_internal_error_hides_details() {
    let response = AppError::Internal(anyhow::anyhow!("secret path")).into_response();

    let body = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["error"], "internal_error");
    assert!(json.get("details").is_none());
}
