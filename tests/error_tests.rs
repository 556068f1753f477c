// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use move_for_ukraine::error::AppError;
use serde_json::Value;

async fn render(err: AppError) -> (StatusCode, Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_client_errors_keep_their_message() {
    let cases = [
        (AppError::forbidden(), StatusCode::FORBIDDEN, "forbidden", "Forbidden resource"),
        (AppError::user_not_found(), StatusCode::NOT_FOUND, "not_found", "User not found"),
        (
            AppError::training_not_found(),
            StatusCode::NOT_FOUND,
            "not_found",
            "Training not found",
        ),
        (
            AppError::BadRequest("startDate must not be after endDate".to_string()),
            StatusCode::BAD_REQUEST,
            "bad_request",
            "startDate must not be after endDate",
        ),
        (
            AppError::Conflict(AppError::EMAIL_TAKEN.to_string()),
            StatusCode::CONFLICT,
            "conflict",
            "User with this email already exists",
        ),
        (
            AppError::AuthFailed("Invalid Google token".to_string()),
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "Invalid Google token",
        ),
    ];

    for (err, status, code, message) in cases {
        let (got_status, body) = render(err).await;
        assert_eq!(got_status, status);
        assert_eq!(body["error"], code);
        assert_eq!(body["message"], message);
    }
}

#[tokio::test]
async fn test_token_errors_are_unauthorized() {
    let (status, body) = render(AppError::Unauthorized).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, body) = render(AppError::InvalidToken).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_token");
    assert_eq!(body["message"], "Unauthorized");
}

#[tokio::test]
async fn test_server_errors_hide_details() {
    let (status, body) = render(AppError::Database("deadline exceeded on users".to_string())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "database_error");
    assert!(!body["message"].as_str().unwrap().contains("deadline"));

    let (status, body) = render(AppError::Internal(anyhow::anyhow!("rng exploded"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body["message"].as_str().unwrap().contains("rng"));

    let (status, body) = render(AppError::GoogleApi("HTTP 503: try later".to_string())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "google_error");
    assert!(!body["message"].as_str().unwrap().contains("503"));
}

#[test]
fn test_validation_errors_become_bad_request() {
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(range(min = 1, message = "must be positive"))]
        count: i32,
    }

    let err: AppError = Probe { count: 0 }.validate().unwrap_err().into();
    match err {
        AppError::BadRequest(msg) => assert_eq!(msg, "count must be positive"),
        other => panic!("unexpected error: {other:?}"),
    }
}
