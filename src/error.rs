// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    extract::rejection::JsonRejection,
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

    /// Login rejected, with a reason the client may show
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Google API error: {0}")]
    GoogleApi(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub const USER_NOT_FOUND: &'static str = "User not found";
    pub const TRAINING_NOT_FOUND: &'static str = "Training not found";
    pub const EMAIL_TAKEN: &'static str = "User with this email already exists";

    pub fn forbidden() -> Self {
        AppError::Forbidden("Forbidden resource".to_string())
    }

    pub fn user_not_found() -> Self {
        AppError::NotFound(Self::USER_NOT_FOUND.to_string())
    }

    pub fn training_not_found() -> Self {
        AppError::NotFound(Self::TRAINING_NOT_FOUND.to_string())
    }

    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidToken | AppError::AuthFailed(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::GoogleApi(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let reason = errs
                    .iter()
                    .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| "is invalid".to_string());
                format!("{} {}", field, reason)
            })
            .collect();
        fields.sort();
        AppError::BadRequest(fields.join("; "))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, message) = match self {
            AppError::Unauthorized => ("unauthorized", "Unauthorized".to_string()),
            AppError::InvalidToken => ("invalid_token", "Unauthorized".to_string()),
            AppError::AuthFailed(msg) => ("unauthorized", msg),
            AppError::Forbidden(msg) => ("forbidden", msg),
            AppError::NotFound(msg) => ("not_found", msg),
            AppError::BadRequest(msg) => ("bad_request", msg),
            AppError::Conflict(msg) => ("conflict", msg),
            AppError::GoogleApi(msg) => {
                tracing::warn!(error = %msg, "Google API error");
                ("google_error", "Upstream identity provider failed".to_string())
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                ("database_error", "Internal server error".to_string())
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                ("internal_error", "Internal server error".to_string())
            }
        };

        (status, Json(ErrorResponse { error, message })).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
