// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login routes.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::Result;
use crate::extract::ValidatedJson;
use crate::models::UserResponse;
use crate::services::auth;
use crate::services::users::validate_not_blank;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/google", post(google_login))
        .route("/auth/dev", post(dev_login))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLoginRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub google_token: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DevLoginRequest {
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    #[serde(default)]
    pub dev_password: String,
}

/// Logged-in user plus their session token.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(flatten)]
    #[cfg_attr(feature = "binding-generation", ts(flatten))]
    pub user: UserResponse,
    pub access_token: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
}

/// Exchange a Google access token for a session token.
async fn google_login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<GoogleLoginRequest>,
) -> Result<Json<LoginResponse>> {
    let (user, access_token) =
        auth::google_login(&state.db, &state.config, &state.google, &body.google_token).await?;

    Ok(Json(LoginResponse {
        user: user.into(),
        access_token,
    }))
}

/// Development bypass: log in as an existing user by email.
async fn dev_login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<DevLoginRequest>,
) -> Result<Json<AccessTokenResponse>> {
    let access_token =
        auth::dev_login(&state.db, &state.config, &body.email, &body.dev_password).await?;
    Ok(Json(AccessTokenResponse { access_token }))
}
