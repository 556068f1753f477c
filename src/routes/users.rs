// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User directory and admin user management.

use crate::error::{AppError, Result};
use crate::extract::ValidatedJson;
use crate::middleware::guards::require_admin;
use crate::middleware::AuthUser;
use crate::models::{Role, User, UserResponse};
use crate::services::users::{self, CreateUserDto, UpdateUserDto};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use std::sync::Arc;

/// User routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/admins", get(list_admins))
        .route("/users/employees", get(list_employees))
        .route(
            "/users/{user_id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

fn to_responses(users: Vec<User>) -> Json<Vec<UserResponse>> {
    Json(users.into_iter().map(UserResponse::from).collect())
}

async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<UserResponse>>> {
    Ok(to_responses(state.db.list_users().await?))
}

async fn list_admins(State(state): State<Arc<AppState>>) -> Result<Json<Vec<UserResponse>>> {
    Ok(to_responses(state.db.list_users_by_role(Role::Admin).await?))
}

async fn list_employees(State(state): State<Arc<AppState>>) -> Result<Json<Vec<UserResponse>>> {
    Ok(to_responses(
        state.db.list_users_by_role(Role::Employee).await?,
    ))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>> {
    let user = state
        .db
        .get_user(&user_id)
        .await?
        .ok_or_else(AppError::user_not_found)?;
    Ok(Json(user.into()))
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    ValidatedJson(body): ValidatedJson<CreateUserDto>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    require_admin(&state.db, &auth).await?;
    let user = users::create_user(&state.db, body).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateUserDto>,
) -> Result<Json<UserResponse>> {
    require_admin(&state.db, &auth).await?;
    let user = users::update_user(&state.db, &user_id, body).await?;
    Ok(Json(user.into()))
}

/// Delete a user together with their trainings.
async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>> {
    let admin = require_admin(&state.db, &auth).await?;
    tracing::info!(admin_id = %admin.id, user_id = %user_id, "Admin deleting user");

    let user = users::delete_user(&state.db, &user_id).await?;
    Ok(Json(user.into()))
}
