// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Training CRUD and per-user history.

use crate::error::{AppError, Result};
use crate::extract::ValidatedJson;
use crate::middleware::guards::{require_owner_or_admin, require_self_or_admin};
use crate::middleware::AuthUser;
use crate::models::{Training, TrainingPage, TrainingResponse};
use crate::services::trainings::{self, CreateTrainingDto, PageQuery, UpdateTrainingDto};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Training routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/trainings", get(list_trainings).post(create_training))
        .route("/trainings/total-distance", get(total_distance))
        .route(
            "/trainings/{training_id}",
            get(get_training).put(update_training).delete(delete_training),
        )
        .route("/users/{user_id}/trainings", get(user_trainings))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct TotalDistanceResponse {
    pub total_distance: f64,
}

async fn load_training(state: &AppState, training_id: &str) -> Result<Training> {
    state
        .db
        .get_training(training_id)
        .await?
        .ok_or_else(AppError::training_not_found)
}

async fn list_trainings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TrainingResponse>>> {
    let trainings = state.db.list_trainings().await?;
    Ok(Json(
        trainings.into_iter().map(TrainingResponse::from).collect(),
    ))
}

async fn total_distance(State(state): State<Arc<AppState>>) -> Result<Json<TotalDistanceResponse>> {
    Ok(Json(TotalDistanceResponse {
        total_distance: state.db.total_distance().await?,
    }))
}

async fn get_training(
    State(state): State<Arc<AppState>>,
    Path(training_id): Path<String>,
) -> Result<Json<TrainingResponse>> {
    Ok(Json(load_training(&state, &training_id).await?.into()))
}

/// Log a training. Non-admins may only log for themselves.
async fn create_training(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    ValidatedJson(body): ValidatedJson<CreateTrainingDto>,
) -> Result<(StatusCode, Json<TrainingResponse>)> {
    require_self_or_admin(&state.db, &auth, &body.user_id).await?;

    let training =
        trainings::create_training(&state.db, &state.config, body, chrono::Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(training.into())))
}

async fn update_training(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(training_id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateTrainingDto>,
) -> Result<Json<TrainingResponse>> {
    let training = load_training(&state, &training_id).await?;
    require_owner_or_admin(&state.db, &auth, &training).await?;

    let training =
        trainings::update_training(&state.db, training, body, chrono::Utc::now()).await?;
    Ok(Json(training.into()))
}

async fn delete_training(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(training_id): Path<String>,
) -> Result<Json<TrainingResponse>> {
    let training = load_training(&state, &training_id).await?;
    require_owner_or_admin(&state.db, &auth, &training).await?;

    let training = trainings::delete_training(&state.db, training).await?;
    Ok(Json(training.into()))
}

/// Paginated training history of one user, newest first.
async fn user_trainings(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<TrainingPage>> {
    let (skip, limit) = query.resolve()?;
    let page = trainings::page_for_user(&state.db, &user_id, skip, limit).await?;
    Ok(Json(page))
}
