// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Date-range activity aggregates.
//!
//! These are queries with a body, so they are POSTs that answer 200.

use crate::error::Result;
use crate::extract::ValidatedJson;
use crate::models::stats::{group_by_user, summarize_team, summarize_user};
use crate::models::{TeamActivity, UserActivity, UserActivitySummary};
use crate::services::trainings::{activities_in_range, DateRangeDto};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use std::sync::Arc;

/// Aggregate routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/{user_id}/activities", post(user_activities))
        .route("/users/activities", post(all_users_activities))
        .route("/teams/activities", post(team_activities))
}

async fn user_activities(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    ValidatedJson(range): ValidatedJson<DateRangeDto>,
) -> Result<Json<UserActivity>> {
    let trainings = activities_in_range(&state.db, &range).await?;
    Ok(Json(summarize_user(&user_id, trainings)))
}

/// Leaderboard rows, highest distance first.
async fn all_users_activities(
    State(state): State<Arc<AppState>>,
    ValidatedJson(range): ValidatedJson<DateRangeDto>,
) -> Result<Json<Vec<UserActivitySummary>>> {
    let trainings = activities_in_range(&state.db, &range).await?;
    Ok(Json(group_by_user(&trainings)))
}

async fn team_activities(
    State(state): State<Arc<AppState>>,
    ValidatedJson(range): ValidatedJson<DateRangeDto>,
) -> Result<Json<TeamActivity>> {
    let trainings = activities_in_range(&state.db, &range).await?;
    Ok(Json(summarize_team(&trainings)))
}
