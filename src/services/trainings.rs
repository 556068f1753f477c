// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Training writes, paging and date-range loading.

use crate::config::Config;
use crate::db::{new_id, Db};
use crate::error::AppError;
use crate::models::{ActivityType, Training, TrainingPage};
use crate::services::users::validate_not_blank;
use crate::time_utils::{parse_date_input, validate_date_input};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

pub const DEFAULT_PAGE_LIMIT: u64 = 20;
pub const MAX_PAGE_LIMIT: u64 = 100;

const GATE_CLOSED: &str = "Activity creation is not allowed yet";
const FUTURE_DATE: &str = "Training date cannot be in the future";

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrainingDto {
    #[validate(custom(function = "validate_not_blank"))]
    pub user_id: String,
    #[serde(default)]
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub description: String,
    #[validate(custom(function = "validate_date_input"))]
    pub date: String,
    /// Kilometers
    #[validate(range(exclusive_min = 0.0, max = 999.0, message = "must be in (0, 999]"))]
    pub distance: f64,
    pub activity_type: ActivityType,
}

/// Partial update; absent fields are left as they are.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTrainingDto {
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_date_input"))]
    pub date: Option<String>,
    #[validate(range(exclusive_min = 0.0, max = 999.0, message = "must be in (0, 999]"))]
    pub distance: Option<f64>,
    pub activity_type: Option<ActivityType>,
}

/// Body of the aggregation endpoints.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeDto {
    #[validate(custom(function = "validate_date_input"))]
    pub start_date: String,
    #[validate(custom(function = "validate_date_input"))]
    pub end_date: String,
}

impl DateRangeDto {
    /// Inclusive `(start, end)` bounds.
    pub fn bounds(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
        let start = parse_date(&self.start_date, "startDate")?;
        let end = parse_date(&self.end_date, "endDate")?;
        if start > end {
            return Err(AppError::BadRequest(
                "startDate must not be after endDate".to_string(),
            ));
        }
        Ok((start, end))
    }
}

/// Raw `skip`/`limit` query values.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub skip: Option<String>,
    pub limit: Option<String>,
}

impl PageQuery {
    /// Resolve to `(skip, limit)`. Empty values take the default and `limit`
    /// is capped at [`MAX_PAGE_LIMIT`].
    pub fn resolve(&self) -> Result<(u64, u64), AppError> {
        let skip = match non_empty(&self.skip) {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                AppError::BadRequest("skip must be a non-negative integer".to_string())
            })?,
            None => 0,
        };

        let limit = match non_empty(&self.limit) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(limit) if limit >= 1 => limit.min(MAX_PAGE_LIMIT),
                _ => {
                    return Err(AppError::BadRequest(
                        "limit must be a positive integer".to_string(),
                    ))
                }
            },
            None => DEFAULT_PAGE_LIMIT,
        };

        Ok((skip, limit))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(raw: &str, field: &str) -> Result<DateTime<Utc>, AppError> {
    parse_date_input(raw)
        .ok_or_else(|| AppError::BadRequest(format!("{} must be an ISO 8601 date", field)))
}

/// Parse a training date and reject anything after `now`.
fn past_date(raw: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, AppError> {
    let date = parse_date(raw, "date")?;
    if date > now {
        return Err(AppError::BadRequest(FUTURE_DATE.to_string()));
    }
    Ok(date)
}

/// Outside dev environments, nothing may be logged before the campaign opens.
pub fn check_campaign_gate(config: &Config, now: DateTime<Utc>) -> Result<(), AppError> {
    if !config.is_dev_env && now < config.campaign_start {
        return Err(AppError::BadRequest(GATE_CLOSED.to_string()));
    }
    Ok(())
}

pub async fn create_training(
    db: &Db,
    config: &Config,
    dto: CreateTrainingDto,
    now: DateTime<Utc>,
) -> Result<Training, AppError> {
    check_campaign_gate(config, now)?;
    let date = past_date(&dto.date, now)?;

    if db.get_user(&dto.user_id).await?.is_none() {
        return Err(AppError::user_not_found());
    }

    let training = Training {
        id: new_id()?,
        user_id: dto.user_id,
        description: dto.description,
        date,
        distance: dto.distance,
        activity_type: dto.activity_type,
        created_at: now,
        updated_at: now,
    };
    db.insert_training(&training).await?;

    tracing::info!(
        training_id = %training.id,
        user_id = %training.user_id,
        distance = training.distance,
        "Training created"
    );
    Ok(training)
}

/// Apply `dto` to an already loaded (and authorized) training.
pub async fn update_training(
    db: &Db,
    mut training: Training,
    dto: UpdateTrainingDto,
    now: DateTime<Utc>,
) -> Result<Training, AppError> {
    if let Some(date) = dto.date.as_deref() {
        training.date = past_date(date, now)?;
    }
    if let Some(description) = dto.description {
        training.description = description;
    }
    if let Some(distance) = dto.distance {
        training.distance = distance;
    }
    if let Some(activity_type) = dto.activity_type {
        training.activity_type = activity_type;
    }
    training.updated_at = now;

    db.update_training(&training).await?;
    tracing::info!(training_id = %training.id, "Training updated");
    Ok(training)
}

pub async fn delete_training(db: &Db, training: Training) -> Result<Training, AppError> {
    db.delete_training(&training.id).await?;
    tracing::info!(
        training_id = %training.id,
        user_id = %training.user_id,
        "Training deleted"
    );
    Ok(training)
}

pub async fn page_for_user(
    db: &Db,
    user_id: &str,
    skip: u64,
    limit: u64,
) -> Result<TrainingPage, AppError> {
    let (trainings, total) = futures_util::future::try_join(
        db.list_trainings_for_user(user_id, skip, limit),
        db.count_trainings_for_user(user_id),
    )
    .await?;

    Ok(TrainingPage::new(trainings, total, skip, limit))
}

/// Trainings of all users inside the requested range.
pub async fn activities_in_range(db: &Db, range: &DateRangeDto) -> Result<Vec<Training>, AppError> {
    let (start, end) = range.bounds()?;
    db.list_trainings_in_range(start, end).await
}
