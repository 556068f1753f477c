// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Training (logged activity) model for storage and API.

use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Kind of exercise.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Running,
    Cycling,
    Walking,
}

impl ActivityType {
    pub const ALL: [ActivityType; 3] = [
        ActivityType::Running,
        ActivityType::Cycling,
        ActivityType::Walking,
    ];
}

/// Stored training record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Training {
    /// Document ID
    pub id: String,
    /// Owner (user document ID)
    pub user_id: String,
    #[serde(default)]
    pub description: String,
    /// When the training happened
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub date: DateTime<Utc>,
    /// Distance in kilometers
    pub distance: f64,
    pub activity_type: ActivityType,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Training as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct TrainingResponse {
    pub id: String,
    pub user_id: String,
    pub description: String,
    pub date: String,
    pub distance: f64,
    pub activity_type: ActivityType,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Training> for TrainingResponse {
    fn from(training: Training) -> Self {
        Self {
            id: training.id,
            user_id: training.user_id,
            description: training.description,
            date: format_utc_rfc3339(training.date),
            distance: training.distance,
            activity_type: training.activity_type,
            created_at: format_utc_rfc3339(training.created_at),
            updated_at: format_utc_rfc3339(training.updated_at),
        }
    }
}

/// One page of a user's training history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct TrainingPage {
    pub trainings: Vec<TrainingResponse>,
    pub total: u64,
    pub has_more: bool,
    pub skip: u64,
    pub limit: u64,
}

impl TrainingPage {
    pub fn new(trainings: Vec<Training>, total: u64, skip: u64, limit: u64) -> Self {
        Self {
            trainings: trainings.into_iter().map(TrainingResponse::from).collect(),
            total,
            has_more: skip.saturating_add(limit) < total,
            skip,
            limit,
        }
    }
}
