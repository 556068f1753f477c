// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Date-range activity aggregates for leaderboards and team totals.
//!
//! Everything here is a pure fold over already-fetched trainings; the
//! storage layer only narrows the set to the requested date range.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::training::{ActivityType, Training, TrainingResponse};

/// Distance and count over a set of trainings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTotals {
    /// Kilometers
    pub total_distance: f64,
    pub total_trainings: u64,
}

impl ActivityTotals {
    pub fn add(&mut self, training: &Training) {
        self.total_distance += training.distance;
        self.total_trainings += 1;
    }
}

/// Totals per activity type. Always carries every type, zeroed when unused.
pub type ActivityBreakdown = BTreeMap<ActivityType, ActivityTotals>;

fn empty_breakdown() -> ActivityBreakdown {
    ActivityType::ALL
        .into_iter()
        .map(|t| (t, ActivityTotals::default()))
        .collect()
}

/// Running totals plus the per-type split.
#[derive(Debug, Clone)]
struct Accumulator {
    totals: ActivityTotals,
    by_type: ActivityBreakdown,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self {
            totals: ActivityTotals::default(),
            by_type: empty_breakdown(),
        }
    }
}

impl Accumulator {
    fn add(&mut self, training: &Training) {
        self.totals.add(training);
        self.by_type
            .entry(training.activity_type)
            .or_default()
            .add(training);
    }
}

/// A single user's activity within a date range, with the trainings themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct UserActivity {
    pub user_id: String,
    pub total_distance: f64,
    pub total_trainings: u64,
    pub by_activity_type: ActivityBreakdown,
    pub trainings: Vec<TrainingResponse>,
}

/// Leaderboard row: one user's totals within a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct UserActivitySummary {
    pub user_id: String,
    pub total_distance: f64,
    pub total_trainings: u64,
    pub by_activity_type: ActivityBreakdown,
}

/// Whole-team totals within a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct TeamActivity {
    pub total_distance: f64,
    pub total_trainings: u64,
    /// Distinct users with at least one training in range
    pub total_users: u64,
    pub by_activity_type: ActivityBreakdown,
}

/// Sum of distances, in kilometers.
pub fn total_distance(trainings: &[Training]) -> f64 {
    trainings.iter().map(|t| t.distance).sum()
}

/// Activity of `user_id`, ignoring trainings owned by anyone else.
pub fn summarize_user(user_id: &str, trainings: Vec<Training>) -> UserActivity {
    let mut acc = Accumulator::default();
    let own: Vec<Training> = trainings
        .into_iter()
        .filter(|t| t.user_id == user_id)
        .collect();

    for training in &own {
        acc.add(training);
    }

    UserActivity {
        user_id: user_id.to_string(),
        total_distance: acc.totals.total_distance,
        total_trainings: acc.totals.total_trainings,
        by_activity_type: acc.by_type,
        trainings: own.into_iter().map(TrainingResponse::from).collect(),
    }
}

/// One row per user that trained, ordered for a leaderboard: most distance
/// first, ties by user id.
pub fn group_by_user(trainings: &[Training]) -> Vec<UserActivitySummary> {
    let mut per_user: HashMap<&str, Accumulator> = HashMap::new();
    for training in trainings {
        per_user
            .entry(training.user_id.as_str())
            .or_default()
            .add(training);
    }

    let mut rows: Vec<UserActivitySummary> = per_user
        .into_iter()
        .map(|(user_id, acc)| UserActivitySummary {
            user_id: user_id.to_string(),
            total_distance: acc.totals.total_distance,
            total_trainings: acc.totals.total_trainings,
            by_activity_type: acc.by_type,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total_distance
            .total_cmp(&a.total_distance)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    rows
}

pub fn summarize_team(trainings: &[Training]) -> TeamActivity {
    let mut acc = Accumulator::default();
    let mut users: HashSet<&str> = HashSet::new();

    for training in trainings {
        acc.add(training);
        users.insert(training.user_id.as_str());
    }

    TeamActivity {
        total_distance: acc.totals.total_distance,
        total_trainings: acc.totals.total_trainings,
        total_users: users.len() as u64,
        by_activity_type: acc.by_type,
    }
}
