// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod stats;
pub mod training;
pub mod user;

pub use stats::{
    ActivityBreakdown, ActivityTotals, TeamActivity, UserActivity, UserActivitySummary,
};
pub use training::{ActivityType, Training, TrainingPage, TrainingResponse};
pub use user::{Role, User, UserResponse};
