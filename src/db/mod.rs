// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! [`Db`] is what handlers hold. It forwards to either the Firestore store
//! used in production or the in-memory store used by local runs and tests.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{Role, Training, User};
use chrono::{DateTime, Utc};
use ring::rand::{SecureRandom, SystemRandom};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// One document per taken email, id = hex of the address
    pub const USER_EMAILS: &str = "user_emails";
    pub const TRAININGS: &str = "trainings";
}

/// Generate a new document ID: 12 random bytes as 24 lowercase hex chars.
pub fn new_id() -> Result<String, AppError> {
    let mut bytes = [0u8; 12];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("system RNG failure")))?;
    Ok(hex::encode(bytes))
}

/// Sort users newest first.
pub(crate) fn sort_users(users: &mut [User]) {
    users.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Sort trainings by date, newest first.
pub(crate) fn sort_trainings(trainings: &mut [Training]) {
    trainings.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
}

/// Storage handle shared through `AppState`.
#[derive(Clone)]
pub enum Db {
    Firestore(FirestoreStore),
    Memory(MemoryStore),
}

macro_rules! dispatch {
    ($self:ident, $store:ident => $call:expr) => {
        match $self {
            Db::Firestore($store) => $call.await,
            Db::Memory($store) => $call.await,
        }
    };
}

impl Db {
    /// Connect to Firestore (or its emulator when `FIRESTORE_EMULATOR_HOST` is set).
    pub async fn firestore(project_id: &str) -> Result<Self, AppError> {
        Ok(Db::Firestore(FirestoreStore::new(project_id).await?))
    }

    pub fn in_memory() -> Self {
        Db::Memory(MemoryStore::new())
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Db::Firestore(_) => "firestore",
            Db::Memory(_) => "memory",
        }
    }

    /// True when the store answers a trivial query.
    pub async fn ping(&self) -> bool {
        dispatch!(self, s => s.ping())
    }

    // ─── Users ───────────────────────────────────────────────────

    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        dispatch!(self, s => s.get_user(id))
    }

    /// Look up a user by (already normalized) email.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        dispatch!(self, s => s.find_user_by_email(email))
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        dispatch!(self, s => s.list_users())
    }

    pub async fn list_users_by_role(&self, role: Role) -> Result<Vec<User>, AppError> {
        dispatch!(self, s => s.list_users_by_role(role))
    }

    pub async fn count_users(&self) -> Result<u64, AppError> {
        dispatch!(self, s => s.count_users())
    }

    /// Store a new user. Fails with 409 if the email is held by another user.
    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        dispatch!(self, s => s.insert_user(user))
    }

    /// Replace a user, moving the email reservation when the address changes.
    pub async fn update_user(&self, user: &User) -> Result<(), AppError> {
        dispatch!(self, s => s.update_user(user))
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), AppError> {
        dispatch!(self, s => s.delete_user(id))
    }

    // ─── Trainings ───────────────────────────────────────────────

    pub async fn get_training(&self, id: &str) -> Result<Option<Training>, AppError> {
        dispatch!(self, s => s.get_training(id))
    }

    pub async fn list_trainings(&self) -> Result<Vec<Training>, AppError> {
        dispatch!(self, s => s.list_trainings())
    }

    /// One page of a user's trainings, newest first.
    pub async fn list_trainings_for_user(
        &self,
        user_id: &str,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Training>, AppError> {
        dispatch!(self, s => s.list_trainings_for_user(user_id, skip, limit))
    }

    pub async fn count_trainings_for_user(&self, user_id: &str) -> Result<u64, AppError> {
        dispatch!(self, s => s.count_trainings_for_user(user_id))
    }

    /// Trainings with `start <= date <= end`, newest first.
    pub async fn list_trainings_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Training>, AppError> {
        dispatch!(self, s => s.list_trainings_in_range(start, end))
    }

    pub async fn insert_training(&self, training: &Training) -> Result<(), AppError> {
        dispatch!(self, s => s.put_training(training))
    }

    pub async fn update_training(&self, training: &Training) -> Result<(), AppError> {
        dispatch!(self, s => s.put_training(training))
    }

    pub async fn delete_training(&self, id: &str) -> Result<(), AppError> {
        dispatch!(self, s => s.delete_training(id))
    }

    /// Remove every training owned by `user_id`. Returns how many were deleted.
    pub async fn delete_trainings_for_user(&self, user_id: &str) -> Result<usize, AppError> {
        dispatch!(self, s => s.delete_trainings_for_user(user_id))
    }

    /// Sum of all training distances, in kilometers.
    pub async fn total_distance(&self) -> Result<f64, AppError> {
        let trainings = self.list_trainings().await?;
        Ok(crate::models::stats::total_distance(&trainings))
    }
}
