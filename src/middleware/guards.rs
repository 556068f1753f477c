// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Role and ownership checks.
//!
//! The JWT only carries identity; roles are always read from the store.

use crate::db::Db;
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::{Training, User};

/// Whether `actor` may act on records owned by `owner_id`.
pub fn may_act_for(actor: &User, owner_id: &str) -> bool {
    actor.id == owner_id || actor.is_admin()
}

async fn load_caller(db: &Db, auth: &AuthUser) -> Result<User, AppError> {
    db.get_user(&auth.id).await?.ok_or_else(|| {
        tracing::warn!(user_id = %auth.id, "Token subject has no user record");
        AppError::forbidden()
    })
}

/// Require the caller to be an admin.
pub async fn require_admin(db: &Db, auth: &AuthUser) -> Result<User, AppError> {
    let caller = load_caller(db, auth).await?;
    if caller.is_admin() {
        Ok(caller)
    } else {
        Err(AppError::forbidden())
    }
}

/// Require the caller to be `target_user_id` or an admin.
pub async fn require_self_or_admin(
    db: &Db,
    auth: &AuthUser,
    target_user_id: &str,
) -> Result<User, AppError> {
    let caller = load_caller(db, auth).await?;
    if may_act_for(&caller, target_user_id) {
        Ok(caller)
    } else {
        Err(AppError::forbidden())
    }
}

/// Require the caller to own `training` or be an admin.
pub async fn require_owner_or_admin(
    db: &Db,
    auth: &AuthUser,
    training: &Training,
) -> Result<User, AppError> {
    require_self_or_admin(db, auth, &training.user_id).await
}
