// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login flows: Google access token exchange and the development bypass.

use crate::config::Config;
use crate::db::{new_id, Db};
use crate::error::AppError;
use crate::middleware::auth::create_jwt;
use crate::models::user::normalize_email;
use crate::models::{Role, User};
use crate::services::google::{GoogleUser, GoogleUserInfoClient};
use chrono::Utc;
use subtle::ConstantTimeEq;

const USER_INVALID: &str = "User is invalid";

/// Signed session token for `user`.
pub fn issue_token(config: &Config, user: &User) -> Result<String, AppError> {
    Ok(create_jwt(
        &user.id,
        &user.email,
        &config.jwt_signing_key,
        config.jwt_ttl_minutes,
    )?)
}

/// Reject emails that are malformed or, outside dev, from a foreign domain.
fn check_email(config: &Config, email: &str) -> Result<(), AppError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(AppError::BadRequest(USER_INVALID.to_string()));
    };
    if local.is_empty() {
        return Err(AppError::BadRequest(USER_INVALID.to_string()));
    }

    if !config.is_dev_env && !domain.eq_ignore_ascii_case(&config.allowed_email_domain) {
        return Err(AppError::AuthFailed(format!(
            "Only @{} emails are allowed",
            config.allowed_email_domain
        )));
    }
    Ok(())
}

async fn find_or_create(
    db: &Db,
    google_user: &GoogleUser,
    email: String,
) -> Result<User, AppError> {
    if let Some(mut user) = db.find_user_by_email(&email).await? {
        if user.image_url.is_none() && google_user.picture.is_some() {
            user.image_url = google_user.picture.clone();
            user.updated_at = Utc::now();
            db.update_user(&user).await?;
        }
        return Ok(user);
    }

    let now = Utc::now();
    let user = User {
        id: new_id()?,
        email,
        name: google_user.display_name(),
        role: Role::User,
        image_url: google_user.picture.clone(),
        created_at: now,
        updated_at: now,
    };
    match db.insert_user(&user).await {
        Ok(()) => {
            tracing::info!(user_id = %user.id, "User created from Google login");
            Ok(user)
        }
        // A concurrent first login for the same address won the email claim
        Err(AppError::Conflict(_)) => db
            .find_user_by_email(&user.email)
            .await?
            .ok_or_else(|| AppError::Conflict(AppError::EMAIL_TAKEN.to_string())),
        Err(e) => Err(e),
    }
}

/// Exchange a Google access token for a session. Creates the user on first login.
pub async fn google_login(
    db: &Db,
    config: &Config,
    google: &GoogleUserInfoClient,
    google_token: &str,
) -> Result<(User, String), AppError> {
    let google_user = google.fetch(google_token).await?;
    let email = normalize_email(&google_user.email);
    check_email(config, &email)?;

    let user = find_or_create(db, &google_user, email).await?;
    let token = issue_token(config, &user)?;

    tracing::info!(user_id = %user.id, "Google login");
    Ok((user, token))
}

/// Log in as any existing user with the shared development password.
pub async fn dev_login(
    db: &Db,
    config: &Config,
    email: &str,
    password: &str,
) -> Result<String, AppError> {
    if !config.dev_login_enabled() {
        return Err(AppError::BadRequest("Not dev env.".to_string()));
    }

    let password_ok = config
        .dev_auth_password
        .as_deref()
        .filter(|expected| !expected.is_empty())
        .is_some_and(|expected| bool::from(expected.as_bytes().ct_eq(password.as_bytes())));
    if !password_ok {
        return Err(AppError::Forbidden("Invalid dev auth password.".to_string()));
    }

    let user = db
        .find_user_by_email(&normalize_email(email))
        .await?
        .ok_or_else(AppError::user_not_found)?;

    tracing::warn!(user_id = %user.id, "Development login");
    issue_token(config, &user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_email_rules() {
        let mut config = Config::test_default();
        config.is_dev_env = false;

        assert!(check_email(&config, "jane@box.com").is_ok());
        assert!(check_email(&config, "jane@BOX.com").is_ok());
        assert!(matches!(
            check_email(&config, "jane@gmail.com"),
            Err(AppError::AuthFailed(msg)) if msg == "Only @box.com emails are allowed"
        ));
        assert!(matches!(
            check_email(&config, "no-at-sign"),
            Err(AppError::BadRequest(_))
        ));

        config.is_dev_env = true;
        assert!(check_email(&config, "jane@gmail.com").is_ok());
    }

    #[tokio::test]
    async fn test_dev_login_password_and_env() {
        let db = Db::in_memory();
        let mut config = Config::test_default();

        assert!(matches!(
            dev_login(&db, &config, "x@box.com", "wrong").await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            dev_login(&db, &config, "x@box.com", "test-dev-password").await,
            Err(AppError::NotFound(_))
        ));

        config.app_env = Some("production".to_string());
        assert!(matches!(
            dev_login(&db, &config, "x@box.com", "test-dev-password").await,
            Err(AppError::BadRequest(_))
        ));

        config.app_env = None;
        config.dev_auth_password = None;
        assert!(matches!(
            dev_login(&db, &config, "x@box.com", "").await,
            Err(AppError::Forbidden(_))
        ));
    }
}
