// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User management.

use crate::db::{new_id, Db};
use crate::error::AppError;
use crate::models::user::normalize_email;
use crate::models::{Role, User};
use chrono::Utc;
use serde::Deserialize;
use validator::{Validate, ValidationError};

pub(crate) fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be empty".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserDto {
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    pub role: Option<Role>,
    #[validate(url(message = "must be a URL"))]
    pub image_url: Option<String>,
}

/// Partial update; absent fields are left as they are.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserDto {
    #[validate(email(message = "must be a valid email"))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    pub role: Option<Role>,
    #[validate(url(message = "must be a URL"))]
    pub image_url: Option<String>,
}

/// Fail with 409 if `email` belongs to anyone other than `except_id`.
async fn ensure_email_free(db: &Db, email: &str, except_id: Option<&str>) -> Result<(), AppError> {
    match db.find_user_by_email(email).await? {
        Some(existing) if Some(existing.id.as_str()) != except_id => {
            Err(AppError::Conflict(AppError::EMAIL_TAKEN.to_string()))
        }
        _ => Ok(()),
    }
}

pub async fn create_user(db: &Db, dto: CreateUserDto) -> Result<User, AppError> {
    let email = normalize_email(&dto.email);
    ensure_email_free(db, &email, None).await?;

    let now = Utc::now();
    let user = User {
        id: new_id()?,
        email,
        name: dto.name.trim().to_string(),
        role: dto.role.unwrap_or_default(),
        image_url: dto.image_url,
        created_at: now,
        updated_at: now,
    };
    db.insert_user(&user).await?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "User created");
    Ok(user)
}

pub async fn update_user(db: &Db, id: &str, dto: UpdateUserDto) -> Result<User, AppError> {
    let mut user = db.get_user(id).await?.ok_or_else(AppError::user_not_found)?;

    if let Some(email) = dto.email {
        let email = normalize_email(&email);
        if email != user.email {
            ensure_email_free(db, &email, Some(id)).await?;
            user.email = email;
        }
    }
    if let Some(name) = dto.name {
        user.name = name.trim().to_string();
    }
    if let Some(role) = dto.role {
        user.role = role;
    }
    if let Some(image_url) = dto.image_url {
        user.image_url = Some(image_url);
    }
    user.updated_at = Utc::now();

    db.update_user(&user).await?;
    tracing::info!(user_id = %user.id, "User updated");
    Ok(user)
}

/// Delete a user and every training they own. Returns the deleted user.
pub async fn delete_user(db: &Db, id: &str) -> Result<User, AppError> {
    let user = db.get_user(id).await?.ok_or_else(AppError::user_not_found)?;

    let trainings = db.delete_trainings_for_user(id).await?;
    db.delete_user(id).await?;

    tracing::info!(user_id = %id, trainings, "User deleted");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(email: &str) -> CreateUserDto {
        CreateUserDto {
            email: email.to_string(),
            name: "Jane".to_string(),
            role: None,
            image_url: None,
        }
    }

    #[test]
    fn test_dto_validation() {
        assert!(dto("jane@box.com").validate().is_ok());
        assert!(dto("not-an-email").validate().is_err());

        let mut blank = dto("jane@box.com");
        blank.name = "   ".to_string();
        assert!(blank.validate().is_err());

        assert!(UpdateUserDto::default().validate().is_ok());
    }

    #[tokio::test]
    async fn test_email_uniqueness_is_case_insensitive() {
        let db = Db::in_memory();
        let jane = create_user(&db, dto("Jane@Box.com")).await.unwrap();
        assert_eq!(jane.email, "jane@box.com");
        assert_eq!(jane.role, Role::User);

        let err = create_user(&db, dto("JANE@box.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_keeps_own_email() {
        let db = Db::in_memory();
        let jane = create_user(&db, dto("jane@box.com")).await.unwrap();
        create_user(&db, dto("john@box.com")).await.unwrap();

        let same = UpdateUserDto {
            email: Some("jane@box.com".to_string()),
            ..Default::default()
        };
        assert!(update_user(&db, &jane.id, same).await.is_ok());

        let taken = UpdateUserDto {
            email: Some("john@box.com".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            update_user(&db, &jane.id, taken).await,
            Err(AppError::Conflict(_))
        ));
    }
}
