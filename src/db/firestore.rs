// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Collections:
//! - `users` (document ID = user ID)
//! - `user_emails` (document ID = hex of the email, holds the owning user ID)
//! - `trainings` (document ID = training ID)

use crate::db::{collections, sort_users};
use crate::error::AppError;
use crate::models::{Role, Training, User};
use chrono::{DateTime, Utc};
use firestore::{FirestoreQueryDirection, FirestoreTimestamp, FirestoreWritePrecondition};
use serde::{Deserialize, Serialize};

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

fn db_err(e: impl std::fmt::Display) -> AppError {
    AppError::Database(e.to_string())
}

fn email_taken() -> AppError {
    AppError::Conflict(AppError::EMAIL_TAKEN.to_string())
}

/// Reservation that makes an email address belong to a single user.
#[derive(Debug, Serialize, Deserialize)]
struct EmailClaim {
    user_id: String,
}

/// Emails may contain `/`, which document IDs cannot.
fn email_key(email: &str) -> String {
    hex::encode(email.as_bytes())
}

/// Firestore offsets and limits are 32-bit.
fn clamp_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreStore {
    client: firestore::FirestoreDb,
}

impl FirestoreStore {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Emulator connection with a dummy bearer token.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore emulator");

        Ok(Self { client })
    }

    pub async fn ping(&self) -> bool {
        let result = self
            .client
            .fluent()
            .select()
            .from(collections::USERS)
            .limit(1)
            .query()
            .await;

        match result {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Firestore ping failed");
                false
            }
        }
    }

    // ─── User Operations ─────────────────────────────────────────

    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(id)
            .await
            .map_err(db_err)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users: Vec<User> = self
            .client
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(|q| q.for_all([q.field("email").eq(email)]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(db_err)?;

        Ok(users.into_iter().next())
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.client
            .fluent()
            .select()
            .from(collections::USERS)
            .order_by([("created_at", FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(db_err)
    }

    /// Sorted client-side to avoid a composite index on (role, created_at).
    pub async fn list_users_by_role(&self, role: Role) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = self
            .client
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(|q| q.for_all([q.field("role").eq(role.as_str())]))
            .obj()
            .query()
            .await
            .map_err(db_err)?;

        sort_users(&mut users);
        Ok(users)
    }

    pub async fn count_users(&self) -> Result<u64, AppError> {
        let docs = self
            .client
            .fluent()
            .select()
            .from(collections::USERS)
            .query()
            .await
            .map_err(db_err)?;
        Ok(docs.len() as u64)
    }

    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        self.write_user(user, None).await
    }

    pub async fn update_user(&self, user: &User) -> Result<(), AppError> {
        let previous = self.get_user(&user.id).await?;
        let released = previous.map(|p| p.email).filter(|email| *email != user.email);
        self.write_user(user, released.as_deref()).await
    }

    /// Write `user` together with its email claim in one transaction.
    ///
    /// A missing claim is created with an exists=false precondition, so of two
    /// racing writers for the same address only one commit succeeds.
    async fn write_user(&self, user: &User, released_email: Option<&str>) -> Result<(), AppError> {
        let key = email_key(&user.email);
        let owner = self.email_owner(&key).await?;
        if owner.as_deref().is_some_and(|id| id != user.id) {
            return Err(email_taken());
        }

        let claim = EmailClaim {
            user_id: user.id.clone(),
        };
        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        if owner.is_none() {
            self.client
                .fluent()
                .update()
                .in_col(collections::USER_EMAILS)
                .precondition(FirestoreWritePrecondition::Exists(false))
                .document_id(&key)
                .object(&claim)
                .add_to_transaction(&mut transaction)
                .map_err(db_err)?;
        }

        self.client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .add_to_transaction(&mut transaction)
            .map_err(db_err)?;

        if let Some(old) = released_email {
            self.client
                .fluent()
                .delete()
                .from(collections::USER_EMAILS)
                .document_id(email_key(old))
                .add_to_transaction(&mut transaction)
                .map_err(db_err)?;
        }

        if let Err(e) = transaction.commit().await {
            if self
                .email_owner(&key)
                .await?
                .is_some_and(|id| id != user.id)
            {
                tracing::info!(user_id = %user.id, "Lost email claim to a concurrent writer");
                return Err(email_taken());
            }
            return Err(AppError::Database(format!("Failed to commit user write: {}", e)));
        }
        Ok(())
    }

    async fn email_owner(&self, key: &str) -> Result<Option<String>, AppError> {
        let claim: Option<EmailClaim> = self
            .client
            .fluent()
            .select()
            .by_id_in(collections::USER_EMAILS)
            .obj()
            .one(key)
            .await
            .map_err(db_err)?;
        Ok(claim.map(|c| c.user_id))
    }

    /// Delete a user document and release its email claim.
    pub async fn delete_user(&self, id: &str) -> Result<(), AppError> {
        let Some(user) = self.get_user(id).await? else {
            return Ok(());
        };
        let key = email_key(&user.email);
        let release = self.email_owner(&key).await?.as_deref() == Some(id);

        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        self.client
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(id)
            .add_to_transaction(&mut transaction)
            .map_err(db_err)?;

        if release {
            self.client
                .fluent()
                .delete()
                .from(collections::USER_EMAILS)
                .document_id(&key)
                .add_to_transaction(&mut transaction)
                .map_err(db_err)?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit user deletion: {}", e)))?;
        Ok(())
    }

    // ─── Training Operations ─────────────────────────────────────

    pub async fn get_training(&self, id: &str) -> Result<Option<Training>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::TRAININGS)
            .obj()
            .one(id)
            .await
            .map_err(db_err)
    }

    pub async fn list_trainings(&self) -> Result<Vec<Training>, AppError> {
        self.client
            .fluent()
            .select()
            .from(collections::TRAININGS)
            .order_by([
                ("date", FirestoreQueryDirection::Descending),
                ("id", FirestoreQueryDirection::Ascending),
            ])
            .obj()
            .query()
            .await
            .map_err(db_err)
    }

    pub async fn list_trainings_for_user(
        &self,
        user_id: &str,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Training>, AppError> {
        self.client
            .fluent()
            .select()
            .from(collections::TRAININGS)
            .filter(|q| q.for_all([q.field("user_id").eq(user_id)]))
            .order_by([
                ("date", FirestoreQueryDirection::Descending),
                ("id", FirestoreQueryDirection::Ascending),
            ])
            .offset(clamp_u32(skip))
            .limit(clamp_u32(limit))
            .obj()
            .query()
            .await
            .map_err(db_err)
    }

    pub async fn count_trainings_for_user(&self, user_id: &str) -> Result<u64, AppError> {
        Ok(self.trainings_owned_by(user_id).await?.len() as u64)
    }

    pub async fn list_trainings_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Training>, AppError> {
        self.client
            .fluent()
            .select()
            .from(collections::TRAININGS)
            .filter(|q| {
                q.for_all([
                    q.field("date")
                        .greater_than_or_equal(FirestoreTimestamp(start)),
                    q.field("date").less_than_or_equal(FirestoreTimestamp(end)),
                ])
            })
            .order_by([
                ("date", FirestoreQueryDirection::Descending),
                ("id", FirestoreQueryDirection::Ascending),
            ])
            .obj()
            .query()
            .await
            .map_err(db_err)
    }

    /// Create or replace a training document.
    pub async fn put_training(&self, training: &Training) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::TRAININGS)
            .document_id(&training.id)
            .object(training)
            .execute()
            .await
            .map_err(db_err)?;
        Ok(())
    }

    pub async fn delete_training(&self, id: &str) -> Result<(), AppError> {
        self.client
            .fluent()
            .delete()
            .from(collections::TRAININGS)
            .document_id(id)
            .execute()
            .await
            .map_err(db_err)?;
        Ok(())
    }

    pub async fn delete_trainings_for_user(&self, user_id: &str) -> Result<usize, AppError> {
        let trainings = self.trainings_owned_by(user_id).await?;
        self.batch_delete(&trainings, collections::TRAININGS, |t: &Training| {
            t.id.clone()
        })
        .await?;

        tracing::debug!(user_id, count = trainings.len(), "Deleted trainings");
        Ok(trainings.len())
    }

    // ─── Helper Methods ────────────────────────────────────────────

    async fn trainings_owned_by(&self, user_id: &str) -> Result<Vec<Training>, AppError> {
        self.client
            .fluent()
            .select()
            .from(collections::TRAININGS)
            .filter(|q| q.for_all([q.field("user_id").eq(user_id)]))
            .obj()
            .query()
            .await
            .map_err(db_err)
    }

    /// Delete documents in transactions of at most `BATCH_SIZE` writes.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = self
                .client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                self.client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }
}
