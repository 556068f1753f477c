// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory store for local development and tests.
//!
//! Same operations and ordering as the Firestore store, held in concurrent
//! maps so handlers never need a lock of their own.

use crate::db::{sort_trainings, sort_users};
use crate::error::AppError;
use crate::models::{Role, Training, User};
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<DashMap<String, User>>,
    /// Email -> owning user id. Claimed before the user row is written.
    emails: Arc<DashMap<String, String>>,
    trainings: Arc<DashMap<String, Training>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_trainings<F>(&self, keep: F) -> Vec<Training>
    where
        F: Fn(&Training) -> bool,
    {
        let mut trainings: Vec<Training> = self
            .trainings
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        sort_trainings(&mut trainings);
        trainings
    }

    pub async fn ping(&self) -> bool {
        true
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.get(id).map(|u| u.value().clone()))
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.value().email == email)
            .map(|entry| entry.value().clone()))
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = self.users.iter().map(|e| e.value().clone()).collect();
        sort_users(&mut users);
        Ok(users)
    }

    pub async fn list_users_by_role(&self, role: Role) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .filter(|e| e.value().role == role)
            .map(|e| e.value().clone())
            .collect();
        sort_users(&mut users);
        Ok(users)
    }

    pub async fn count_users(&self) -> Result<u64, AppError> {
        Ok(self.users.len() as u64)
    }

    /// Reserve `email` for `user_id`. Fails if another user holds it.
    fn claim_email(&self, email: &str, user_id: &str) -> Result<(), AppError> {
        match self.emails.entry(email.to_string()) {
            Entry::Occupied(owner) if owner.get() != user_id => {
                Err(AppError::Conflict(AppError::EMAIL_TAKEN.to_string()))
            }
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(slot) => {
                slot.insert(user_id.to_string());
                Ok(())
            }
        }
    }

    fn release_email(&self, email: &str, user_id: &str) {
        self.emails.remove_if(email, |_, owner| owner == user_id);
    }

    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        self.claim_email(&user.email, &user.id)?;
        self.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    pub async fn update_user(&self, user: &User) -> Result<(), AppError> {
        self.claim_email(&user.email, &user.id)?;
        let previous = self.users.insert(user.id.clone(), user.clone());
        if let Some(previous) = previous.filter(|p| p.email != user.email) {
            self.release_email(&previous.email, &user.id);
        }
        Ok(())
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), AppError> {
        if let Some((_, user)) = self.users.remove(id) {
            self.release_email(&user.email, id);
        }
        Ok(())
    }

    pub async fn get_training(&self, id: &str) -> Result<Option<Training>, AppError> {
        Ok(self.trainings.get(id).map(|t| t.value().clone()))
    }

    pub async fn list_trainings(&self) -> Result<Vec<Training>, AppError> {
        Ok(self.collect_trainings(|_| true))
    }

    pub async fn list_trainings_for_user(
        &self,
        user_id: &str,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Training>, AppError> {
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(self
            .collect_trainings(|t| t.user_id == user_id)
            .into_iter()
            .skip(skip)
            .take(limit)
            .collect())
    }

    pub async fn count_trainings_for_user(&self, user_id: &str) -> Result<u64, AppError> {
        Ok(self
            .trainings
            .iter()
            .filter(|e| e.value().user_id == user_id)
            .count() as u64)
    }

    pub async fn list_trainings_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Training>, AppError> {
        Ok(self.collect_trainings(|t| t.date >= start && t.date <= end))
    }

    pub async fn put_training(&self, training: &Training) -> Result<(), AppError> {
        self.trainings.insert(training.id.clone(), training.clone());
        Ok(())
    }

    pub async fn delete_training(&self, id: &str) -> Result<(), AppError> {
        self.trainings.remove(id);
        Ok(())
    }

    pub async fn delete_trainings_for_user(&self, user_id: &str) -> Result<usize, AppError> {
        let mut removed = 0;
        self.trainings.retain(|_, t| {
            let keep = t.user_id != user_id;
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityType;
    use chrono::TimeZone;

    fn user(id: &str, email: &str, role: Role, day: u32) -> User {
        let at = Utc.with_ymd_and_hms(2025, 1, day, 0, 0, 0).unwrap();
        User {
            id: id.to_string(),
            email: email.to_string(),
            name: id.to_string(),
            role,
            image_url: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn training(id: &str, user_id: &str, day: u32) -> Training {
        let at = Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap();
        Training {
            id: id.to_string(),
            user_id: user_id.to_string(),
            description: String::new(),
            date: at,
            distance: 1.0,
            activity_type: ActivityType::Walking,
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn test_users_newest_first_and_by_role() {
        let store = MemoryStore::new();
        store.insert_user(&user("a", "a@box.com", Role::Admin, 1)).await.unwrap();
        store.insert_user(&user("b", "b@box.com", Role::Employee, 3)).await.unwrap();
        store.insert_user(&user("c", "c@box.com", Role::Employee, 2)).await.unwrap();

        let ids: Vec<String> = store
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(ids, vec!["b", "c", "a"]);

        let employees = store.list_users_by_role(Role::Employee).await.unwrap();
        assert_eq!(employees.len(), 2);
        assert_eq!(
            store.find_user_by_email("c@box.com").await.unwrap().map(|u| u.id),
            Some("c".to_string())
        );
    }

    #[tokio::test]
    async fn test_pagination_and_cascade() {
        let store = MemoryStore::new();
        for day in 1..=5 {
            store.put_training(&training(&format!("t{day}"), "u1", day)).await.unwrap();
        }
        store.put_training(&training("other", "u2", 9)).await.unwrap();

        let page = store.list_trainings_for_user("u1", 1, 2).await.unwrap();
        let ids: Vec<&str> = page.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t4", "t3"]);
        assert_eq!(store.count_trainings_for_user("u1").await.unwrap(), 5);
        assert!(store.list_trainings_for_user("u1", 10, 2).await.unwrap().is_empty());

        assert_eq!(store.delete_trainings_for_user("u1").await.unwrap(), 5);
        assert_eq!(store.list_trainings().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_range_is_inclusive() {
        let store = MemoryStore::new();
        for day in 1..=4 {
            store.put_training(&training(&format!("t{day}"), "u1", day)).await.unwrap();
        }
        let start = Utc.with_ymd_and_hms(2025, 3, 2, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 3, 12, 0, 0).unwrap();

        let ids: Vec<String> = store
            .list_trainings_in_range(start, end)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["t3", "t2"]);
    }

    #[tokio::test]
    async fn test_email_is_unique_across_users() {
        let store = MemoryStore::new();
        store.insert_user(&user("a", "jane@box.com", Role::Employee, 1)).await.unwrap();

        let err = store
            .insert_user(&user("b", "jane@box.com", Role::Employee, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(msg) if msg == AppError::EMAIL_TAKEN));
        assert!(store.get_user("b").await.unwrap().is_none());

        // Moving to a taken address fails, moving to a free one releases the old
        let mut other = user("c", "carl@box.com", Role::Employee, 3);
        store.insert_user(&other).await.unwrap();
        other.email = "jane@box.com".to_string();
        assert!(store.update_user(&other).await.is_err());
        other.email = "carl.new@box.com".to_string();
        store.update_user(&other).await.unwrap();
        store.insert_user(&user("d", "carl@box.com", Role::Employee, 4)).await.unwrap();

        // Deleting frees the address
        store.delete_user("a").await.unwrap();
        store.insert_user(&user("e", "jane@box.com", Role::Employee, 5)).await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_email_claims_admit_one() {
        let store = MemoryStore::new();
        let handles: Vec<_> = (0..16)
            .map(|n| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .insert_user(&user(&format!("u{n}"), "race@box.com", Role::User, 1))
                        .await
                        .is_ok()
                })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(store.count_users().await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_cascade_count_with_concurrent_inserts() {
        let store = MemoryStore::new();
        for n in 0..500 {
            store.put_training(&training(&format!("a{n}"), "u1", 1)).await.unwrap();
        }

        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                for n in 0..50_000 {
                    store.put_training(&training(&format!("b{n}"), "u2", 2)).await.unwrap();
                }
            })
        };

        let mut removed = 0;
        while !writer.is_finished() {
            removed += store.delete_trainings_for_user("u1").await.unwrap();
        }
        writer.await.unwrap();
        removed += store.delete_trainings_for_user("u1").await.unwrap();

        assert_eq!(removed, 500);
        assert_eq!(store.count_trainings_for_user("u2").await.unwrap(), 50_000);
    }
}
