// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::{DateTime, Utc};
use move_for_ukraine::config::Config;
use move_for_ukraine::db::{new_id, Db};
use move_for_ukraine::middleware::auth::create_jwt;
use move_for_ukraine::models::{ActivityType, Role, Training, User};
use move_for_ukraine::routes::create_router;
use move_for_ukraine::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Connect to the Firestore emulator.
#[allow(dead_code)]
pub async fn test_db() -> Db {
    Db::firestore("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app backed by the in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with(config: Config) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, Db::in_memory()));
    (create_router(state.clone()), state)
}

/// Session token for `user`, signed with the test key.
#[allow(dead_code)]
pub fn token_for(state: &AppState, user: &User) -> String {
    create_jwt(
        &user.id,
        &user.email,
        &state.config.jwt_signing_key,
        state.config.jwt_ttl_minutes,
    )
    .expect("Failed to create JWT")
}

#[allow(dead_code)]
pub fn parse_time(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("valid RFC3339")
        .with_timezone(&Utc)
}

/// Insert a user directly into the store.
#[allow(dead_code)]
pub async fn seed_user(state: &AppState, email: &str, role: Role) -> User {
    let now = Utc::now();
    let user = User {
        id: new_id().unwrap(),
        email: email.to_string(),
        name: email.split('@').next().unwrap().to_string(),
        role,
        image_url: None,
        created_at: now,
        updated_at: now,
    };
    state.db.insert_user(&user).await.unwrap();
    user
}

/// Insert a training directly into the store.
#[allow(dead_code)]
pub async fn seed_training(
    state: &AppState,
    user_id: &str,
    date: &str,
    distance: f64,
    activity_type: ActivityType,
) -> Training {
    let date = parse_time(date);
    let training = Training {
        id: new_id().unwrap(),
        user_id: user_id.to_string(),
        description: String::new(),
        date,
        distance,
        activity_type,
        created_at: date,
        updated_at: date,
    };
    state.db.insert_training(&training).await.unwrap();
    training
}

/// Send a request through the router and decode the JSON response body
/// (`Value::Null` when the body is empty or not JSON).
#[allow(dead_code)]
pub async fn send(
    app: &axum::Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
