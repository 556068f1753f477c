// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Date-range aggregation endpoint tests.

use axum::http::{Method, StatusCode};
use move_for_ukraine::models::{ActivityType, Role, User};
use move_for_ukraine::AppState;
use serde_json::{json, Value};
use std::sync::Arc;

mod common;
use common::{create_test_app, seed_training, seed_user, send, token_for};

const AUGUST: (&str, &str) = ("2025-08-01T00:00:00Z", "2025-08-31T23:59:59Z");

fn range(start: &str, end: &str) -> Value {
    json!({"startDate": start, "endDate": end})
}

/// alice: 5 run + 3 walk in range, 100 cycle out of range
/// bob:   20 cycle in range
async fn seed(state: &Arc<AppState>) -> (User, User) {
    let alice = seed_user(state, "alice@box.com", Role::Employee).await;
    let bob = seed_user(state, "bob@box.com", Role::Employee).await;

    seed_training(state, &alice.id, "2025-08-01T00:00:00Z", 5.0, ActivityType::Running).await;
    seed_training(state, &alice.id, "2025-08-15T09:30:00Z", 3.0, ActivityType::Walking).await;
    seed_training(state, &alice.id, "2025-07-31T23:59:59Z", 100.0, ActivityType::Cycling).await;
    seed_training(state, &bob.id, "2025-08-31T23:59:59Z", 20.0, ActivityType::Cycling).await;

    (alice, bob)
}

#[tokio::test]
async fn test_user_activities_in_range() {
    let (app, state) = create_test_app();
    let (alice, bob) = seed(&state).await;
    let token = token_for(&state, &bob);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/users/{}/activities", alice.id),
        Some(&token),
        Some(range(AUGUST.0, AUGUST.1)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], alice.id);
    assert_eq!(body["totalDistance"], 8.0);
    assert_eq!(body["totalTrainings"], 2);
    assert_eq!(body["trainings"].as_array().unwrap().len(), 2);
    assert_eq!(body["byActivityType"]["running"]["totalDistance"], 5.0);
    assert_eq!(body["byActivityType"]["cycling"]["totalTrainings"], 0);
}

#[tokio::test]
async fn test_range_bounds_inclusive() {
    let (app, state) = create_test_app();
    let (_, bob) = seed(&state).await;
    let token = token_for(&state, &bob);

    // Exactly the instant of bob's only training
    let (_, body) = send(
        &app,
        Method::POST,
        "/teams/activities",
        Some(&token),
        Some(range("2025-08-31T23:59:59Z", "2025-08-31T23:59:59Z")),
    )
    .await;

    assert_eq!(body["totalTrainings"], 1);
    assert_eq!(body["totalDistance"], 20.0);
}

#[tokio::test]
async fn test_leaderboard_order_and_team_totals_agree() {
    let (app, state) = create_test_app();
    let (alice, bob) = seed(&state).await;
    let token = token_for(&state, &alice);

    let (status, rows) = send(
        &app,
        Method::POST,
        "/users/activities",
        Some(&token),
        Some(range(AUGUST.0, AUGUST.1)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = rows.as_array().unwrap().clone();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["userId"], bob.id);
    assert_eq!(rows[1]["userId"], alice.id);

    let (status, team) = send(
        &app,
        Method::POST,
        "/teams/activities",
        Some(&token),
        Some(range(AUGUST.0, AUGUST.1)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(team["totalUsers"], 2);
    assert_eq!(team["totalTrainings"], 3);
    assert_eq!(team["totalDistance"], 28.0);

    let row_sum: f64 = rows
        .iter()
        .map(|r| r["totalDistance"].as_f64().unwrap())
        .sum();
    assert_eq!(row_sum, team["totalDistance"].as_f64().unwrap());
}

#[tokio::test]
async fn test_empty_range() {
    let (app, state) = create_test_app();
    let (alice, _) = seed(&state).await;
    let token = token_for(&state, &alice);

    let (status, team) = send(
        &app,
        Method::POST,
        "/teams/activities",
        Some(&token),
        Some(range("2024-01-01", "2024-12-31")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(team["totalUsers"], 0);
    assert_eq!(team["totalDistance"], 0.0);
}

#[tokio::test]
async fn test_bad_ranges_rejected() {
    let (app, state) = create_test_app();
    let (alice, _) = seed(&state).await;
    let token = token_for(&state, &alice);

    for body in [
        range("2025-09-01", "2025-08-01"),
        range("yesterday", "2025-08-01"),
        json!({"startDate": "2025-08-01"}),
    ] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/teams/activities",
            Some(&token),
            Some(body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_aggregates_require_auth() {
    let (app, _) = create_test_app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/teams/activities",
        None,
        Some(range(AUGUST.0, AUGUST.1)),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
