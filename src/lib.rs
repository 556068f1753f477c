// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Move for Ukraine: team fitness logging backend
//!
//! REST API for logging running, cycling and walking trainings, with
//! role-based access control and date-range leaderboards.

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Db;
use services::GoogleUserInfoClient;
use std::time::Instant;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub google: GoogleUserInfoClient,
    /// Process start, for `/health` uptime
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config, db: Db) -> Self {
        let google = GoogleUserInfoClient::new(config.google_userinfo_url.clone());
        Self {
            config,
            db,
            google,
            started_at: Instant::now(),
        }
    }
}
