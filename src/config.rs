// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honored for local development. Production deployments
//! inject the same variables through the runtime environment.

use chrono::{DateTime, Utc};
use std::env;

/// Default Google endpoint used to resolve an OAuth access token to a profile.
pub const DEFAULT_GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v1/userinfo";

/// Campaign opening instant: 12 Aug 2025, 07:00 CEST.
pub const DEFAULT_CAMPAIGN_START: &str = "2025-08-12T05:00:00Z";

/// Longest accepted session lifetime: one week.
pub const MAX_JWT_TTL_MINUTES: i64 = 7 * 24 * 60;

/// Which document store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    Firestore,
    Memory,
}

impl std::str::FromStr for DatabaseBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(Self::Firestore),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::Invalid("DATABASE_BACKEND", s.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL (allowed CORS origin)
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Store backing users and trainings
    pub database_backend: DatabaseBackend,

    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Session token lifetime in minutes
    pub jwt_ttl_minutes: i64,
    /// Shared password for `/auth/dev`; dev login is impossible when unset
    pub dev_auth_password: Option<String>,

    /// Relaxes the email domain check and the campaign gate
    pub is_dev_env: bool,
    /// Deployment environment name; `/auth/dev` only works in "development"
    pub app_env: Option<String>,

    pub google_userinfo_url: String,
    pub allowed_email_domain: String,
    /// Trainings cannot be created before this instant (outside dev)
    pub campaign_start: DateTime<Utc>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", raw))?,
            Err(_) => 3000,
        };

        let jwt_ttl_minutes = match env::var("JWT_TTL_MINUTES") {
            Ok(raw) => parse_jwt_ttl(&raw)?,
            Err(_) => 30,
        };

        let database_backend = env::var("DATABASE_BACKEND")
            .unwrap_or_else(|_| "firestore".to_string())
            .parse()?;

        let campaign_start = parse_campaign_start(
            &env::var("CAMPAIGN_START").unwrap_or_else(|_| DEFAULT_CAMPAIGN_START.to_string()),
        )?;

        Ok(Self {
            port,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            database_backend,

            jwt_signing_key: env::var("JWT_SECRET")
                .map_err(|_| ConfigError::Missing("JWT_SECRET"))?
                .into_bytes(),
            jwt_ttl_minutes,
            dev_auth_password: env::var("DEV_AUTH_PASSWORD")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),

            is_dev_env: env::var("IS_DEV_ENV").is_ok_and(|v| v == "true"),
            app_env: env::var("APP_ENV").ok().filter(|v| !v.is_empty()),

            google_userinfo_url: env::var("GOOGLE_USERINFO_URL")
                .unwrap_or_else(|_| DEFAULT_GOOGLE_USERINFO_URL.to_string()),
            allowed_email_domain: env::var("ALLOWED_EMAIL_DOMAIN")
                .map(|v| v.trim().to_ascii_lowercase())
                .unwrap_or_else(|_| "box.com".to_string()),
            campaign_start,
        })
    }

    /// Deterministic configuration for tests.
    ///
    /// Uses the in-memory store, dev mode, and a campaign that has already
    /// started so the gate never interferes unless a test asks for it.
    pub fn test_default() -> Self {
        Self {
            port: 3000,
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            database_backend: DatabaseBackend::Memory,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            jwt_ttl_minutes: 30,
            dev_auth_password: Some("test-dev-password".to_string()),
            is_dev_env: true,
            app_env: None,
            google_userinfo_url: DEFAULT_GOOGLE_USERINFO_URL.to_string(),
            allowed_email_domain: "box.com".to_string(),
            campaign_start: DateTime::from_timestamp(0, 0).unwrap_or_default(),
        }
    }

    /// `/auth/dev` is available when no environment is named or it is "development".
    pub fn dev_login_enabled(&self) -> bool {
        self.app_env
            .as_deref()
            .map_or(true, |env| env == "development")
    }
}

fn parse_jwt_ttl(raw: &str) -> Result<i64, ConfigError> {
    match raw.trim().parse::<i64>() {
        Ok(minutes) if (1..=MAX_JWT_TTL_MINUTES).contains(&minutes) => Ok(minutes),
        _ => Err(ConfigError::Invalid("JWT_TTL_MINUTES", raw.to_string())),
    }
}

fn parse_campaign_start(raw: &str) -> Result<DateTime<Utc>, ConfigError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ConfigError::Invalid("CAMPAIGN_START", raw.to_string()))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
