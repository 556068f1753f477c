// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google userinfo client.
//!
//! The frontend completes the OAuth flow and hands us the access token; we
//! only resolve it to a profile.

use crate::error::AppError;
use serde::Deserialize;

/// Profile returned by Google's userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleUser {
    #[serde(default)]
    pub email: String,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl GoogleUser {
    /// Display name: "given family", else `name`, else the email local part.
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.given_name.as_deref(), self.family_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        if !parts.is_empty() {
            return parts.join(" ");
        }

        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self
                .email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }
}

/// Google userinfo API client.
#[derive(Clone)]
pub struct GoogleUserInfoClient {
    http: reqwest::Client,
    userinfo_url: String,
}

impl GoogleUserInfoClient {
    pub fn new(userinfo_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            userinfo_url: userinfo_url.into(),
        }
    }

    /// Resolve an OAuth access token to the user's Google profile.
    pub async fn fetch(&self, access_token: &str) -> Result<GoogleUser, AppError> {
        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| AppError::GoogleApi(format!("Userinfo request failed: {}", e)))?;

        let status = response.status();
        if status.is_client_error() {
            tracing::info!(status = status.as_u16(), "Google rejected access token");
            return Err(AppError::AuthFailed("Invalid Google token".to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::GoogleApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::GoogleApi(format!("JSON parse error: {}", e)))
    }
}
