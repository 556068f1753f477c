// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Move for Ukraine API Server

use move_for_ukraine::{
    config::{Config, DatabaseBackend},
    db::Db,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        dev = config.is_dev_env,
        "Starting Move for Ukraine API"
    );

    let db = match config.database_backend {
        DatabaseBackend::Firestore => Db::firestore(&config.gcp_project_id).await?,
        DatabaseBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Db::in_memory()
        }
    };
    tracing::info!(backend = db.backend_name(), "Store ready");

    if !config.is_dev_env && config.dev_login_enabled() && config.dev_auth_password.is_some() {
        tracing::warn!("Dev login is enabled outside a dev environment");
    }

    let state = Arc::new(AppState::new(config.clone(), db));
    let app = move_for_ukraine::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("move_for_ukraine=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
