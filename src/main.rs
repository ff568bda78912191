// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hyrox-Tracker API Server
//!
//! Records Hyrox training sessions per athlete and serves the progress
//! dashboard.

use hyrox_tracker::{
    config::{Config, IdentityBackend},
    db::FirestoreDb,
    services::IdentityService,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        language = config.default_language.code(),
        "Starting Hyrox-Tracker API"
    );

    // The in-memory identity backend pairs with the in-memory store
    let db = match config.identity_backend {
        IdentityBackend::Firebase => FirestoreDb::new(&config.gcp_project_id).await?,
        IdentityBackend::InMemory => {
            tracing::warn!("Using in-memory identity and storage; data is not persisted");
            FirestoreDb::new_in_memory()
        }
    };

    let identity = IdentityService::from_config(&config);

    let state = Arc::new(AppState::new(config.clone(), db, identity));
    let app = hyrox_tracker::routes::create_router(state);

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
                .add_directive("hyrox_tracker=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
