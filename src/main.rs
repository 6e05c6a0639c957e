// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stride Dashboard API Server
//!
//! Serves the Strava OAuth flow and activity endpoints for the weekly
//! running dashboard.

use std::sync::Arc;
use stride_dashboard::{config::Config, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env();
    tracing::info!(port = config.port, "Starting Stride Dashboard API");

    if let Err(e) = config.oauth_credentials() {
        tracing::warn!(error = %e, "Strava OAuth not configured, auth flows will fail");
    }

    let addr = format!("0.0.0.0:{}", config.port);

    // Build shared state and router
    let state = Arc::new(AppState::new(config));
    let app = stride_dashboard::routes::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("stride_dashboard=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
