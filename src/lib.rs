// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Stride Dashboard: weekly running statistics from Strava
//!
//! This crate provides the backend for the dashboard: Strava OAuth, a
//! cookie-backed token store, and activity endpoints that transparently
//! refresh expired tokens.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod time_utils;

use config::Config;
use services::StravaClient;
use session::SessionCookies;

/// Shared application state.
///
/// Holds no token state; every request builds its own session from cookies.
pub struct AppState {
    pub config: Config,
    pub strava: StravaClient,
    pub cookies: SessionCookies,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            strava: StravaClient::from_config(&config),
            cookies: SessionCookies::new(config.cookie_secure),
            config,
        }
    }
}
