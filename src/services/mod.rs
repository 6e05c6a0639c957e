// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - Strava access and activity retrieval.

pub mod activity;
pub mod relay;
pub mod strava;

pub use activity::ActivityService;
pub use relay::{DashboardRelay, RemoteStatus};
pub use strava::{ProviderRefresher, StravaClient, StravaSession, TokenRefresher};
