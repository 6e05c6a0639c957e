// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava activity models as exposed to the dashboard.
//!
//! Field names follow Strava's wire format so the UI can consume the same
//! shape whether it comes from the proxy or from Strava directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Activity type discriminator (Strava's `type` field).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityType {
    Run,
    VirtualRun,
    Ride,
    Other(String),
}

impl ActivityType {
    /// Running activity types, as used by the runs-only endpoint.
    ///
    /// Trail runs arrive as `Run`; the finer `sport_type` is not consulted.
    pub const RUNNING: [ActivityType; 2] = [ActivityType::Run, ActivityType::VirtualRun];

    pub fn is_run(&self) -> bool {
        Self::RUNNING.contains(self)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ActivityType::Run => "Run",
            ActivityType::VirtualRun => "VirtualRun",
            ActivityType::Ride => "Ride",
            ActivityType::Other(s) => s,
        }
    }
}

impl From<String> for ActivityType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Run" => ActivityType::Run,
            "VirtualRun" => ActivityType::VirtualRun,
            "Ride" => ActivityType::Ride,
            _ => ActivityType::Other(value),
        }
    }
}

impl From<ActivityType> for String {
    fn from(value: ActivityType) -> Self {
        value.as_str().to_string()
    }
}

/// Summary activity from `GET /athlete/activities`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivitySummary {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub activity_type: ActivityType,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub start_date: DateTime<Utc>,
    /// Distance in meters
    pub distance: f64,
    /// Moving time in seconds
    pub moving_time: u64,
    /// Average speed in m/s
    pub average_speed: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_heartrate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_heartrate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_cadence: Option<f64>,
    #[serde(default)]
    pub has_heartrate: bool,
}

/// One heart-rate band and the time spent in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ZoneBucket {
    /// Lower bound (bpm)
    pub min: i32,
    /// Upper bound (bpm), -1 for the open-ended top zone
    pub max: i32,
    /// Seconds spent in this zone
    pub time: f64,
}

/// Time spent in each heart-rate zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ZoneDistribution {
    pub buckets: Vec<ZoneBucket>,
}

impl ZoneDistribution {
    pub fn total_time(&self) -> f64 {
        self.buckets.iter().map(|b| b.time).sum()
    }
}

/// An activity summary with its heart-rate zone distribution attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DetailedActivity {
    #[serde(flatten)]
    pub summary: ActivitySummary,
    /// `None` when the activity has no heart-rate data or enrichment failed.
    pub zones: Option<ZoneDistribution>,
}
