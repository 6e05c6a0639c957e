// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod range;

pub use activity::{ActivitySummary, ActivityType, DetailedActivity, ZoneBucket, ZoneDistribution};
pub use range::DateRange;
