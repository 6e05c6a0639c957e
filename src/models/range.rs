// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Inclusive date range used as the query unit for activity retrieval.

use crate::error::AppError;
use crate::time_utils::parse_iso_datetime;
use chrono::{DateTime, Utc};

/// `[start, end]`, boundary-inclusive, with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    /// Returns `None` if `start > end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Build a range from the `startDate`/`endDate` query strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, AppError> {
        let start_dt = parse_iso_datetime(start)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid startDate: {start}")))?;
        let end_dt = parse_iso_datetime(end)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid endDate: {end}")))?;

        Self::new(start_dt, end_dt)
            .ok_or_else(|| AppError::BadRequest("startDate must not be after endDate".to_string()))
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}
