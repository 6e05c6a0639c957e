// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity retrieval service.
//!
//! Handles:
//! 1. Paging through `/athlete/activities` for a date range
//! 2. Trimming results to the inclusive range
//! 3. Per-activity heart-rate zone enrichment

use crate::error::Result;
use crate::models::{ActivitySummary, DateRange, DetailedActivity, ZoneBucket, ZoneDistribution};
use crate::services::strava::{StravaSession, TokenRefresher};
use chrono::Duration;
use serde::Deserialize;

/// Activities requested per upstream page.
const PAGE_SIZE: u32 = 100;

/// Upper bound on pages fetched for one range.
const MAX_PAGES: u32 = 100;

/// One entry of `GET /activities/{id}/zones`.
#[derive(Debug, Deserialize)]
struct ActivityZone {
    #[serde(rename = "type")]
    zone_type: String,
    #[serde(default)]
    distribution_buckets: Vec<ZoneBucket>,
}

/// Fetches activities through a [`StravaSession`].
pub struct ActivityService<R> {
    session: StravaSession<R>,
}

impl<R: TokenRefresher> ActivityService<R> {
    pub fn new(session: StravaSession<R>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &StravaSession<R> {
        &self.session
    }

    /// All activities starting within `range`, in upstream order.
    pub async fn list_activities(&mut self, range: DateRange) -> Result<Vec<ActivitySummary>> {
        // Strava's after/before are exclusive; widen by a second and trim locally.
        let after = (range.start() - Duration::seconds(1)).timestamp();
        let before = (range.end() + Duration::seconds(1)).timestamp();

        let mut activities = Vec::new();
        for page in 1..=MAX_PAGES {
            let batch: Vec<ActivitySummary> = self
                .session
                .fetch_resource(
                    "/athlete/activities",
                    &[
                        ("after", after.to_string()),
                        ("before", before.to_string()),
                        ("page", page.to_string()),
                        ("per_page", PAGE_SIZE.to_string()),
                    ],
                )
                .await?;

            let fetched = batch.len();
            tracing::debug!(page, fetched, "Fetched activity page");

            activities.extend(batch.into_iter().filter(|a| range.contains(a.start_date)));

            if fetched < PAGE_SIZE as usize {
                return Ok(activities);
            }
        }

        tracing::warn!(
            pages = MAX_PAGES,
            count = activities.len(),
            "Activity listing hit page limit, results truncated"
        );
        Ok(activities)
    }

    /// Running activities only (`Run`, `VirtualRun`).
    pub async fn list_runs(&mut self, range: DateRange) -> Result<Vec<ActivitySummary>> {
        let mut activities = self.list_activities(range).await?;
        activities.retain(|a| a.activity_type.is_run());
        Ok(activities)
    }

    /// Activities in `range` with heart-rate zones attached.
    ///
    /// Activities without heart-rate data are not looked up. A failed lookup
    /// leaves that activity zone-less, unless the failure means the session
    /// itself is dead, in which case the whole call fails.
    pub async fn list_activities_with_zones(
        &mut self,
        range: DateRange,
    ) -> Result<Vec<DetailedActivity>> {
        let activities = self.list_activities(range).await?;
        let mut detailed = Vec::with_capacity(activities.len());

        for summary in activities {
            let zones = if summary.has_heartrate {
                match self.fetch_heartrate_zones(summary.id).await {
                    Ok(zones) => zones,
                    Err(e) if e.is_session_error() => return Err(e),
                    Err(e) => {
                        tracing::warn!(
                            activity_id = summary.id,
                            error = %e,
                            "Failed to fetch heart-rate zones, continuing without"
                        );
                        None
                    }
                }
            } else {
                None
            };

            detailed.push(DetailedActivity { summary, zones });
        }

        Ok(detailed)
    }

    async fn fetch_heartrate_zones(&mut self, activity_id: u64) -> Result<Option<ZoneDistribution>> {
        let zones: Vec<ActivityZone> = self
            .session
            .fetch_resource(&format!("/activities/{}/zones", activity_id), &[])
            .await?;

        Ok(zones
            .into_iter()
            .find(|z| z.zone_type == "heartrate")
            .map(|z| ZoneDistribution {
                buckets: z.distribution_buckets,
            }))
    }
}
