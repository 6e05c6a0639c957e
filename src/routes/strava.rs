// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity routes proxied to Strava with the caller's session.

use crate::error::{AppError, Result};
use crate::models::DateRange;
use crate::routes::session_failure;
use crate::services::{ActivityService, ProviderRefresher, StravaSession};
use crate::session::TokenState;
use crate::time_utils::now_unix;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const SUMMARY_CACHE_CONTROL: &str = "public, max-age=900, stale-while-revalidate=86400";
const ZONES_CACHE_CONTROL: &str = "public, max-age=1800, stale-while-revalidate=86400";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/strava/activities", get(get_activities))
        .route("/strava/activities/zones", get(get_activities_with_zones))
        .route("/strava/runs", get(get_runs))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
}

impl RangeQuery {
    fn range(&self) -> Result<DateRange> {
        match (self.start_date.as_deref(), self.end_date.as_deref()) {
            (Some(start), Some(end)) if !start.is_empty() && !end.is_empty() => {
                DateRange::parse(start, end)
            }
            _ => Err(AppError::BadRequest(
                "startDate and endDate are required".to_string(),
            )),
        }
    }
}

#[derive(Serialize)]
struct ActivitiesResponse<T> {
    activities: Vec<T>,
}

/// A request's session before any Strava call.
struct ProxySession {
    jar: CookieJar,
    before: TokenState,
    service: ActivityService<ProviderRefresher>,
}

/// Parse the range and open the caller's session. Fails before any upstream
/// call when the request has no access token.
fn open_session(
    state: &AppState,
    jar: CookieJar,
    query: &RangeQuery,
) -> std::result::Result<(ProxySession, DateRange), Response> {
    let range = query.range().map_err(IntoResponse::into_response)?;

    let before = state.cookies.load(&jar);
    if !before.is_authenticated() {
        tracing::info!("Activity request without access token");
        return Err(session_failure(&state.cookies, jar, AppError::Unauthenticated));
    }

    let credentials = state
        .config
        .oauth_credentials()
        .map_err(|e| AppError::from(e).into_response())?;

    let session = StravaSession::new(
        state.strava.clone(),
        ProviderRefresher::new(state.strava.clone(), credentials),
        before.clone(),
    );

    Ok((
        ProxySession {
            jar,
            before,
            service: ActivityService::new(session),
        },
        range,
    ))
}

/// Build the response, re-emitting any rotated token cookies.
fn finish<T: Serialize>(
    state: &AppState,
    proxy: ProxySession,
    result: Result<Vec<T>>,
    cache_control: &'static str,
) -> Response {
    let after = proxy.service.session().tokens();

    match result {
        Ok(activities) => {
            tracing::info!(count = activities.len(), "Activities fetched");
            let jar = state
                .cookies
                .persist_changes(proxy.jar, &proxy.before, after, now_unix());
            (
                jar,
                [(header::CACHE_CONTROL, cache_control)],
                Json(ActivitiesResponse { activities }),
            )
                .into_response()
        }
        Err(e) if e.is_session_error() => session_failure(&state.cookies, proxy.jar, e),
        Err(e) => {
            let jar = state
                .cookies
                .persist_changes(proxy.jar, &proxy.before, after, now_unix());
            (jar, e).into_response()
        }
    }
}

/// All activities in the range.
async fn get_activities(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<RangeQuery>,
) -> Response {
    let (mut proxy, range) = match open_session(&state, jar, &query) {
        Ok(opened) => opened,
        Err(response) => return response,
    };
    let result = proxy.service.list_activities(range).await;
    finish(&state, proxy, result, SUMMARY_CACHE_CONTROL)
}

/// Running activities in the range.
async fn get_runs(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<RangeQuery>,
) -> Response {
    let (mut proxy, range) = match open_session(&state, jar, &query) {
        Ok(opened) => opened,
        Err(response) => return response,
    };
    let result = proxy.service.list_runs(range).await;
    finish(&state, proxy, result, SUMMARY_CACHE_CONTROL)
}

/// Activities in the range with heart-rate zones.
async fn get_activities_with_zones(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<RangeQuery>,
) -> Response {
    let (mut proxy, range) = match open_session(&state, jar, &query) {
        Ok(opened) => opened,
        Err(response) => return response,
    };
    let result = proxy.service.list_activities_with_zones(range).await;
    finish(&state, proxy, result, ZONES_CACHE_CONTROL)
}
