// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::header;
use axum::response::Response;
use serde_json::{json, Value};
use std::sync::Arc;
use stride_dashboard::config::Config;
use stride_dashboard::routes::create_router;
use stride_dashboard::services::StravaClient;
use stride_dashboard::AppState;
use wiremock::MockServer;

/// Strava REST path prefix on the mock server.
#[allow(dead_code)]
pub const API_PREFIX: &str = "/api/v3";

/// Body Strava sends with a 401 for an invalid access token.
#[allow(dead_code)]
pub const INVALID_TOKEN_BODY: &str = r#"{"message":"Authorization Error","errors":[{"resource":"Athlete","field":"access_token","code":"invalid"}]}"#;

/// Config pointing both Strava base URLs at the mock server.
#[allow(dead_code)]
pub fn config_for(server: &MockServer) -> Config {
    let mut config = Config::test_default();
    config.strava_api_base = format!("{}{}", server.uri(), API_PREFIX);
    config.strava_oauth_base = format!("{}/oauth", server.uri());
    config
}

#[allow(dead_code)]
pub fn strava_client(server: &MockServer) -> StravaClient {
    StravaClient::from_config(&config_for(server))
}

/// Create a test app with the given config.
#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config));
    (create_router(state.clone()), state)
}

/// Create a test app talking to a mock Strava.
#[allow(dead_code)]
pub fn create_test_app(server: &MockServer) -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(config_for(server))
}

#[allow(dead_code)]
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// `Cookie:` header for a session whose access token expires at `expires_at`.
#[allow(dead_code)]
pub fn session_cookie(access: &str, refresh: &str, expires_at: i64) -> String {
    format!(
        "strava_access_token={access}; strava_refresh_token={refresh}; strava_expires_at={expires_at}; strava_athlete_id=42"
    )
}

/// Token endpoint response body.
#[allow(dead_code)]
pub fn token_body(access: &str, refresh: &str, expires_at: i64) -> Value {
    json!({
        "token_type": "Bearer",
        "access_token": access,
        "refresh_token": refresh,
        "expires_at": expires_at,
        "expires_in": expires_at - now(),
    })
}

/// Summary activity as Strava returns it.
#[allow(dead_code)]
pub fn activity_json(id: u64, activity_type: &str, start_date: &str, has_heartrate: bool) -> Value {
    json!({
        "id": id,
        "name": format!("Activity {id}"),
        "type": activity_type,
        "sport_type": activity_type,
        "start_date": start_date,
        "distance": 8000.0,
        "moving_time": 2700,
        "average_speed": 2.96,
        "average_heartrate": if has_heartrate { json!(150.0) } else { Value::Null },
        "max_heartrate": if has_heartrate { json!(172.0) } else { Value::Null },
        "average_cadence": 85.0,
        "has_heartrate": has_heartrate,
    })
}

/// Zones response with a heart-rate entry.
#[allow(dead_code)]
pub fn zones_json(times: [u32; 5]) -> Value {
    json!([
        {
            "type": "heartrate",
            "sensor_based": true,
            "distribution_buckets": [
                { "min": 0, "max": 123, "time": times[0] },
                { "min": 123, "max": 153, "time": times[1] },
                { "min": 153, "max": 169, "time": times[2] },
                { "min": 169, "max": 184, "time": times[3] },
                { "min": 184, "max": -1, "time": times[4] }
            ]
        },
        { "type": "pace", "distribution_buckets": [] }
    ])
}

#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

#[allow(dead_code)]
pub fn find_cookie(headers: &[String], name: &str) -> String {
    headers
        .iter()
        .find(|value| value.starts_with(&format!("{name}=")))
        .cloned()
        .unwrap_or_else(|| panic!("missing Set-Cookie header for {name}: {headers:?}"))
}

/// Assert every session cookie is expired by the response.
#[allow(dead_code)]
pub fn assert_session_cleared(response: &Response) {
    let cookies = set_cookie_headers(response);
    for name in stride_dashboard::session::SESSION_COOKIES {
        let cookie = find_cookie(&cookies, name);
        assert!(
            cookie.starts_with(&format!("{name}=;")),
            "{name} should be emptied: {cookie}"
        );
        assert!(cookie.contains("Max-Age=0"), "{name} should expire: {cookie}");
        assert!(cookie.contains("Path=/"));
    }
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[allow(dead_code)]
pub fn get(uri: &str, cookie: Option<&str>) -> axum::http::Request<Body> {
    request("GET", uri, cookie)
}

#[allow(dead_code)]
pub fn request(method: &str, uri: &str, cookie: Option<&str>) -> axum::http::Request<Body> {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}
