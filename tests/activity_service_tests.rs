// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity listing, pagination and zone enrichment tests.

use serde_json::Value;
use stride_dashboard::config::Config;
use stride_dashboard::error::AppError;
use stride_dashboard::models::{ActivityType, DateRange};
use stride_dashboard::services::{ActivityService, ProviderRefresher, StravaSession};
use stride_dashboard::session::TokenState;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{activity_json, now, zones_json};

fn service(server: &MockServer) -> ActivityService<ProviderRefresher> {
    let client = common::strava_client(server);
    let credentials = Config::test_default().oauth_credentials().unwrap();
    let tokens = TokenState::new(
        Some("access-1".to_string()),
        Some("refresh-1".to_string()),
        Some(now() + 3600),
    );
    ActivityService::new(StravaSession::new(
        client.clone(),
        ProviderRefresher::new(client, credentials),
        tokens,
    ))
}

fn january_week() -> DateRange {
    DateRange::parse("2024-01-01", "2024-01-08").unwrap()
}

async fn mount_page(server: &MockServer, page: u32, activities: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/api/v3/athlete/activities"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(activities)))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_list_activities_sends_widened_range() {
    let server = MockServer::start().await;
    // 2024-01-01T00:00:00Z = 1704067200, 2024-01-08T00:00:00Z = 1704672000
    Mock::given(method("GET"))
        .and(path("/api/v3/athlete/activities"))
        .and(query_param("after", "1704067199"))
        .and(query_param("before", "1704672001"))
        .and(query_param("per_page", "100"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(vec![])))
        .expect(1)
        .mount(&server)
        .await;

    let activities = service(&server).list_activities(january_week()).await.unwrap();
    assert!(activities.is_empty());
}

#[tokio::test]
async fn test_list_activities_follows_pages() {
    let server = MockServer::start().await;

    let first: Vec<Value> = (0..100)
        .map(|i| activity_json(1000 + i, "Run", "2024-01-05T07:00:00Z", false))
        .collect();
    let second = vec![
        activity_json(2000, "Ride", "2024-01-03T07:00:00Z", false),
        activity_json(2001, "Run", "2024-01-02T07:00:00Z", false),
    ];
    mount_page(&server, 1, first).await;
    mount_page(&server, 2, second).await;

    let activities = service(&server).list_activities(january_week()).await.unwrap();

    assert_eq!(activities.len(), 102);
    // Upstream order is preserved
    assert_eq!(activities[0].id, 1000);
    assert_eq!(activities[101].id, 2001);
    assert_eq!(activities[100].activity_type, ActivityType::Ride);
}

#[tokio::test]
async fn test_list_activities_trims_to_inclusive_range() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        vec![
            activity_json(1, "Run", "2024-01-08T00:00:00Z", false),
            activity_json(2, "Run", "2024-01-08T00:00:01Z", false),
            activity_json(3, "Run", "2024-01-01T00:00:00Z", false),
            activity_json(4, "Run", "2023-12-31T23:59:59Z", false),
        ],
    )
    .await;

    let range = january_week();
    let activities = service(&server).list_activities(range).await.unwrap();
    let ids: Vec<u64> = activities.iter().map(|a| a.id).collect();

    assert_eq!(ids, vec![1, 3]);
    assert!(activities.iter().all(|a| range.contains(a.start_date)));
}

#[tokio::test]
async fn test_list_runs_filters_types() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        vec![
            activity_json(1, "Run", "2024-01-02T07:00:00Z", false),
            activity_json(2, "Ride", "2024-01-03T07:00:00Z", false),
            activity_json(3, "VirtualRun", "2024-01-04T07:00:00Z", false),
            activity_json(4, "Walk", "2024-01-05T07:00:00Z", false),
        ],
    )
    .await;

    let runs = service(&server).list_runs(january_week()).await.unwrap();
    let ids: Vec<u64> = runs.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[tokio::test]
async fn test_zones_attached_only_for_heartrate_activities() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        vec![
            activity_json(1, "Run", "2024-01-02T07:00:00Z", true),
            activity_json(2, "Run", "2024-01-03T07:00:00Z", false),
        ],
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/activities/1/zones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(zones_json([60, 600, 1200, 300, 30])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/activities/2/zones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(zones_json([0; 5])))
        .expect(0)
        .mount(&server)
        .await;

    let detailed = service(&server)
        .list_activities_with_zones(january_week())
        .await
        .unwrap();

    assert_eq!(detailed.len(), 2);
    let zones = detailed[0].zones.as_ref().expect("zones for HR activity");
    assert_eq!(zones.buckets.len(), 5);
    assert_eq!(zones.buckets[4].max, -1);
    assert_eq!(zones.total_time(), 2190.0);
    assert!(detailed[1].zones.is_none());
}

#[tokio::test]
async fn test_failed_enrichment_degrades_single_activity() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        vec![
            activity_json(1, "Run", "2024-01-02T07:00:00Z", true),
            activity_json(2, "Run", "2024-01-03T07:00:00Z", true),
            activity_json(3, "Run", "2024-01-04T07:00:00Z", true),
        ],
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/activities/1/zones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(zones_json([1, 2, 3, 4, 5])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/activities/2/zones"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/activities/3/zones"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let detailed = service(&server)
        .list_activities_with_zones(january_week())
        .await
        .unwrap();

    assert_eq!(detailed.len(), 3);
    assert!(detailed[0].zones.is_some());
    assert!(detailed[1].zones.is_none());
    assert!(detailed[2].zones.is_none());
}

#[tokio::test]
async fn test_session_failure_during_enrichment_aborts_batch() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        vec![
            activity_json(1, "Run", "2024-01-02T07:00:00Z", true),
            activity_json(2, "Run", "2024-01-03T07:00:00Z", true),
        ],
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/activities/1/zones"))
        .respond_with(ResponseTemplate::new(401).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/activities/2/zones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(zones_json([1, 2, 3, 4, 5])))
        .expect(0)
        .mount(&server)
        .await;

    let err = service(&server)
        .list_activities_with_zones(january_week())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Upstream { status: 401, .. }));
}

#[tokio::test]
async fn test_zones_listing_is_repeatable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/athlete/activities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(vec![
            activity_json(1, "Run", "2024-01-02T07:00:00Z", true),
            activity_json(2, "Ride", "2024-01-03T07:00:00Z", false),
        ])))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/activities/1/zones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(zones_json([10, 20, 30, 40, 50])))
        .expect(2)
        .mount(&server)
        .await;

    let mut service = service(&server);
    let first = service.list_activities_with_zones(january_week()).await.unwrap();
    let second = service.list_activities_with_zones(january_week()).await.unwrap();

    assert_eq!(first, second);
}
