use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use opportunity_hub::apis::{Collector, CollectorRegistry};
use opportunity_hub::clock::FixedClock;
use opportunity_hub::error::Result as HubResult;
use opportunity_hub::metrics::init_metrics;
use opportunity_hub::pipeline::CollectionOrchestrator;
use opportunity_hub::server::{create_server, AppState};
use opportunity_hub::storage::{SqliteStore, Store};
use opportunity_hub::types::{CandidateRecord, Category, Source};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct HackathonCollector;

#[async_trait]
impl Collector for HackathonCollector {
    fn name(&self) -> &'static str {
        "devpost"
    }

    fn category(&self) -> Category {
        Category::Hackathon
    }

    async fn collect(&self, _source: &Source) -> HubResult<Vec<CandidateRecord>> {
        Ok(vec![CandidateRecord {
            title: Some("Climate Hack 2025".into()),
            organization: Some("Devpost".into()),
            url: Some("https://climate.devpost.com".into()),
            description: Some("Build tools that help communities adapt to climate change".into()),
            prize: Some("$10,000 in prizes".into()),
            deadline: Some("Submissions due 11/15/2025".into()),
            ..CandidateRecord::new(Category::Hackathon)
        }])
    }
}

fn app() -> Result<(Router, Arc<dyn Store>)> {
    let store: Arc<dyn Store> = Arc::new(SqliteStore::open_in_memory()?);
    let mut registry = CollectorRegistry::new();
    registry.register(Arc::new(HackathonCollector));
    let orchestrator = Arc::new(CollectionOrchestrator::new(store.clone(), registry));
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
    let state = AppState::new(store.clone(), orchestrator).with_clock(Arc::new(FixedClock(now)));
    Ok((create_server(state), store))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(v) => Body::from(v.to_string()),
            None => Body::empty(),
        })?;
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

#[tokio::test]
async fn health_reports_registered_collectors() -> Result<()> {
    let (app, _) = app()?;
    let (status, body) = send(&app, "GET", "/api/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["collectors"], json!(["devpost"]));
    Ok(())
}

#[tokio::test]
async fn collect_then_query_and_dashboard() -> Result<()> {
    let (app, _) = app()?;
    let (status, created) = send(
        &app,
        "POST",
        "/api/sources",
        Some(json!({"userId": "u1", "name": "Devpost", "url": "https://devpost.com/hackathons", "type": "hackathon"})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["category"], "hackathon");

    let (status, summary) = send(&app, "POST", "/api/collect/u1", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary, json!({"success": true, "collected": 1, "verified": 1, "sources": 1}));

    let (_, all) = send(&app, "GET", "/api/data/u1?category=all", None).await?;
    assert_eq!(all.as_array().map(Vec::len), Some(1));
    assert_eq!(all[0]["deadline"], "2025-11-15");
    assert_eq!(all[0]["status"], "verified");

    let (_, any_status) = send(&app, "GET", "/api/data/u1?category=all&status=all", None).await?;
    assert_eq!(any_status.as_array().map(Vec::len), Some(1));

    let (_, jobs) = send(&app, "GET", "/api/data/u1?category=job", None).await?;
    assert_eq!(jobs, json!([]));

    let (_, dashboard) = send(&app, "GET", "/api/dashboard/u1", None).await?;
    assert_eq!(dashboard["total"], 1);
    assert_eq!(dashboard["verified"], 1);
    assert_eq!(dashboard["categories"]["hackathon"], 1);
    Ok(())
}

#[tokio::test]
async fn sources_are_listed_newest_first() -> Result<()> {
    let (app, _) = app()?;
    for name in ["First", "Second"] {
        send(
            &app,
            "POST",
            "/api/sources",
            Some(json!({"userId": "u1", "name": name, "url": "https://example.com", "type": "job"})),
        )
        .await?;
    }
    let (_, sources) = send(&app, "GET", "/api/sources/u1", None).await?;
    assert_eq!(sources[0]["name"], "Second");
    assert_eq!(sources[1]["name"], "First");
    Ok(())
}

#[tokio::test]
async fn unknown_source_type_is_a_bad_request() -> Result<()> {
    let (app, store) = app()?;
    let (status, body) = send(
        &app,
        "POST",
        "/api/sources",
        Some(json!({"userId": "u1", "name": "Meetup", "url": "https://meetup.com", "type": "meetup"})),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some());
    assert!(store.list_sources("u1").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn schedule_returns_next_run() -> Result<()> {
    let (app, store) = app()?;
    let (status, body) = send(
        &app,
        "POST",
        "/api/schedule/u1",
        Some(json!({"frequency": "daily", "time": "09:00", "timezone": "UTC", "enabled": true})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["schedule"]["nextRun"], "2025-06-01T09:00:00+00:00");
    assert!(store.get_schedule("u1").await?.is_some());

    let (status, _) = send(
        &app,
        "POST",
        "/api/schedule/u1",
        Some(json!({"frequency": "daily", "time": "9 o'clock", "timezone": "UTC", "enabled": true})),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn collect_reports_every_active_source() -> Result<()> {
    let (app, _) = app()?;
    for name in ["Indeed", "LinkedIn"] {
        send(
            &app,
            "POST",
            "/api/sources",
            Some(json!({"userId": "u1", "name": name, "url": "https://example.com/jobs", "type": "job"})),
        )
        .await?;
    }
    let (status, summary) = send(&app, "POST", "/api/collect/u1", None).await?;
    assert_eq!(status, StatusCode::OK);
    // Only the first job source runs, and no job collector is registered
    assert_eq!(summary["sources"], 2);
    assert_eq!(summary["collected"], 0);
    Ok(())
}

#[tokio::test]
async fn metrics_route_exposes_collection_counters() -> Result<()> {
    init_metrics();
    let (app, _) = app()?;
    send(
        &app,
        "POST",
        "/api/sources",
        Some(json!({"userId": "u1", "name": "Devpost", "url": "https://devpost.com/hackathons", "type": "hackathon"})),
    )
    .await?;
    send(&app, "POST", "/api/collect/u1", None).await?;

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = hyper::body::to_bytes(response.into_body()).await?;
    let text = String::from_utf8(bytes.to_vec())?;
    assert!(text.contains("opphub_collection_runs_total"), "metrics body: {}", text);
    assert!(text.contains("opphub_records_collected_total"), "metrics body: {}", text);
    Ok(())
}
