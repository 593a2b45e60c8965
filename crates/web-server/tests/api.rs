//! Router-level tests for the job API.

use analytics::AnalyticsEngine;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use core_types::{DealKind, EntryKind, RawDeal, Snapshot};
use data_source::MemorySource;
use events::{JobRecord, JobStatus};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use web_server::handlers::AnalyzeResponse;
use web_server::{AppState, Dispatcher, JobStore, router};

const KEY: &str = "mysecret";
// 2024-03-01T01:00:00Z
const OPEN_AT: i64 = 1_709_254_800;

fn deal(entry: EntryKind, kind: DealKind, time: i64, price: Decimal, profit: Decimal) -> RawDeal {
    RawDeal {
        position_id: Some(1),
        time: Some(time),
        entry,
        kind,
        symbol: "EURUSD".to_string(),
        volume: dec!(0.1),
        price: Some(price),
        commission: Decimal::ZERO,
        swap: Decimal::ZERO,
        profit,
    }
}

fn one_trade() -> Snapshot {
    Snapshot::new(
        vec![
            deal(EntryKind::In, DealKind::Buy, OPEN_AT, dec!(1.2000), Decimal::ZERO),
            deal(EntryKind::Out, DealKind::Sell, OPEN_AT + 3_600, dec!(1.2050), dec!(50)),
        ],
        vec![],
    )
}

fn test_app(snapshot: Snapshot) -> (Router, JobStore) {
    let store = JobStore::new();
    let dispatcher = Dispatcher::new(
        store.clone(),
        Arc::new(MemorySource::new(snapshot)),
        AnalyticsEngine::default(),
        30,
    );
    let state = Arc::new(AppState {
        dispatcher,
        api_key: KEY.to_string(),
    });
    (router(state), store)
}

fn analyze_request(key: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/json");
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn wait_until_finished(store: &JobStore, task_id: uuid::Uuid) -> JobRecord {
    for _ in 0..200 {
        let record = store.get(task_id).await.unwrap();
        if record.status != JobStatus::Running {
            return record;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {} never finished", task_id);
}

#[tokio::test]
async fn health_needs_no_key() {
    let (app, _) = test_app(Snapshot::default());
    let response = app
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_or_wrong_key_is_unauthorized() {
    let (app, store) = test_app(one_trade());

    let response = app.clone().oneshot(analyze_request(None, "{}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.oneshot(analyze_request(Some("nope"), "{}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = body_json(response).await;
    assert_eq!(body["error"], "Invalid API key");

    assert!(store.is_empty().await);
}

#[tokio::test]
async fn analysis_job_completes_with_a_summary() {
    let (app, store) = test_app(one_trade());

    let response = app
        .clone()
        .oneshot(analyze_request(Some(KEY), r#"{"from": "2024-03-01", "to": "2024-03-31"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let accepted: AnalyzeResponse = body_json(response).await;
    assert_eq!(accepted.status, "running");

    let record = wait_until_finished(&store, accepted.task_id).await;
    assert_eq!(record.status, JobStatus::Completed);
    let summary = record.summary.unwrap();
    assert_eq!(summary.closed_positions, 1);
    assert_eq!(summary.final_equity, dec!(10050));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/task/{}", accepted.task_id))
                .header("x-api-key", KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(response).await;
    assert_eq!(body["status"], "completed");
    assert!(body["completed_at"].is_string());

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/task/{}/report", accepted.task_id))
                .header("x-api-key", KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report: serde_json::Value = body_json(response).await;
    assert_eq!(report["closed_positions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn empty_window_fails_with_no_trade_data() {
    let (app, store) = test_app(one_trade());

    let response = app
        .oneshot(analyze_request(Some(KEY), r#"{"from": "2023-01-01", "to": "2023-01-31"}"#))
        .await
        .unwrap();
    let accepted: AnalyzeResponse = body_json(response).await;

    let record = wait_until_finished(&store, accepted.task_id).await;
    assert_eq!(record.status, JobStatus::Failed);
    assert_eq!(record.error.as_deref(), Some("No trade data found"));
    assert!(record.summary.is_none());
}

#[tokio::test]
async fn reversed_window_is_a_bad_request() {
    let (app, store) = test_app(one_trade());
    let response = app
        .oneshot(analyze_request(Some(KEY), r#"{"from": "2024-03-31", "to": "2024-03-01"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn unknown_task_is_not_found() {
    let (app, _) = test_app(Snapshot::default());

    for id in [uuid::Uuid::new_v4().to_string(), "not-a-uuid".to_string()] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/task/{}", id))
                    .header("x-api-key", KEY)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = body_json(response).await;
        assert_eq!(body["error"], "Task not found");
    }
}

#[tokio::test]
async fn dispatcher_handle_resolves_after_recording() {
    let store = JobStore::new();
    let dispatcher = Dispatcher::new(
        store.clone(),
        Arc::new(MemorySource::default()),
        AnalyticsEngine::default(),
        7,
    );
    let window = dispatcher.default_window();
    assert_eq!((window.end - window.start).num_days(), 7);

    let (task_id, handle) = dispatcher.submit(window).await;
    handle.await.unwrap();
    let record = store.get(task_id).await.unwrap();
    assert_eq!(record.status, JobStatus::Failed);
    assert_eq!(record.error.as_deref(), Some(web_server::dispatcher::NO_TRADES_MESSAGE));
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let (app, store) = test_app(one_trade());

    for body in [r#"{"from": "garbage", "to": "2024-03-01"}"#, "{ not json", "42"] {
        let response = app
            .clone()
            .oneshot(analyze_request(Some(KEY), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        let error: serde_json::Value = body_json(response).await;
        assert!(error["error"].as_str().unwrap().starts_with("Invalid request body"));
    }
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn one_sided_window_is_a_bad_request() {
    let (app, store) = test_app(one_trade());
    let response = app
        .oneshot(analyze_request(Some(KEY), r#"{"from": "2024-03-01"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn empty_body_uses_the_default_window() {
    let (app, store) = test_app(Snapshot::default());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/analyze")
                .header("x-api-key", KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let accepted: AnalyzeResponse = body_json(response).await;
    assert_eq!(store.len().await, 1);

    let record = wait_until_finished(&store, accepted.task_id).await;
    assert_eq!(record.status, JobStatus::Failed);
}
