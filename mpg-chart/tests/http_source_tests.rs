//! Integration tests for the HTTP record source
//!
//! Runs an in-process axum server standing in for the `top_players` backend.
//!
//! Tests cover:
//! - Query parameters reach the backend decoded and intact
//! - Response parsing into records
//! - Error mapping: rejected status, malformed body, timeout, connection failure
//! - End-to-end controller load over HTTP

use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
use mpg_chart::controller::SyncOutcome;
use mpg_chart::query::serialize;
use mpg_chart::{
    ChartEventBus, DataFetcher, FetchError, FilterAction, FilterState, HttpRecordSource,
    Projector, RecordSource, SyncController,
};
use mpg_common::ClientConfig;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Echoes the received parameters back inside the player name
async fn top_players(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let position = params.get("position").cloned().unwrap_or_default();
    let criterion = params.get("ranking_criteria").cloned().unwrap_or_default();
    let top_number = params.get("top_number").cloned().unwrap_or_default();

    Json(json!([
        {
            "playerFullName": format!("{}|{}|{}", position, criterion, top_number),
            "totalGoals": 12,
            "averageRating": 6.5,
            "averagePoints": 5,
            "quotation": 31,
            "participation": 87.5,
            "position": "A",
            "injured": null
        },
        {
            "playerFullName": "Second Player",
            "totalGoals": 3,
            "averageRating": 5.25,
            "averagePoints": 4,
            "quotation": 14,
            "participation": 60.0,
            "position": "M"
        }
    ]))
}

async fn forbidden() -> (StatusCode, &'static str) {
    (
        StatusCode::FORBIDDEN,
        "top_number arg must be defined in the request an be an integer",
    )
}

async fn not_json() -> &'static str {
    "<html>maintenance</html>"
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(500)).await;
    Json(json!([]))
}

/// Test helper: start backend on an ephemeral port
async fn spawn_backend() -> SocketAddr {
    let app = Router::new()
        .route("/top_players", get(top_players))
        .route("/forbidden", get(forbidden))
        .route("/not_json", get(not_json))
        .route("/slow", get(slow));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Should bind test listener");
    let addr = listener.local_addr().expect("Should have local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test backend failed");
    });

    addr
}

fn client_config(addr: SocketAddr, endpoint: &str, timeout: Duration) -> ClientConfig {
    ClientConfig {
        base_url: format!("http://{}", addr),
        endpoint: endpoint.to_string(),
        timeout,
    }
}

fn source(addr: SocketAddr, endpoint: &str) -> HttpRecordSource {
    HttpRecordSource::new(&client_config(addr, endpoint, Duration::from_secs(5)))
        .expect("Should build client")
}

#[tokio::test]
async fn test_query_reaches_backend() {
    let addr = spawn_backend().await;
    let state = FilterState::new()
        .set_positions(["M", "A"])
        .unwrap()
        .set_ranking_criterion("quotation")
        .unwrap()
        .set_limit(5)
        .unwrap();

    let records = source(addr, "top_players")
        .fetch_records(&serialize(&state))
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].full_name(), Some("A,M|quotation|5"));
    assert!(records[0].get("injured").is_none());
}

#[tokio::test]
async fn test_empty_position_sent_as_empty_value() {
    let addr = spawn_backend().await;

    let records = source(addr, "top_players")
        .fetch_records(&serialize(&FilterState::new()))
        .await
        .unwrap();

    assert_eq!(records[0].full_name(), Some("|averagePoints|10"));
}

#[tokio::test]
async fn test_rejected_status_mapped() {
    let addr = spawn_backend().await;

    let err = source(addr, "forbidden")
        .fetch_records(&serialize(&FilterState::new()))
        .await
        .unwrap_err();

    match err {
        FetchError::Rejected { status, message } => {
            assert_eq!(status, 403);
            assert!(message.starts_with("top_number arg"));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_endpoint_is_rejected() {
    let addr = spawn_backend().await;

    let err = source(addr, "top_forwards")
        .fetch_records(&serialize(&FilterState::new()))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Rejected { status: 404, .. }));
}

#[tokio::test]
async fn test_malformed_body_mapped() {
    let addr = spawn_backend().await;

    let err = source(addr, "not_json")
        .fetch_records(&serialize(&FilterState::new()))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_timeout_mapped() {
    let addr = spawn_backend().await;
    let timeout = Duration::from_millis(100);
    let source = HttpRecordSource::new(&client_config(addr, "slow", timeout)).unwrap();

    let err = source
        .fetch_records(&serialize(&FilterState::new()))
        .await
        .unwrap_err();

    assert_eq!(err, FetchError::Timeout(timeout));
}

#[tokio::test]
async fn test_connection_refused_is_network_failure() {
    // Reserve a port, then release it so nothing is listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = source(addr, "top_players")
        .fetch_records(&serialize(&FilterState::new()))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::NetworkFailure(_)));
}

#[tokio::test]
async fn test_controller_over_http() {
    let addr = spawn_backend().await;
    let fetcher = DataFetcher::new(Arc::new(source(addr, "top_players")));
    let mut controller = SyncController::new(fetcher, Projector::default(), ChartEventBus::new(16));

    let outcome = controller.load().await;
    assert!(matches!(outcome, SyncOutcome::Published { series: 2, skipped: 0, .. }));

    controller
        .dispatch(FilterAction::SetPositions(vec!["G".to_string()]))
        .await
        .unwrap();

    let dataset = controller.dataset();
    assert_eq!(dataset.series()[0].label, "G|averagePoints|10");
    assert_eq!(dataset.series()[0].point.x, 12.0);
    assert_eq!(dataset.series()[0].point.y, 6.5);
    assert_eq!(dataset.series()[1].label, "Second Player");
}
