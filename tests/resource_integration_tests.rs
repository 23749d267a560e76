//! Integration Tests for the Resource Client
//!
//! Runs a local axum server standing in for a REST API and counts how many
//! requests actually reach it.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use resource_cache::{
    store::Store, transport::HttpTransport, FetchError, ResourceClient, StoreError,
};
use serde_json::{json, Map, Value};

// == Helper Functions ==

type Hits = Arc<AtomicUsize>;

async fn items_handler(
    State(hits): State<Hits>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let hit = hits.fetch_add(1, Ordering::SeqCst) + 1;
    tokio::time::sleep(Duration::from_millis(50)).await;
    Json(json!({ "items": [1, 2, 3], "params": params, "hit": hit }))
}

async fn broken_handler(State(hits): State<Hits>) -> (StatusCode, &'static str) {
    hits.fetch_add(1, Ordering::SeqCst);
    (StatusCode::INTERNAL_SERVER_ERROR, "backend unavailable")
}

async fn spawn_backend() -> (SocketAddr, Hits) {
    let hits: Hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/api/items/", get(items_handler))
        .route("/api/broken/", get(broken_handler))
        .with_state(hits.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, hits)
}

fn create_client(addr: SocketAddr, cache_duration: Option<u64>) -> ResourceClient {
    ResourceClient::new(
        format!("http://{}/api", addr),
        HttpTransport::with_client(
            reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap(),
        ),
        Store::new(cache_duration),
    )
}

// == Aggregation Tests ==

#[tokio::test]
async fn test_concurrent_fetches_reach_backend_once() {
    let (addr, hits) = spawn_backend().await;
    let client = create_client(addr, Some(60));

    let first = client.fetch("/items/", &Value::Null);
    let second = client.fetch("/items/", &Value::Null);
    let third = client.fetch("/items/", &Value::Null);
    let (first, second, third) = tokio::join!(first, second, third);

    let first = first.unwrap();
    assert_eq!(first["hit"], 1);
    assert_eq!(second.unwrap(), first);
    assert_eq!(third.unwrap(), first);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let stats = client.store().stats();
    assert_eq!(stats.requests, 1);
    assert_eq!(stats.aggregated, 2);
    assert_eq!(stats.pending_requests, 0);
    assert_eq!(stats.total_entries, 1);
}

#[tokio::test]
async fn test_zero_cache_duration_still_aggregates() {
    let (addr, hits) = spawn_backend().await;
    let client = create_client(addr, Some(0));

    let (first, second) = tokio::join!(
        client.fetch("/items/", &Value::Null),
        client.fetch("/items/", &Value::Null)
    );
    assert_eq!(first.unwrap(), second.unwrap());
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    client.fetch("/items/", &Value::Null).await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert_eq!(client.store().cached_len(), 0);
}

// == Cache Tests ==

#[tokio::test]
async fn test_cached_refreshed_and_uncached_fetches() {
    let (addr, hits) = spawn_backend().await;
    let client = create_client(addr, Some(60));

    let fetched = client.fetch("/items/", &Value::Null).await.unwrap();
    let cached = client.fetch("/items/", &Value::Null).await.unwrap();
    assert_eq!(cached, fetched);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let refreshed = client.refresh("/items/", &Value::Null).await.unwrap();
    assert_eq!(refreshed["hit"], 2);
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    let live = client.fetch_uncached("/items/", &Value::Null).await.unwrap();
    assert_eq!(live["hit"], 3);

    // The uncached fetch did not replace the refreshed value
    let cached = client.fetch("/items/", &Value::Null).await.unwrap();
    assert_eq!(cached, refreshed);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_filters_are_sent_and_keyed_canonically() {
    let (addr, hits) = spawn_backend().await;
    let client = create_client(addr, Some(60));

    let mut first = Map::new();
    first.insert("status".to_string(), json!("active"));
    first.insert("page".to_string(), json!(2));
    let mut second = Map::new();
    second.insert("page".to_string(), json!(2));
    second.insert("status".to_string(), json!("active"));

    let body = client
        .fetch("/items/", &Value::Object(first))
        .await
        .unwrap();
    assert_eq!(body["params"], json!({"page": "2", "status": "active"}));

    client
        .fetch("/items/", &Value::Object(second))
        .await
        .unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    client
        .fetch("/items/", &json!({"page": 3}))
        .await
        .unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

// == Failure Tests ==

#[tokio::test]
async fn test_failed_fetch_is_not_cached() {
    let (addr, hits) = spawn_backend().await;
    let client = create_client(addr, Some(60));

    let (first, second) = tokio::join!(
        client.fetch("/broken/", &Value::Null),
        client.fetch("/broken/", &Value::Null)
    );

    let expected = StoreError::Request(FetchError::Status {
        status: 500,
        url: format!("http://{}/api/broken/", addr),
    });
    assert_eq!(first.unwrap_err(), expected);
    assert_eq!(second.unwrap_err(), expected);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(client.store().pending_len(), 0);
    assert_eq!(client.store().cached_len(), 0);

    let retry = client.fetch("/broken/", &Value::Null).await;
    assert!(retry.is_err());
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert_eq!(client.store().stats().failures, 2);
}

#[tokio::test]
async fn test_unreachable_backend_reports_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = create_client(addr, Some(60));
    let result = client.fetch("/items/", &Value::Null).await;

    assert!(matches!(
        result,
        Err(StoreError::Request(FetchError::Transport(_)))
    ));
}
