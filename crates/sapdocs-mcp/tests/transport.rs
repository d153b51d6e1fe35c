#![allow(missing_docs, clippy::unwrap_used)]
//! End-to-end transport tests: session lifecycle, event replay, health.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};

use sapdocs_core::{
    AdapterSet, Catalog, DocumentFetcher, Registry, SearchEngine, types::LibraryBundle,
};
use sapdocs_mcp::{AppState, router};

fn empty_state() -> Arc<AppState> {
    let catalog = Arc::new(
        Catalog::from_bundles(vec![LibraryBundle {
            id: "/cap".into(),
            name: "CAP".into(),
            description: String::new(),
            documents: vec![],
        }])
        .unwrap(),
    );
    let registry = Arc::new(Registry::new());
    let adapters = Arc::new(AdapterSet::with_adapters(vec![]));
    let engine = Arc::new(SearchEngine::new(
        Arc::clone(&catalog),
        None,
        Arc::clone(&registry),
        Arc::clone(&adapters),
    ));
    let fetcher = Arc::new(DocumentFetcher::new(catalog, registry, adapters));
    Arc::new(AppState::new(engine, fetcher))
}

async fn serve(state: Arc<AppState>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{addr}")
}

fn initialize_request() -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2025-07-09",
            "capabilities": {},
            "clientInfo": { "name": "test", "version": "0" }
        }
    })
}

#[tokio::test]
async fn session_lifecycle_initialize_use_delete() {
    let base = serve(empty_state()).await;
    let client = reqwest::Client::new();

    // Initialize without a session header mints one.
    let response = client
        .post(format!("{base}/mcp"))
        .json(&initialize_request())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let session_id = response
        .headers()
        .get("mcp-session-id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["result"]["protocolVersion"], "2025-07-09");

    // A subsequent POST carrying the header succeeds.
    let response = client
        .post(format!("{base}/mcp"))
        .header("mcp-session-id", &session_id)
        .json(&json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    let tools = body["result"]["tools"].as_array().unwrap();
    assert!(tools.iter().any(|tool| tool["name"] == "search"));

    // DELETE terminates the session.
    let response = client
        .delete(format!("{base}/mcp"))
        .header("mcp-session-id", &session_id)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // Any further POST with the same header is a -32000 transport error.
    let response = client
        .post(format!("{base}/mcp"))
        .header("mcp-session-id", &session_id)
        .json(&json!({"jsonrpc": "2.0", "id": 3, "method": "ping"}))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], -32000);
}

#[tokio::test]
async fn initialize_with_stale_session_header_is_rejected() {
    let base = serve(empty_state()).await;
    let client = reqwest::Client::new();

    // A header that maps to no live session is rejected even when the body
    // carries initialize; no new session is minted for it.
    let response = client
        .post(format!("{base}/mcp"))
        .header("mcp-session-id", "00000000-0000-4000-8000-000000000000")
        .json(&initialize_request())
        .send()
        .await
        .unwrap();
    assert!(response.headers().get("mcp-session-id").is_none());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], -32000);
}

#[tokio::test]
async fn post_without_initialize_or_session_is_rejected() {
    let base = serve(empty_state()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/mcp"))
        .json(&json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], -32000);
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let base = serve(empty_state()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/mcp"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], -32700);
}

#[tokio::test]
async fn sse_replays_events_after_last_event_id() {
    let state = empty_state();
    let base = serve(Arc::clone(&state)).await;
    let client = reqwest::Client::new();

    // Establish a session the HTTP way.
    let response = client
        .post(format!("{base}/mcp"))
        .json(&initialize_request())
        .send()
        .await
        .unwrap();
    let session_id = response
        .headers()
        .get("mcp-session-id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    // Store three events in one stream.
    let stream_id = state.events.create_stream();
    let session = state.sessions.get(&session_id).unwrap();
    let e1 = state.publish_event(&session, &stream_id, json!({"n": 1}).to_string());
    state.publish_event(&session, &stream_id, json!({"n": 2}).to_string());
    state.publish_event(&session, &stream_id, json!({"n": 3}).to_string());

    // Resume after e1: exactly e2 then e3 replay, in order.
    let response = client
        .get(format!("{base}/mcp"))
        .header("mcp-session-id", &session_id)
        .header("last-event-id", format!("{stream_id}_{e1}"))
        .header("accept", "text/event-stream")
        .send()
        .await
        .unwrap();
    assert_eq!(
        response.headers().get("content-type").unwrap().to_str().unwrap(),
        "text/event-stream"
    );

    let mut response = response;
    let mut collected = String::new();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while tokio::time::Instant::now() < deadline {
        match tokio::time::timeout(Duration::from_millis(500), response.chunk()).await {
            Ok(Ok(Some(chunk))) => {
                collected.push_str(&String::from_utf8_lossy(&chunk));
                if collected.contains("\"n\":3") {
                    break;
                }
            },
            _ => break,
        }
    }

    let pos2 = collected.find("\"n\":2").expect("event 2 replayed");
    let pos3 = collected.find("\"n\":3").expect("event 3 replayed");
    assert!(pos2 < pos3, "replay preserves original order");
    assert!(!collected.contains("\"n\":1"), "events at or before Last-Event-Id are not replayed");
}

#[tokio::test]
async fn sse_requires_a_live_session() {
    let base = serve(empty_state()).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{base}/mcp"))
        .header("accept", "text/event-stream")
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], -32000);
}

#[tokio::test]
async fn health_is_session_independent_and_fixed_shape() {
    let base = serve(empty_state()).await;
    let client = reqwest::Client::new();

    let response = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["service"], "sapdocs-mcp");
    assert_eq!(body["transport"], "streamable-http");
    assert_eq!(body["protocolVersion"], "2025-07-09");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn status_reports_catalog_shape() {
    let base = serve(empty_state()).await;
    let client = reqwest::Client::new();

    let response = client.get(format!("{base}/status")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["libraries"], 1);
    assert_eq!(body["documents"], 0);
    assert_eq!(body["sessions"], 0);
}

#[tokio::test]
async fn responses_keep_request_order_within_a_session() {
    let base = serve(empty_state()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/mcp"))
        .json(&initialize_request())
        .send()
        .await
        .unwrap();
    let session_id = response
        .headers()
        .get("mcp-session-id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    // A batch dispatches in order; ids come back in request order.
    let response = client
        .post(format!("{base}/mcp"))
        .header("mcp-session-id", &session_id)
        .json(&json!([
            {"jsonrpc": "2.0", "id": 10, "method": "ping"},
            {"jsonrpc": "2.0", "id": 11, "method": "prompts/list"},
            {"jsonrpc": "2.0", "id": 12, "method": "ping"}
        ]))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![10, 11, 12]);
}
