//! Streaming HTTP transport: `/mcp` (POST, GET, DELETE), `/health` and
//! `/status`.
//!
//! Sessions ride in the `Mcp-Session-Id` header: emitted by the server on
//! `initialize`, echoed by clients afterwards. `GET /mcp` opens an SSE
//! stream; a `Last-Event-Id` header replays everything newer from that
//! stream's log. Responses within one session keep request order via the
//! session dispatch lock.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, Method, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use futures::StreamExt;
use serde_json::{Value, json};
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};

use crate::error::McpError;
use crate::rpc::{self, PROTOCOL_VERSION, SERVER_NAME};
use crate::state::AppState;

const SESSION_HEADER: &str = "mcp-session-id";
const LAST_EVENT_ID_HEADER: &str = "last-event-id";

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(SESSION_HEADER)]);

    Router::new()
        .route("/mcp", get(mcp_get).post(mcp_post).delete(mcp_delete))
        .route("/health", get(health))
        .route("/status", get(status))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// POST /mcp — JSON-RPC dispatch with session management
// ---------------------------------------------------------------------------

async fn mcp_post(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let parsed: Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(_) => {
            let err = json!({
                "jsonrpc": "2.0",
                "id": null,
                "error": { "code": -32700, "message": "Parse error" }
            });
            return json_response(StatusCode::BAD_REQUEST, &err);
        },
    };

    let is_batch = parsed.is_array();
    let requests: Vec<Value> = if is_batch {
        parsed.as_array().cloned().unwrap_or_default()
    } else {
        vec![parsed]
    };

    let has_initialize = requests
        .iter()
        .any(|req| req.get("method").and_then(Value::as_str) == Some("initialize"));

    // A session header, when present, must map to a live session, initialize
    // included. Only a header-less initialize mints one.
    let (session, fresh) = match header_value(&headers, SESSION_HEADER) {
        Some(sid) => match state.sessions.get(&sid) {
            Some(session) => (session, false),
            None => return session_error("Invalid or expired session ID"),
        },
        None if has_initialize => {
            let session = state.sessions.create();
            info!(session = %session.id, "session created");
            (session, true)
        },
        None => {
            return session_error("Missing Mcp-Session-Id header. Send 'initialize' first.");
        },
    };
    session.touch();

    // Serialize dispatch per session so responses keep request order.
    let _order = session.dispatch_lock.lock().await;
    let mut cancelled = session.cancelled();

    let mut responses: Vec<Value> = Vec::new();
    for request in &requests {
        tokio::select! {
            response = rpc::dispatch(&state, request) => {
                if let Some(response) = response {
                    responses.push(response);
                }
            },
            _ = cancelled.changed() => {
                debug!(session = %session.id, "request aborted by session termination");
                return session_error("Session terminated");
            },
        }
    }

    if responses.is_empty() {
        // Pure notifications: nothing to send back.
        let mut builder = Response::builder().status(StatusCode::ACCEPTED);
        if fresh {
            builder = builder.header(SESSION_HEADER, session.id.as_str());
        }
        return builder.body(Body::empty()).unwrap_or_default();
    }

    let body_json = if is_batch {
        serde_json::to_string(&responses)
    } else {
        serde_json::to_string(&responses[0])
    }
    .unwrap_or_else(|_| "{}".to_string());

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header("content-type", "application/json");
    if fresh {
        builder = builder.header(SESSION_HEADER, session.id.as_str());
    }
    builder.body(Body::from(body_json)).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// GET /mcp — server-to-client event stream with resumption
// ---------------------------------------------------------------------------

async fn mcp_get(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let Some(session) = header_value(&headers, SESSION_HEADER)
        .and_then(|sid| state.sessions.get(&sid))
    else {
        return session_error("Invalid or missing Mcp-Session-Id header");
    };
    session.touch();

    // Replay anything newer than the client's last seen event.
    let mut replayed: Vec<Event> = Vec::new();
    let stream_id = match header_value(&headers, LAST_EVENT_ID_HEADER) {
        Some(last_event_id) => state.events.replay_after(&last_event_id, |entry| {
            replayed.push(
                Event::default()
                    .id(entry.wire_id())
                    .data(entry.message.clone()),
            );
        }),
        None => state.events.create_stream(),
    };
    debug!(session = %session.id, stream = %stream_id, replayed = replayed.len(), "SSE stream opened");

    let replay = futures::stream::iter(replayed.into_iter().map(Ok::<_, Infallible>));
    let live = live_events(session.subscribe(), stream_id);
    Sse::new(replay.chain(live))
        .keep_alive(KeepAlive::default())
        .into_response()
}

/// Forwards a session's broadcast events that belong to `stream_id`.
fn live_events(
    rx: broadcast::Receiver<crate::events::EventLogEntry>,
    stream_id: String,
) -> impl futures::Stream<Item = Result<Event, Infallible>> {
    futures::stream::unfold((rx, stream_id), |(mut rx, stream_id)| async move {
        loop {
            match rx.recv().await {
                Ok(entry) if entry.stream_id == stream_id => {
                    let event = Event::default().id(entry.wire_id()).data(entry.message);
                    return Some((Ok(event), (rx, stream_id)));
                },
                // Events for other streams of the same session are skipped.
                Ok(_) => {},
                Err(broadcast::error::RecvError::Lagged(_)) => {},
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    })
}

// ---------------------------------------------------------------------------
// DELETE /mcp — session termination
// ---------------------------------------------------------------------------

async fn mcp_delete(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let Some(sid) = header_value(&headers, SESSION_HEADER) else {
        return session_error("Missing Mcp-Session-Id header");
    };
    if state.sessions.remove(&sid) {
        info!(session = %sid, "session terminated");
        StatusCode::OK.into_response()
    } else {
        session_error("Invalid or expired session ID")
    }
}

// ---------------------------------------------------------------------------
// GET /health and GET /status
// ---------------------------------------------------------------------------

async fn health() -> Response {
    // Fixed shape, independent of session state, always 200 while running.
    let body = json!({
        "service": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "transport": "streamable-http",
        "protocolVersion": PROTOCOL_VERSION,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    json_response(StatusCode::OK, &body)
}

async fn status(State(state): State<Arc<AppState>>) -> Response {
    let catalog = state.engine.catalog();
    let body = json!({
        "service": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "startedAt": state.started_at.to_rfc3339(),
        "sessions": state.sessions.len(),
        "libraries": catalog.bundles().len(),
        "documents": catalog.len(),
        "indexBuiltAt": state.index_built_at.map(|t| t.to_rfc3339()),
    });
    json_response(StatusCode::OK, &body)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn session_error(message: &str) -> Response {
    let body = rpc::error_response(Value::Null, &McpError::Session(message.to_string()));
    json_response(StatusCode::NOT_FOUND, &body)
}

fn json_response(status: StatusCode, body: &Value) -> Response {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap_or_default()
}
