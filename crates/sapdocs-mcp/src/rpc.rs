//! JSON-RPC dispatch for the MCP protocol.
//!
//! One dispatcher per session; the transport serializes calls through the
//! session's dispatch lock so responses keep request order. Capabilities
//! advertise tools and prompts only — resource enumeration over a catalog
//! this size degrades client performance and stays disabled.

use serde_json::{Value, json};

use crate::error::{McpError, McpResult};
use crate::state::AppState;
use crate::{prompts, tools};

/// Advertised MCP protocol version.
pub const PROTOCOL_VERSION: &str = "2025-07-09";
/// Server name reported in `initialize` and `/health`.
pub const SERVER_NAME: &str = "sapdocs-mcp";

/// Dispatches one JSON-RPC request. Returns `None` for notifications.
pub async fn dispatch(state: &AppState, request: &Value) -> Option<Value> {
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let Some(method) = request.get("method").and_then(Value::as_str) else {
        return Some(error_response(
            id,
            &McpError::Protocol("missing method".into()),
        ));
    };

    if method.starts_with("notifications/") {
        return None;
    }

    let params = request.get("params").cloned().unwrap_or(Value::Null);
    let result = handle(state, method, &params).await;
    Some(match result {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err(err) => error_response(id, &err),
    })
}

async fn handle(state: &AppState, method: &str, params: &Value) -> McpResult<Value> {
    match method {
        "initialize" => Ok(initialize_result()),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(json!({ "tools": tools::definitions() })),
        "tools/call" => {
            let name = params
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| McpError::InvalidParams("missing tool name".into()))?;
            let default_args = json!({});
            let arguments = params.get("arguments").unwrap_or(&default_args);
            tools::call(state, name, arguments).await
        },
        "prompts/list" => Ok(prompts::list()),
        "prompts/get" => {
            let name = params
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| McpError::InvalidParams("missing prompt name".into()))?;
            prompts::get(name, params.get("arguments"))
        },
        other => Err(McpError::MethodNotFound(other.to_string())),
    }
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": { "listChanged": false },
            "prompts": { "listChanged": false }
        },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

/// Renders a JSON-RPC error response for an [`McpError`].
#[must_use]
pub fn error_response(id: Value, err: &McpError) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": err.error_code(),
            "message": err.to_string()
        }
    })
}
