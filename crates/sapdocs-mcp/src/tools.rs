//! Tool surface: declarations, argument validation and dispatch.
//!
//! Four tools are exposed: `search` (hybrid retrieval), `fetch` (document
//! resolution), `feature_matrix` and `community_search` (single-adapter
//! lookups). Argument constraints are validated before any work happens;
//! violations surface as structured `-32602` errors.

use serde_json::{Value, json};

use sapdocs_core::{Flavor, MAX_SEARCH_LIMIT, SearchFlags};

use crate::error::{McpError, McpResult};
use crate::state::AppState;

/// Tool declarations for `tools/list`, one JSON schema per tool.
#[must_use]
pub fn definitions() -> Value {
    let read_only = json!({
        "readOnlyHint": true,
        "destructiveHint": false,
        "idempotentHint": true,
        "openWorldHint": false
    });
    let open_world = json!({
        "readOnlyHint": true,
        "destructiveHint": false,
        "idempotentHint": true,
        "openWorldHint": true
    });

    json!([
        {
            "name": "search",
            "annotations": read_only,
            "description": "Search the federated SAP documentation corpora (SAPUI5, CAP, wdi5, Cloud SDK, OpenUI5 API and samples, ABAP keyword docs). Returns ranked hits with public URLs. Use fetch with a hit id to read the full document.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Free-text query, e.g. 'Column Micro Chart' or 'sap.m.Button'" },
                    "k": { "type": "integer", "description": "Maximum number of hits (default 10, max 50)" },
                    "includeOnline": { "type": "boolean", "description": "Also query live sources (community, help portal, articles) and fuse results" },
                    "includeSamples": { "type": "boolean", "description": "Include sample-kind documents in results" },
                    "sources": { "type": "array", "items": { "type": "string" }, "description": "Restrict to the given library identifiers (loose names accepted, e.g. 'ui5')" },
                    "flavor": { "type": "string", "enum": ["on-prem", "cloud"], "description": "ABAP documentation flavor" }
                },
                "required": ["query"]
            }
        },
        {
            "name": "fetch",
            "annotations": read_only,
            "description": "Fetch the full text of a search hit by identifier: a catalog document, a section (id contains '#'), or an external post.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "id": { "type": "string", "description": "Identifier returned by search" }
                },
                "required": ["id"]
            }
        },
        {
            "name": "feature_matrix",
            "annotations": open_world,
            "description": "Look up ABAP language features in the feature matrix: availability on-premise vs ABAP Cloud.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Feature name or fragment" },
                    "limit": { "type": "integer", "description": "Maximum number of rows (default 10)" }
                },
                "required": ["query"]
            }
        },
        {
            "name": "community_search",
            "annotations": open_world,
            "description": "Search SAP Community posts only. Best-effort: bot protection may yield empty results.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Free-text query" }
                },
                "required": ["query"]
            }
        }
    ])
}

/// Dispatches a validated tool call and renders the MCP result envelope.
pub async fn call(state: &AppState, name: &str, args: &Value) -> McpResult<Value> {
    match name {
        "search" => search(state, args).await,
        "fetch" => fetch(state, args).await,
        "feature_matrix" => adapter_search(state, "abap-feature-matrix", args).await,
        "community_search" => adapter_search(state, "community", args).await,
        other => Err(McpError::MethodNotFound(format!("unknown tool '{other}'"))),
    }
}

fn required_str<'a>(args: &'a Value, key: &str) -> McpResult<&'a str> {
    let value = args
        .get(key)
        .ok_or_else(|| McpError::InvalidParams(format!("missing required parameter '{key}'")))?;
    let s = value
        .as_str()
        .ok_or_else(|| McpError::InvalidParams(format!("parameter '{key}' must be a string")))?;
    if s.trim().is_empty() {
        return Err(McpError::InvalidParams(format!(
            "parameter '{key}' must not be empty"
        )));
    }
    Ok(s)
}

fn parse_search_flags(args: &Value) -> McpResult<SearchFlags> {
    let flavor = match args.get("flavor").and_then(Value::as_str) {
        None => None,
        Some("on-prem") => Some(Flavor::OnPrem),
        Some("cloud") => Some(Flavor::Cloud),
        Some(other) => {
            return Err(McpError::InvalidParams(format!(
                "parameter 'flavor' must be 'on-prem' or 'cloud', got '{other}'"
            )));
        },
    };

    let sources = match args.get("sources") {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => {
            let names: Option<Vec<String>> = items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect();
            Some(names.ok_or_else(|| {
                McpError::InvalidParams("parameter 'sources' must be an array of strings".into())
            })?)
        },
        Some(_) => {
            return Err(McpError::InvalidParams(
                "parameter 'sources' must be an array of strings".into(),
            ));
        },
    };

    Ok(SearchFlags {
        include_online: args
            .get("includeOnline")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        include_samples: args
            .get("includeSamples")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        sources,
        flavor,
    })
}

fn parse_limit(args: &Value, key: &str, max: usize) -> McpResult<Option<usize>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            let k = value.as_u64().ok_or_else(|| {
                McpError::InvalidParams(format!("parameter '{key}' must be a positive integer"))
            })?;
            let k = usize::try_from(k)
                .map_err(|_| McpError::InvalidParams(format!("parameter '{key}' out of range")))?;
            if k == 0 || k > max {
                return Err(McpError::InvalidParams(format!(
                    "parameter '{key}' must be between 1 and {max}"
                )));
            }
            Ok(Some(k))
        },
    }
}

async fn search(state: &AppState, args: &Value) -> McpResult<Value> {
    let query = required_str(args, "query")?;
    let k = parse_limit(args, "k", MAX_SEARCH_LIMIT)?;
    let flags = parse_search_flags(args)?;

    let response = state.engine.search(query, k, &flags).await;
    let structured = serde_json::to_value(&response)?;
    Ok(tool_result(structured))
}

async fn fetch(state: &AppState, args: &Value) -> McpResult<Value> {
    let id = required_str(args, "id")?;
    let fetched = state.fetcher.fetch(id).await;
    let structured = json!({
        "id": fetched.id,
        "text": fetched.text,
        "url": fetched.url,
    });
    Ok(tool_result(structured))
}

async fn adapter_search(state: &AppState, adapter: &str, args: &Value) -> McpResult<Value> {
    let query = required_str(args, "query")?;
    let limit = parse_limit(args, "limit", MAX_SEARCH_LIMIT)?.unwrap_or(10);

    let (hits, warnings) = state.engine.adapters().search_one(adapter, query).await;
    let hits: Vec<_> = hits.into_iter().take(limit).collect();
    let structured = json!({
        "results": hits,
        "warnings": warnings,
    });
    Ok(tool_result(structured))
}

/// MCP tool result: structured content plus a JSON text block for clients
/// that only render text.
fn tool_result(structured: Value) -> Value {
    let text = serde_json::to_string_pretty(&structured).unwrap_or_else(|_| "{}".to_string());
    json!({
        "content": [{ "type": "text", "text": text }],
        "structuredContent": structured,
        "isError": false
    })
}
