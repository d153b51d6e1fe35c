//! # sapdocs-mcp
//!
//! Streaming HTTP MCP server for the federated SAP documentation search
//! service. Exposes the tool surface (`search`, `fetch`, `feature_matrix`,
//! `community_search`) and prompt catalog over a session-aware `/mcp`
//! endpoint with SSE resumption, plus `/health` and `/status`.

/// Error types with JSON-RPC code mapping
pub mod error;
/// Per-stream event logs for SSE resumption
pub mod events;
/// Prompt templates
pub mod prompts;
/// JSON-RPC dispatch
pub mod rpc;
/// HTTP routes and handlers
pub mod server;
/// Session lifecycle
pub mod session;
/// Shared server state
pub mod state;
/// Tool declarations and dispatch
pub mod tools;

pub use error::{McpError, McpResult};
pub use events::{EventLogEntry, EventStore};
pub use rpc::{PROTOCOL_VERSION, SERVER_NAME};
pub use server::router;
pub use session::{Session, SessionRegistry};
pub use state::AppState;
