//! Error types for the MCP server with JSON-RPC error-code mapping.

use thiserror::Error;

/// Errors surfaced by the transport and tool layers.
#[derive(Debug, Error)]
pub enum McpError {
    /// Core engine failure.
    #[error("core error: {0}")]
    Core(#[from] sapdocs_core::Error),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing or invalid session identifier.
    #[error("session error: {0}")]
    Session(String),

    /// Malformed request envelope.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Unknown JSON-RPC method.
    #[error("method not found: {0}")]
    MethodNotFound(String),

    /// Tool argument validation failure.
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl McpError {
    /// JSON-RPC error code for this error.
    #[must_use]
    pub const fn error_code(&self) -> i32 {
        match self {
            Self::Session(_) => -32000,
            Self::Json(_) => -32700,
            Self::Protocol(_) => -32600,
            Self::MethodNotFound(_) => -32601,
            Self::InvalidParams(_) => -32602,
            Self::Core(_) | Self::Internal(_) => -32603,
        }
    }
}

/// Result type alias for MCP operations.
pub type McpResult<T> = Result<T, McpError>;
