//! Error types and result aliases for sapdocs-core operations.
//!
//! Errors are grouped by the subsystem that produced them. Inside a request
//! the search pipeline never propagates `Index` errors to the caller: the
//! scorer degrades to a catalog scan instead (see `search`). The only error
//! treated as fatal by the server binary is a catalog that cannot be read at
//! startup.

use thiserror::Error;

/// The main error type for sapdocs-core operations.
///
/// All public functions in sapdocs-core return `Result<T, Error>` for
/// consistent error handling. Conversions from `std::io::Error`,
/// `reqwest::Error` and `serde_json::Error` are provided so that `?` works
/// at every layer.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Covers file system operations like reading source trees, writing
    /// catalog artifacts and reading document bodies at fetch time.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network operation failed.
    ///
    /// Covers HTTP requests issued by the live source adapters. Adapter
    /// callers treat these as degraded-empty rather than request failures.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Parsing operation failed.
    ///
    /// Markdown/JSDoc extraction, front-matter handling and JSON
    /// deserialization of catalog artifacts.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Search index operation failed.
    ///
    /// Tantivy-related failures when building or querying the full-text
    /// index. The scorer recovers from these by scanning the catalog.
    #[error("Index error: {0}")]
    Index(String),

    /// Catalog storage operation failed.
    ///
    /// Covers the data-directory layout: `index.json`, the per-library
    /// mirrors and the index directory itself.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Requested entity was not found.
    ///
    /// Unknown document identifiers, unknown libraries, missing files.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid configuration.
    #[error("Config error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(format!("JSON error: {err}"))
    }
}

impl Error {
    /// Returns true when the failure is transient and a retry could succeed.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Io(_))
    }

    /// Stable category label used in logs and diagnostics.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Network(_) => "network",
            Self::Parse(_) => "parse",
            Self::Index(_) => "index",
            Self::Storage(_) => "storage",
            Self::NotFound(_) => "not-found",
            Self::Config(_) => "config",
        }
    }
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
