//! # sapdocs-core
//!
//! Core library for the federated SAP documentation search service.
//!
//! This crate turns a fixed set of SAP-adjacent source trees (SAPUI5 and
//! CAP guides, Cloud SDK docs, wdi5 guides, ABAP keyword documentation,
//! OpenUI5 control sources and samples) into a uniform document catalog
//! with a full-text index, and answers queries through a hybrid retrieval
//! pipeline.
//!
//! ## Architecture
//!
//! - **Harvesting**: per-source extractors (markdown, JSDoc, samples) emit
//!   uniform [`Document`](types::Document) records, sections included
//! - **Catalog & index**: JSON catalog artifacts plus a tantivy index,
//!   rebuilt at build time and read-only afterwards
//! - **Retrieval**: query expansion, FTS candidates, context-aware scoring
//!   with fuzzy matching and metadata boosts, catalog-scan fallback
//! - **Live sources**: community, help portal, articles and the ABAP
//!   feature matrix, fused by reciprocal rank when enabled
//! - **URLs**: deterministic strategies mapping documents to canonical
//!   public documentation pages
//!
//! ## Error handling
//!
//! All operations return [`Result<T, Error>`]. Within a search request the
//! pipeline degrades rather than fails: FTS errors fall back to a catalog
//! scan and adapter failures surface as warnings on the response.

/// Live source adapters and the shared response cache
pub mod adapters;
/// Document catalog and its persistence
pub mod catalog;
/// Document fetcher resolving identifiers to display text
pub mod docfetch;
/// Error types and result aliases
pub mod error;
/// Query expansion into ranked variants
pub mod expand;
/// Minimal YAML front-matter parsing
pub mod frontmatter;
/// Reciprocal-rank fusion of ranked lists
pub mod fusion;
/// Source harvesting and per-type extractors
pub mod harvest;
/// Tantivy-backed full-text index
pub mod index;
/// Build-time ingestion pipeline
pub mod ingest;
/// Built-in registry of corpora and URL configurations
pub mod registry;
/// Hybrid retrieval pipeline
pub mod search;
/// Data-directory layout
pub mod storage;
/// Text normalization helpers
pub mod text;
/// Core data types
pub mod types;
/// Deterministic URL generation
pub mod urls;

// Re-export commonly used types
pub use adapters::{AdapterSet, LiveAdapter, ResponseCache};
pub use catalog::Catalog;
pub use docfetch::{DocumentFetcher, FetchedDocument};
pub use error::{Error, Result};
pub use harvest::Harvester;
pub use index::SearchIndex;
pub use ingest::{BuildSummary, build_all};
pub use registry::{ExtractorKind, LibraryEntry, Registry, SourceSpec};
pub use search::SearchEngine;
pub use storage::Storage;
pub use types::*;
