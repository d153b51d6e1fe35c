//! Core data structures for the documentation catalog and search pipeline.
//!
//! ## Type categories
//!
//! - **Catalog**: [`Document`], [`DocKind`], [`LibraryBundle`]
//! - **Control metadata**: [`ControlMetadata`], [`SectionInfo`]
//! - **Search**: [`SearchHit`], [`ScoreBreakdown`], [`SearchResponse`], [`SearchFlags`]
//! - **Live sources**: [`LiveHit`]
//! - **URL generation**: [`UrlConfig`], [`AnchorStyle`]
//!
//! ## Serialization
//!
//! All wire-facing types serialize with camelCase field names; enums use
//! kebab-case variants. The catalog JSON written at build time is read back
//! verbatim at startup, so the formats here are the persistence formats too.

use serde::{Deserialize, Serialize};

/// Content kind of an indexed document.
///
/// Modeled as a tagged variant rather than inheritance: consumers
/// pattern-match on the kind and read the per-kind attribute subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocKind {
    /// Narrative documentation page.
    Guide,
    /// API reference extracted from annotated sources.
    ApiReference,
    /// Framework sample (controller, view, manifest, page).
    Sample,
    /// Heading-scoped slice of a guide or API reference.
    Section,
    /// Result sourced from a live adapter, not the local catalog.
    ExternalPost,
}

impl DocKind {
    /// Stable label used in FTS columns and log output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Guide => "guide",
            Self::ApiReference => "api-reference",
            Self::Sample => "sample",
            Self::Section => "section",
            Self::ExternalPost => "external-post",
        }
    }
}

/// Structured metadata extracted from JSDoc-annotated control sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlMetadata {
    /// Short control name, e.g. `Button`.
    pub control_name: String,
    /// Namespace prefix, e.g. `sap.m`.
    pub namespace: String,
    /// Declared property names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<String>,
    /// Declared event names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
    /// Declared aggregation names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aggregations: Vec<String>,
    /// Free-form keywords harvested from the source.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

impl ControlMetadata {
    /// Fully-qualified control name (`namespace.ControlName`).
    #[must_use]
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.control_name.clone()
        } else {
            format!("{}.{}", self.namespace, self.control_name)
        }
    }

    /// Concatenated keyword blob used as an FTS column.
    ///
    /// Keywords, properties, events and aggregations joined by spaces in
    /// that order; the order is part of the index schema contract.
    #[must_use]
    pub fn keyword_blob(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(
            self.keywords.len() + self.properties.len() + self.events.len() + self.aggregations.len(),
        );
        parts.extend(self.keywords.iter().map(String::as_str));
        parts.extend(self.properties.iter().map(String::as_str));
        parts.extend(self.events.iter().map(String::as_str));
        parts.extend(self.aggregations.iter().map(String::as_str));
        parts.join(" ")
    }
}

/// Section placement for documents of kind [`DocKind::Section`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionInfo {
    /// Identifier of the parent document (kind guide or api-reference).
    pub parent_id: String,
    /// Heading level, always in `2..=4`.
    pub level: u8,
    /// 1-based line of the heading within the parent file.
    pub start_line: usize,
}

/// A single indexed unit of the catalog.
///
/// Invariants: the identifier is unique across the catalog, its first
/// slash-delimited segment equals `library`, and for sections `section`
/// is present with a parent that resolves to a guide or API reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Stable opaque identifier, slash-delimited, library-prefixed.
    pub id: String,
    /// Library identifier (leading slash), e.g. `/sapui5`.
    pub library: String,
    /// Content kind.
    pub kind: DocKind,
    /// Display title.
    pub title: String,
    /// Short description (first paragraph or front-matter synopsis).
    #[serde(default)]
    pub description: String,
    /// File path relative to the library's source tree.
    pub rel_file: String,
    /// Number of code snippets detected in the body.
    #[serde(default)]
    pub snippet_count: usize,
    /// Control metadata for API references and samples.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ControlMetadata>,
    /// Section placement; present iff `kind == Section`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<SectionInfo>,
}

impl Document {
    /// Returns true when the identifier prefix matches the library, the
    /// basic structural invariant of the catalog.
    #[must_use]
    pub fn id_matches_library(&self) -> bool {
        self.id == self.library || self.id.starts_with(&format!("{}/", self.library))
    }
}

/// A named, path-prefixed group of documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryBundle {
    /// Library identifier with leading slash, e.g. `/cap`.
    pub id: String,
    /// Human-readable display name.
    pub name: String,
    /// Short description shown in listings.
    pub description: String,
    /// All documents belonging to this bundle.
    pub documents: Vec<Document>,
}

/// Per-stage score contributions for a ranked hit.
///
/// Kept on the wire so clients can explain rankings; every field is the
/// total contribution of that stage, penalties included as negatives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    /// Title match contribution (full/prefix/substring).
    pub title: f32,
    /// Keyword-blob token hits, capped.
    pub keywords: f32,
    /// Control or namespace exact match.
    pub metadata: f32,
    /// Fuzzy title-token match.
    pub fuzzy: f32,
    /// Body excerpt containing a variant.
    pub excerpt: f32,
    /// Cross-context penalty (negative or zero).
    pub context_penalty: f32,
    /// Section-over-parent bias.
    pub section_bias: f32,
    /// Longest common prefix (in characters) between the lowercased title
    /// and any query variant. Not a score contribution; it is the first
    /// tie-break between equally scored hits.
    #[serde(default)]
    pub title_prefix_len: usize,
}

impl ScoreBreakdown {
    /// Sum of all stage contributions.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.title
            + self.keywords
            + self.metadata
            + self.fuzzy
            + self.excerpt
            + self.context_penalty
            + self.section_bias
    }
}

/// A ranked search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    /// Document identifier (catalog id or adapter-scoped id).
    pub id: String,
    /// Display title.
    pub title: String,
    /// Owning library, or the adapter label for external posts.
    pub library: String,
    /// Content kind.
    pub kind: DocKind,
    /// Final score; the returned sequence is non-increasing in this value.
    pub score: f32,
    /// Per-stage score contributions.
    #[serde(default)]
    pub breakdown: ScoreBreakdown,
    /// Short excerpt of the document's first non-heading text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    /// Resolved canonical public URL, when one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Provenance label: `local` or the adapter name.
    pub source: String,
}

/// Search response envelope, including degradation notices.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Ranked hits, at most `k`.
    pub results: Vec<SearchHit>,
    /// True when the FTS engine was bypassed and the catalog was scanned.
    #[serde(default)]
    pub fallback: bool,
    /// Human-readable degradation notices (adapter timeouts etc).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// ABAP documentation flavor selecting the keyword-doc corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Flavor {
    /// On-premise release documentation.
    #[default]
    OnPrem,
    /// SAP BTP ABAP Environment documentation.
    Cloud,
}

/// Capability flags accepted by the search operation.
#[derive(Debug, Clone, Default)]
pub struct SearchFlags {
    /// Enable live source adapters, fused via reciprocal-rank fusion.
    pub include_online: bool,
    /// Include sample-kind documents in results.
    pub include_samples: bool,
    /// Restrict results to the given library identifiers.
    pub sources: Option<Vec<String>>,
    /// Language-variant selector for flavored corpora.
    pub flavor: Option<Flavor>,
}

/// Maximum number of hits a single search may return.
pub const MAX_SEARCH_LIMIT: usize = 50;
/// Default number of hits when the caller does not pass `k`.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Normalized hit returned by a live source adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveHit {
    /// Adapter-scoped identifier, e.g. `community-14039211`.
    pub id: String,
    /// Post or page title.
    pub title: String,
    /// Absolute URL of the result.
    pub url: String,
    /// Plain-text snippet (tags stripped, entities decoded).
    pub snippet: String,
    /// Adapter label, e.g. `community`.
    pub source: String,
}

/// Anchor style used when composing section links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorStyle {
    /// GitHub-flavored slugs (`#my-heading`).
    GithubFlavored,
    /// Docsify slugs (`?id=my-heading`).
    DocsifyFlavored,
    /// Anchor emitted verbatim.
    Raw,
}

/// Per-library URL generation settings. Immutable at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlConfig {
    /// Base URL, scheme `https`.
    pub base_url: String,
    /// Path pattern with a `{file}` placeholder for the generic strategy.
    pub path_pattern: String,
    /// Anchor style for heading links.
    pub anchor_style: AnchorStyle,
}
