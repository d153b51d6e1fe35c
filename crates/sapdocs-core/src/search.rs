//! Hybrid retrieval pipeline: FTS candidate generation, context-aware
//! scoring, fuzzy matching and metadata boosts, with an optional live
//! fan-out fused by reciprocal rank.
//!
//! Failure semantics: an FTS error or an empty candidate set degrades to a
//! full catalog scan with the same scoring function, flagged in the
//! response. An empty result list is a normal outcome, not an error.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::adapters::AdapterSet;
use crate::catalog::Catalog;
use crate::expand;
use crate::fusion::reciprocal_rank_fusion;
use crate::index::{CANDIDATES_PER_VARIANT, SearchIndex};
use crate::registry::Registry;
use crate::text::{excerpt_around, first_text_line, levenshtein_bounded, tokenize};
use crate::types::{
    DEFAULT_SEARCH_LIMIT, DocKind, Document, Flavor, MAX_SEARCH_LIMIT, ScoreBreakdown, SearchFlags,
    SearchHit, SearchResponse,
};

/// Title scoring: full match, prefix match, substring match.
const TITLE_FULL: f32 = 100.0;
const TITLE_PREFIX: f32 = 60.0;
const TITLE_SUBSTRING: f32 = 30.0;
/// Keyword-blob token hit and its cap.
const KEYWORD_TOKEN: f32 = 15.0;
const KEYWORD_CAP: f32 = 60.0;
/// Control or namespace exact match.
const METADATA_EXACT: f32 = 80.0;
/// Fuzzy title-token match (edit distance <= 2, token length >= 4).
const FUZZY_TITLE: f32 = 20.0;
/// Stored excerpt contains a variant.
const EXCERPT_CONTAINS: f32 = 10.0;
/// Penalty for candidates from an unrelated context library.
const CONTEXT_PENALTY: f32 = -25.0;
/// A section whose heading matches the query outscores its parent.
const SECTION_BIAS: f32 = 5.0;

/// Excerpt window attached to hits.
const EXCERPT_CHARS: usize = 200;

/// Whole-request deadline; the tightest of the per-call deadlines wins.
pub const REQUEST_DEADLINE: std::time::Duration = std::time::Duration::from_secs(25);

/// Fixed vocabulary-to-library associations driving context penalties.
static CONTEXT_VOCABS: &[(&[&str], &[&str])] = &[
    (
        &["cds", "cap", "entity", "annotation", "service definition", "srv"],
        &["/cap"],
    ),
    (
        &["control", "xml view", "fragment", "fiori", "ui5", "renderer"],
        &["/sapui5", "/openui5-api", "/openui5-samples"],
    ),
    (&["wdi5", "wdio", "webdriver"], &["/wdi5"]),
    (
        &["abap", "internal table", "select-options", "field symbol"],
        &["/abap-docs-758", "/abap-docs-cloud"],
    ),
    (
        &["destination", "btp", "cloud sdk"],
        &["/cloud-sdk-js", "/cloud-sdk-ai"],
    ),
];

/// The retrieval engine: read-only catalog and index plus live adapters.
pub struct SearchEngine {
    catalog: Arc<Catalog>,
    index: Option<SearchIndex>,
    registry: Arc<Registry>,
    adapters: Arc<AdapterSet>,
}

impl SearchEngine {
    /// Creates an engine. Passing `None` for the index forces the catalog
    /// scan path permanently, which some deployments use on tiny corpora.
    #[must_use]
    pub fn new(
        catalog: Arc<Catalog>,
        index: Option<SearchIndex>,
        registry: Arc<Registry>,
        adapters: Arc<AdapterSet>,
    ) -> Self {
        Self {
            catalog,
            index,
            registry,
            adapters,
        }
    }

    /// Read-only catalog handle.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Registry handle.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Live adapter set.
    #[must_use]
    pub fn adapters(&self) -> &Arc<AdapterSet> {
        &self.adapters
    }

    /// Runs the full pipeline under the request deadline and returns at
    /// most `k` ranked hits. Hitting the deadline degrades to an empty
    /// response with a warning, never an error.
    pub async fn search(&self, query: &str, k: Option<usize>, flags: &SearchFlags) -> SearchResponse {
        match tokio::time::timeout(REQUEST_DEADLINE, self.search_inner(query, k, flags)).await {
            Ok(response) => response,
            Err(_) => {
                warn!(query, "search hit the request deadline");
                SearchResponse {
                    warnings: vec!["request deadline exceeded".to_string()],
                    ..SearchResponse::default()
                }
            },
        }
    }

    async fn search_inner(&self, query: &str, k: Option<usize>, flags: &SearchFlags) -> SearchResponse {
        let k = k.unwrap_or(DEFAULT_SEARCH_LIMIT).clamp(1, MAX_SEARCH_LIMIT);
        let variants = expand::expand(query);
        if variants[0].is_empty() {
            return SearchResponse::default();
        }

        let library_filter = self.resolve_source_filter(flags);

        let local = self.search_local(&variants, k, flags, library_filter.as_ref());

        if flags.include_online {
            // Live fan-out runs concurrently with local scoring.
            let (local, (live_lists, live_warnings)) =
                tokio::join!(local, self.adapters.search_all(&variants[0]));
            let mut response = local;
            response.warnings.extend(live_warnings);

            let mut lists: Vec<Vec<SearchHit>> = vec![response.results.clone()];
            lists.extend(live_lists.into_iter().map(|hits| {
                hits.into_iter().map(live_to_hit).collect::<Vec<_>>()
            }));
            let fused = reciprocal_rank_fusion(lists);
            response.results = fused.into_iter().take(k).collect();
            response
        } else {
            local.await
        }
    }

    async fn search_local(
        &self,
        variants: &[String],
        k: usize,
        flags: &SearchFlags,
        library_filter: Option<&HashSet<String>>,
    ) -> SearchResponse {
        let mut warnings = Vec::new();
        let mut fallback = false;

        let mut candidate_ids: HashSet<String> = HashSet::new();
        if let Some(index) = &self.index {
            for variant in variants {
                match index.candidates(variant, CANDIDATES_PER_VARIANT) {
                    Ok(ids) => candidate_ids.extend(ids),
                    Err(err) => {
                        warn!(error = %err, "FTS query failed, degrading to catalog scan");
                        warnings.push("full-text index unavailable, scanned catalog".to_string());
                        fallback = true;
                        break;
                    },
                }
            }
        } else {
            fallback = true;
        }

        if candidate_ids.is_empty() && !fallback {
            fallback = true;
        }

        let candidates: Vec<&Document> = if fallback {
            self.catalog.iter().collect()
        } else {
            candidate_ids
                .iter()
                .filter_map(|id| self.catalog.get(id))
                .collect()
        };

        let query_lower = variants[0].to_lowercase();
        let mut scored: Vec<(f32, &Document, ScoreBreakdown)> = Vec::new();
        for doc in candidates {
            if !self.passes_filters(doc, flags, library_filter) {
                continue;
            }
            if let Some((score, breakdown)) = score_document(doc, variants, &query_lower) {
                scored.push((score, doc, breakdown));
            }
        }

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.2.title_prefix_len.cmp(&a.2.title_prefix_len))
                .then_with(|| a.1.id.cmp(&b.1.id))
        });
        scored.truncate(k);

        let results = scored
            .into_iter()
            .map(|(score, doc, breakdown)| self.finish_hit(doc, score, breakdown, &query_lower, flags))
            .collect();

        debug!(query = %variants[0], fallback, "local search complete");
        SearchResponse {
            results,
            fallback,
            warnings,
        }
    }

    fn resolve_source_filter(&self, flags: &SearchFlags) -> Option<HashSet<String>> {
        let sources = flags.sources.as_ref()?;
        let resolved: HashSet<String> = sources
            .iter()
            .filter_map(|name| self.registry.resolve_library(name))
            .map(str::to_string)
            .collect();
        Some(resolved)
    }

    fn passes_filters(
        &self,
        doc: &Document,
        flags: &SearchFlags,
        library_filter: Option<&HashSet<String>>,
    ) -> bool {
        if doc.kind == DocKind::Sample && !flags.include_samples {
            return false;
        }
        if let Some(filter) = library_filter {
            if !filter.is_empty() && !filter.contains(&doc.library) {
                return false;
            }
        }
        match flags.flavor {
            Some(Flavor::Cloud) if doc.library == "/abap-docs-758" => false,
            Some(Flavor::OnPrem) if doc.library == "/abap-docs-cloud" => false,
            _ => true,
        }
    }

    /// Attaches URL and excerpt to a ranked hit. File reads happen only for
    /// the truncated top-k, never for the whole candidate set.
    fn finish_hit(
        &self,
        doc: &Document,
        score: f32,
        breakdown: ScoreBreakdown,
        query_lower: &str,
        flags: &SearchFlags,
    ) -> SearchHit {
        let content = self
            .catalog
            .source_path(&self.registry, doc)
            .and_then(|path| std::fs::read_to_string(path).ok())
            .unwrap_or_default();

        let url = self
            .registry
            .url_config(&doc.library, flags.flavor)
            .and_then(|config| {
                if doc.kind == DocKind::Section {
                    crate::urls::resolve_section_url(
                        &doc.library,
                        &doc.rel_file,
                        &content,
                        &doc.title,
                        config,
                    )
                } else {
                    crate::urls::resolve_url(&doc.library, &doc.rel_file, &content, config)
                }
            });

        let excerpt_source = first_text_line(&content).unwrap_or_else(|| doc.description.clone());
        let excerpt = if excerpt_source.is_empty() {
            None
        } else {
            Some(excerpt_around(&excerpt_source, query_lower, EXCERPT_CHARS))
        };

        SearchHit {
            id: doc.id.clone(),
            title: doc.title.clone(),
            library: doc.library.clone(),
            kind: doc.kind,
            score,
            breakdown,
            excerpt,
            url,
            source: "local".to_string(),
        }
    }
}

fn live_to_hit(live: crate::types::LiveHit) -> SearchHit {
    SearchHit {
        id: live.id,
        title: live.title,
        library: live.source.clone(),
        kind: DocKind::ExternalPost,
        score: 0.0,
        breakdown: ScoreBreakdown::default(),
        excerpt: if live.snippet.is_empty() {
            None
        } else {
            Some(live.snippet)
        },
        url: if live.url.is_empty() { None } else { Some(live.url) },
        source: live.source,
    }
}

/// Scores one catalog document against the expanded variants.
///
/// Returns `None` for documents that match nothing. The breakdown carries
/// the longest title-match prefix length for downstream tie-breaking.
#[must_use]
pub fn score_document(
    doc: &Document,
    variants: &[String],
    query_lower: &str,
) -> Option<(f32, ScoreBreakdown)> {
    let title_lower = doc.title.to_lowercase();
    let mut breakdown = ScoreBreakdown::default();
    let mut prefix_len = 0usize;

    // Title: best match over all variants. Substring works both ways so a
    // short section heading still matches a longer query.
    for variant in variants {
        let variant_lower = variant.to_lowercase();
        if variant_lower.is_empty() {
            continue;
        }
        let stage = if title_lower == variant_lower {
            TITLE_FULL
        } else if title_lower.starts_with(&variant_lower) {
            TITLE_PREFIX
        } else if title_lower.contains(&variant_lower)
            || (title_lower.len() >= 3 && variant_lower.contains(&title_lower))
        {
            TITLE_SUBSTRING
        } else {
            0.0
        };
        if stage > breakdown.title {
            breakdown.title = stage;
        }
        prefix_len = prefix_len.max(common_prefix_len(&title_lower, &variant_lower));
    }

    // Keyword blob: +15 per distinct matched token, capped.
    if let Some(meta) = &doc.metadata {
        let blob = meta.keyword_blob().to_lowercase();
        let blob_tokens: HashSet<String> = tokenize(&blob).into_iter().collect();
        // Each distinct token counts once across all variants.
        let mut matched: HashSet<String> = HashSet::new();
        for variant in variants {
            for token in tokenize(variant) {
                if blob_tokens.contains(&token) {
                    matched.insert(token);
                }
            }
        }
        #[allow(clippy::cast_precision_loss)]
        let keyword_score = (matched.len() as f32 * KEYWORD_TOKEN).min(KEYWORD_CAP);
        breakdown.keywords = keyword_score;

        // Control / namespace exact match.
        let control_lower = meta.control_name.to_lowercase();
        let namespace_lower = meta.namespace.to_lowercase();
        let qualified_lower = meta.qualified_name().to_lowercase();
        for variant in variants {
            let v = variant.to_lowercase();
            if !v.is_empty()
                && (v == control_lower || v == namespace_lower || v == qualified_lower)
            {
                breakdown.metadata = METADATA_EXACT;
                break;
            }
        }
    }

    // Fuzzy title tokens: edit distance <= 2 on tokens of length >= 4.
    'fuzzy: for title_token in tokenize(&title_lower) {
        if title_token.len() < 4 {
            continue;
        }
        for variant in variants {
            for query_token in tokenize(variant) {
                if query_token.len() >= 4
                    && query_token != title_token
                    && levenshtein_bounded(&title_token, &query_token, 2) <= 2
                {
                    breakdown.fuzzy = FUZZY_TITLE;
                    break 'fuzzy;
                }
            }
        }
    }

    // Stored excerpt (description) contains a variant.
    let description_lower = doc.description.to_lowercase();
    if !description_lower.is_empty()
        && variants.iter().any(|variant| {
            let v = variant.to_lowercase();
            !v.is_empty() && description_lower.contains(&v)
        })
    {
        breakdown.excerpt = EXCERPT_CONTAINS;
    }

    // Context penalty: query pulls toward one vocabulary, candidate lives
    // in a different vocabulary's libraries.
    breakdown.context_penalty = context_penalty(query_lower, &doc.library);

    // Section bias: a matching section heading outscores its parent.
    if doc.kind == DocKind::Section && breakdown.title > 0.0 {
        breakdown.section_bias = SECTION_BIAS;
    }

    let positive = breakdown.title
        + breakdown.keywords
        + breakdown.metadata
        + breakdown.fuzzy
        + breakdown.excerpt;
    if positive <= 0.0 {
        return None;
    }

    breakdown.title_prefix_len = prefix_len;
    Some((breakdown.total(), breakdown))
}

fn context_penalty(query_lower: &str, library: &str) -> f32 {
    let mut query_vocabs: Vec<usize> = Vec::new();
    let mut library_vocabs: Vec<usize> = Vec::new();

    for (idx, (terms, libraries)) in CONTEXT_VOCABS.iter().enumerate() {
        if terms.iter().any(|term| query_lower.contains(term)) {
            query_vocabs.push(idx);
        }
        if libraries.contains(&library) {
            library_vocabs.push(idx);
        }
    }

    if query_vocabs.is_empty() || library_vocabs.is_empty() {
        return 0.0;
    }
    if query_vocabs.iter().any(|idx| library_vocabs.contains(idx)) {
        return 0.0;
    }
    CONTEXT_PENALTY
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|(ca, cb)| ca == cb)
        .count()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::types::{ControlMetadata, LibraryBundle};

    fn doc(id: &str, library: &str, kind: DocKind, title: &str, description: &str) -> Document {
        Document {
            id: id.into(),
            library: library.into(),
            kind,
            title: title.into(),
            description: description.into(),
            rel_file: "f.md".into(),
            snippet_count: 0,
            metadata: None,
            section: None,
        }
    }

    fn variants(query: &str) -> Vec<String> {
        crate::expand::expand(query)
    }

    #[test]
    fn exact_title_scores_at_least_full() {
        let chart = doc(
            "/sapui5/06_SAP_Fiori_Elements/column-micro-chart-1a4ecb8",
            "/sapui5",
            DocKind::Guide,
            "Column Micro Chart",
            "Displays a compact chart",
        );
        let vars = variants("Column Micro Chart");
        let (score, breakdown) = score_document(&chart, &vars, "column micro chart").unwrap();
        assert!(score >= TITLE_FULL);
        assert!((breakdown.title - TITLE_FULL).abs() < f32::EPSILON);
    }

    #[test]
    fn prefix_and_substring_are_weaker() {
        let full = doc("/cap/a", "/cap", DocKind::Guide, "Entity", "");
        let prefix = doc("/cap/b", "/cap", DocKind::Guide, "Entity Definitions", "");
        let substring = doc("/cap/c", "/cap", DocKind::Guide, "Draft Entity Handling", "");
        let vars = variants("Entity");

        let s_full = score_document(&full, &vars, "entity").unwrap().0;
        let s_prefix = score_document(&prefix, &vars, "entity").unwrap().0;
        let s_sub = score_document(&substring, &vars, "entity").unwrap().0;
        assert!(s_full > s_prefix && s_prefix > s_sub);
    }

    #[test]
    fn control_metadata_boost() {
        let mut button = doc(
            "/openui5-api/src/sap.m/src/sap/m/Button",
            "/openui5-api",
            DocKind::ApiReference,
            "sap.m.Button",
            "Enables users to trigger actions",
        );
        button.metadata = Some(ControlMetadata {
            control_name: "Button".into(),
            namespace: "sap.m".into(),
            properties: vec!["text".into(), "enabled".into()],
            events: vec!["press".into()],
            aggregations: vec![],
            keywords: vec![],
        });
        let vars = variants("sap.m.Button");
        let (score, breakdown) = score_document(&button, &vars, "sap.m.button").unwrap();
        assert!((breakdown.metadata - METADATA_EXACT).abs() < f32::EPSILON);
        assert!(score >= TITLE_FULL + METADATA_EXACT);
    }

    #[test]
    fn keyword_tokens_are_capped() {
        let mut control = doc("/openui5-api/x", "/openui5-api", DocKind::ApiReference, "X", "");
        control.metadata = Some(ControlMetadata {
            control_name: "X".into(),
            namespace: "sap.m".into(),
            properties: vec![
                "alpha".into(),
                "beta".into(),
                "gamma".into(),
                "delta".into(),
                "epsilon".into(),
            ],
            events: vec![],
            aggregations: vec![],
            keywords: vec![],
        });
        let vars = vec!["alpha beta gamma delta epsilon".to_string()];
        let (_, breakdown) = score_document(&control, &vars, "alpha").unwrap();
        assert!((breakdown.keywords - KEYWORD_CAP).abs() < f32::EPSILON);
    }

    #[test]
    fn fuzzy_title_match_applies() {
        let wizard = doc("/sapui5/w", "/sapui5", DocKind::Guide, "Wizard Control", "");
        // "wizrd" is one edit away from "wizard".
        let vars = vec!["wizrd".to_string()];
        let (_, breakdown) = score_document(&wizard, &vars, "wizrd").unwrap();
        assert!((breakdown.fuzzy - FUZZY_TITLE).abs() < f32::EPSILON);
    }

    #[test]
    fn context_penalty_hits_unrelated_library() {
        let cap_doc = doc("/cap/entities", "/cap", DocKind::Guide, "Entity Basics", "");
        let ui5_doc = doc("/sapui5/entities", "/sapui5", DocKind::Guide, "Entity Basics", "");
        let vars = variants("cds entity basics");

        let cap_score = score_document(&cap_doc, &vars, "cds entity basics").unwrap().0;
        let ui5_score = score_document(&ui5_doc, &vars, "cds entity basics").unwrap().0;
        assert!(cap_score - ui5_score >= 25.0 - f32::EPSILON);
    }

    #[test]
    fn section_outscores_parent_on_heading_match() {
        let parent = doc("/cap/guide", "/cap", DocKind::Guide, "Custom Handlers", "");
        let mut section = doc(
            "/cap/guide#custom-handlers",
            "/cap",
            DocKind::Section,
            "Custom Handlers",
            "",
        );
        section.section = Some(crate::types::SectionInfo {
            parent_id: "/cap/guide".into(),
            level: 2,
            start_line: 10,
        });
        let vars = variants("Custom Handlers");
        let parent_score = score_document(&parent, &vars, "custom handlers").unwrap().0;
        let section_score = score_document(&section, &vars, "custom handlers").unwrap().0;
        assert!((section_score - parent_score - SECTION_BIAS).abs() < f32::EPSILON);
    }

    #[test]
    fn unmatched_documents_are_dropped() {
        let unrelated = doc("/cap/x", "/cap", DocKind::Guide, "Deployment", "CF and Kyma");
        assert!(score_document(&unrelated, &variants("wizard"), "wizard").is_none());
    }

    fn engine(docs: Vec<Document>) -> SearchEngine {
        let mut by_lib: std::collections::BTreeMap<String, Vec<Document>> = Default::default();
        for d in docs {
            by_lib.entry(d.library.clone()).or_default().push(d);
        }
        let bundles = by_lib
            .into_iter()
            .map(|(id, documents)| LibraryBundle {
                id: id.clone(),
                name: id,
                description: String::new(),
                documents,
            })
            .collect();
        SearchEngine::new(
            Arc::new(Catalog::from_bundles(bundles).unwrap()),
            None,
            Arc::new(Registry::new()),
            Arc::new(AdapterSet::with_adapters(vec![])),
        )
    }

    #[tokio::test]
    async fn search_respects_k_and_orders_scores() {
        let docs = (0..20)
            .map(|i| {
                doc(
                    &format!("/cap/doc-{i:02}"),
                    "/cap",
                    DocKind::Guide,
                    &format!("Entity Guide {i}"),
                    "about entities",
                )
            })
            .collect();
        let engine = engine(docs);
        let response = engine
            .search("entity", Some(5), &SearchFlags::default())
            .await;

        assert_eq!(response.results.len(), 5);
        assert!(response.fallback, "no index configured, must report fallback");
        for pair in response.results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn ties_break_by_prefix_then_id() {
        let docs = vec![
            doc("/cap/b-doc", "/cap", DocKind::Guide, "Entity Basics", ""),
            doc("/cap/a-doc", "/cap", DocKind::Guide, "Entity Basics", ""),
        ];
        let engine = engine(docs);
        let response = engine
            .search("Entity Basics", None, &SearchFlags::default())
            .await;
        // Equal scores and prefixes: lexicographic id order.
        assert_eq!(response.results[0].id, "/cap/a-doc");
        assert_eq!(response.results[1].id, "/cap/b-doc");
    }

    #[tokio::test]
    async fn samples_are_excluded_unless_requested() {
        let docs = vec![
            doc("/openui5-samples/sample/Wizard/a", "/openui5-samples", DocKind::Sample, "Wizard Sample View", ""),
            doc("/sapui5/wizard", "/sapui5", DocKind::Guide, "Wizard", ""),
        ];
        let engine = engine(docs);

        let without = engine.search("wizard", None, &SearchFlags::default()).await;
        assert!(without.results.iter().all(|hit| hit.kind != DocKind::Sample));

        let flags = SearchFlags {
            include_samples: true,
            ..SearchFlags::default()
        };
        let with = engine.search("wizard", None, &flags).await;
        assert!(with.results.iter().any(|hit| hit.kind == DocKind::Sample));
    }

    #[tokio::test]
    async fn sources_filter_restricts_libraries() {
        let docs = vec![
            doc("/cap/entity", "/cap", DocKind::Guide, "Entity", ""),
            doc("/sapui5/entity", "/sapui5", DocKind::Guide, "Entity", ""),
        ];
        let engine = engine(docs);
        let flags = SearchFlags {
            sources: Some(vec!["ui5".to_string()]),
            ..SearchFlags::default()
        };
        let response = engine.search("entity", None, &flags).await;
        assert!(!response.results.is_empty());
        assert!(response.results.iter().all(|hit| hit.library == "/sapui5"));
    }

    #[tokio::test]
    async fn flavor_excludes_the_other_abap_corpus() {
        let docs = vec![
            doc("/abap-docs-758/abenselect", "/abap-docs-758", DocKind::Guide, "SELECT", ""),
            doc("/abap-docs-cloud/abenselect", "/abap-docs-cloud", DocKind::Guide, "SELECT", ""),
        ];
        let engine = engine(docs);
        let flags = SearchFlags {
            flavor: Some(Flavor::Cloud),
            ..SearchFlags::default()
        };
        let response = engine.search("select", None, &flags).await;
        assert!(!response.results.is_empty());
        assert!(
            response
                .results
                .iter()
                .all(|hit| hit.library == "/abap-docs-cloud")
        );
    }

    #[tokio::test]
    async fn empty_query_returns_empty_response() {
        let engine = engine(vec![]);
        let response = engine.search("   ", None, &SearchFlags::default()).await;
        assert!(response.results.is_empty());
    }
}
