//! Query expansion: a bounded, ordered list of query variants.
//!
//! The original (trimmed) query is always the first variant; the rules
//! below add paraphrases, deduplicated case-insensitively, in a stable
//! order. Expansion is pure, so repeated invocations agree, and expanding
//! the first variant again reproduces the full list.

use once_cell::sync::Lazy;
use regex::Regex;

/// Upper bound on emitted variants, original included.
pub const MAX_VARIANTS: usize = 8;

/// Token-level synonym table, applied in both directions.
static SYNONYMS: &[(&str, &str)] = &[
    ("wizard", "multi-step process"),
    ("odata", "data protocol"),
    ("auth", "authentication"),
    ("authz", "authorization"),
    ("i18n", "internationalization"),
    ("fe", "fiori elements"),
    ("cds", "core data services"),
    ("mta", "multitarget application"),
    ("ws", "websocket"),
    ("fragment", "xml fragment"),
    ("facet", "header facet"),
    ("lrp", "list report page"),
    ("op", "object page"),
    ("rap", "restful application programming"),
    ("bas", "business application studio"),
    ("cf", "cloud foundry"),
    ("vh", "value help"),
];

/// Domain alias table: whole-phrase rewrites.
static ALIASES: &[(&str, &str)] = &[
    ("cds entity", "entity definition"),
    ("fiori list report", "list report floorplan"),
    ("unit test", "qunit test"),
    ("e2e test", "end-to-end test"),
    ("value help", "value help dialog"),
    ("smart table", "responsive table"),
    ("message box", "message handling"),
    ("side effect", "side effects annotation"),
    ("draft", "draft handling"),
];

static DOTTED_CONTROL_RE: Lazy<Regex> = Lazy::new(|| {
    // UI5-style identifier: lowercase namespace segments, capitalized leaf.
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^[a-z][a-z0-9]*(?:\.[a-z][a-z0-9]*)*\.([A-Z][A-Za-z0-9]*)$").unwrap()
});

static CAMEL_BOUNDARY_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"([a-z0-9])([A-Z])").unwrap()
});

/// Expands a user query into ranked variants.
///
/// Rule order: raw trimmed query, synonym substitutions, namespace
/// heuristics, compound splits, domain aliases. Duplicates (after case
/// folding) are removed, keeping first occurrence.
#[must_use]
pub fn expand(query: &str) -> Vec<String> {
    let original = query.trim().to_string();
    if original.is_empty() {
        return vec![original];
    }

    let mut variants = vec![original.clone()];

    // 2. Token-level synonym substitutions.
    for (a, b) in SYNONYMS {
        push_substitution(&mut variants, &original, a, b);
        push_substitution(&mut variants, &original, b, a);
    }

    // 3. Namespace heuristics for dotted control identifiers.
    if let Some(caps) = DOTTED_CONTROL_RE.captures(&original) {
        if let (Some(short), Some((namespace, _))) = (caps.get(1), original.rsplit_once('.')) {
            variants.push(short.as_str().to_string());
            variants.push(namespace.to_string());
        }
    }

    // 4. Compound splits: camelCase and dotted tokens.
    let camel_split = CAMEL_BOUNDARY_RE.replace_all(&original, "$1 $2");
    if camel_split != original {
        variants.push(camel_split.into_owned());
    }
    if original.contains('.') && !DOTTED_CONTROL_RE.is_match(&original) {
        let dotted_split = original.replace('.', " ");
        let collapsed: String = dotted_split.split_whitespace().collect::<Vec<_>>().join(" ");
        variants.push(collapsed);
    }

    // 5. Domain aliases.
    let lower = original.to_lowercase();
    for (alias, replacement) in ALIASES {
        if lower.contains(alias) {
            variants.push(lower.replace(alias, replacement));
        }
    }

    dedup_case_folded(variants)
}

fn push_substitution(variants: &mut Vec<String>, original: &str, from: &str, to: &str) {
    let lower = original.to_lowercase();
    let tokens: Vec<&str> = lower.split_whitespace().collect();
    if tokens.iter().any(|token| *token == from) {
        let substituted: Vec<&str> = tokens
            .iter()
            .map(|token| if *token == from { to } else { *token })
            .collect();
        variants.push(substituted.join(" "));
    }
}

fn dedup_case_folded(variants: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for variant in variants {
        let trimmed = variant.trim().to_string();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_lowercase()) {
            out.push(trimmed);
        }
        if out.len() == MAX_VARIANTS {
            break;
        }
    }
    out
}
