//! Sample extractor for demo kit trees.
//!
//! The control name is the first path segment after `sample/`; title and
//! description depend on the file suffix, and the snippet count is a rough
//! tally of syntactic patterns so richer samples rank above stubs.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{ControlMetadata, DocKind, Document};

static FUNCTION_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"function\s*[A-Za-z0-9_$]*\s*\(|=>\s*\{").unwrap()
});

static EVENT_BINDING_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r#"(?:press|select|change|liveChange|submit)\s*=\s*"|on[A-Z][A-Za-z0-9]*\s*:"#)
        .unwrap()
});

static TAG_START_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"<[A-Za-z][A-Za-z0-9:._-]*").unwrap()
});

static BINDING_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r#"=\s*"\{[^}]+\}""#).unwrap()
});

static SCRIPT_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"<script\b").unwrap()
});

/// Extracts a sample document, or `None` when the path carries no
/// `sample/<Control>/` segment or an unknown suffix.
#[must_use]
pub fn extract_sample(library: &str, rel_file: &str, content: &str) -> Option<Document> {
    let control = control_from_path(rel_file)?;
    let file_name = rel_file.rsplit('/').next().unwrap_or(rel_file);

    let (title, description, snippet_count) = if file_name.ends_with(".js") {
        let role = if file_name.contains(".controller.") {
            "Controller"
        } else if file_name.starts_with("Component") {
            "Component"
        } else {
            "Script"
        };
        let snippets =
            FUNCTION_RE.find_iter(content).count() + EVENT_BINDING_RE.find_iter(content).count();
        (
            format!("{control} Sample {role}"),
            format!("{role} logic for the {control} sample"),
            snippets,
        )
    } else if file_name.ends_with(".xml") {
        let snippets =
            TAG_START_RE.find_iter(content).count() + BINDING_RE.find_iter(content).count();
        (
            format!("{control} Sample View"),
            format!("XML view for the {control} sample"),
            snippets,
        )
    } else if file_name.ends_with(".json") {
        let role = if file_name == "manifest.json" { "Manifest" } else { "Model Data" };
        (
            format!("{control} Sample {role}"),
            format!("{role} for the {control} sample"),
            0,
        )
    } else if file_name.ends_with(".html") {
        (
            format!("{control} Sample Page"),
            format!("HTML page hosting the {control} sample"),
            SCRIPT_TAG_RE.find_iter(content).count(),
        )
    } else {
        return None;
    };

    let stem = rel_file
        .trim_end_matches(".js")
        .trim_end_matches(".xml")
        .trim_end_matches(".json")
        .trim_end_matches(".html");

    Some(Document {
        id: format!("{library}/{stem}"),
        library: library.to_string(),
        kind: DocKind::Sample,
        title,
        description,
        rel_file: rel_file.to_string(),
        snippet_count,
        metadata: Some(ControlMetadata {
            control_name: control.to_string(),
            namespace: String::new(),
            keywords: vec!["sample".to_string()],
            ..ControlMetadata::default()
        }),
        section: None,
    })
}

fn control_from_path(rel_file: &str) -> Option<&str> {
    let (_, after) = rel_file.rsplit_once("sample/")?;
    let control = after.split('/').next()?;
    if control.is_empty() || control.contains('.') {
        return None;
    }
    Some(control)
}
