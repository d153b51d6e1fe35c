//! Document fetcher: resolves a result identifier to full display text.
//!
//! Three identifier families are handled: local catalog documents, section
//! identifiers (`parent#slug`) and external identifiers minted by live
//! adapters. A missing identifier produces a short "not found" body; this
//! boundary never returns an error to the caller.

use std::sync::Arc;

use tracing::debug;

use crate::adapters::AdapterSet;
use crate::catalog::Catalog;
use crate::registry::Registry;
use crate::text::slugify;
use crate::types::Document;
use crate::urls;

/// Resolved fetch result: display text plus provenance.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// The identifier as requested.
    pub id: String,
    /// Markdown-oriented display text.
    pub text: String,
    /// Canonical public URL, when one could be resolved.
    pub url: Option<String>,
    /// True when the identifier resolved to real content.
    pub found: bool,
}

/// Fetcher over the catalog and the live adapters.
pub struct DocumentFetcher {
    catalog: Arc<Catalog>,
    registry: Arc<Registry>,
    adapters: Arc<AdapterSet>,
}

impl DocumentFetcher {
    /// Creates a fetcher sharing the process-wide catalog and adapters.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, registry: Arc<Registry>, adapters: Arc<AdapterSet>) -> Self {
        Self {
            catalog,
            registry,
            adapters,
        }
    }

    /// Resolves `id` to display text.
    pub async fn fetch(&self, id: &str) -> FetchedDocument {
        // External identifiers dispatch on the adapter prefix.
        if let Some(adapter) = self.adapters.for_id(id) {
            return match adapter.get_by_id(id).await {
                Ok(Some(text)) => FetchedDocument {
                    id: id.to_string(),
                    text,
                    url: None,
                    found: true,
                },
                Ok(None) => self.not_found(id),
                Err(err) => {
                    debug!(error = %err, "adapter fetch failed");
                    self.not_found(id)
                },
            };
        }

        if id.contains('#') {
            return self.fetch_section(id);
        }
        self.fetch_local(id)
    }

    fn fetch_local(&self, id: &str) -> FetchedDocument {
        let Some(doc) = self.catalog.get(id) else {
            return self.not_found(id);
        };
        let Some(content) = self.read_source(doc) else {
            return self.not_found(id);
        };

        let url = self.resolve_url(doc, &content);
        let text = format!("{}{content}", provenance_header(doc, url.as_deref()));
        FetchedDocument {
            id: id.to_string(),
            text,
            url,
            found: true,
        }
    }

    /// Section fetch: the substring from the section heading through the
    /// line before the next heading of equal or lesser level.
    fn fetch_section(&self, id: &str) -> FetchedDocument {
        let Some((parent_id, slug)) = id.split_once('#') else {
            return self.not_found(id);
        };
        let Some(parent) = self.catalog.get(parent_id) else {
            return self.not_found(id);
        };
        let Some(content) = self.read_source(parent) else {
            return self.not_found(id);
        };

        // Prefer the indexed start line; fall back to a slug scan so ids
        // survive small reorderings of the source file.
        let start_line = self
            .catalog
            .get(id)
            .and_then(|doc| doc.section.as_ref())
            .map(|section| section.start_line)
            .or_else(|| find_heading_by_slug(&content, slug));

        let Some(start_line) = start_line else {
            return self.not_found(id);
        };

        let Some((body, heading)) = slice_section(&content, start_line) else {
            return self.not_found(id);
        };

        let url = self
            .registry
            .url_config(&parent.library, None)
            .and_then(|config| {
                urls::resolve_section_url(&parent.library, &parent.rel_file, &content, &heading, config)
            });

        let text = format!("{}{body}", provenance_header(parent, url.as_deref()));
        FetchedDocument {
            id: id.to_string(),
            text,
            url,
            found: true,
        }
    }

    fn resolve_url(&self, doc: &Document, content: &str) -> Option<String> {
        self.registry
            .url_config(&doc.library, None)
            .and_then(|config| urls::resolve_url(&doc.library, &doc.rel_file, content, config))
    }

    fn read_source(&self, doc: &Document) -> Option<String> {
        let path = self.catalog.source_path(&self.registry, doc)?;
        std::fs::read_to_string(path).ok()
    }

    fn not_found(&self, id: &str) -> FetchedDocument {
        FetchedDocument {
            id: id.to_string(),
            text: format!("No document found for '{id}'. Run a search to discover valid identifiers.\n"),
            url: None,
            found: false,
        }
    }
}

fn provenance_header(doc: &Document, url: Option<&str>) -> String {
    format!(
        "> {} · {}\n> {}\n\n",
        doc.library,
        doc.rel_file,
        url.unwrap_or("URL unavailable")
    )
}

/// Heading line (1-based) whose slug matches, scanned outside code fences.
fn find_heading_by_slug(content: &str, slug: &str) -> Option<usize> {
    let mut in_fence = false;
    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some((level, title)) = split_heading(trimmed) {
            if (2..=4).contains(&level) && slugify(title) == slug {
                return Some(idx + 1);
            }
        }
    }
    None
}

/// The section body starting at `start_line` (the heading itself) through
/// the line before the next heading of equal or lesser level. Also returns
/// the heading text.
fn slice_section(content: &str, start_line: usize) -> Option<(String, String)> {
    let lines: Vec<&str> = content.lines().collect();
    let start = start_line.checked_sub(1)?;
    let (level, heading) = split_heading(lines.get(start)?.trim_start())?;

    let mut out = String::new();
    let mut in_fence = false;
    for (offset, line) in lines[start..].iter().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") {
            in_fence = !in_fence;
        }
        if offset > 0 && !in_fence {
            if let Some((next_level, _)) = split_heading(trimmed) {
                if next_level <= level {
                    break;
                }
            }
        }
        out.push_str(line);
        out.push('\n');
    }
    Some((out, heading.to_string()))
}

fn split_heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let title = line[hashes..].strip_prefix(' ')?;
    #[allow(clippy::cast_possible_truncation)]
    Some((hashes as u8, title.trim()))
}
