//! Source harvester: walks configured source trees and emits uniform
//! document records.
//!
//! Each [`SourceSpec`](crate::registry::SourceSpec) names a directory, an
//! include glob and an extractor kind. Per-file failures are logged and the
//! file is skipped; harvesting never aborts a batch.

mod jsdoc;
mod markdown;
mod sample;

pub use jsdoc::extract_jsdoc;
pub use markdown::{extract_markdown, extract_sections};
pub use sample::extract_sample;

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use tracing::{debug, warn};

use crate::registry::{ExtractorKind, Registry, SourceSpec};
use crate::types::{Document, LibraryBundle};
use crate::{Error, Result};

/// Counters reported after a harvest run.
#[derive(Debug, Default, Clone, Copy)]
pub struct HarvestStats {
    /// Files matched by the include glob.
    pub files_seen: usize,
    /// Documents emitted (sections included).
    pub documents: usize,
    /// Files skipped due to per-file extraction errors.
    pub skipped: usize,
}

/// Walks all registered source trees under `sources_root` and produces one
/// bundle per library.
pub struct Harvester<'a> {
    registry: &'a Registry,
    sources_root: PathBuf,
}

impl<'a> Harvester<'a> {
    /// Creates a harvester rooted at the directory containing the cloned
    /// documentation repositories.
    pub fn new(registry: &'a Registry, sources_root: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            sources_root: sources_root.into(),
        }
    }

    /// Harvests every registered source, returning bundles plus counters.
    ///
    /// A missing source directory is logged and yields an empty bundle so
    /// partial checkouts still build a usable catalog.
    pub fn harvest_all(&self) -> Result<(Vec<LibraryBundle>, HarvestStats)> {
        let mut stats = HarvestStats::default();
        let mut bundles: Vec<LibraryBundle> = Vec::new();

        for spec in self.registry.sources() {
            let documents = match self.harvest_source(spec, &mut stats) {
                Ok(docs) => docs,
                Err(err) => {
                    warn!(library = spec.library, error = %err, "source skipped");
                    Vec::new()
                },
            };
            stats.documents += documents.len();

            // The OpenUI5 tree contributes two libraries from one checkout;
            // merge into an existing bundle when the library repeats.
            if let Some(bundle) = bundles.iter_mut().find(|b| b.id == spec.library) {
                bundle.documents.extend(documents);
            } else {
                bundles.push(LibraryBundle {
                    id: spec.library.to_string(),
                    name: spec.name.to_string(),
                    description: spec.description.to_string(),
                    documents,
                });
            }
        }

        Ok((bundles, stats))
    }

    /// Harvests a single source tree.
    pub fn harvest_source(
        &self,
        spec: &SourceSpec,
        stats: &mut HarvestStats,
    ) -> Result<Vec<Document>> {
        let dir = self.sources_root.join(spec.dir);
        if !dir.is_dir() {
            return Err(Error::NotFound(format!(
                "source directory '{}' does not exist",
                dir.display()
            )));
        }

        let include = build_globset(spec.include)?;
        let exclude = spec.exclude.map(build_globset).transpose()?;

        let mut documents = Vec::new();
        let walker = WalkBuilder::new(&dir)
            .standard_filters(false)
            .hidden(true)
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "walk error");
                    continue;
                },
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(&dir) else {
                continue;
            };
            if !include.is_match(rel) {
                continue;
            }
            if exclude.as_ref().is_some_and(|set| set.is_match(rel)) {
                continue;
            }

            stats.files_seen += 1;
            match harvest_file(spec, entry.path(), rel) {
                Ok(mut docs) => documents.append(&mut docs),
                Err(err) => {
                    stats.skipped += 1;
                    warn!(file = %rel.display(), error = %err, "file skipped");
                },
            }
        }

        debug!(
            library = spec.library,
            documents = documents.len(),
            "source harvested"
        );
        Ok(documents)
    }
}

fn build_globset(pattern: &str) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    let glob = Glob::new(pattern)
        .map_err(|e| Error::Config(format!("invalid glob '{pattern}': {e}")))?;
    builder.add(glob);
    builder
        .build()
        .map_err(|e| Error::Config(format!("invalid glob set: {e}")))
}

/// Extracts all documents from one file according to the source's extractor.
fn harvest_file(spec: &SourceSpec, path: &Path, rel: &Path) -> Result<Vec<Document>> {
    let content = std::fs::read_to_string(path)?;
    let rel_str = rel.to_string_lossy().replace('\\', "/");
    match spec.extractor {
        ExtractorKind::Markdown => {
            let Some(parent) = extract_markdown(spec.library, &rel_str, &content) else {
                return Ok(Vec::new());
            };
            let mut docs = extract_sections(&parent, &content);
            docs.insert(0, parent);
            Ok(docs)
        },
        ExtractorKind::Jsdoc => Ok(extract_jsdoc(spec.library, &rel_str, &content)
            .into_iter()
            .collect()),
        ExtractorKind::Sample => Ok(extract_sample(spec.library, &rel_str, &content)
            .into_iter()
            .collect()),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn harvest_walks_includes_and_skips_excludes() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "cap/guides/providing-services.md",
            "# Providing Services\n\nHow to expose CDS services.\n",
        );
        write(tmp.path(), "cap/.github/PULL_REQUEST.md", "# Not docs\n\nCI noise.\n");

        let registry = Registry::new();
        let harvester = Harvester::new(&registry, tmp.path());
        let spec = registry
            .sources()
            .iter()
            .find(|s| s.library == "/cap")
            .unwrap();

        let mut stats = HarvestStats::default();
        let docs = harvester.harvest_source(spec, &mut stats).unwrap();
        assert_eq!(stats.files_seen, 1);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "/cap/guides/providing-services");
        assert_eq!(docs[0].title, "Providing Services");
    }

    #[test]
    fn missing_directory_is_reported_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let registry = Registry::new();
        let harvester = Harvester::new(&registry, tmp.path());
        // harvest_all tolerates every directory missing.
        let (bundles, stats) = harvester.harvest_all().unwrap();
        assert_eq!(stats.documents, 0);
        assert!(bundles.iter().all(|b| b.documents.is_empty()));
    }

    #[test]
    fn unreadable_file_is_skipped_and_counted() {
        let tmp = TempDir::new().unwrap();
        // Invalid UTF-8 forces a read error inside harvest_file.
        let path = tmp.path().join("cap/broken.md");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        write(tmp.path(), "cap/ok.md", "# Ok\n\nFine.\n");

        let registry = Registry::new();
        let harvester = Harvester::new(&registry, tmp.path());
        let spec = registry
            .sources()
            .iter()
            .find(|s| s.library == "/cap")
            .unwrap();

        let mut stats = HarvestStats::default();
        let docs = harvester.harvest_source(spec, &mut stats).unwrap();
        assert_eq!(stats.skipped, 1);
        assert_eq!(docs.len(), 1);
    }
}
