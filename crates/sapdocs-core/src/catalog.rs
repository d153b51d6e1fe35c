//! The document catalog: every indexed unit, addressable by identifier.
//!
//! The catalog is written at build time as `index.json` (keyed by library
//! identifier) plus per-library mirrors, then loaded read-only at startup.
//! Sections reference their parent by identifier, not by pointer; the
//! catalog is a tree serialized as a flat list.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::registry::Registry;
use crate::storage::Storage;
use crate::types::{DocKind, Document, LibraryBundle};
use crate::{Error, Result};

/// Serialized shape of `index.json`: bundles keyed by library identifier.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogFile {
    libraries: HashMap<String, LibraryBundle>,
}

/// In-memory catalog with an id lookup table.
pub struct Catalog {
    bundles: Vec<LibraryBundle>,
    by_id: HashMap<String, (usize, usize)>,
    sources_root: Option<PathBuf>,
}

impl Catalog {
    /// Builds a catalog from harvested bundles.
    ///
    /// Duplicate identifiers are rejected: uniqueness across the whole
    /// catalog is a structural invariant.
    pub fn from_bundles(bundles: Vec<LibraryBundle>) -> Result<Self> {
        let mut by_id = HashMap::new();
        for (bundle_idx, bundle) in bundles.iter().enumerate() {
            for (doc_idx, doc) in bundle.documents.iter().enumerate() {
                if !doc.id_matches_library() {
                    return Err(Error::Parse(format!(
                        "document '{}' does not carry its library prefix '{}'",
                        doc.id, doc.library
                    )));
                }
                if by_id.insert(doc.id.clone(), (bundle_idx, doc_idx)).is_some() {
                    return Err(Error::Parse(format!("duplicate document id '{}'", doc.id)));
                }
            }
        }
        Ok(Self {
            bundles,
            by_id,
            sources_root: None,
        })
    }

    /// Loads the catalog from `index.json` in the given storage.
    ///
    /// An unreadable catalog is the one fatal startup error of the system.
    pub fn load(storage: &Storage) -> Result<Self> {
        let path = storage.catalog_path();
        let raw = fs::read_to_string(&path).map_err(|e| {
            Error::Storage(format!("Failed to read catalog {}: {e}", path.display()))
        })?;
        let file: CatalogFile = serde_json::from_str(&raw)
            .map_err(|e| Error::Storage(format!("Malformed catalog: {e}")))?;

        let mut bundles: Vec<LibraryBundle> = file.libraries.into_values().collect();
        bundles.sort_by(|a, b| a.id.cmp(&b.id));
        let catalog = Self::from_bundles(bundles)?;
        info!(
            libraries = catalog.bundles.len(),
            documents = catalog.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Attaches the sources root used to read document bodies at fetch time.
    #[must_use]
    pub fn with_sources_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.sources_root = Some(root.into());
        self
    }

    /// Persists `index.json` and the per-library mirrors.
    pub fn save(&self, storage: &Storage) -> Result<()> {
        let mut libraries = HashMap::new();
        for bundle in &self.bundles {
            libraries.insert(bundle.id.clone(), bundle.clone());
        }
        let file = CatalogFile { libraries };
        let json = serde_json::to_string_pretty(&file)?;
        fs::write(storage.catalog_path(), &json)
            .map_err(|e| Error::Storage(format!("Failed to write catalog: {e}")))?;

        for bundle in &self.bundles {
            let mirror = serde_json::to_string_pretty(bundle)?;
            fs::write(storage.library_mirror_path(&bundle.id), mirror)
                .map_err(|e| Error::Storage(format!("Failed to write mirror: {e}")))?;
        }
        debug!(path = %storage.catalog_path().display(), "catalog persisted");
        Ok(())
    }

    /// All bundles, sorted by identifier.
    #[must_use]
    pub fn bundles(&self) -> &[LibraryBundle] {
        &self.bundles
    }

    /// Total number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// True when the catalog holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Document lookup by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Document> {
        self.by_id
            .get(id)
            .map(|&(bundle, doc)| &self.bundles[bundle].documents[doc])
    }

    /// Parent document of a section, when the id encodes one (`parent#slug`).
    #[must_use]
    pub fn parent_of(&self, id: &str) -> Option<&Document> {
        let parent_id = id.split_once('#').map(|(parent, _)| parent)?;
        self.get(parent_id)
    }

    /// Iterates every document in the catalog.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.bundles.iter().flat_map(|bundle| bundle.documents.iter())
    }

    /// Absolute path of a document's source file, when a sources root is
    /// set. The registry maps the library back to its checkout directory;
    /// unknown libraries fall back to the bare library name.
    #[must_use]
    pub fn source_path(&self, registry: &Registry, doc: &Document) -> Option<PathBuf> {
        let root = self.sources_root.as_ref()?;
        let dir = registry
            .source_dir(&doc.library)
            .map_or_else(|| doc.library.trim_start_matches('/').to_string(), str::to_string);
        Some(root.join(dir).join(&doc.rel_file))
    }

    /// Validates the section invariants over the whole catalog: every
    /// section's parent exists, is a guide or API reference, and the parent
    /// identifier prefixes the section identifier up to `#`.
    pub fn validate_sections(&self) -> Result<()> {
        for doc in self.iter() {
            let Some(section) = &doc.section else { continue };
            let parent = self.get(&section.parent_id).ok_or_else(|| {
                Error::Parse(format!(
                    "section '{}' references missing parent '{}'",
                    doc.id, section.parent_id
                ))
            })?;
            if !matches!(parent.kind, DocKind::Guide | DocKind::ApiReference) {
                return Err(Error::Parse(format!(
                    "section '{}' has parent of kind {}",
                    doc.id,
                    parent.kind.as_str()
                )));
            }
            if doc.id.split_once('#').map(|(prefix, _)| prefix) != Some(section.parent_id.as_str()) {
                return Err(Error::Parse(format!(
                    "section id '{}' does not start with parent id '{}'",
                    doc.id, section.parent_id
                )));
            }
        }
        Ok(())
    }
}
