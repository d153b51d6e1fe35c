//! Data-directory layout for build artifacts.
//!
//! A single writable directory holds everything the runtime reads:
//! `index.json` (the full catalog), per-library `data_<libid>.json` mirrors
//! and the `fts/` index directory. Nothing else is persisted at runtime.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Environment override for the data directory, used by tests and deploys.
pub const DATA_DIR_ENV: &str = "SAPDOCS_DATA_DIR";

/// Filesystem layout of the persisted artifacts.
pub struct Storage {
    root_dir: PathBuf,
}

impl Storage {
    /// Creates a storage rooted at `SAPDOCS_DATA_DIR`, falling back to
    /// `./data` relative to the working directory.
    pub fn new() -> Result<Self> {
        let root = std::env::var(DATA_DIR_ENV)
            .map_or_else(|_| PathBuf::from("data"), PathBuf::from);
        Self::with_root(root)
    }

    /// Creates a storage rooted at an explicit directory.
    pub fn with_root(root_dir: impl Into<PathBuf>) -> Result<Self> {
        let root_dir = root_dir.into();
        fs::create_dir_all(&root_dir)
            .map_err(|e| Error::Storage(format!("Failed to create data directory: {e}")))?;
        Ok(Self { root_dir })
    }

    /// Root data directory.
    #[must_use]
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Path of the catalog file (`index.json`).
    #[must_use]
    pub fn catalog_path(&self) -> PathBuf {
        self.root_dir.join("index.json")
    }

    /// Path of the per-library mirror (`data_<libid>.json`).
    ///
    /// The leading slash of the library identifier is dropped and the rest
    /// sanitized so the filename never escapes the data directory.
    #[must_use]
    pub fn library_mirror_path(&self, library: &str) -> PathBuf {
        let stem: String = library
            .trim_start_matches('/')
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root_dir.join(format!("data_{stem}.json"))
    }

    /// Directory of the tantivy FTS index.
    #[must_use]
    pub fn index_dir(&self) -> PathBuf {
        self.root_dir.join("fts")
    }

    /// Last-modified timestamp of the catalog file, for `/status`.
    #[must_use]
    pub fn catalog_modified(&self) -> Option<std::time::SystemTime> {
        fs::metadata(self.catalog_path())
            .and_then(|meta| meta.modified())
            .ok()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn mirror_filenames_are_sanitized() {
        let tmp = TempDir::new().unwrap();
        let storage = Storage::with_root(tmp.path()).unwrap();
        let path = storage.library_mirror_path("/abap-docs-758");
        assert!(path.ends_with("data_abap-docs-758.json"));

        let hostile = storage.library_mirror_path("/../etc/passwd");
        let name = hostile.file_name().unwrap().to_string_lossy().into_owned();
        assert!(!name.contains(".."));
        assert!(name.starts_with("data_"));
        assert_eq!(hostile.parent().unwrap(), tmp.path());
    }

    #[test]
    fn layout_is_under_root() {
        let tmp = TempDir::new().unwrap();
        let storage = Storage::with_root(tmp.path()).unwrap();
        assert!(storage.catalog_path().starts_with(tmp.path()));
        assert!(storage.index_dir().starts_with(tmp.path()));
    }
}
