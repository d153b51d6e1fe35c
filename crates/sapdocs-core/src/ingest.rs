//! Build-time pipeline: harvest sources, persist the catalog, build the
//! full-text index.
//!
//! The pipeline is idempotent: artifacts from a previous run are replaced
//! wholesale, and the index rebuild spans a single commit.

use std::path::Path;

use tracing::info;

use crate::catalog::Catalog;
use crate::harvest::{Harvester, HarvestStats};
use crate::index::SearchIndex;
use crate::registry::Registry;
use crate::storage::Storage;
use crate::Result;

/// Summary of one build run.
#[derive(Debug, Clone, Copy)]
pub struct BuildSummary {
    /// Harvest counters.
    pub stats: HarvestStats,
    /// Libraries with at least one document.
    pub populated_libraries: usize,
}

/// Harvests every registered source under `sources_root`, writes the
/// catalog artifacts and rebuilds the FTS index.
pub fn build_all(registry: &Registry, sources_root: &Path, storage: &Storage) -> Result<BuildSummary> {
    let harvester = Harvester::new(registry, sources_root);
    let (bundles, stats) = harvester.harvest_all()?;

    let populated_libraries = bundles.iter().filter(|b| !b.documents.is_empty()).count();

    let catalog = Catalog::from_bundles(bundles)?;
    catalog.validate_sections()?;
    catalog.save(storage)?;

    SearchIndex::build(&storage.index_dir(), &catalog)?;

    info!(
        documents = catalog.len(),
        libraries = populated_libraries,
        files = stats.files_seen,
        skipped = stats.skipped,
        "build complete"
    );
    Ok(BuildSummary {
        stats,
        populated_libraries,
    })
}
