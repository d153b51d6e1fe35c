//! Live source adapters: query external services and normalize results.
//!
//! Every adapter implements the same capability: a query returns normalized
//! [`LiveHit`]s, and identifiers minted by the adapter resolve back to full
//! text. Adapters degrade to empty results on timeout or upstream failure;
//! they never fail the surrounding search request.

mod articles;
mod cache;
mod community;
mod feature_matrix;
mod help_portal;
mod sanitize;

pub use articles::ArticlesAdapter;
pub use cache::ResponseCache;
pub use community::CommunityAdapter;
pub use feature_matrix::FeatureMatrixAdapter;
pub use help_portal::HelpPortalAdapter;
pub use sanitize::{extract_links, looks_like_bot_challenge, strip_html};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::Result;
use crate::types::LiveHit;

/// Deadline applied to each adapter call.
pub const ADAPTER_DEADLINE: Duration = Duration::from_secs(10);

/// Uniform capability implemented by every live source.
#[async_trait]
pub trait LiveAdapter: Send + Sync {
    /// Stable adapter label, also the provenance tag on hits.
    fn name(&self) -> &'static str;

    /// Identifier prefix for ids minted by this adapter.
    fn id_prefix(&self) -> &'static str;

    /// Cache lifetime for responses of this adapter.
    fn ttl(&self) -> Duration;

    /// Runs a search against the external service.
    async fn search(&self, query: &str) -> Result<Vec<LiveHit>>;

    /// Resolves an adapter-minted identifier to display text.
    async fn get_by_id(&self, id: &str) -> Result<Option<String>>;
}

/// The set of configured adapters plus the shared response cache.
pub struct AdapterSet {
    adapters: Vec<Arc<dyn LiveAdapter>>,
    cache: Arc<ResponseCache>,
    deadline: Duration,
}

impl AdapterSet {
    /// Creates the default adapter set (community, help portal, articles,
    /// ABAP feature matrix) with a shared cache.
    pub fn new() -> Result<Self> {
        let client = http_client()?;
        let adapters: Vec<Arc<dyn LiveAdapter>> = vec![
            Arc::new(CommunityAdapter::new(client.clone())),
            Arc::new(HelpPortalAdapter::new(client.clone())),
            Arc::new(ArticlesAdapter::new(client.clone())),
            Arc::new(FeatureMatrixAdapter::new(client)),
        ];
        Ok(Self {
            adapters,
            cache: Arc::new(ResponseCache::new()),
            deadline: ADAPTER_DEADLINE,
        })
    }

    /// Creates a set from explicit adapters, for tests.
    #[must_use]
    pub fn with_adapters(adapters: Vec<Arc<dyn LiveAdapter>>) -> Self {
        Self {
            adapters,
            cache: Arc::new(ResponseCache::new()),
            deadline: ADAPTER_DEADLINE,
        }
    }

    /// Overrides the per-adapter deadline, for tests.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Adapter lookup by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<Arc<dyn LiveAdapter>> {
        self.adapters
            .iter()
            .find(|adapter| adapter.name() == name)
            .cloned()
    }

    /// Adapter owning an external identifier, by prefix.
    #[must_use]
    pub fn for_id(&self, id: &str) -> Option<Arc<dyn LiveAdapter>> {
        self.adapters
            .iter()
            .find(|adapter| id.starts_with(adapter.id_prefix()))
            .cloned()
    }

    /// Fans a query out to every adapter in parallel.
    ///
    /// Each call is bounded by the configured deadline; a timeout or error
    /// contributes an empty list plus a warning instead of failing the
    /// request. Returns one ranked list per responsive adapter, for fusion.
    pub async fn search_all(&self, query: &str) -> (Vec<Vec<LiveHit>>, Vec<String>) {
        let mut handles = Vec::with_capacity(self.adapters.len());
        for adapter in &self.adapters {
            handles.push(self.spawn_search(Arc::clone(adapter), query.to_string()));
        }

        let mut lists = Vec::new();
        let mut warnings = Vec::new();
        for (adapter, handle) in self.adapters.iter().zip(handles) {
            match handle.await {
                Ok(Ok(hits)) if !hits.is_empty() => lists.push(hits),
                Ok(Ok(_)) => {},
                Ok(Err(warning)) => warnings.push(warning),
                Err(join_err) => {
                    warn!(adapter = adapter.name(), error = %join_err, "adapter task failed");
                    warnings.push(format!("{}: adapter task failed", adapter.name()));
                },
            }
        }
        (lists, warnings)
    }

    /// Runs a single named adapter with the same caching and deadline
    /// behavior as the fan-out.
    pub async fn search_one(&self, name: &str, query: &str) -> (Vec<LiveHit>, Vec<String>) {
        let Some(adapter) = self.by_name(name) else {
            return (Vec::new(), vec![format!("unknown adapter '{name}'")]);
        };
        match self.spawn_search(adapter, query.to_string()).await {
            Ok(Ok(hits)) => (hits, Vec::new()),
            Ok(Err(warning)) => (Vec::new(), vec![warning]),
            Err(_) => (Vec::new(), vec![format!("{name}: adapter task failed")]),
        }
    }

    fn spawn_search(
        &self,
        adapter: Arc<dyn LiveAdapter>,
        query: String,
    ) -> tokio::task::JoinHandle<std::result::Result<Vec<LiveHit>, String>> {
        let cache = Arc::clone(&self.cache);
        let deadline = self.deadline;
        tokio::spawn(async move {
            let key = format!("{}?q={query}", adapter.name());
            if let Some(hits) = cache.get(&key) {
                return Ok(hits);
            }

            match tokio::time::timeout(deadline, adapter.search(&query)).await {
                Ok(Ok(hits)) => {
                    cache.put(key, hits.clone(), adapter.ttl());
                    Ok(hits)
                },
                Ok(Err(err)) => {
                    warn!(adapter = adapter.name(), error = %err, "adapter search failed");
                    Err(format!("{}: upstream unavailable", adapter.name()))
                },
                Err(_) => {
                    warn!(adapter = adapter.name(), "adapter search timed out");
                    Err(format!("{}: timed out", adapter.name()))
                },
            }
        })
    }

    /// Shared response cache, exposed for diagnostics.
    #[must_use]
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }
}

pub(crate) fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(ADAPTER_DEADLINE)
        .user_agent(concat!("sapdocs-mcp/", env!("CARGO_PKG_VERSION")))
        .gzip(true)
        .build()
        .map_err(crate::Error::Network)
}
