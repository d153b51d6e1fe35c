//! In-process TTL cache for adapter responses.
//!
//! Keys are the full request parameter set; values expire after the
//! adapter's TTL and expired entries are never returned. Readers and
//! writers interleave freely.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::types::LiveHit;

/// Concurrent response cache shared by all adapters of a process.
#[derive(Default)]
pub struct ResponseCache {
    entries: DashMap<String, CachedEntry>,
}

struct CachedEntry {
    hits: Vec<LiveHit>,
    expires_at: Instant,
}

impl ResponseCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached hits for `key`, unless expired.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Vec<LiveHit>> {
        let entry = self.entries.get(key)?;
        if entry.expires_at <= Instant::now() {
            drop(entry);
            self.entries.remove(key);
            return None;
        }
        Some(entry.hits.clone())
    }

    /// Stores hits under `key` for `ttl`.
    pub fn put(&self, key: String, hits: Vec<LiveHit>, ttl: Duration) {
        self.entries.insert(
            key,
            CachedEntry {
                hits,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Drops every expired entry; called opportunistically by the owner.
    pub fn evict_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }

    /// Number of live entries (tests and `/status`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
