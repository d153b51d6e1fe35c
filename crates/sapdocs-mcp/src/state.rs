//! Shared server state: the read-only engine plus transport-owned
//! registries. One instance per process, shared via `Arc`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sapdocs_core::{DocumentFetcher, SearchEngine};

use crate::events::EventStore;
use crate::session::{Session, SessionRegistry};

/// Process-wide state handed to every handler.
pub struct AppState {
    /// Hybrid retrieval engine (catalog + index + adapters).
    pub engine: Arc<SearchEngine>,
    /// Document fetcher sharing the engine's catalog and adapters.
    pub fetcher: Arc<DocumentFetcher>,
    /// Live sessions, owned by the transport.
    pub sessions: Arc<SessionRegistry>,
    /// Per-stream event logs for SSE resumption.
    pub events: Arc<EventStore>,
    /// Server start time, reported by `/status`.
    pub started_at: DateTime<Utc>,
    /// When the index artifacts were last written, reported by `/status`.
    pub index_built_at: Option<DateTime<Utc>>,
}

impl AppState {
    /// Assembles the state from its parts.
    #[must_use]
    pub fn new(engine: Arc<SearchEngine>, fetcher: Arc<DocumentFetcher>) -> Self {
        Self {
            engine,
            fetcher,
            sessions: Arc::new(SessionRegistry::new()),
            events: Arc::new(EventStore::new()),
            started_at: Utc::now(),
            index_built_at: None,
        }
    }

    /// Records the index freshness snapshot shown by `/status`.
    #[must_use]
    pub fn with_index_built_at(mut self, built_at: Option<DateTime<Utc>>) -> Self {
        self.index_built_at = built_at;
        self
    }

    /// Stores a message on one of a session's streams and forwards it to
    /// any connected SSE stream. Returns the event identifier.
    pub fn publish_event(&self, session: &Session, stream_id: &str, message: String) -> u64 {
        let event_id = self.events.store_event(stream_id, message.clone());
        session.forward_event(crate::events::EventLogEntry {
            stream_id: stream_id.to_string(),
            event_id,
            message,
        });
        event_id
    }
}
