//! Per-stream event log backing SSE resumption.
//!
//! Each stream keeps a bounded ring of the most recent messages with
//! strictly increasing event identifiers. A client reconnecting with
//! `Last-Event-Id` replays everything newer in original order; an unknown
//! identifier yields a fresh stream.

use std::collections::VecDeque;

use dashmap::DashMap;
use uuid::Uuid;

/// Default per-stream retention.
pub const DEFAULT_RETENTION: usize = 100;

/// One stored event.
#[derive(Debug, Clone)]
pub struct EventLogEntry {
    /// Owning stream.
    pub stream_id: String,
    /// Monotonically increasing identifier within the stream.
    pub event_id: u64,
    /// Serialized message payload.
    pub message: String,
}

impl EventLogEntry {
    /// Composite identifier sent on the wire (`<stream>_<n>`).
    #[must_use]
    pub fn wire_id(&self) -> String {
        format!("{}_{}", self.stream_id, self.event_id)
    }
}

struct StreamLog {
    next_id: u64,
    entries: VecDeque<EventLogEntry>,
}

/// In-memory bounded event store, one log per stream.
pub struct EventStore {
    streams: DashMap<String, StreamLog>,
    retention: usize,
}

impl EventStore {
    /// Creates a store with the default retention.
    #[must_use]
    pub fn new() -> Self {
        Self::with_retention(DEFAULT_RETENTION)
    }

    /// Creates a store keeping the most recent `retention` events per stream.
    #[must_use]
    pub fn with_retention(retention: usize) -> Self {
        Self {
            streams: DashMap::new(),
            retention: retention.max(1),
        }
    }

    /// Registers a fresh stream and returns its identifier.
    #[must_use]
    pub fn create_stream(&self) -> String {
        let stream_id = Uuid::new_v4().simple().to_string();
        self.streams.insert(
            stream_id.clone(),
            StreamLog {
                next_id: 1,
                entries: VecDeque::new(),
            },
        );
        stream_id
    }

    /// Appends a message to a stream's log, returning its event identifier.
    ///
    /// Identifiers are strictly increasing per stream; the bounded tail
    /// evicts the oldest entry once retention is exceeded. Storing into an
    /// unknown stream creates it.
    pub fn store_event(&self, stream_id: &str, message: String) -> u64 {
        let mut log = self
            .streams
            .entry(stream_id.to_string())
            .or_insert_with(|| StreamLog {
                next_id: 1,
                entries: VecDeque::new(),
            });
        let event_id = log.next_id;
        log.next_id += 1;
        log.entries.push_back(EventLogEntry {
            stream_id: stream_id.to_string(),
            event_id,
            message,
        });
        while log.entries.len() > self.retention {
            log.entries.pop_front();
        }
        event_id
    }

    /// Replays every entry newer than `last_event_id` (a wire identifier)
    /// into `send`, in original order, and returns the stream to continue
    /// on. An unparsable or unknown identifier returns a fresh stream and
    /// replays nothing.
    pub fn replay_after(&self, last_event_id: &str, mut send: impl FnMut(&EventLogEntry)) -> String {
        let Some((stream_id, event_id)) = parse_wire_id(last_event_id) else {
            return self.create_stream();
        };
        let Some(log) = self.streams.get(&stream_id) else {
            return self.create_stream();
        };
        for entry in &log.entries {
            if entry.event_id > event_id {
                send(entry);
            }
        }
        stream_id
    }

    /// Drops a stream and its log.
    pub fn remove_stream(&self, stream_id: &str) {
        self.streams.remove(stream_id);
    }

    /// Number of live streams.
    #[must_use]
    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_wire_id(wire_id: &str) -> Option<(String, u64)> {
    let (stream, id) = wire_id.rsplit_once('_')?;
    let id = id.parse::<u64>().ok()?;
    if stream.is_empty() {
        return None;
    }
    Some((stream.to_string(), id))
}
