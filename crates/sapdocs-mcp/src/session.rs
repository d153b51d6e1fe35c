//! Session lifecycle for the streaming HTTP transport.
//!
//! A session is created by an `initialize` request without a session
//! header and destroyed by DELETE, transport close or the inactivity
//! sweep. Per-session state is owned exclusively by its dispatcher; the
//! registry itself is only mutated on create and destroy.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::{broadcast, watch};
use uuid::Uuid;

use crate::events::EventLogEntry;

/// Sessions idle longer than this are reaped by the sweep task.
pub const MAX_IDLE: Duration = Duration::from_secs(30 * 60);

/// Capacity of the per-session event broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// One client-scoped conversation.
pub struct Session {
    /// Opaque identifier (UUID v4, 122 bits of entropy).
    pub id: String,
    /// Creation instant.
    pub created_at: Instant,
    /// Serializes request dispatch so responses keep arrival order.
    pub dispatch_lock: tokio::sync::Mutex<()>,
    last_activity: Mutex<Instant>,
    cancel_tx: watch::Sender<bool>,
    cancel_rx: watch::Receiver<bool>,
    events_tx: broadcast::Sender<EventLogEntry>,
}

impl Session {
    fn new() -> Self {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let now = Instant::now();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            dispatch_lock: tokio::sync::Mutex::new(()),
            last_activity: Mutex::new(now),
            cancel_tx,
            cancel_rx,
            events_tx,
        }
    }

    /// Subscribes to events pushed on this session's streams.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EventLogEntry> {
        self.events_tx.subscribe()
    }

    /// Forwards a stored event to connected SSE streams. Returns false when
    /// no stream is listening.
    pub fn forward_event(&self, entry: EventLogEntry) -> bool {
        self.events_tx.send(entry).is_ok()
    }

    /// Marks the session as recently used.
    pub fn touch(&self) {
        if let Ok(mut guard) = self.last_activity.lock() {
            *guard = Instant::now();
        }
    }

    /// Time since the last request on this session.
    #[must_use]
    pub fn idle_for(&self) -> Duration {
        self.last_activity
            .lock()
            .map_or(Duration::ZERO, |guard| guard.elapsed())
    }

    /// A receiver that resolves when the session is cancelled. In-flight
    /// requests select on this to abort at their next suspension point.
    #[must_use]
    pub fn cancelled(&self) -> watch::Receiver<bool> {
        self.cancel_rx.clone()
    }

    fn cancel(&self) {
        let _ = self.cancel_tx.send(true);
    }
}

/// Process-wide session registry.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, Arc<Session>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and registers a new session.
    #[must_use]
    pub fn create(&self) -> Arc<Session> {
        let session = Arc::new(Session::new());
        self.sessions.insert(session.id.clone(), Arc::clone(&session));
        session
    }

    /// Live session lookup.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.get(id).map(|entry| Arc::clone(&entry))
    }

    /// Destroys a session, signalling its in-flight requests to abort.
    /// Returns true when the identifier was live.
    pub fn remove(&self, id: &str) -> bool {
        if let Some((_, session)) = self.sessions.remove(id) {
            session.cancel();
            true
        } else {
            false
        }
    }

    /// Reaps sessions idle longer than `max_idle`; returns how many.
    pub fn sweep(&self, max_idle: Duration) -> usize {
        let stale: Vec<String> = self
            .sessions
            .iter()
            .filter(|entry| entry.idle_for() > max_idle)
            .map(|entry| entry.id.clone())
            .collect();
        for id in &stale {
            tracing::info!(session = %id, "sweeping idle session");
            self.remove(id);
        }
        stale.len()
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// True when no sessions are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Cancels and drops every session (shutdown path).
    pub fn close_all(&self) {
        for entry in self.sessions.iter() {
            entry.cancel();
        }
        self.sessions.clear();
    }
}
