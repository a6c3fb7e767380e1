//! Event system for the lector engine
//!
//! Hybrid communication model:
//! - **EventBus** (tokio::broadcast): one-to-many notifications for UI layers
//! - **Narration channel** (tokio::mpsc): generation-tagged events from the
//!   narration capability into the playback engine (see [`crate::narration`])
//! - **Shared state** (Arc<RwLock<T>>): read-heavy session access
//!
//! Bus events are serializable so an outer surface can forward them verbatim.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use crate::playback::PlaybackState;

/// Events published by the playback engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LectorEvent {
    /// Playback state changed
    PlaybackStateChanged {
        old_state: PlaybackState,
        new_state: PlaybackState,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The narrator reached a word; highlighting has been updated
    WordReached {
        word_id: usize,
        sentence_id: usize,
        /// Playback generation the event belongs to
        generation: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Narration ran to the end of the submitted text
    PlaybackFinished {
        generation: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Narration failed; the session has ended
    PlaybackError {
        detail: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// All highlights were cleared
    HighlightsCleared {
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl LectorEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            LectorEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            LectorEvent::WordReached { .. } => "WordReached",
            LectorEvent::PlaybackFinished { .. } => "PlaybackFinished",
            LectorEvent::PlaybackError { .. } => "PlaybackError",
            LectorEvent::HighlightsCleared { .. } => "HighlightsCleared",
        }
    }
}

/// Broadcast bus for [`LectorEvent`]
///
/// Thin wrapper over `tokio::sync::broadcast`: non-blocking publish, multiple
/// concurrent subscribers, automatic cleanup when subscribers drop. Slow
/// subscribers lag instead of blocking the engine.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<LectorEvent>,
    capacity: usize,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<LectorEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if nobody is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: LectorEvent,
    ) -> std::result::Result<usize, broadcast::error::SendError<LectorEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring whether anyone is listening
    pub fn emit_lossy(&self, event: LectorEvent) {
        if self.tx.send(event).is_err() {
            trace!("no subscribers for event, dropping");
        }
    }

    /// Channel capacity this bus was created with
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of currently attached subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
