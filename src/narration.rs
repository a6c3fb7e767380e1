//! Narration capability contract
//!
//! The narration capability accepts text plus voice/rate/volume, emits an
//! ordered stream of word-boundary events, and supports best-effort
//! cancellation. It has **no** native pause, resume, or mid-stream seek;
//! the playback engine papers over that by restarting on text suffixes
//! (resynthesis).
//!
//! Every submission is bound to an [`EventSink`] carrying the playback
//! generation fixed at submit time. Events from a superseded submission
//! arrive tagged with a stale generation and are discarded by the engine,
//! which makes restart-based seeking race-free without any blocking
//! cancellation handshake.

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::Result;

/// Opaque handle for one in-flight narration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NarrationHandle(Uuid);

impl NarrationHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NarrationHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NarrationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One narration submission: the text plus opaque delivery parameters
#[derive(Debug, Clone)]
pub struct NarrationRequest {
    pub text: String,
    pub voice: String,
    /// Speech rate multiplier, 0.5–2.0
    pub rate: f64,
    /// Volume, 0–100
    pub volume: u8,
}

/// Events emitted by a narrator for one submission
///
/// Per handle: zero or more `WordBoundary`, then exactly one of `Completed`,
/// `Canceled`, or `Failed`. Offsets are 0-based code-point positions into the
/// text as submitted; within one submission they arrive in non-decreasing
/// order.
#[derive(Debug, Clone)]
pub enum NarrationEvent {
    WordBoundary { offset: usize, length: usize },
    Completed,
    Canceled,
    Failed { detail: String },
}

/// A narration event tagged with its playback generation
#[derive(Debug, Clone)]
pub struct TaggedNarrationEvent {
    pub generation: u64,
    pub event: NarrationEvent,
}

/// Generation-tagged sender handed to a narrator at submit time
///
/// The sink owns the generation; the narrator never sees or manipulates
/// generation numbers itself. Sends are lossy once the engine is gone.
#[derive(Debug, Clone)]
pub struct EventSink {
    generation: u64,
    tx: mpsc::UnboundedSender<TaggedNarrationEvent>,
}

impl EventSink {
    pub fn new(generation: u64, tx: mpsc::UnboundedSender<TaggedNarrationEvent>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn word_boundary(&self, offset: usize, length: usize) {
        self.send(NarrationEvent::WordBoundary { offset, length });
    }

    pub fn completed(&self) {
        self.send(NarrationEvent::Completed);
    }

    pub fn canceled(&self) {
        self.send(NarrationEvent::Canceled);
    }

    pub fn failed(&self, detail: impl Into<String>) {
        self.send(NarrationEvent::Failed {
            detail: detail.into(),
        });
    }

    fn send(&self, event: NarrationEvent) {
        // Receiver dropped means the engine shut down; nothing to do.
        let _ = self.tx.send(TaggedNarrationEvent {
            generation: self.generation,
            event,
        });
    }
}

/// Narration capability
///
/// `submit` must not block on synthesis: implementations run their work off
/// the caller's task and deliver events through the sink. `cancel` is
/// best-effort and non-blocking; a cancellation may race with a natural
/// completion, and the engine tolerates either outcome.
pub trait Narrator: Send + Sync {
    /// Whether the capability is usable (credentials present, device ready)
    fn is_configured(&self) -> bool;

    /// Start synthesizing `request`, delivering events through `sink`
    fn submit(&self, request: NarrationRequest, sink: EventSink) -> Result<NarrationHandle>;

    /// Request cancellation of an in-flight narration
    fn cancel(&self, handle: NarrationHandle);
}
