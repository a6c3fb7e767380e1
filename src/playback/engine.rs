//! Playback engine orchestration
//!
//! Single owner of the active playback session. All control operations
//! (play/pause/stop/seek) and all inbound narration events funnel through
//! this state machine; the narration capability runs its work off-task and
//! delivers events through a generation-tagged mpsc channel.
//!
//! The narration capability cannot pause, resume, or seek natively, so every
//! pause/resume/seek is re-architected as "cancel, then restart narration on
//! a document suffix with a recomputed base offset" (resynthesis). The
//! generation counter is the sole cancellation mechanism: events from a
//! superseded submission carry a stale generation and are inert.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex, RwLock};
use tracing::{debug, info, trace, warn};

use crate::display::DisplaySurface;
use crate::error::{Error, Result};
use crate::events::{EventBus, LectorEvent};
use crate::index::{SpanIndex, UnitKind};
use crate::narration::{
    EventSink, NarrationEvent, NarrationHandle, NarrationRequest, Narrator, TaggedNarrationEvent,
};
use crate::playback::projector::HighlightProjector;
use crate::playback::session::PlaybackSession;
use crate::playback::state::PlaybackState;

/// Opaque narration delivery parameters, injected at `play()` time
#[derive(Debug, Clone)]
pub struct NarrationOptions {
    pub voice: String,
    /// Speech rate multiplier; clamped to 0.5–2.0 when submitted
    pub rate: f64,
    /// Volume 0–100; clamped when submitted
    pub volume: u8,
}

impl Default for NarrationOptions {
    fn default() -> Self {
        Self {
            voice: "en-US-JennyNeural".to_string(),
            rate: 1.0,
            volume: 100,
        }
    }
}

impl NarrationOptions {
    fn request_for(&self, text: String) -> NarrationRequest {
        NarrationRequest {
            text,
            voice: self.voice.clone(),
            rate: self.rate.clamp(0.5, 2.0),
            volume: self.volume.min(100),
        }
    }
}

/// Mutable engine state, guarded by one lock so every operation observes a
/// consistent (state, session, handle) triple
struct EngineInner {
    state: PlaybackState,
    session: Option<PlaybackSession>,
    handle: Option<NarrationHandle>,
    /// Last issued generation; increments on every (re)start including seeks
    generation: u64,
    options: NarrationOptions,
    projector: HighlightProjector,
}

/// Playback engine - reconciles narration events against the span index
pub struct PlaybackEngine {
    narrator: Arc<dyn Narrator>,
    display: Arc<dyn DisplaySurface>,
    event_bus: Arc<EventBus>,
    inner: Arc<RwLock<EngineInner>>,
    events_tx: mpsc::UnboundedSender<TaggedNarrationEvent>,
    /// Taken by `start()`; present until the pump task is spawned
    events_rx: Mutex<Option<mpsc::UnboundedReceiver<TaggedNarrationEvent>>>,
}

impl PlaybackEngine {
    pub fn new(
        narrator: Arc<dyn Narrator>,
        display: Arc<dyn DisplaySurface>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            narrator,
            display: Arc::clone(&display),
            event_bus,
            inner: Arc::new(RwLock::new(EngineInner {
                state: PlaybackState::Idle,
                session: None,
                handle: None,
                generation: 0,
                options: NarrationOptions::default(),
                projector: HighlightProjector::new(display),
            })),
            events_tx,
            events_rx: Mutex::new(Some(events_rx)),
        }
    }

    /// Spawn the narration event pump
    ///
    /// Drains the tagged event channel onto the engine's handlers. Safe to
    /// call once; subsequent calls are no-ops.
    pub async fn start(self: &Arc<Self>) {
        let Some(mut rx) = self.events_rx.lock().await.take() else {
            warn!("playback engine already started");
            return;
        };

        let engine = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(tagged) = rx.recv().await {
                engine.dispatch(tagged).await;
            }
            debug!("narration event channel closed, pump exiting");
        });
        info!("playback engine started");
    }

    async fn dispatch(&self, tagged: TaggedNarrationEvent) {
        let TaggedNarrationEvent { generation, event } = tagged;
        match event {
            NarrationEvent::WordBoundary { offset, length } => {
                self.on_word_boundary(generation, offset, length).await;
            }
            NarrationEvent::Completed => self.on_completed(generation).await,
            NarrationEvent::Canceled => self.on_canceled(generation).await,
            NarrationEvent::Failed { detail } => self.on_error(generation, detail).await,
        }
    }

    /// Start narrating `text` from the beginning
    ///
    /// Builds a fresh index over the snapshot and submits the full text with
    /// base offset 0. A live session is superseded: its narration is
    /// canceled and its remaining events become stale.
    pub async fn play(&self, text: &str, options: NarrationOptions) -> Result<()> {
        if !self.narrator.is_configured() {
            return Err(Error::NotConfigured);
        }
        if text.trim().is_empty() {
            return Err(Error::EmptyContent);
        }

        let mut inner = self.inner.write().await;
        if let Some(handle) = inner.handle.take() {
            debug!(%handle, "superseding in-flight narration");
            self.narrator.cancel(handle);
        }

        let index = Arc::new(SpanIndex::build(text));
        inner.generation += 1;
        let generation = inner.generation;
        inner.options = options;
        inner.session = Some(PlaybackSession::new(generation, 0, index));

        let request = inner.options.request_for(text.to_string());
        let sink = EventSink::new(generation, self.events_tx.clone());
        match self.narrator.submit(request, sink) {
            Ok(handle) => {
                info!(generation, %handle, "narration submitted");
                inner.handle = Some(handle);
                self.set_state(&mut inner, PlaybackState::Playing);
                Ok(())
            }
            Err(e) => {
                inner.session = None;
                self.set_state(&mut inner, PlaybackState::Errored);
                Err(e)
            }
        }
    }

    /// Pause playback
    ///
    /// The capability has no native pause: the in-flight narration is
    /// canceled and the last observed absolute offset becomes the resume
    /// point. Valid only while Playing.
    pub async fn pause(&self) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.state != PlaybackState::Playing {
            return Err(Error::InvalidState(format!(
                "cannot pause while {}",
                inner.state
            )));
        }

        if let Some(handle) = inner.handle.take() {
            self.narrator.cancel(handle);
        }
        self.set_state(&mut inner, PlaybackState::Paused);
        Ok(())
    }

    /// Resume paused playback
    ///
    /// Restarts narration at the start of the sentence containing the resume
    /// point, never mid-word, to avoid audibly truncated speech. Valid only
    /// while Paused.
    pub async fn resume(&self) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.state != PlaybackState::Paused {
            return Err(Error::InvalidState(format!(
                "cannot resume while {}",
                inner.state
            )));
        }

        let session = inner
            .session
            .as_ref()
            .ok_or_else(|| Error::InvalidState("paused without a session".to_string()))?;
        let resume_at = session.resume_point();
        let sentence_id = session
            .index
            .sentence_at(resume_at)
            .map(|s| s.id)
            .ok_or_else(|| Error::UnitNotFound(format!("no sentence at offset {resume_at}")))?;

        self.restart_from_sentence(&mut inner, sentence_id)
    }

    /// Stop playback and clear all highlights
    ///
    /// Valid from any state; stopping while already Idle is a no-op.
    pub async fn stop(&self) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.state == PlaybackState::Idle {
            return Ok(());
        }

        if let Some(handle) = inner.handle.take() {
            self.narrator.cancel(handle);
        }
        inner.session = None;
        inner.projector.clear();
        self.event_bus.emit_lossy(LectorEvent::HighlightsCleared {
            timestamp: chrono::Utc::now(),
        });
        self.set_state(&mut inner, PlaybackState::Idle);
        Ok(())
    }

    /// Jump to a reading unit
    ///
    /// Restarts narration at the start of the sentence containing the unit
    /// (a word resolves to its parent sentence) and force-enables
    /// auto-scroll. Valid while Playing or Paused.
    pub async fn seek_to_unit(&self, kind: UnitKind, id: usize) -> Result<()> {
        let mut inner = self.inner.write().await;
        if !inner.state.can_seek() {
            return Err(Error::InvalidState(format!(
                "cannot seek while {}",
                inner.state
            )));
        }

        let session = inner
            .session
            .as_ref()
            .ok_or_else(|| Error::InvalidState("seek without a session".to_string()))?;
        let sentence_id = match kind {
            UnitKind::Sentence => {
                session
                    .index
                    .sentence(id)
                    .ok_or_else(|| Error::UnitNotFound(format!("sentence {id}")))?
                    .id
            }
            UnitKind::Word => session
                .index
                .word(id)
                .and_then(|w| w.parent_sentence)
                .ok_or_else(|| Error::UnitNotFound(format!("word {id}")))?,
        };

        self.display.set_auto_scroll_enabled(true);
        self.restart_from_sentence(&mut inner, sentence_id)
    }

    /// Cancel the current submission and resynthesize from a sentence start
    ///
    /// Establishes a new generation with `base_offset` at the sentence start
    /// and the document suffix from that offset as the submitted text.
    fn restart_from_sentence(&self, inner: &mut EngineInner, sentence_id: usize) -> Result<()> {
        let session = inner
            .session
            .as_ref()
            .ok_or_else(|| Error::InvalidState("restart without a session".to_string()))?;
        let index = Arc::clone(&session.index);
        let base_offset = index
            .sentence(sentence_id)
            .ok_or_else(|| Error::UnitNotFound(format!("sentence {sentence_id}")))?
            .start;

        self.set_state(inner, PlaybackState::Seeking);
        if let Some(handle) = inner.handle.take() {
            self.narrator.cancel(handle);
        }

        inner.generation += 1;
        let generation = inner.generation;
        let suffix = index.suffix_from(base_offset).to_string();
        inner.session = Some(PlaybackSession::new(generation, base_offset, index));

        let request = inner.options.request_for(suffix);
        let sink = EventSink::new(generation, self.events_tx.clone());
        match self.narrator.submit(request, sink) {
            Ok(handle) => {
                info!(generation, base_offset, %handle, "narration restarted");
                inner.handle = Some(handle);
                self.set_state(inner, PlaybackState::Playing);
                Ok(())
            }
            Err(e) => {
                inner.session = None;
                self.set_state(inner, PlaybackState::Errored);
                Err(e)
            }
        }
    }

    /// Handle a word-boundary event from the narration capability
    ///
    /// Stale generations are discarded silently; that single check is what
    /// makes restart-based seeking race-free. Events are also ignored unless
    /// actively Playing, so a cancellation racing a pause cannot move the
    /// highlight afterwards.
    pub async fn on_word_boundary(&self, generation: u64, relative: usize, length: usize) {
        let mut inner = self.inner.write().await;
        if inner.session.as_ref().map(|s| s.generation) != Some(generation) {
            trace!(generation, "discarding stale word boundary");
            return;
        }
        if inner.state != PlaybackState::Playing {
            trace!(state = %inner.state, "ignoring word boundary while not playing");
            return;
        }

        let Some(session) = inner.session.as_mut() else {
            return;
        };
        let absolute = session.to_absolute(relative);
        session.observe(absolute);
        let index = Arc::clone(&session.index);

        let Some(word) = index.word_at(absolute) else {
            trace!(absolute, length, "no word unit at offset");
            return;
        };
        let word_id = word.id;
        let Some(sentence_id) = word.parent_sentence else {
            return;
        };

        inner.projector.project(sentence_id, Some(word_id));
        self.event_bus.emit_lossy(LectorEvent::WordReached {
            word_id,
            sentence_id,
            generation,
            timestamp: chrono::Utc::now(),
        });
    }

    /// Handle narration completion
    pub async fn on_completed(&self, generation: u64) {
        let mut inner = self.inner.write().await;
        if inner.session.as_ref().map(|s| s.generation) != Some(generation) {
            trace!(generation, "discarding stale completion");
            return;
        }
        if inner.state != PlaybackState::Playing {
            debug!(state = %inner.state, "ignoring completion while not playing");
            return;
        }

        inner.handle = None;
        inner.projector.clear();
        self.event_bus.emit_lossy(LectorEvent::HighlightsCleared {
            timestamp: chrono::Utc::now(),
        });
        self.set_state(&mut inner, PlaybackState::Finished);
        self.event_bus.emit_lossy(LectorEvent::PlaybackFinished {
            generation,
            timestamp: chrono::Utc::now(),
        });
    }

    /// Handle a cancellation acknowledgement
    ///
    /// Always inert: cancellations are initiated by this engine and the state
    /// transition already happened in the initiating operation.
    pub async fn on_canceled(&self, generation: u64) {
        debug!(generation, "narration canceled");
    }

    /// Handle a capability-reported narration failure
    ///
    /// The session ends; no automatic retry (narration failures are not
    /// transient-safe to blindly retry mid-sentence). `play()` is valid
    /// again from Errored.
    pub async fn on_error(&self, generation: u64, detail: String) {
        let mut inner = self.inner.write().await;
        if inner.session.as_ref().map(|s| s.generation) != Some(generation) {
            trace!(generation, "discarding stale error");
            return;
        }
        if inner.state != PlaybackState::Playing {
            debug!(state = %inner.state, detail, "ignoring error while not playing");
            return;
        }

        warn!(generation, detail, "narration failed");
        inner.handle = None;
        inner.projector.clear();
        self.set_state(&mut inner, PlaybackState::Errored);
        self.event_bus.emit_lossy(LectorEvent::PlaybackError {
            detail,
            timestamp: chrono::Utc::now(),
        });
    }

    /// The display reported a user-initiated scroll: stop following along
    pub fn on_user_scrolled(&self) {
        self.display.set_auto_scroll_enabled(false);
    }

    /// The display reported a click on a reading unit: jump there
    pub async fn on_unit_clicked(&self, kind: UnitKind, id: usize) -> Result<()> {
        self.seek_to_unit(kind, id).await
    }

    fn set_state(&self, inner: &mut EngineInner, new_state: PlaybackState) {
        if inner.state == new_state {
            return;
        }
        let old_state = inner.state;
        inner.state = new_state;
        info!("playback state changed: {} -> {}", old_state, new_state);
        self.event_bus.emit_lossy(LectorEvent::PlaybackStateChanged {
            old_state,
            new_state,
            timestamp: chrono::Utc::now(),
        });
    }

    pub async fn state(&self) -> PlaybackState {
        self.inner.read().await.state
    }

    /// Generation of the current session (last issued)
    pub async fn current_generation(&self) -> u64 {
        self.inner.read().await.generation
    }

    /// Base offset of the current session's submission
    pub async fn base_offset(&self) -> Option<usize> {
        self.inner.read().await.session.as_ref().map(|s| s.base_offset)
    }

    /// Last observed absolute offset in the current session
    pub async fn last_offset(&self) -> Option<usize> {
        self.inner
            .read()
            .await
            .session
            .as_ref()
            .and_then(|s| s.last_offset())
    }

    /// Currently highlighted (sentence, word), the observable position
    pub async fn current_unit(&self) -> Option<(usize, Option<usize>)> {
        self.inner.read().await.projector.current()
    }
}
