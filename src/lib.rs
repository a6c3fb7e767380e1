//! # Lector reading synchronization engine
//!
//! Keeps a live, bidirectional mapping between document text, an
//! offset-addressed index of sentence and word units, and a stream of
//! asynchronous narration-progress events, exposing play/pause/stop/seek
//! controls over a narration capability that natively supports none of
//! pause, resume, or mid-stream seek.
//!
//! **Architecture:** a pure span indexer feeds a single-owner playback state
//! machine; narration events arrive generation-tagged over an mpsc channel;
//! highlighting flows out through a display-surface contract.

pub mod config;
pub mod display;
pub mod error;
pub mod events;
pub mod index;
pub mod narration;
pub mod playback;
pub mod render;

pub use config::LectorConfig;
pub use display::DisplaySurface;
pub use error::{Error, Result};
pub use events::{EventBus, LectorEvent};
pub use index::{ReadingUnit, SpanIndex, UnitKind};
pub use narration::{EventSink, NarrationEvent, NarrationHandle, NarrationRequest, Narrator};
pub use playback::{NarrationOptions, PlaybackEngine, PlaybackState};
