//! Playback synchronization engine
//!
//! Reconciles asynchronous narration events against the span index, derives
//! the currently-spoken unit, and drives highlighting. All control surfaces
//! (play/pause/stop/seek) live on [`PlaybackEngine`].

pub mod engine;
pub mod projector;
pub mod session;
pub mod state;

pub use engine::{NarrationOptions, PlaybackEngine};
pub use projector::HighlightProjector;
pub use session::PlaybackSession;
pub use state::PlaybackState;
