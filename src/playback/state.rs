//! Playback state machine states

use serde::{Deserialize, Serialize};

/// Playback lifecycle state
///
/// Transitions:
/// - `play()`: Idle/Finished/Errored → Playing (a live session is superseded)
/// - `pause()`: Playing → Paused
/// - `resume()`: Paused → Seeking → Playing
/// - seek: Playing/Paused → Seeking → Playing
/// - `stop()`: any non-Idle → Idle
/// - narration completion → Finished, narration error → Errored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
    Seeking,
    Finished,
    Errored,
}

impl PlaybackState {
    /// States a seek request is accepted from
    pub fn can_seek(self) -> bool {
        matches!(self, PlaybackState::Playing | PlaybackState::Paused)
    }

    /// Terminal states for a session; a new `play()` starts a new session
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PlaybackState::Idle | PlaybackState::Finished | PlaybackState::Errored
        )
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "idle"),
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
            PlaybackState::Seeking => write!(f, "seeking"),
            PlaybackState::Finished => write!(f, "finished"),
            PlaybackState::Errored => write!(f, "errored"),
        }
    }
}
