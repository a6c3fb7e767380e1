//! Display surface contract
//!
//! The display applies and removes highlight markers by unit id and can
//! scroll a sentence into view. It owns the auto-scroll flag: user scrolling
//! disables it (via [`crate::playback::PlaybackEngine::on_user_scrolled`]),
//! an explicit seek force-enables it. Keeping the flag behind this contract
//! keeps incidental UI state out of the playback state machine.
//!
//! Implementations must be cheap and non-blocking; the engine calls these
//! methods from its event-handling path.

/// Visual surface the highlight projector drives
pub trait DisplaySurface: Send + Sync {
    /// Mark the given sentence (and optionally word) as currently spoken,
    /// replacing any previous marking
    fn mark_current(&self, sentence_id: usize, word_id: Option<usize>);

    /// Remove all highlight markers
    fn clear_all(&self);

    /// Bring the sentence into the visible area
    fn scroll_into_view(&self, sentence_id: usize);

    fn is_auto_scroll_enabled(&self) -> bool;

    fn set_auto_scroll_enabled(&self, enabled: bool);
}
