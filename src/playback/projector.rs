//! Highlight projector: turns "unit K is current" into display commands
//!
//! Idempotent by construction: projecting the same sentence/word pair twice
//! has no observable effect. Scrolling happens only on a sentence change and
//! only while the display's auto-scroll flag is enabled.

use std::sync::Arc;

use crate::display::DisplaySurface;

pub struct HighlightProjector {
    display: Arc<dyn DisplaySurface>,
    /// Currently marked (sentence, word), if any
    current: Option<(usize, Option<usize>)>,
}

impl HighlightProjector {
    pub fn new(display: Arc<dyn DisplaySurface>) -> Self {
        Self {
            display,
            current: None,
        }
    }

    /// Mark the given units as current, replacing the previous marking
    pub fn project(&mut self, sentence_id: usize, word_id: Option<usize>) {
        if self.current == Some((sentence_id, word_id)) {
            return;
        }
        let sentence_changed = self.current.map(|(s, _)| s) != Some(sentence_id);

        self.display.mark_current(sentence_id, word_id);
        if sentence_changed && self.display.is_auto_scroll_enabled() {
            self.display.scroll_into_view(sentence_id);
        }
        self.current = Some((sentence_id, word_id));
    }

    /// Remove all highlights
    pub fn clear(&mut self) {
        self.display.clear_all();
        self.current = None;
    }

    /// Currently marked (sentence, word) pair
    pub fn current(&self) -> Option<(usize, Option<usize>)> {
        self.current
    }
}
