//! Playback session bookkeeping: generation, base offset, span index
//!
//! One session covers one narration submission. The generation increments on
//! every (re)start, including seeks; inbound events carrying any other
//! generation are stale and must be discarded. The base offset re-bases the
//! narrator's submission-relative offsets onto the document after a
//! resynthesis restart.

use std::sync::Arc;

use crate::index::SpanIndex;

/// State for one narration submission
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    /// Monotonic counter identifying this submission
    pub generation: u64,
    /// Absolute document offset of relative offset 0 in the submitted text
    pub base_offset: usize,
    /// Immutable unit index over the full document snapshot
    pub index: Arc<SpanIndex>,
    /// Last observed absolute offset, used as the pause/resume point
    last_offset: Option<usize>,
}

impl PlaybackSession {
    pub fn new(generation: u64, base_offset: usize, index: Arc<SpanIndex>) -> Self {
        Self {
            generation,
            base_offset,
            index,
            last_offset: None,
        }
    }

    /// Translate a submission-relative offset to an absolute document offset
    pub fn to_absolute(&self, relative: usize) -> usize {
        self.base_offset + relative
    }

    /// Record an observed absolute offset
    ///
    /// Word boundaries arrive in non-decreasing order within a generation,
    /// but a violation must not corrupt the resume point: regressions are
    /// ignored rather than stored.
    pub fn observe(&mut self, absolute: usize) {
        if self.last_offset.map_or(true, |last| absolute >= last) {
            self.last_offset = Some(absolute);
        }
    }

    /// Absolute offset playback should resume from after a pause
    ///
    /// Before any word boundary has been observed this is the base offset,
    /// so resuming an immediately-paused session restarts where it began.
    pub fn resume_point(&self) -> usize {
        self.last_offset.unwrap_or(self.base_offset)
    }

    /// Last observed absolute offset, if any word boundary arrived
    pub fn last_offset(&self) -> Option<usize> {
        self.last_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(generation: u64, base: usize) -> PlaybackSession {
        PlaybackSession::new(generation, base, Arc::new(SpanIndex::build("One. Two.")))
    }

    #[test]
    fn translates_relative_offsets() {
        let s = session(1, 0);
        assert_eq!(s.to_absolute(6), 6);

        let rebased = session(2, 16);
        assert_eq!(rebased.to_absolute(0), 16);
        assert_eq!(rebased.to_absolute(7), 23);
    }

    #[test]
    fn observe_is_monotonic() {
        let mut s = session(1, 0);
        assert_eq!(s.last_offset(), None);

        s.observe(5);
        s.observe(9);
        assert_eq!(s.last_offset(), Some(9));

        // Out-of-order event: ignored, never stored.
        s.observe(3);
        assert_eq!(s.last_offset(), Some(9));
    }

    #[test]
    fn resume_point_defaults_to_base() {
        let s = session(3, 16);
        assert_eq!(s.resume_point(), 16);

        let mut advanced = session(3, 16);
        advanced.observe(23);
        assert_eq!(advanced.resume_point(), 23);
    }
}
