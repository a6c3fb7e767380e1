//! Shared test doubles for engine integration tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use lector::display::DisplaySurface;
use lector::narration::{EventSink, NarrationHandle, NarrationRequest, Narrator};
use lector::Result;

/// One recorded narration submission
pub struct Submission {
    pub handle: NarrationHandle,
    pub request: NarrationRequest,
    pub sink: EventSink,
}

/// Narrator double that records submissions and lets tests drive the event
/// stream by hand
pub struct ScriptedNarrator {
    configured: bool,
    /// Emit a Canceled acknowledgement through the submission's sink when
    /// cancel() is called, simulating the capability's ack racing onward
    ack_cancel: bool,
    submissions: Mutex<Vec<Submission>>,
    canceled: Mutex<Vec<NarrationHandle>>,
}

impl ScriptedNarrator {
    pub fn new() -> Self {
        Self {
            configured: true,
            ack_cancel: true,
            submissions: Mutex::new(Vec::new()),
            canceled: Mutex::new(Vec::new()),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }

    pub fn submitted_text(&self, i: usize) -> String {
        self.submissions.lock().unwrap()[i].request.text.clone()
    }

    pub fn sink_for(&self, i: usize) -> EventSink {
        self.submissions.lock().unwrap()[i].sink.clone()
    }

    pub fn handle_for(&self, i: usize) -> NarrationHandle {
        self.submissions.lock().unwrap()[i].handle
    }

    pub fn canceled_handles(&self) -> Vec<NarrationHandle> {
        self.canceled.lock().unwrap().clone()
    }
}

impl Narrator for ScriptedNarrator {
    fn is_configured(&self) -> bool {
        self.configured
    }

    fn submit(&self, request: NarrationRequest, sink: EventSink) -> Result<NarrationHandle> {
        let handle = NarrationHandle::new();
        self.submissions.lock().unwrap().push(Submission {
            handle,
            request,
            sink,
        });
        Ok(handle)
    }

    fn cancel(&self, handle: NarrationHandle) {
        self.canceled.lock().unwrap().push(handle);
        if self.ack_cancel {
            let submissions = self.submissions.lock().unwrap();
            if let Some(submission) = submissions.iter().find(|s| s.handle == handle) {
                submission.sink.canceled();
            }
        }
    }
}

/// Display double recording every call
pub struct RecordingDisplay {
    pub marks: Mutex<Vec<(usize, Option<usize>)>>,
    pub scrolls: Mutex<Vec<usize>>,
    clears: AtomicUsize,
    auto_scroll: AtomicBool,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self {
            marks: Mutex::new(Vec::new()),
            scrolls: Mutex::new(Vec::new()),
            clears: AtomicUsize::new(0),
            auto_scroll: AtomicBool::new(true),
        }
    }

    pub fn mark_count(&self) -> usize {
        self.marks.lock().unwrap().len()
    }

    pub fn last_mark(&self) -> Option<(usize, Option<usize>)> {
        self.marks.lock().unwrap().last().copied()
    }

    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl DisplaySurface for RecordingDisplay {
    fn mark_current(&self, sentence_id: usize, word_id: Option<usize>) {
        self.marks.lock().unwrap().push((sentence_id, word_id));
    }

    fn clear_all(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }

    fn scroll_into_view(&self, sentence_id: usize) {
        self.scrolls.lock().unwrap().push(sentence_id);
    }

    fn is_auto_scroll_enabled(&self) -> bool {
        self.auto_scroll.load(Ordering::SeqCst)
    }

    fn set_auto_scroll_enabled(&self, enabled: bool) {
        self.auto_scroll.store(enabled, Ordering::SeqCst);
    }
}
