//! Shared helpers for integration tests.

pub mod convert_server;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use mcc_core::notify::{Notice, Severity, UiSink};

/// UI sink that records every feedback call for assertions.
#[derive(Default)]
pub struct RecordingUi {
    pub notices: Mutex<Vec<Notice>>,
    pub busy_transitions: Mutex<Vec<bool>>,
    pub shakes: AtomicUsize,
}

impl RecordingUi {
    pub fn notice_texts(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.text.clone())
            .collect()
    }

    pub fn error_count(&self) -> usize {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.severity == Severity::Error)
            .count()
    }

    pub fn success_count(&self) -> usize {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.severity == Severity::Success)
            .count()
    }

    pub fn shake_count(&self) -> usize {
        self.shakes.load(Ordering::SeqCst)
    }
}

impl UiSink for RecordingUi {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }

    fn set_busy(&self, busy: bool) {
        self.busy_transitions.lock().unwrap().push(busy);
    }

    fn shake(&self) {
        self.shakes.fetch_add(1, Ordering::SeqCst);
    }
}
