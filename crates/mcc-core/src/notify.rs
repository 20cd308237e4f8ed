//! Transient flash notices and the UI feedback seam.
//!
//! At most one notice is visible at a time; showing a new one replaces the
//! old. A renderer keeps a notice on screen for [`NOTICE_VISIBLE`], plays an
//! exit animation for [`NOTICE_EXIT`], then removes it. [`FlashSlot`] tracks
//! the visible notice with tokens so a dismissal scheduled for a replaced
//! notice does not clear its successor, and dismissing twice is a no-op.

use std::time::Duration;

/// How long a notice stays fully visible.
pub const NOTICE_VISIBLE: Duration = Duration::from_secs(3);

/// Exit-animation window between fade and removal.
pub const NOTICE_EXIT: Duration = Duration::from_millis(500);

/// Duration of the empty-input shake indication.
pub const SHAKE_DURATION: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// One transient message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub severity: Severity,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Error,
        }
    }
}

/// Sink for UI feedback during a submission.
///
/// The submission flow holds a sink passed in at construction instead of
/// reaching for ambient UI state; front ends implement it (terminal renderer
/// in the CLI, recording sinks in tests).
pub trait UiSink: Send + Sync {
    /// Show a transient notice, replacing any visible one.
    fn notify(&self, notice: Notice);
    /// Enter or leave the busy state (submit control disabled, busy label).
    fn set_busy(&self, busy: bool);
    /// Play the empty-input shake indication.
    fn shake(&self);
}

/// Token identifying one shown notice, for guarded dismissal.
pub type NoticeToken = u64;

/// Single-slot notice holder.
#[derive(Debug, Default)]
pub struct FlashSlot {
    current: Option<(NoticeToken, Notice)>,
    next_token: NoticeToken,
}

impl FlashSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any visible notice with `notice`; returns the token its
    /// dismissal must present.
    pub fn show(&mut self, notice: Notice) -> NoticeToken {
        let token = self.next_token;
        self.next_token += 1;
        self.current = Some((token, notice));
        token
    }

    /// Removes the notice identified by `token`. Returns false when that
    /// notice is already gone (dismissed before, or replaced).
    pub fn dismiss(&mut self, token: NoticeToken) -> bool {
        match self.current {
            Some((t, _)) if t == token => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    /// The currently visible notice, if any.
    pub fn visible(&self) -> Option<&Notice> {
        self.current.as_ref().map(|(_, n)| n)
    }

    /// Whether the notice identified by `token` is still the visible one.
    pub fn is_current(&self, token: NoticeToken) -> bool {
        matches!(self.current, Some((t, _)) if t == token)
    }
}
