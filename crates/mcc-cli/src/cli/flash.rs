//! Terminal renderer for submission feedback.
//!
//! Notices occupy the most recent output line: shown at once, dimmed after
//! [`NOTICE_VISIBLE`], erased [`NOTICE_EXIT`] later. The busy indicator sits
//! on the current (unterminated) line and is wiped when the submission
//! settles or the first notice arrives. One-shot commands use plain mode,
//! where notices print as ordinary lines and stay put.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use mcc_core::notify::{
    FlashSlot, Notice, Severity, UiSink, NOTICE_EXIT, NOTICE_VISIBLE, SHAKE_DURATION,
};

const ERASE_LINE: &str = "\r\x1b[2K";
const ERASE_ABOVE: &str = "\x1b[1A\x1b[2K";

pub struct FlashRenderer {
    slot: Arc<Mutex<FlashSlot>>,
    /// Pending dismissal/shake tasks; `settle` drains them so the prompt is
    /// only reprinted once the last transient line is gone.
    timers: Mutex<Vec<tokio::task::JoinHandle<()>>>,
    busy_line_open: AtomicBool,
    transient: bool,
}

impl FlashRenderer {
    /// Renderer for the interactive prompt: notices auto-dismiss.
    pub fn transient() -> Self {
        Self::new(true)
    }

    /// Renderer for one-shot commands: notices persist in the scrollback.
    pub fn plain() -> Self {
        Self::new(false)
    }

    fn new(transient: bool) -> Self {
        Self {
            slot: Arc::new(Mutex::new(FlashSlot::new())),
            timers: Mutex::new(Vec::new()),
            busy_line_open: AtomicBool::new(false),
            transient,
        }
    }

    /// Waits for pending dismissal timers so transient lines are cleaned up
    /// before the caller writes anything new.
    pub async fn settle(&self) {
        loop {
            let pending: Vec<_> = self.timers.lock().unwrap().drain(..).collect();
            if pending.is_empty() {
                return;
            }
            for handle in pending {
                let _ = handle.await;
            }
        }
    }

    fn wipe_busy_line(&self) {
        if self.busy_line_open.swap(false, Ordering::SeqCst) {
            print!("{ERASE_LINE}");
            let _ = io::stdout().flush();
        }
    }
}

fn paint(notice: &Notice) -> String {
    match notice.severity {
        Severity::Success => format!("\x1b[32m{}\x1b[0m", notice.text),
        Severity::Error => format!("\x1b[31m{}\x1b[0m", notice.text),
    }
}

impl UiSink for FlashRenderer {
    fn notify(&self, notice: Notice) {
        self.wipe_busy_line();
        println!("{}", paint(&notice));
        let _ = io::stdout().flush();
        if !self.transient {
            return;
        }

        let token = self.slot.lock().unwrap().show(notice.clone());
        let slot = Arc::clone(&self.slot);
        let faded = format!("\x1b[2m{}\x1b[0m", notice.text);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(NOTICE_VISIBLE).await;
            // A newer notice owns the line now; leave it alone.
            if !slot.lock().unwrap().is_current(token) {
                return;
            }
            println!("{ERASE_ABOVE}{faded}");
            let _ = io::stdout().flush();
            tokio::time::sleep(NOTICE_EXIT).await;
            if slot.lock().unwrap().dismiss(token) {
                print!("{ERASE_ABOVE}");
                let _ = io::stdout().flush();
            }
        });
        self.timers.lock().unwrap().push(handle);
    }

    fn set_busy(&self, busy: bool) {
        if busy {
            print!("Converting... ");
            let _ = io::stdout().flush();
            self.busy_line_open.store(true, Ordering::SeqCst);
        } else {
            self.wipe_busy_line();
        }
    }

    fn shake(&self) {
        // Bell plus a transient caret marker; no message, matching the
        // empty-input contract.
        println!("\x07^^^^^^");
        let _ = io::stdout().flush();
        if !self.transient {
            return;
        }
        let handle = tokio::spawn(async move {
            tokio::time::sleep(SHAKE_DURATION).await;
            print!("{ERASE_ABOVE}");
            let _ = io::stdout().flush();
        });
        self.timers.lock().unwrap().push(handle);
    }
}
