//! Recording collaborators.
//!
//! `RecordingUi` implements both `Notifier` and `Navigator` and keeps every
//! call in one ordered log, which makes it suitable for tests and for
//! headless drivers that want to inspect what the editor did.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::collaborators::{Navigator, Notifier};

/// A call made by the editor to one of its UI collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UiEvent {
    NotifySuccess { title: String, text: String },
    NotifyError { title: String, text: String },
    ShowErrorMsg(String),
    Alert(String),
    Confirm(String),
    BlockUi,
    UnblockUi,
    InlineAlert(String),
    NavigateTo { path: String, trigger: bool },
    AllowNavigation,
    PreventNavigation(String),
}

/// Notifier and navigator that record every call.
///
/// Clones share the same log.
#[derive(Debug, Clone)]
pub struct RecordingUi {
    events: Arc<Mutex<Vec<UiEvent>>>,
    confirm_answer: Arc<AtomicBool>,
}

impl RecordingUi {
    /// Recorder answering confirmations with yes.
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            confirm_answer: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Set the answer given to confirmation pop-ups.
    pub fn answer_confirm(&self, answer: bool) {
        self.confirm_answer.store(answer, Ordering::SeqCst);
    }

    /// Events recorded so far.
    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().clone()
    }

    /// Drain the recorded events.
    pub fn take_events(&self) -> Vec<UiEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    fn record(&self, event: UiEvent) {
        self.events.lock().push(event);
    }
}

impl Default for RecordingUi {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for RecordingUi {
    fn notify_success(&self, title: &str, text: &str) {
        self.record(UiEvent::NotifySuccess {
            title: title.to_string(),
            text: text.to_string(),
        });
    }

    fn notify_error(&self, title: &str, text: &str) {
        self.record(UiEvent::NotifyError {
            title: title.to_string(),
            text: text.to_string(),
        });
    }

    fn show_error_msg(&self, description: &str) {
        self.record(UiEvent::ShowErrorMsg(description.to_string()));
    }

    fn alert_popup(&self, message: &str) {
        self.record(UiEvent::Alert(message.to_string()));
    }

    fn confirm_popup(&self, message: &str) -> bool {
        self.record(UiEvent::Confirm(message.to_string()));
        self.confirm_answer.load(Ordering::SeqCst)
    }

    fn block_ui(&self) {
        self.record(UiEvent::BlockUi);
    }

    fn unblock_ui(&self) {
        self.record(UiEvent::UnblockUi);
    }

    fn show_inline_alert(&self, message: &str) {
        self.record(UiEvent::InlineAlert(message.to_string()));
    }
}

impl Navigator for RecordingUi {
    fn navigate_to(&self, path: &str, trigger: bool) {
        self.record(UiEvent::NavigateTo {
            path: path.to_string(),
            trigger,
        });
    }

    fn allow_navigation(&self) {
        self.record(UiEvent::AllowNavigation);
    }

    fn prevent_navigation(&self, message: &str) {
        self.record(UiEvent::PreventNavigation(message.to_string()));
    }
}
