//! Modal Overlay Controller
//!
//! One blocking dialog (the protected-project notice) with a two-state
//! machine, plus a stateless "not available yet" acknowledgment that is
//! fired and forgotten. Independent of navigation.

use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Title of the protected-project dialog
pub const PROTECTED_NOTICE_TITLE: &str = "Protected Project";

/// Body of the protected-project dialog
pub const PROTECTED_NOTICE_BODY: &str = "Due to the Non-Disclosure Agreement signed, \
    you can’t access the source code or live demo for this project.";

/// Label of the dialog's acknowledge button
pub const PROTECTED_NOTICE_ACK: &str = "I Understand";

/// One-shot notice for projects whose live demo is not up yet
pub const UNAVAILABLE_NOTICE: &str =
    "No live view available for this project due to work in progress.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalState {
    #[default]
    Closed,
    /// The protected-project dialog is showing
    ProtectedNotice,
}

/// How the dialog was dismissed
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum DismissReason {
    /// "I Understand" button
    Acknowledged = 0,
    /// Corner close affordance
    CloseButton = 1,
    /// Click on the dimmed backdrop
    Backdrop = 2,
}

/// Sink for fire-once notices (a browser alert, a toast, a test log).
pub trait Notifier {
    fn notify(&self, message: &str);
}

impl<T: Notifier + ?Sized> Notifier for std::rc::Rc<T> {
    fn notify(&self, message: &str) {
        (**self).notify(message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModalController {
    state: ModalState,
}

impl ModalController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ModalState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ModalState::ProtectedNotice
    }

    /// Show the protected-project dialog. Already open stays open.
    ///
    /// Returns true if the state changed.
    pub fn open_protected(&mut self) -> bool {
        if self.is_open() {
            return false;
        }
        tracing::debug!("Protected notice opened");
        self.state = ModalState::ProtectedNotice;
        true
    }

    /// Close the dialog. Already closed stays closed.
    ///
    /// Returns true if the state changed.
    pub fn dismiss(&mut self, reason: DismissReason) -> bool {
        if !self.is_open() {
            return false;
        }
        tracing::debug!(?reason, "Protected notice dismissed");
        self.state = ModalState::Closed;
        true
    }

    /// Fire the "no live demo yet" notice. Leaves the dialog state alone.
    pub fn acknowledge_unavailable(&self, notifier: &dyn Notifier) {
        notifier.notify(UNAVAILABLE_NOTICE);
    }
}

/// Notifier that remembers every message, for tests and native hosts.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: std::cell::RefCell<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}
