//! Collaborators of the policy editor.
//!
//! The editor never renders anything itself. Form binding, notifications,
//! pop-ups and navigation are reached through the traits in this module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::messages::{DefaultCatalog, MessageCatalog};
use crate::model::Policy;

/// A field-level problem reported by the form when committing edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the offending field.
    pub field: String,

    /// What is wrong with it.
    pub message: String,
}

impl FieldError {
    /// Create a field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// The form the policy is edited in.
pub trait PolicyForm: Send + Sync {
    /// Write pending form values into the policy.
    ///
    /// Returns the field errors found; an empty vector means the commit
    /// succeeded. Fields without errors are written even when others fail.
    fn commit(&self, policy: &mut Policy) -> Vec<FieldError>;

    /// Last adjustments to the policy right before it is sent to the store.
    fn before_save(&self, _policy: &mut Policy) {}
}

/// Form with no pending edits. Used when the policy is edited directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughForm;

impl PolicyForm for PassthroughForm {
    fn commit(&self, _policy: &mut Policy) -> Vec<FieldError> {
        Vec::new()
    }
}

/// Notifications, pop-ups and the blocking indicator.
pub trait Notifier: Send + Sync {
    /// Transient success notification.
    fn notify_success(&self, title: &str, text: &str);

    /// Transient error notification.
    fn notify_error(&self, title: &str, text: &str);

    /// Show a description supplied by the store.
    fn show_error_msg(&self, description: &str);

    /// Modal alert.
    fn alert_popup(&self, message: &str);

    /// Modal yes/no question. Returns the answer.
    fn confirm_popup(&self, message: &str) -> bool;

    /// Engage the blocking indicator.
    fn block_ui(&self);

    /// Release the blocking indicator.
    fn unblock_ui(&self);

    /// Alert shown inside the form, e.g. for a disabled policy.
    fn show_inline_alert(&self, _message: &str) {}
}

/// Navigation and the leave-page guard.
pub trait Navigator: Send + Sync {
    /// Go to a route. `trigger` asks the router to run the route handler.
    fn navigate_to(&self, path: &str, trigger: bool);

    /// Release the navigation guard.
    fn allow_navigation(&self);

    /// Install the navigation guard with the prompt to show.
    fn prevent_navigation(&self, message: &str);
}

/// Everything the editor talks to besides the store.
#[derive(Clone)]
pub struct EditorCollaborators {
    /// Form binding
    pub form: Arc<dyn PolicyForm>,

    /// Notifications and pop-ups
    pub notifier: Arc<dyn Notifier>,

    /// Router
    pub navigator: Arc<dyn Navigator>,

    /// Message texts
    pub catalog: Arc<dyn MessageCatalog>,
}

impl EditorCollaborators {
    /// Collaborators with a pass-through form and the built-in messages.
    pub fn new(notifier: Arc<dyn Notifier>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            form: Arc::new(PassthroughForm),
            notifier,
            navigator,
            catalog: Arc::new(DefaultCatalog),
        }
    }

    /// Replace the form.
    pub fn with_form(mut self, form: Arc<dyn PolicyForm>) -> Self {
        self.form = form;
        self
    }

    /// Replace the message catalog.
    pub fn with_catalog(mut self, catalog: Arc<dyn MessageCatalog>) -> Self {
        self.catalog = catalog;
        self
    }
}

impl fmt::Debug for EditorCollaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorCollaborators").finish_non_exhaustive()
    }
}
