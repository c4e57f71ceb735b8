//! Save, delete and cancel lifecycle of a policy edit session.

mod collaborators;
mod controller;
mod recording;
mod state;

pub use collaborators::{EditorCollaborators, FieldError, Navigator, Notifier, PassthroughForm, PolicyForm};
pub use controller::{DeleteOutcome, PolicyEditor, SaveOutcome};
pub use recording::{RecordingUi, UiEvent};
pub use state::EditorState;
