//! Editor states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a policy editor session.
///
/// `Blocked` and `Failed` are passed through during a save or delete and
/// always lead back to `Editing` before the call returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditorState {
    /// The policy is open for edits.
    Editing,

    /// Form edits are committed and the rule lists are being checked.
    Validating,

    /// Validation refused the save.
    Blocked,

    /// A save request is outstanding.
    Saving,

    /// The store confirmed the save.
    Persisted,

    /// The store refused or failed a request.
    Failed,

    /// A delete request is outstanding.
    Deleting,

    /// The store confirmed the delete.
    Deleted,

    /// The editor was left.
    Closed,
}

impl fmt::Display for EditorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Editing => write!(f, "Editing"),
            Self::Validating => write!(f, "Validating"),
            Self::Blocked => write!(f, "Blocked"),
            Self::Saving => write!(f, "Saving"),
            Self::Persisted => write!(f, "Persisted"),
            Self::Failed => write!(f, "Failed"),
            Self::Deleting => write!(f, "Deleting"),
            Self::Deleted => write!(f, "Deleted"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

impl EditorState {
    /// Whether a request to the store is outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Saving | Self::Deleting)
    }

    /// Whether the session has ended.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Get the valid next states from this state.
    pub fn valid_next_states(&self) -> Vec<EditorState> {
        match self {
            Self::Editing => vec![Self::Validating, Self::Deleting, Self::Closed],
            Self::Validating => vec![Self::Editing, Self::Blocked, Self::Saving],
            Self::Blocked => vec![Self::Editing],
            Self::Saving => vec![Self::Persisted, Self::Failed],
            Self::Failed => vec![Self::Editing],
            Self::Deleting => vec![Self::Deleted, Self::Failed],
            Self::Persisted => vec![Self::Closed],
            Self::Deleted => vec![Self::Closed],
            Self::Closed => vec![],
        }
    }

    /// Check if a transition to the given state is valid.
    pub fn can_transition_to(&self, next: EditorState) -> bool {
        self.valid_next_states().contains(&next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_path() {
        assert!(EditorState::Editing.can_transition_to(EditorState::Validating));
        assert!(EditorState::Validating.can_transition_to(EditorState::Saving));
        assert!(EditorState::Saving.can_transition_to(EditorState::Persisted));
        assert!(EditorState::Saving.can_transition_to(EditorState::Failed));
        assert!(EditorState::Failed.can_transition_to(EditorState::Editing));
    }

    #[test]
    fn test_blocked_returns_to_editing() {
        assert_eq!(EditorState::Blocked.valid_next_states(), vec![EditorState::Editing]);
    }

    #[test]
    fn test_busy_states_cannot_close() {
        assert!(EditorState::Saving.is_busy());
        assert!(!EditorState::Saving.can_transition_to(EditorState::Closed));
        assert!(!EditorState::Deleting.can_transition_to(EditorState::Closed));
    }

    #[test]
    fn test_closed_is_final() {
        assert!(EditorState::Closed.is_final());
        assert!(EditorState::Closed.valid_next_states().is_empty());
    }
}
