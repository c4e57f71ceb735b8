//! User-facing messages.
//!
//! Every message the editor can surface has a stable localization key and a
//! built-in English text. Callers that localize implement `MessageCatalog`;
//! everything else uses `DefaultCatalog`.

use serde::Serialize;
use std::fmt;

/// Identifies a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MessageKey {
    /// Audit logging is off and nothing is granted.
    AuditLoggingOff,

    /// A condition was set without any principal.
    AddUserOrGroupForCondition,

    /// Permissions were set without any principal.
    AddUserOrGroup,

    /// Groups were set without permissions.
    AddGroupPermission,

    /// Group permissions were set without groups.
    AddGroup,

    /// Users were set without permissions.
    AddUserPermission,

    /// User permissions were set without users.
    AddUser,

    /// A new policy was stored.
    PolicyCreated,

    /// An existing policy was stored.
    PolicyUpdated,

    /// A policy was deleted.
    PolicyDeleted,

    /// Creating a policy failed without a server description.
    CreateFailed,

    /// Updating a policy failed without a server description.
    UpdateFailed,

    /// Deleting a policy failed without a server description.
    DeleteFailed,

    /// Delete confirmation prompt.
    ConfirmDelete,

    /// Prompt shown when leaving the editor with unsaved changes.
    PreventNavigation,

    /// Inline alert for a disabled policy.
    PolicyDisabled,

    /// Title of success notifications.
    SuccessTitle,

    /// Title of error notifications.
    ErrorTitle,
}

impl MessageKey {
    /// Localization key.
    pub fn key(&self) -> &'static str {
        match self {
            Self::AuditLoggingOff => "msg.yourAuditLogginIsOff",
            Self::AddUserOrGroupForCondition => "msg.addUserOrGroupForPC",
            Self::AddUserOrGroup => "msg.addUserOrGroup",
            Self::AddGroupPermission => "msg.addGroupPermission",
            Self::AddGroup => "msg.addGroup",
            Self::AddUserPermission => "msg.addUserPermission",
            Self::AddUser => "msg.addUser",
            Self::PolicyCreated => "msg.policyCreated",
            Self::PolicyUpdated => "msg.policyUpdated",
            Self::PolicyDeleted => "msg.policyDeleteMsg",
            Self::CreateFailed => "msg.policyCreateError",
            Self::UpdateFailed => "msg.policyUpdateError",
            Self::DeleteFailed => "msg.policyDeleteError",
            Self::ConfirmDelete => "msg.confirmDelete",
            Self::PreventNavigation => "dialogMsg.preventNavPolicyForm",
            Self::PolicyDisabled => "msg.policyDisabled",
            Self::SuccessTitle => "lbl.success",
            Self::ErrorTitle => "lbl.error",
        }
    }

    /// Built-in English text.
    pub fn default_text(&self) -> &'static str {
        match self {
            Self::AuditLoggingOff => {
                "Audit logging is off and no permission has been granted. Please grant a permission or enable audit logging."
            }
            Self::AddUserOrGroupForCondition => {
                "Please add a user or group for the policy condition."
            }
            Self::AddUserOrGroup => "Please add a user or group.",
            Self::AddGroupPermission => "Please add a permission for the selected group.",
            Self::AddGroup => "Please select a group for the given permission.",
            Self::AddUserPermission => "Please add a permission for the selected user.",
            Self::AddUser => "Please select a user for the given permission.",
            Self::PolicyCreated => "Policy created successfully",
            Self::PolicyUpdated => "Policy updated successfully",
            Self::PolicyDeleted => "Policy deleted successfully",
            Self::CreateFailed => "Error creating policy.",
            Self::UpdateFailed => "Error updating policy.",
            Self::DeleteFailed => "Error deleting Policy!",
            Self::ConfirmDelete => "Are you sure want to delete ?",
            Self::PreventNavigation => {
                "You have unsaved changes in the policy form. Leave anyway?"
            }
            Self::PolicyDisabled => "This policy is currently disabled.",
            Self::SuccessTitle => "Success",
            Self::ErrorTitle => "Error",
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Resolves message keys to display text.
pub trait MessageCatalog: Send + Sync {
    /// Text for the given key.
    fn text(&self, key: MessageKey) -> String {
        key.default_text().to_string()
    }
}

/// Catalog returning the built-in English texts.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCatalog;

impl MessageCatalog for DefaultCatalog {}
