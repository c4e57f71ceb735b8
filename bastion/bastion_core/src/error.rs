//! Error types for the Bastion policy editor.
//!
//! Errors are grouped by the part of the editor that raises them. The root
//! `Error` type wraps each of them so callers that do not care about the
//! origin can propagate with `?`.
//!
//! Note that a policy failing structural validation is *not* an error: the
//! aggregator reports it as an outcome carrying a message key. The types
//! here cover failures that stop an operation from running at all.

use crate::id::PolicyId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Root error type for the Bastion editor.
#[derive(Debug, Error)]
pub enum Error {
    /// Policy document errors
    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    /// Errors reported by the persistence collaborator
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Editor lifecycle errors
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Errors related to the policy document itself.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The document could not be understood as a policy
    #[error("Invalid policy document: {0}")]
    InvalidDocument(String),

    /// The policy belongs to a different service than the editor
    #[error("Policy belongs to service '{policy}', editor is bound to '{editor}'")]
    ServiceMismatch {
        /// Service the editor was opened for
        editor: String,

        /// Service named by the policy
        policy: String,
    },
}

/// Structured error body returned by the policy store.
///
/// Mirrors the admin server's response envelope; only `msgDesc` is ever
/// shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    /// Server status code, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg_desc: Option<String>,
}

impl ErrorPayload {
    /// Create a payload carrying only a description.
    pub fn described(msg_desc: impl Into<String>) -> Self {
        Self {
            status_code: None,
            msg_desc: Some(msg_desc.into()),
        }
    }
}

/// Errors reported by a policy store.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The store answered with an error payload
    #[error("Request rejected: {}", .0.msg_desc.as_deref().unwrap_or("no description"))]
    Rejected(ErrorPayload),

    /// Policy with the given ID does not exist
    #[error("Policy not found: {0}")]
    NotFound(PolicyId),

    /// Policy conflicts with an existing one
    #[error("Policy conflict: {0}")]
    Conflict(String),

    /// The store could not be reached or failed internally
    #[error("Storage failure: {0}")]
    Storage(String),

    /// I/O failure in a file-backed store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PersistenceError {
    /// The description the store supplied for this failure, if any.
    ///
    /// Transport-level failures carry no description; callers fall back to
    /// a generic message for those.
    pub fn description(&self) -> Option<String> {
        match self {
            Self::Rejected(payload) => payload
                .msg_desc
                .as_ref()
                .filter(|desc| !desc.trim().is_empty())
                .cloned(),
            Self::NotFound(id) => Some(format!("Policy {} does not exist", id)),
            Self::Conflict(desc) => Some(desc.clone()),
            Self::Storage(_) | Self::Io(_) | Self::Serialization(_) => None,
        }
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Errors raised by the editor state machine.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A save or delete request is still outstanding
    #[error("A request is already in flight")]
    RequestInFlight,

    /// The operation is not allowed in the current state
    #[error("Cannot {operation} while editor is {state}")]
    InvalidState {
        /// Operation that was attempted
        operation: &'static str,

        /// State the editor was in
        state: String,
    },

    /// Delete was requested for a policy that was never stored
    #[error("Policy has not been persisted yet")]
    NotPersisted,
}

/// Errors related to configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    /// Configuration file could not be parsed
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Configuration values are inconsistent
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type used throughout the Bastion crates.
pub type Result<T> = std::result::Result<T, Error>;
