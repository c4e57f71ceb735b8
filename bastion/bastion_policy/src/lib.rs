//! # Bastion Policy
//!
//! `bastion_policy` is the core of the Bastion policy editor: it decides
//! whether an edited access policy is complete enough to be stored, and
//! drives the save and delete round trips with the policy store.
//!
//! Key concepts:
//!
//! 1. **Rule list**: One of the four ordered item lists of a policy (allow,
//!    allow exceptions, deny, deny exceptions).
//!
//! 2. **Verdict**: The boolean summary of one rule list produced by the
//!    `RuleSetValidator`.
//!
//! 3. **Aggregation**: The `PolicyValidationAggregator` turns the four
//!    verdicts into a single go/no-go decision and at most one message.
//!
//! 4. **Editor**: The `PolicyEditor` owns a policy for one edit session and
//!    reports every outcome through its UI collaborators.

pub mod engine;
pub mod lifecycle;
pub mod messages;
pub mod model;
pub mod store;

// Re-export key types and traits for convenience
pub use engine::{AggregationOutcome, PolicyValidationAggregator, RuleSetValidator};
pub use lifecycle::{
    DeleteOutcome, EditorCollaborators, EditorState, Navigator, Notifier, PolicyEditor,
    PolicyForm, SaveOutcome,
};
pub use messages::{DefaultCatalog, MessageCatalog, MessageKey};
pub use model::{Policy, PolicyItem, PolicyVerdicts, RuleListKind, ServiceRef, ValidationVerdict};
pub use store::{InMemoryPolicyStore, JsonDirPolicyStore, PolicyStore, SaveOptions};
