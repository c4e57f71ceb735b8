//! Policy models.
//!
//! This module defines the policy document, its items and the per-list
//! validation verdict.

pub mod item;
pub mod policy;
pub mod service;
pub mod verdict;

pub use item::{PolicyItem, PolicyItemAccess, PolicyItemCondition};
pub use policy::{Policy, PolicyResource, RuleListKind};
pub use service::ServiceRef;
pub use verdict::{PolicyVerdicts, ValidationVerdict};
