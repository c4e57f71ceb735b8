//! Policy document model.
//!
//! Field names follow the admin server's JSON representation so documents
//! exported from the console can be loaded unchanged.

use bastion_core::id::PolicyId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::model::PolicyItem;

/// A security policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Policy {
    /// Identity assigned by the store. `None` means the policy is new.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<PolicyId>,

    /// Globally unique id assigned by the store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,

    /// Name of the owning service.
    pub service: String,

    /// Policy name, unique within the service.
    pub name: String,

    /// Free-form description.
    pub description: String,

    /// Whether the policy is enforced.
    pub is_enabled: bool,

    /// Whether access decisions under this policy are audited.
    pub is_audit_enabled: bool,

    /// Resources the policy applies to, keyed by resource type.
    pub resources: BTreeMap<String, PolicyResource>,

    /// Allow items.
    pub policy_items: Vec<PolicyItem>,

    /// Exceptions to the allow items.
    pub allow_exceptions: Vec<PolicyItem>,

    /// Deny items.
    pub deny_policy_items: Vec<PolicyItem>,

    /// Exceptions to the deny items.
    pub deny_exceptions: Vec<PolicyItem>,

    /// Revision, bumped by the store on every update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,

    /// When the policy was first stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,

    /// When the policy was last stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            id: None,
            guid: None,
            service: String::new(),
            name: String::new(),
            description: String::new(),
            is_enabled: true,
            is_audit_enabled: true,
            resources: BTreeMap::new(),
            policy_items: Vec::new(),
            allow_exceptions: Vec::new(),
            deny_policy_items: Vec::new(),
            deny_exceptions: Vec::new(),
            version: None,
            create_time: None,
            update_time: None,
        }
    }
}

impl Policy {
    /// Create a new, unsaved policy for a service.
    pub fn new(service: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Whether the policy has never been stored.
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Set the audit logging flag.
    pub fn with_audit_logging(mut self, enabled: bool) -> Self {
        self.is_audit_enabled = enabled;
        self
    }

    /// Add a resource.
    pub fn with_resource(mut self, resource_type: impl Into<String>, resource: PolicyResource) -> Self {
        self.resources.insert(resource_type.into(), resource);
        self
    }

    /// Append an item to one of the rule lists.
    pub fn with_item(mut self, kind: RuleListKind, item: PolicyItem) -> Self {
        self.rule_list_mut(kind).push(item);
        self
    }

    /// The items of one rule list.
    pub fn rule_list(&self, kind: RuleListKind) -> &[PolicyItem] {
        match kind {
            RuleListKind::Allow => &self.policy_items,
            RuleListKind::AllowException => &self.allow_exceptions,
            RuleListKind::Deny => &self.deny_policy_items,
            RuleListKind::DenyException => &self.deny_exceptions,
        }
    }

    /// Mutable access to one rule list.
    pub fn rule_list_mut(&mut self, kind: RuleListKind) -> &mut Vec<PolicyItem> {
        match kind {
            RuleListKind::Allow => &mut self.policy_items,
            RuleListKind::AllowException => &mut self.allow_exceptions,
            RuleListKind::Deny => &mut self.deny_policy_items,
            RuleListKind::DenyException => &mut self.deny_exceptions,
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "Policy '{}' ({}) of service '{}'", self.name, id, self.service),
            None => write!(f, "New policy '{}' of service '{}'", self.name, self.service),
        }
    }
}

/// Values of one resource type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PolicyResource {
    /// Resource values, e.g. paths or table names.
    pub values: Vec<String>,

    /// Whether the values are excluded rather than matched.
    pub is_excludes: bool,

    /// Whether the values match recursively.
    pub is_recursive: bool,
}

impl PolicyResource {
    /// Resource matching the given values.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// The four rule lists of a policy, in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleListKind {
    /// Allow items.
    Allow,

    /// Exceptions to the allow items.
    AllowException,

    /// Deny items.
    Deny,

    /// Exceptions to the deny items.
    DenyException,
}

impl RuleListKind {
    /// All lists, in the order they are validated.
    pub const ALL: [RuleListKind; 4] = [
        RuleListKind::Allow,
        RuleListKind::AllowException,
        RuleListKind::Deny,
        RuleListKind::DenyException,
    ];

    /// Stable name of the list.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::AllowException => "allow-exception",
            Self::Deny => "deny",
            Self::DenyException => "deny-exception",
        }
    }

    /// Position of the list in validation order.
    pub fn index(&self) -> usize {
        match self {
            Self::Allow => 0,
            Self::AllowException => 1,
            Self::Deny => 2,
            Self::DenyException => 3,
        }
    }
}

impl fmt::Display for RuleListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
