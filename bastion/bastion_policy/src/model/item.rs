//! Policy item model.
//!
//! A policy item is one row of a rule list: who (users and groups) gets
//! which accesses, optionally narrowed by conditions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry within a rule list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PolicyItem {
    /// Accesses granted to the listed principals.
    pub accesses: Vec<PolicyItemAccess>,

    /// User principals.
    pub users: Vec<String>,

    /// Group principals.
    pub groups: Vec<String>,

    /// Extra constraints, e.g. an IP range.
    pub conditions: Vec<PolicyItemCondition>,

    /// Whether the principals may administer this policy.
    pub delegate_admin: bool,
}

impl PolicyItem {
    /// Create an empty item.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add user principals.
    pub fn with_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.users.extend(users.into_iter().map(Into::into));
        self
    }

    /// Add group principals.
    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.extend(groups.into_iter().map(Into::into));
        self
    }

    /// Grant the given access types.
    pub fn with_accesses<I, S>(mut self, access_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accesses
            .extend(access_types.into_iter().map(PolicyItemAccess::allowed));
        self
    }

    /// Attach a condition.
    pub fn with_condition(mut self, condition: PolicyItemCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Whether any user principal is listed.
    pub fn has_users(&self) -> bool {
        !self.users.is_empty()
    }

    /// Whether any group principal is listed.
    pub fn has_groups(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Whether any access is granted. Accesses carried with `isAllowed: false`
    /// grant nothing and do not count.
    pub fn has_permissions(&self) -> bool {
        self.accesses.iter().any(|access| access.is_allowed)
    }

    /// Whether a condition with at least one value is attached. Conditions
    /// without values are ignored.
    pub fn has_condition(&self) -> bool {
        self.conditions.iter().any(|c| !c.values.is_empty())
    }

    /// Whether the item pairs a principal with a permission.
    pub fn is_complete(&self) -> bool {
        self.has_permissions() && (self.has_groups() || self.has_users())
    }
}

/// An access granted by a policy item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyItemAccess {
    /// Access type token, e.g. `read`.
    #[serde(rename = "type")]
    pub access_type: String,

    /// Whether the access is allowed.
    #[serde(default = "default_allowed")]
    pub is_allowed: bool,
}

fn default_allowed() -> bool {
    true
}

impl PolicyItemAccess {
    /// An allowed access of the given type.
    pub fn allowed(access_type: impl Into<String>) -> Self {
        Self {
            access_type: access_type.into(),
            is_allowed: true,
        }
    }
}

impl fmt::Display for PolicyItemAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.access_type)
    }
}

/// A condition narrowing a policy item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyItemCondition {
    /// Condition type, e.g. `ip-range`.
    #[serde(rename = "type")]
    pub condition_type: String,

    /// Condition values.
    #[serde(default)]
    pub values: Vec<String>,
}

impl PolicyItemCondition {
    /// Create a condition.
    pub fn new<I, S>(condition_type: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            condition_type: condition_type.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_builders() {
        let item = PolicyItem::new()
            .with_users(["alice"])
            .with_groups(vec!["g1".to_string()])
            .with_accesses(["read", "write"]);

        assert!(item.has_users());
        assert!(item.has_groups());
        assert!(item.has_permissions());
        assert_eq!(item.accesses.len(), 2);
        assert!(item.accesses.iter().all(|a| a.is_allowed));
        assert!(item.is_complete());
    }

    #[test]
    fn test_item_completeness() {
        assert!(!PolicyItem::new().is_complete());
        assert!(!PolicyItem::new().with_users(["alice"]).is_complete());
        assert!(!PolicyItem::new().with_accesses(["read"]).is_complete());
        assert!(PolicyItem::new()
            .with_groups(["g1"])
            .with_accesses(["read"])
            .is_complete());
    }

    #[test]
    fn test_denied_access_is_not_a_permission() {
        let mut item = PolicyItem::new().with_users(["alice"]).with_accesses(["read"]);
        item.accesses[0].is_allowed = false;

        assert!(!item.has_permissions());
        assert!(!item.is_complete());

        item.accesses.push(PolicyItemAccess::allowed("write"));
        assert!(item.has_permissions());
        assert!(item.is_complete());
    }

    #[test]
    fn test_empty_condition_does_not_count() {
        let item = PolicyItem::new().with_condition(PolicyItemCondition::new(
            "ip-range",
            Vec::<String>::new(),
        ));
        assert!(!item.has_condition());

        let item = item.with_condition(PolicyItemCondition::new("ip-range", ["10.0.0.0/8"]));
        assert!(item.has_condition());
    }

    #[test]
    fn test_item_json_shape() {
        let item: PolicyItem = serde_json::from_str(
            r#"{"accesses":[{"type":"read"}],"users":["bob"],"delegateAdmin":true}"#,
        )
        .unwrap();

        assert_eq!(item.users, vec!["bob".to_string()]);
        assert!(item.groups.is_empty());
        assert!(item.accesses[0].is_allowed);
        assert!(item.delegate_admin);
    }
}
