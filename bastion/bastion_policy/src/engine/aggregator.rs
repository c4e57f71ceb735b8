//! Policy validation aggregation.
//!
//! Combines the verdicts of the four rule lists into one decision and picks
//! the single message to show when the policy cannot be saved.

use bastion_core::log_event;
use serde::Serialize;

use crate::messages::MessageKey;
use crate::model::{PolicyVerdicts, RuleListKind, ValidationVerdict};

/// Result of aggregating the verdicts of a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AggregationOutcome {
    /// Whether the policy may be persisted.
    pub proceed: bool,

    /// Message explaining why not.
    pub message: Option<MessageKey>,

    /// List that failed, when the failure is specific to one list.
    pub failed_list: Option<RuleListKind>,
}

impl AggregationOutcome {
    /// The policy may be persisted.
    pub fn proceed() -> Self {
        Self {
            proceed: true,
            message: None,
            failed_list: None,
        }
    }

    /// The policy may not be persisted.
    pub fn blocked(message: MessageKey, failed_list: Option<RuleListKind>) -> Self {
        Self {
            proceed: false,
            message: Some(message),
            failed_list,
        }
    }
}

/// Decides whether a policy is save-worthy.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyValidationAggregator;

impl PolicyValidationAggregator {
    /// Create a new aggregator.
    pub fn new() -> Self {
        Self
    }

    /// Aggregate the verdicts of all four lists.
    ///
    /// The audit gate runs first and once for the whole policy. The lists
    /// are then checked in validation order and the first failing list
    /// decides the message.
    ///
    /// # Arguments
    ///
    /// * `verdicts` - One verdict per rule list, from [`RuleSetValidator::validate_policy`].
    ///
    /// # Returns
    ///
    /// An outcome that either lets the save proceed, or blocks it with the
    /// message to show and the list that failed. The audit gate blocks
    /// without naming a list.
    ///
    /// [`RuleSetValidator::validate_policy`]: crate::engine::RuleSetValidator::validate_policy
    pub fn aggregate(&self, verdicts: &PolicyVerdicts) -> AggregationOutcome {
        if !self.passes_audit_gate(verdicts) {
            log_event!(LogLevel::Debug, "Audit gate failed", audit_logging => false);
            return AggregationOutcome::blocked(MessageKey::AuditLoggingOff, None);
        }

        for (kind, verdict) in verdicts.iter() {
            if let Some(message) = self.check_rule_list(verdict) {
                log_event!(LogLevel::Debug, "Rule list incomplete",
                    list => kind,
                    message => message,
                );
                return AggregationOutcome::blocked(message, Some(kind));
            }
        }

        AggregationOutcome::proceed()
    }

    /// Audit logging must be on, or something must be granted somewhere.
    ///
    /// The audit flag is read from the allow list's verdict.
    pub fn passes_audit_gate(&self, verdicts: &PolicyVerdicts) -> bool {
        let audit_logging = verdicts.get(RuleListKind::Allow).audit_logging;
        let group_perm = verdicts.iter().any(|(_, v)| v.group_perm_set);
        let user_perm = verdicts.iter().any(|(_, v)| v.user_perm);

        audit_logging || group_perm || user_perm
    }

    /// Check one list for principal/permission pairing.
    ///
    /// Returns the message for the first rule that fails, or `None` when the
    /// list may be saved.
    pub fn check_rule_list(&self, verdict: &ValidationVerdict) -> Option<MessageKey> {
        if !verdict.is_valid() && !verdict.has_principal() {
            if verdict.cond_set {
                return Some(MessageKey::AddUserOrGroupForCondition);
            }
            if verdict.perm_set {
                return Some(MessageKey::AddUserOrGroup);
            }
        }

        // Checked group before user, whether or not the list is valid. A list
        // that matches none of these passes, including a list with no
        // principals, permissions or conditions at all.
        if verdict.group_set && !verdict.perm_set {
            Some(MessageKey::AddGroupPermission)
        } else if verdict.perm_set && !verdict.group_set {
            Some(MessageKey::AddGroup)
        } else if verdict.user_set && !verdict.user_perm {
            Some(MessageKey::AddUserPermission)
        } else if verdict.user_perm && !verdict.user_set {
            Some(MessageKey::AddUser)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RuleSetValidator;
    use crate::model::{Policy, PolicyItem, PolicyItemCondition};

    fn outcome_for(policy: &Policy) -> AggregationOutcome {
        let verdicts = RuleSetValidator::new().validate_policy(policy);
        PolicyValidationAggregator::new().aggregate(&verdicts)
    }

    fn verdict(flags: &[&str]) -> ValidationVerdict {
        let mut v = ValidationVerdict::default();
        for flag in flags {
            match *flag {
                "group" => v.group_set = true,
                "user" => v.user_set = true,
                "perm" => {
                    v.perm_set = true;
                    v.group_perm_set = true;
                }
                "user_perm" => v.user_perm = true,
                "cond" => v.cond_set = true,
                other => panic!("unknown flag {}", other),
            }
        }
        v
    }

    #[test]
    fn test_empty_policy_with_audit_proceeds() {
        let outcome = outcome_for(&Policy::new("svc", "empty"));
        assert_eq!(outcome, AggregationOutcome::proceed());
    }

    #[test]
    fn test_empty_policy_without_audit_is_blocked() {
        let outcome = outcome_for(&Policy::new("svc", "empty").with_audit_logging(false));
        assert!(!outcome.proceed);
        assert_eq!(outcome.message, Some(MessageKey::AuditLoggingOff));
        assert_eq!(outcome.failed_list, None);
    }

    #[test]
    fn test_user_without_permission() {
        let policy = Policy::new("svc", "p")
            .with_item(RuleListKind::Allow, PolicyItem::new().with_users(["alice"]));

        let outcome = outcome_for(&policy);
        assert!(!outcome.proceed);
        assert_eq!(outcome.message, Some(MessageKey::AddUserPermission));
        assert_eq!(outcome.failed_list, Some(RuleListKind::Allow));
    }

    #[test]
    fn test_group_with_permission_proceeds() {
        let policy = Policy::new("svc", "p").with_item(
            RuleListKind::Allow,
            PolicyItem::new().with_groups(["g1"]).with_accesses(["read"]),
        );
        assert!(outcome_for(&policy).proceed);
    }

    #[test]
    fn test_audit_gate_precedes_list_checks() {
        // Deny list is structurally broken, but the audit gate speaks first
        let policy = Policy::new("svc", "p")
            .with_audit_logging(false)
            .with_item(RuleListKind::Deny, PolicyItem::new().with_groups(["g1"]));

        let outcome = outcome_for(&policy);
        assert_eq!(outcome.message, Some(MessageKey::AuditLoggingOff));
    }

    #[test]
    fn test_grant_in_any_list_satisfies_audit_gate() {
        let policy = Policy::new("svc", "p").with_audit_logging(false).with_item(
            RuleListKind::DenyException,
            PolicyItem::new().with_users(["bob"]).with_accesses(["read"]),
        );
        assert!(outcome_for(&policy).proceed);
    }

    #[test]
    fn test_first_failing_list_wins() {
        let policy = Policy::new("svc", "p")
            .with_item(RuleListKind::DenyException, PolicyItem::new().with_users(["u"]))
            .with_item(RuleListKind::AllowException, PolicyItem::new().with_groups(["g"]));

        let outcome = outcome_for(&policy);
        assert_eq!(outcome.failed_list, Some(RuleListKind::AllowException));
        assert_eq!(outcome.message, Some(MessageKey::AddGroupPermission));
    }

    #[test]
    fn test_condition_without_principal() {
        let policy = Policy::new("svc", "p").with_item(
            RuleListKind::Allow,
            PolicyItem::new()
                .with_accesses(["read"])
                .with_condition(PolicyItemCondition::new("ip-range", ["10.0.0.1"])),
        );
        assert_eq!(
            outcome_for(&policy).message,
            Some(MessageKey::AddUserOrGroupForCondition)
        );
    }

    #[test]
    fn test_valid_list_still_checks_other_pairing() {
        let policy = Policy::new("svc", "p")
            .with_item(
                RuleListKind::Allow,
                PolicyItem::new().with_groups(["g1"]).with_accesses(["read"]),
            )
            .with_item(RuleListKind::Allow, PolicyItem::new().with_users(["alice"]));

        assert_eq!(
            outcome_for(&policy).message,
            Some(MessageKey::AddUserPermission)
        );

        let policy = Policy::new("svc", "p")
            .with_item(RuleListKind::Allow, PolicyItem::new().with_groups(["g1"]))
            .with_item(
                RuleListKind::Allow,
                PolicyItem::new().with_users(["alice"]).with_accesses(["read"]),
            );

        assert_eq!(
            outcome_for(&policy).message,
            Some(MessageKey::AddGroupPermission)
        );
    }

    #[test]
    fn test_permission_only_item_falls_through() {
        let policy = Policy::new("svc", "p")
            .with_item(RuleListKind::Allow, PolicyItem::new().with_accesses(["read"]));
        assert!(outcome_for(&policy).proceed);
    }

    #[test]
    fn test_check_rule_list_branches() {
        let aggregator = PolicyValidationAggregator::new();
        let cases: Vec<(&[&str], Option<MessageKey>)> = vec![
            (&[][..], None),
            (&["cond"][..], Some(MessageKey::AddUserOrGroupForCondition)),
            (&["perm"][..], Some(MessageKey::AddUserOrGroup)),
            (&["group"][..], Some(MessageKey::AddGroupPermission)),
            (&["user"][..], Some(MessageKey::AddUserPermission)),
            (&["user_perm"][..], Some(MessageKey::AddUser)),
            (&["group", "perm"][..], None),
            (&["user", "user_perm"][..], None),
            (&["group", "perm", "user"][..], Some(MessageKey::AddUserPermission)),
            (&["group", "user", "user_perm"][..], Some(MessageKey::AddGroupPermission)),
            (&["group", "perm", "user_perm"][..], Some(MessageKey::AddUser)),
            (&["group", "cond"][..], Some(MessageKey::AddGroupPermission)),
        ];

        for (flags, expected) in cases {
            assert_eq!(
                aggregator.check_rule_list(&verdict(flags)),
                expected,
                "flags {:?}",
                flags
            );
        }
    }
}
