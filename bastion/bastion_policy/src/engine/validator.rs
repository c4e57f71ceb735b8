//! Rule list validation.

use log::trace;

use crate::model::{Policy, PolicyItem, PolicyVerdicts, RuleListKind, ValidationVerdict};

/// Computes the completeness verdict of a rule list.
///
/// One validator handles all four lists; the list's role only matters to
/// the aggregator's ordering.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleSetValidator;

impl RuleSetValidator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self
    }

    /// Summarize one rule list.
    ///
    /// Each flag is the OR over every item in the list. An empty list yields
    /// all flags false apart from the carried audit flag.
    ///
    /// # Arguments
    ///
    /// * `items` - The items of one rule list.
    /// * `audit_logging` - The policy's audit flag, carried into the verdict.
    ///
    /// # Returns
    ///
    /// The list's verdict. `group_perm_set` always equals `perm_set`.
    pub fn validate(&self, items: &[PolicyItem], audit_logging: bool) -> ValidationVerdict {
        let verdict = items.iter().fold(
            ValidationVerdict {
                audit_logging,
                ..ValidationVerdict::default()
            },
            |mut acc, item| {
                let groups = item.has_groups();
                let users = item.has_users();
                let perms = item.has_permissions();

                acc.group_set |= groups;
                acc.user_set |= users;
                acc.perm_set |= groups && perms;
                acc.user_perm |= users && perms;
                acc.cond_set |= item.has_condition();
                acc
            },
        );

        ValidationVerdict {
            group_perm_set: verdict.perm_set,
            ..verdict
        }
    }

    /// Summarize every rule list of a policy, in validation order.
    pub fn validate_policy(&self, policy: &Policy) -> PolicyVerdicts {
        let audit_logging = policy.is_audit_enabled;
        let verdicts = RuleListKind::ALL.map(|kind| {
            let verdict = self.validate(policy.rule_list(kind), audit_logging);
            trace!("Verdict for {} list: {:?}", kind, verdict);
            verdict
        });

        PolicyVerdicts::new(verdicts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PolicyItemCondition;

    #[test]
    fn test_empty_list_has_all_flags_false() {
        let verdict = RuleSetValidator::new().validate(&[], false);
        assert_eq!(verdict, ValidationVerdict::default());
    }

    #[test]
    fn test_empty_list_carries_audit_flag() {
        let verdict = RuleSetValidator::new().validate(&[], true);
        assert!(verdict.audit_logging);
        assert!(!verdict.group_set && !verdict.user_set && !verdict.perm_set);
        assert!(!verdict.user_perm && !verdict.group_perm_set && !verdict.cond_set);
    }

    #[test]
    fn test_perm_set_considers_every_item() {
        let items = vec![
            PolicyItem::new().with_users(["alice"]),
            PolicyItem::new(),
            PolicyItem::new().with_groups(["g1"]).with_accesses(["read"]),
        ];

        let verdict = RuleSetValidator::new().validate(&items, true);
        assert!(verdict.perm_set);
        assert!(verdict.group_perm_set);
        assert!(verdict.group_set);
        assert!(verdict.user_set);
        assert!(!verdict.user_perm);
    }

    #[test]
    fn test_permission_must_sit_on_the_same_item() {
        // Groups on one item and accesses on another do not pair up
        let items = vec![
            PolicyItem::new().with_groups(["g1"]),
            PolicyItem::new().with_accesses(["read"]),
        ];

        let verdict = RuleSetValidator::new().validate(&items, true);
        assert!(verdict.group_set);
        assert!(!verdict.perm_set);
    }

    #[test]
    fn test_user_without_permission() {
        let items = vec![PolicyItem::new().with_users(["alice"])];
        let verdict = RuleSetValidator::new().validate(&items, true);
        assert!(verdict.user_set);
        assert!(!verdict.user_perm);
    }

    #[test]
    fn test_condition_flag() {
        let items = vec![PolicyItem::new()
            .with_condition(PolicyItemCondition::new("ip-range", ["192.168.0.0/16"]))];
        let verdict = RuleSetValidator::new().validate(&items, true);
        assert!(verdict.cond_set);
        assert!(!verdict.has_principal());
    }

    #[test]
    fn test_validate_does_not_mutate_input() {
        let items = vec![PolicyItem::new().with_users(["alice"]).with_accesses(["read"])];
        let before = items.clone();
        RuleSetValidator::new().validate(&items, false);
        assert_eq!(items, before);
    }

    #[test]
    fn test_validate_policy_orders_lists() {
        let policy = Policy::new("svc", "p")
            .with_audit_logging(false)
            .with_item(
                RuleListKind::DenyException,
                PolicyItem::new().with_users(["bob"]).with_accesses(["write"]),
            );

        let verdicts = RuleSetValidator::new().validate_policy(&policy);
        assert!(verdicts.get(RuleListKind::DenyException).user_perm);
        assert!(!verdicts.get(RuleListKind::Allow).user_perm);
        assert!(verdicts.iter().all(|(_, v)| !v.audit_logging));
    }
}
