//! Validation verdict model.
//!
//! A verdict is the boolean summary of one rule list. It is produced fresh
//! for every validation pass and consumed once by the aggregator.

use serde::Serialize;

use crate::model::RuleListKind;

/// Completeness summary of one rule list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidationVerdict {
    /// Some item lists a group.
    pub group_set: bool,

    /// Some item lists a user.
    pub user_set: bool,

    /// Some item lists a group together with a permission.
    pub perm_set: bool,

    /// Some item lists a user together with a permission.
    pub user_perm: bool,

    /// Same as `perm_set`; read by the audit gate.
    pub group_perm_set: bool,

    /// Some item carries a condition.
    pub cond_set: bool,

    /// Audit logging flag of the policy the list belongs to.
    pub audit_logging: bool,
}

impl ValidationVerdict {
    /// Whether the list pairs groups or users with permissions.
    pub fn is_valid(&self) -> bool {
        (self.group_set && self.perm_set) || (self.user_set && self.user_perm)
    }

    /// Whether any principal appears in the list.
    pub fn has_principal(&self) -> bool {
        self.group_set || self.user_set
    }
}

/// Verdicts for all four rule lists of a policy, in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PolicyVerdicts {
    verdicts: [ValidationVerdict; 4],
}

impl PolicyVerdicts {
    /// Build from verdicts given in `RuleListKind::ALL` order.
    pub fn new(verdicts: [ValidationVerdict; 4]) -> Self {
        Self { verdicts }
    }

    /// Verdict of one list.
    pub fn get(&self, kind: RuleListKind) -> &ValidationVerdict {
        &self.verdicts[kind.index()]
    }

    /// Verdicts tagged with their list, in validation order.
    pub fn iter(&self) -> impl Iterator<Item = (RuleListKind, &ValidationVerdict)> {
        RuleListKind::ALL.into_iter().zip(self.verdicts.iter())
    }
}
