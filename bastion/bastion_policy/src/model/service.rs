//! The service a policy belongs to.

use bastion_core::id::ServiceId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to the service owning the policies being edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRef {
    /// Numeric id, used to build the policy list route.
    pub id: ServiceId,

    /// Service name, stored on each policy.
    pub name: String,

    /// Service type, e.g. `hdfs` or `tag`.
    #[serde(rename = "type", default)]
    pub service_type: String,
}

impl ServiceRef {
    /// Create a service reference.
    pub fn new(id: ServiceId, name: impl Into<String>, service_type: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            service_type: service_type.into(),
        }
    }
}

impl fmt::Display for ServiceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Service '{}' ({})", self.name, self.id)
    }
}
