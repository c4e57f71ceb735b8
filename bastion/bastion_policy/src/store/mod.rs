//! Policy storage.
//!
//! The editor talks to its store through the async `PolicyStore` trait. Two
//! implementations ship with the crate: an in-memory store and a store
//! keeping one JSON document per policy in a directory.

mod in_memory;
mod json_dir;

pub use in_memory::InMemoryPolicyStore;
pub use json_dir::JsonDirPolicyStore;

use async_trait::async_trait;
use bastion_core::error::{ErrorPayload, PersistenceError};
use bastion_core::id::PolicyId;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Policy;

/// Options for a save request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOptions {
    /// Resolve only once the store has confirmed the write.
    pub wait: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self { wait: true }
    }
}

/// Trait for policy storage.
///
/// A store assigns identity to new policies and is the owner of the
/// persisted copy. Every method resolves exactly once.
#[async_trait]
pub trait PolicyStore: Send + Sync + 'static {
    /// Create or update a policy.
    ///
    /// A policy without an id is created and receives one. A policy with an
    /// id replaces the stored copy.
    ///
    /// # Returns
    ///
    /// * `Ok(Policy)` - The policy as stored, with id and revision filled in.
    /// * `Err(PersistenceError)` - If the store refused or failed the write.
    async fn save(&self, policy: &Policy, options: SaveOptions) -> Result<Policy, PersistenceError>;

    /// Delete a stored policy.
    async fn destroy(&self, id: PolicyId) -> Result<(), PersistenceError>;

    /// Fetch a stored policy.
    async fn get(&self, id: PolicyId) -> Result<Policy, PersistenceError>;

    /// List the stored policies of a service, ordered by id.
    async fn list_for_service(&self, service: &str) -> Result<Vec<Policy>, PersistenceError>;
}

/// Reject documents no store will accept.
pub(crate) fn check_document(policy: &Policy) -> Result<(), PersistenceError> {
    if policy.name.trim().is_empty() {
        return Err(PersistenceError::Rejected(ErrorPayload {
            status_code: Some(400),
            msg_desc: Some("Policy name is required".to_string()),
        }));
    }

    if policy.service.trim().is_empty() {
        return Err(PersistenceError::Rejected(ErrorPayload {
            status_code: Some(400),
            msg_desc: Some("Service name is required".to_string()),
        }));
    }

    Ok(())
}

/// Policy names are unique within a service.
pub(crate) fn check_name_unique<'a, I>(policy: &Policy, stored: I) -> Result<(), PersistenceError>
where
    I: IntoIterator<Item = &'a Policy>,
{
    let clash = stored.into_iter().find(|other| {
        other.id != policy.id && other.service == policy.service && other.name == policy.name
    });

    match clash {
        Some(other) => Err(PersistenceError::Conflict(format!(
            "Another policy already exists for matching resource: policy-name=[{}], service=[{}], id=[{}]",
            other.name,
            other.service,
            other.id.map(|id| id.to_string()).unwrap_or_default()
        ))),
        None => Ok(()),
    }
}

/// Produce the stored copy of a policy.
///
/// `previous` is the copy being replaced, if any; creation time and guid
/// carry over from it and the version is bumped.
pub(crate) fn stamp(policy: &Policy, id: PolicyId, previous: Option<&Policy>) -> Policy {
    let now = Utc::now();
    let mut stored = policy.clone();

    stored.id = Some(id);
    stored.guid = previous
        .and_then(|p| p.guid.clone())
        .or_else(|| policy.guid.clone())
        .or_else(|| Some(Uuid::new_v4().to_string()));
    stored.create_time = previous.and_then(|p| p.create_time).or(Some(now));
    stored.update_time = Some(now);
    stored.version = Some(previous.and_then(|p| p.version).unwrap_or(0) + 1);

    stored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_options_default_waits() {
        assert!(SaveOptions::default().wait);
    }

    #[test]
    fn test_check_document() {
        assert!(check_document(&Policy::new("svc", "p")).is_ok());

        let err = check_document(&Policy::new("svc", "  ")).unwrap_err();
        assert_eq!(err.description().as_deref(), Some("Policy name is required"));

        assert!(check_document(&Policy::new("", "p")).is_err());
    }

    #[test]
    fn test_name_unique_ignores_self_and_other_services() {
        let mut stored = Policy::new("svc", "p");
        stored.id = Some(PolicyId::from_value(1));

        let mut same = stored.clone();
        same.description = "edited".into();
        assert!(check_name_unique(&same, [&stored]).is_ok());

        let other_service = Policy::new("other", "p");
        assert!(check_name_unique(&other_service, [&stored]).is_ok());

        let clash = Policy::new("svc", "p");
        let err = check_name_unique(&clash, [&stored]).unwrap_err();
        assert!(matches!(err, PersistenceError::Conflict(_)));
        assert!(err.description().unwrap().contains("policy-name=[p]"));
    }

    #[test]
    fn test_stamp_new_and_update() {
        let id = PolicyId::from_value(7);
        let created = stamp(&Policy::new("svc", "p"), id, None);

        assert_eq!(created.id, Some(id));
        assert_eq!(created.version, Some(1));
        assert!(created.guid.is_some());
        assert!(created.create_time.is_some());

        let updated = stamp(&created, id, Some(&created));
        assert_eq!(updated.version, Some(2));
        assert_eq!(updated.guid, created.guid);
        assert_eq!(updated.create_time, created.create_time);
    }
}
