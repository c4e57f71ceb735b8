//! In-memory policy store.

use async_trait::async_trait;
use bastion_core::error::PersistenceError;
use bastion_core::id::PolicyId;
use bastion_core::log_event;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::{check_document, check_name_unique, stamp, PolicyStore, SaveOptions};
use crate::model::Policy;

/// An in-memory policy store.
///
/// Clones share the same underlying map.
#[derive(Clone)]
pub struct InMemoryPolicyStore {
    /// The policies, indexed by ID.
    policies: Arc<DashMap<PolicyId, Policy>>,

    /// Next ID to hand out.
    next_id: Arc<AtomicU64>,

    /// Serializes writes so the name check and the insert see the same map.
    write_lock: Arc<Mutex<()>>,
}

impl InMemoryPolicyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            policies: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(1)),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Number of stored policies.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    fn allocate_id(&self) -> PolicyId {
        PolicyId::from_value(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for InMemoryPolicyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PolicyStore for InMemoryPolicyStore {
    // Writes complete before the call returns, so `wait` changes nothing here.
    async fn save(&self, policy: &Policy, _options: SaveOptions) -> Result<Policy, PersistenceError> {
        check_document(policy)?;

        let _guard = self.write_lock.lock();

        let previous = match policy.id {
            Some(id) => Some(
                self.policies
                    .get(&id)
                    .map(|entry| entry.value().clone())
                    .ok_or(PersistenceError::NotFound(id))?,
            ),
            None => None,
        };

        {
            let stored: Vec<Policy> = self.policies.iter().map(|e| e.value().clone()).collect();
            check_name_unique(policy, &stored)?;
        }

        let id = match policy.id {
            Some(id) => id,
            None => self.allocate_id(),
        };

        let stored = stamp(policy, id, previous.as_ref());
        self.policies.insert(id, stored.clone());

        log_event!(LogLevel::Debug, "Policy stored",
            id => id,
            version => stored.version.unwrap_or_default(),
        );

        Ok(stored)
    }

    async fn destroy(&self, id: PolicyId) -> Result<(), PersistenceError> {
        let _guard = self.write_lock.lock();

        if self.policies.remove(&id).is_none() {
            return Err(PersistenceError::NotFound(id));
        }

        Ok(())
    }

    async fn get(&self, id: PolicyId) -> Result<Policy, PersistenceError> {
        self.policies
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(PersistenceError::NotFound(id))
    }

    async fn list_for_service(&self, service: &str) -> Result<Vec<Policy>, PersistenceError> {
        let mut policies: Vec<Policy> = self
            .policies
            .iter()
            .filter(|entry| entry.value().service == service)
            .map(|entry| entry.value().clone())
            .collect();

        policies.sort_by_key(|p| p.id);

        Ok(policies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_assigns_id() {
        let store = InMemoryPolicyStore::new();

        let first = store.save(&Policy::new("svc", "a"), SaveOptions::default()).await.unwrap();
        let second = store.save(&Policy::new("svc", "b"), SaveOptions::default()).await.unwrap();

        assert_eq!(first.id, Some(PolicyId::from_value(1)));
        assert_eq!(second.id, Some(PolicyId::from_value(2)));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_update_bumps_version() {
        let store = InMemoryPolicyStore::new();
        let mut policy = store.save(&Policy::new("svc", "a"), SaveOptions::default()).await.unwrap();

        policy.description = "changed".into();
        let updated = store.save(&policy, SaveOptions::default()).await.unwrap();

        assert_eq!(updated.id, policy.id);
        assert_eq!(updated.version, Some(2));
        assert_eq!(store.len(), 1);

        let fetched = store.get(policy.id.unwrap()).await.unwrap();
        assert_eq!(fetched.description, "changed");
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let store = InMemoryPolicyStore::new();
        let mut policy = Policy::new("svc", "a");
        policy.id = Some(PolicyId::from_value(42));

        let err = store.save(&policy, SaveOptions::default()).await.unwrap_err();
        assert!(matches!(err, PersistenceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let store = InMemoryPolicyStore::new();
        store.save(&Policy::new("svc", "a"), SaveOptions::default()).await.unwrap();

        let err = store.save(&Policy::new("svc", "a"), SaveOptions::default()).await.unwrap_err();
        assert!(matches!(err, PersistenceError::Conflict(_)));
        assert_eq!(store.len(), 1);

        assert!(store.save(&Policy::new("other", "a"), SaveOptions::default()).await.is_ok());
    }

    #[tokio::test]
    async fn test_destroy() {
        let store = InMemoryPolicyStore::new();
        let policy = store.save(&Policy::new("svc", "a"), SaveOptions::default()).await.unwrap();
        let id = policy.id.unwrap();

        store.destroy(id).await.unwrap();
        assert!(store.is_empty());

        let err = store.destroy(id).await.unwrap_err();
        assert!(matches!(err, PersistenceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_for_service() {
        let store = InMemoryPolicyStore::new();
        store.save(&Policy::new("svc", "b"), SaveOptions::default()).await.unwrap();
        store.save(&Policy::new("other", "x"), SaveOptions::default()).await.unwrap();
        store.save(&Policy::new("svc", "a"), SaveOptions::default()).await.unwrap();

        let names: Vec<String> = store
            .list_for_service("svc")
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
