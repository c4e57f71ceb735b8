//! Strongly-typed identifiers.
//!
//! The admin server identifies policies and services by numeric ids. Each
//! identifier type is a thin wrapper around a `u64` with a phantom marker
//! so a service id can never be passed where a policy id is expected.
//!
//! # Examples
//!
//! ```
//! use bastion_core::id::{PolicyId, ServiceId};
//! use std::str::FromStr;
//!
//! let policy_id = PolicyId::from_value(12);
//! let service_id = ServiceId::from_str("3").unwrap();
//!
//! assert_eq!(policy_id.to_string(), "12");
//! assert_eq!(service_id.value(), 3);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// A type-safe numeric identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Id<T> {
    value: u64,
    #[serde(skip)]
    _marker: std::marker::PhantomData<T>,
}

impl<T> Id<T> {
    /// Wrap a raw numeric id.
    pub fn from_value(value: u64) -> Self {
        Self {
            value,
            _marker: std::marker::PhantomData,
        }
    }

    /// Get the raw numeric id.
    pub fn value(&self) -> u64 {
        self.value
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> FromStr for Id<T> {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_value(s.trim().parse()?))
    }
}

/// Marker type for policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolicyMarker;
/// Identifier for a policy.
pub type PolicyId = Id<PolicyMarker>;

/// Marker type for services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceMarker;
/// Identifier for a service.
pub type ServiceId = Id<ServiceMarker>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(PolicyId::from_value(42).to_string(), "42");
    }

    #[test]
    fn test_id_from_str() {
        let id = ServiceId::from_str(" 9 ").unwrap();
        assert_eq!(id.value(), 9);
        assert!(PolicyId::from_str("abc").is_err());
    }

    #[test]
    fn test_id_ordering() {
        assert!(PolicyId::from_value(1) < PolicyId::from_value(2));
    }

    #[test]
    fn test_id_serde_is_plain_number() {
        let id = PolicyId::from_value(17);
        let serialized = serde_json::to_string(&id).unwrap();
        assert_eq!(serialized, "17");
        let deserialized: PolicyId = serde_json::from_str(&serialized).unwrap();
        assert_eq!(id, deserialized);
    }
}
