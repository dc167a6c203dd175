//! Actor identity and addressing
//!
//! TigerStyle: Explicit types, validation on construction, immutable after creation.

use crate::constants::*;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

// =============================================================================
// ServiceType
// =============================================================================

/// Declared capability of an actor, used only for discovery
///
/// A `(namespace, name)` pair such as `("acme", "EchoService")`. The namespace
/// is the manufacturer in package metadata.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ServiceType {
    namespace: String,
    name: String,
}

impl ServiceType {
    /// Create a new ServiceType with validation
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        let name = name.into();

        let invalid = |reason: String| Error::InvalidServiceType {
            value: format!("{}:{}", namespace, name),
            reason,
        };

        if namespace.is_empty() {
            return Err(invalid("namespace must not be empty".into()));
        }
        if name.is_empty() {
            return Err(invalid("name must not be empty".into()));
        }
        if namespace.len() > SERVICE_NAMESPACE_LENGTH_BYTES_MAX {
            return Err(invalid(format!(
                "namespace length {} exceeds limit {}",
                namespace.len(),
                SERVICE_NAMESPACE_LENGTH_BYTES_MAX
            )));
        }
        if name.len() > SERVICE_NAME_LENGTH_BYTES_MAX {
            return Err(invalid(format!(
                "name length {} exceeds limit {}",
                name.len(),
                SERVICE_NAME_LENGTH_BYTES_MAX
            )));
        }

        let valid_chars = |s: &str| {
            s.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        };
        if !valid_chars(&namespace) {
            return Err(invalid("namespace contains invalid characters".into()));
        }
        if !valid_chars(&name) {
            return Err(invalid("name contains invalid characters".into()));
        }

        Ok(Self { namespace, name })
    }

    /// Get the namespace (manufacturer)
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Get the service name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

// =============================================================================
// ActorId
// =============================================================================

/// Opaque identity of a running actor
///
/// Assigned by the runtime at attach time and never reused while the owning
/// system lives. Callers compare and display it; they never build one.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActorId {
    realm_id: u32,
    serial: u64,
    service_type: ServiceType,
}

impl ActorId {
    /// Create an ActorId (runtime use)
    #[doc(hidden)]
    pub fn new(realm_id: u32, serial: u64, service_type: ServiceType) -> Self {
        debug_assert!(serial > 0, "serial numbers start at 1");
        Self {
            realm_id,
            serial,
            service_type,
        }
    }

    /// Realm the actor was deployed into
    pub fn realm_id(&self) -> u32 {
        self.realm_id
    }

    /// Serial number unique within the owning system
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Service type the actor was attached as
    pub fn service_type(&self) -> &ServiceType {
        &self.service_type
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}#{}",
            self.realm_id, self.service_type, self.serial
        )
    }
}

// =============================================================================
// Dest
// =============================================================================

/// Target of an outbound call
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Dest {
    /// A specific actor by identity
    Actor(ActorId),
}

impl Dest {
    /// Address a specific actor
    pub fn actor(id: ActorId) -> Self {
        Self::Actor(id)
    }

    /// The identity this destination resolves to
    pub fn actor_id(&self) -> &ActorId {
        match self {
            Self::Actor(id) => id,
        }
    }
}

impl From<ActorId> for Dest {
    fn from(id: ActorId) -> Self {
        Self::Actor(id)
    }
}

impl fmt::Display for Dest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actor(id) => write!(f, "actor({})", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_type_valid() {
        let st = ServiceType::new("acme", "EchoService").unwrap();
        assert_eq!(st.namespace(), "acme");
        assert_eq!(st.name(), "EchoService");
        assert_eq!(st.to_string(), "acme:EchoService");
    }

    #[test]
    fn test_service_type_invalid() {
        assert!(matches!(
            ServiceType::new("", "EchoService"),
            Err(Error::InvalidServiceType { .. })
        ));
        assert!(ServiceType::new("acme", "Echo Service").is_err());
        let long = "a".repeat(SERVICE_NAME_LENGTH_BYTES_MAX + 1);
        assert!(ServiceType::new("acme", long).is_err());
    }

    #[test]
    fn test_actor_id_display() {
        let st = ServiceType::new("acme", "EchoService").unwrap();
        let id = ActorId::new(1001, 7, st);
        assert_eq!(id.to_string(), "1001/acme:EchoService#7");
        assert_eq!(id.realm_id(), 1001);
        assert_eq!(id.serial(), 7);
    }

    #[test]
    fn test_dest_from_actor_id() {
        let st = ServiceType::new("acme", "EchoService").unwrap();
        let id = ActorId::new(1, 1, st);
        let dest = Dest::from(id.clone());
        assert_eq!(dest, Dest::actor(id.clone()));
        assert_eq!(dest.actor_id(), &id);
    }
}
