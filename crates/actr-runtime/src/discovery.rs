//! Service discovery
//!
//! TigerStyle: Single attempt, deterministic choice, no hidden retries.

use actr_core::error::{Error, Result};
use actr_core::{ActorId, ServiceType};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

/// Resolves service types to live actors
#[async_trait]
pub trait Discovery: Send + Sync + std::fmt::Debug {
    /// Make an actor discoverable under its service type
    async fn register(&self, actor_id: &ActorId) -> Result<()>;

    /// Remove an actor; unknown ids are ignored
    async fn unregister(&self, actor_id: &ActorId) -> Result<()>;

    /// Resolve a service type to one live actor
    async fn discover(&self, service_type: &ServiceType) -> Result<ActorId>;

    /// All actors registered under a service type, in registration order
    async fn list(&self, service_type: &ServiceType) -> Result<Vec<ActorId>>;
}

/// In-process discovery backed by a registration list
///
/// When several actors share a service type, the earliest registration wins.
#[derive(Debug, Default)]
pub struct LocalDiscovery {
    registrations: RwLock<Vec<ActorId>>,
}

impl LocalDiscovery {
    /// Create an empty discovery service
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Discovery for LocalDiscovery {
    async fn register(&self, actor_id: &ActorId) -> Result<()> {
        let mut registrations = self.registrations.write().await;
        if !registrations.contains(actor_id) {
            registrations.push(actor_id.clone());
            debug!(actor_id = %actor_id, "registered for discovery");
        }
        Ok(())
    }

    async fn unregister(&self, actor_id: &ActorId) -> Result<()> {
        let mut registrations = self.registrations.write().await;
        let before = registrations.len();
        registrations.retain(|id| id != actor_id);
        if registrations.len() != before {
            debug!(actor_id = %actor_id, "unregistered from discovery");
        }
        Ok(())
    }

    async fn discover(&self, service_type: &ServiceType) -> Result<ActorId> {
        let registrations = self.registrations.read().await;
        registrations
            .iter()
            .find(|id| id.service_type() == service_type)
            .cloned()
            .ok_or_else(|| Error::discovery_failed(service_type, "no registered actor"))
    }

    async fn list(&self, service_type: &ServiceType) -> Result<Vec<ActorId>> {
        let registrations = self.registrations.read().await;
        Ok(registrations
            .iter()
            .filter(|id| id.service_type() == service_type)
            .cloned()
            .collect())
    }
}
