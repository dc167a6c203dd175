//! Actor system: configuration, identity assignment, and shared routing
//!
//! TigerStyle: Single entry point, explicit configuration, clean shutdown.

use crate::directory::Directory;
use crate::discovery::{Discovery, LocalDiscovery};
use crate::lifecycle::LifecycleState;
use crate::node::Node;
use crate::reference::ActorRef;
use crate::router::SystemRouter;
use actr_core::error::Result;
use actr_core::io::{TimeProvider, WallClockTime};
use actr_core::{ActorId, ActrConfig, ServiceType, Workload};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::info;

/// Host runtime for workloads in this process
///
/// Cheap to clone; clones share actors, directory, and discovery.
#[derive(Debug, Clone)]
pub struct ActorSystem {
    config: Arc<ActrConfig>,
    service_type: ServiceType,
    directory: Arc<Directory>,
    router: Arc<SystemRouter>,
    time: Arc<dyn TimeProvider>,
    serial_next: Arc<AtomicU64>,
    started: Arc<Mutex<HashMap<ActorId, ActorRef>>>,
}

impl ActorSystem {
    /// Create a system from validated configuration
    pub fn new(config: ActrConfig) -> Result<Self> {
        config.validate()?;
        let service_type = config.service_type()?;

        let directory = Arc::new(Directory::new());
        let time: Arc<dyn TimeProvider> = Arc::new(WallClockTime::new());
        let router = Arc::new(SystemRouter::new(
            directory.clone(),
            Arc::new(LocalDiscovery::new()),
            time.clone(),
        ));

        info!(
            package = %config.package.name,
            service_type = %service_type,
            realm_id = config.system.deployment.realm_id,
            "actor system created"
        );

        Ok(Self {
            config: Arc::new(config),
            service_type,
            directory,
            router,
            time,
            serial_next: Arc::new(AtomicU64::new(1)),
            started: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Create a system from an `Actr.toml` file
    pub fn from_toml(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(ActrConfig::from_file(path)?)
    }

    /// Replace the discovery service
    ///
    /// Call before attaching; actors already started keep the old one.
    pub fn with_discovery(mut self, discovery: Arc<dyn Discovery>) -> Self {
        self.router = Arc::new(SystemRouter::new(
            self.directory.clone(),
            discovery,
            self.time.clone(),
        ));
        self
    }

    /// Replace the time provider
    pub fn with_time(mut self, time: Arc<dyn TimeProvider>) -> Self {
        self.router = Arc::new(SystemRouter::new(
            self.directory.clone(),
            self.router.discovery().clone(),
            time.clone(),
        ));
        self.time = time;
        self
    }

    /// Attach a workload under the configured package service type
    pub fn attach<W: Workload>(&self, workload: W) -> Node<W> {
        self.attach_as(self.service_type.clone(), workload)
    }

    /// Attach a workload under an explicit service type
    pub fn attach_as<W: Workload>(&self, service_type: ServiceType, workload: W) -> Node<W> {
        let serial = self.serial_next.fetch_add(1, Ordering::SeqCst);
        let id = ActorId::new(self.config.system.deployment.realm_id, serial, service_type);
        Node::new(workload, id, self.clone())
    }

    /// Shut down every started actor and wait for all of them
    pub async fn shutdown_all(&self) {
        let actors: Vec<ActorRef> = self
            .started
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, actor)| actor)
            .collect();
        info!(count = actors.len(), "shutting down all actors");

        for actor in &actors {
            actor.shutdown();
        }
        futures::future::join_all(actors.iter().map(|actor| actor.wait_for_shutdown())).await;
    }

    /// Resolve a service type to a live actor, single attempt
    pub async fn discover(&self, service_type: &ServiceType) -> Result<ActorId> {
        self.router.discovery().discover(service_type).await
    }

    /// All discoverable actors of a service type, in registration order
    pub async fn list(&self, service_type: &ServiceType) -> Result<Vec<ActorId>> {
        self.router.discovery().list(service_type).await
    }

    /// Number of started actors that have not stopped yet
    pub fn started_count(&self) -> usize {
        self.started
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of actors currently reachable
    pub fn live_count(&self) -> usize {
        self.directory.len()
    }

    /// Configuration this system was built from
    pub fn config(&self) -> &ActrConfig {
        &self.config
    }

    /// Service type from package metadata
    pub fn service_type(&self) -> &ServiceType {
        &self.service_type
    }

    pub(crate) fn directory(&self) -> &Arc<Directory> {
        &self.directory
    }

    pub(crate) fn router(&self) -> Arc<SystemRouter> {
        self.router.clone()
    }

    pub(crate) fn time(&self) -> &Arc<dyn TimeProvider> {
        &self.time
    }

    pub(crate) fn default_call_timeout(&self) -> Option<Duration> {
        Some(Duration::from_millis(self.config.runtime.call_timeout_ms))
    }

    pub(crate) fn track(&self, actor: ActorRef) {
        let mut started = self.started.lock().unwrap_or_else(PoisonError::into_inner);
        // The inbound loop untracks after Stopped; if it already ran, skip
        if actor.state() != LifecycleState::Stopped {
            started.insert(actor.actor_id().clone(), actor);
        }
    }

    pub(crate) fn untrack(&self, actor_id: &ActorId) {
        self.started
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(actor_id);
    }
}
