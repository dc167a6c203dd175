//! In-process call routing
//!
//! TigerStyle: Explicit failure for every way a call can go nowhere.

use crate::directory::Directory;
use crate::discovery::Discovery;
use crate::mailbox::Envelope;
use actr_core::error::{Error, Result};
use actr_core::io::TimeProvider;
use actr_core::{ActorId, Dest, RouteKey, Router, ServiceType};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::trace;

/// Routes calls to actor mailboxes through the system directory
#[derive(Debug, Clone)]
pub struct SystemRouter {
    directory: Arc<Directory>,
    discovery: Arc<dyn Discovery>,
    time: Arc<dyn TimeProvider>,
}

impl SystemRouter {
    /// Create a router over `directory` and `discovery`
    pub fn new(
        directory: Arc<Directory>,
        discovery: Arc<dyn Discovery>,
        time: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            directory,
            discovery,
            time,
        }
    }

    /// Discovery service behind this router
    pub fn discovery(&self) -> &Arc<dyn Discovery> {
        &self.discovery
    }

    /// Deliver a request to `target` and wait for the response
    ///
    /// - target not live: `UnreachableDestination`, immediately
    /// - target stops before replying: `ActorStopping`
    pub async fn deliver(
        &self,
        caller: Option<&ActorId>,
        target: &ActorId,
        route_key: RouteKey,
        payload: Bytes,
    ) -> Result<Bytes> {
        let sender = self
            .directory
            .sender(target)
            .ok_or_else(|| Error::unreachable(target))?;

        trace!(target = %target, route_key = %route_key, "deliver");

        let (reply_tx, reply_rx) = oneshot::channel();
        let envelope = Envelope::new_with_time(
            route_key,
            payload,
            caller.cloned(),
            reply_tx,
            self.time.as_ref(),
        );

        // Suspends while the mailbox is full
        sender
            .send(envelope)
            .await
            .map_err(|_| Error::stopping(target))?;

        reply_rx.await.map_err(|_| Error::stopping(target))?
    }
}

#[async_trait]
impl Router for SystemRouter {
    async fn route(
        &self,
        caller: &ActorId,
        dest: &Dest,
        route_key: RouteKey,
        payload: Bytes,
    ) -> Result<Bytes> {
        match dest {
            Dest::Actor(target) => self.deliver(Some(caller), target, route_key, payload).await,
        }
    }

    async fn discover(&self, service_type: &ServiceType) -> Result<ActorId> {
        self.discovery.discover(service_type).await
    }
}
