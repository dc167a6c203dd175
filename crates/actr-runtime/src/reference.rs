//! External references to running actors
//!
//! TigerStyle: Location-transparent handles with explicit error handling.

use crate::lifecycle::LifecycleState;
use crate::node::ActorShared;
use crate::router::SystemRouter;
use crate::stats::DispatchStats;
use actr_core::codec;
use actr_core::error::{Error, Result};
use actr_core::{ActorId, RouteKey};
use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Handle to a running actor
///
/// Owns no business state. Clones share the same actor.
#[derive(Debug, Clone)]
pub struct ActorRef {
    shared: Arc<ActorShared>,
    router: Arc<SystemRouter>,
    default_timeout: Option<Duration>,
}

impl ActorRef {
    pub(crate) fn new(
        shared: Arc<ActorShared>,
        router: Arc<SystemRouter>,
        default_timeout: Option<Duration>,
    ) -> Self {
        Self {
            shared,
            router,
            default_timeout,
        }
    }

    /// Use `timeout` for calls through this handle
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    /// Calls through this handle wait as long as the actor takes
    pub fn without_timeout(mut self) -> Self {
        self.default_timeout = None;
        self
    }

    /// The actor's identity
    pub fn actor_id(&self) -> &ActorId {
        &self.shared.id
    }

    /// Current lifecycle state
    pub fn state(&self) -> LifecycleState {
        self.shared.lifecycle.state()
    }

    /// Whether `on_start` has returned
    pub fn is_ready(&self) -> bool {
        self.shared.ready.is_ready()
    }

    /// Snapshot of dispatch counters
    pub fn stats(&self) -> DispatchStats {
        self.shared.stats()
    }

    /// Send a request to the actor and wait for its response
    pub async fn call(&self, route_key: &str, payload: Bytes) -> Result<Bytes> {
        let key = RouteKey::parse(route_key)?;
        codec::check_payload_size(payload.len())?;

        match self.default_timeout {
            Some(timeout) => tokio::time::timeout(
                timeout,
                self.router.deliver(None, &self.shared.id, key, payload),
            )
            .await
            .map_err(|_| Error::CallTimeout {
                route_key: route_key.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })?,
            None => {
                self.router
                    .deliver(None, &self.shared.id, key, payload)
                    .await
            }
        }
    }

    /// Typed request using the JSON codec
    pub async fn request<Req, Resp>(&self, route_key: &str, request: &Req) -> Result<Resp>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let payload = codec::encode(request)?;
        let response = self.call(route_key, payload).await?;
        codec::decode(&response)
    }

    /// Request shutdown; idempotent and non-blocking
    pub fn shutdown(&self) {
        if self.shared.request_shutdown() {
            info!(actor_id = %self.shared.id, "shutdown requested");
        }
    }

    /// Wait until the actor is Stopped
    ///
    /// Returns immediately if it already is. Any number of tasks may wait.
    pub async fn wait_for_shutdown(&self) {
        self.shared
            .lifecycle
            .wait_for(LifecycleState::Stopped)
            .await;
    }

    /// Wait for Ctrl-C (or a shutdown requested elsewhere), then stop
    pub async fn wait_for_interrupt_and_shutdown(&self) {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => info!(actor_id = %self.shared.id, "interrupt received"),
                Err(e) => warn!(actor_id = %self.shared.id, error = %e, "failed to listen for interrupt"),
            },
            _ = self.shared.lifecycle.wait_for(LifecycleState::Stopping) => {}
        }
        self.shutdown();
        self.wait_for_shutdown().await;
    }
}
