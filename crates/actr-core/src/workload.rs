//! Workload contract: dispatch, lifecycle hooks, and the call context
//!
//! TigerStyle: Explicit seams, bounded waits, no hidden retries.
//!
//! A [`Workload`] is user code hosted by the runtime. The runtime hands it a
//! [`Context`] in every hook and dispatch; the context is the only way a
//! workload reaches other actors.

use crate::actor::{ActorId, Dest, ServiceType};
use crate::codec;
use crate::constants::DISCOVERY_TIMEOUT_MS_DEFAULT;
use crate::error::{Error, Result};
use crate::route::RouteKey;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

// =============================================================================
// Router seam
// =============================================================================

/// Routing backend behind a [`Context`]
///
/// The runtime implements this over its actor directory and discovery
/// service. Tests may implement it directly.
#[async_trait]
pub trait Router: Send + Sync + std::fmt::Debug {
    /// Deliver a request to `dest` and wait for its response
    ///
    /// Fails with `UnreachableDestination` if `dest` is not live.
    async fn route(
        &self,
        caller: &ActorId,
        dest: &Dest,
        route_key: RouteKey,
        payload: Bytes,
    ) -> Result<Bytes>;

    /// Resolve a service type to a live actor, single attempt
    async fn discover(&self, service_type: &ServiceType) -> Result<ActorId>;
}

// =============================================================================
// Context
// =============================================================================

/// Per-actor runtime context passed to hooks and dispatches
#[derive(Debug, Clone)]
pub struct Context {
    self_id: ActorId,
    router: Arc<dyn Router>,
    discovery_timeout_ms: u64,
}

impl Context {
    /// Create a context for `self_id` backed by `router`
    pub fn new(self_id: ActorId, router: Arc<dyn Router>) -> Self {
        Self {
            self_id,
            router,
            discovery_timeout_ms: DISCOVERY_TIMEOUT_MS_DEFAULT,
        }
    }

    /// Override the discovery timeout
    pub fn with_discovery_timeout_ms(mut self, timeout_ms: u64) -> Self {
        assert!(timeout_ms > 0, "discovery timeout must be positive");
        self.discovery_timeout_ms = timeout_ms;
        self
    }

    /// Identity of the actor this context belongs to
    pub fn self_id(&self) -> &ActorId {
        &self.self_id
    }

    /// Service type of the actor this context belongs to
    pub fn service_type(&self) -> &ServiceType {
        self.self_id.service_type()
    }

    /// Issue a request to another actor and wait for its response
    ///
    /// At-most-once: the runtime never retries. Suspends only the calling task.
    #[instrument(skip(self, payload), fields(caller = %self.self_id, dest = %dest), level = "debug")]
    pub async fn call(&self, dest: &Dest, route_key: &str, payload: Bytes) -> Result<Bytes> {
        let route_key = RouteKey::parse(route_key)?;
        codec::check_payload_size(payload.len())?;

        debug!(route_key = %route_key, size = payload.len(), "outbound call");
        self.router
            .route(&self.self_id, dest, route_key, payload)
            .await
    }

    /// Issue a request bounded by `timeout`
    ///
    /// On expiry the pending reply is discarded; the callee may still run.
    pub async fn call_with_timeout(
        &self,
        dest: &Dest,
        route_key: &str,
        payload: Bytes,
        timeout: Duration,
    ) -> Result<Bytes> {
        tokio::time::timeout(timeout, self.call(dest, route_key, payload))
            .await
            .map_err(|_| Error::CallTimeout {
                route_key: route_key.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })?
    }

    /// Typed request using the JSON codec
    pub async fn request<Req, Resp>(&self, dest: &Dest, route_key: &str, request: &Req) -> Result<Resp>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let payload = codec::encode(request)?;
        let response = self.call(dest, route_key, payload).await?;
        codec::decode(&response)
    }

    /// Resolve a peer by service type
    ///
    /// Single attempt, bounded by the discovery timeout.
    #[instrument(skip(self), fields(caller = %self.self_id), level = "debug")]
    pub async fn discover(&self, service_type: &ServiceType) -> Result<ActorId> {
        let timeout = Duration::from_millis(self.discovery_timeout_ms);
        match tokio::time::timeout(timeout, self.router.discover(service_type)).await {
            Ok(result) => result,
            Err(_) => Err(Error::DiscoveryTimeout {
                service_type: service_type.to_string(),
                timeout_ms: self.discovery_timeout_ms,
            }),
        }
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Routes an incoming request to the workload's handler logic
///
/// Invoked by the runtime for each call addressed to the actor. Dispatches may
/// run concurrently, so the workload keeps its state in synchronized cells.
#[async_trait]
pub trait Dispatcher<W: ?Sized>: Send + Sync + 'static {
    /// Handle one request
    ///
    /// Unknown keys fail with `UnrecognizedRoute`; the actor keeps running.
    async fn dispatch(
        &self,
        workload: &W,
        route_key: &RouteKey,
        payload: Bytes,
        ctx: &Context,
    ) -> Result<Bytes>;
}

// =============================================================================
// Workload
// =============================================================================

/// User-defined unit of actor behavior
///
/// # Lifecycle
/// `on_start` runs exactly once while the actor is Starting; calls may already
/// arrive. `on_stop` runs exactly once after in-flight dispatches drained.
#[async_trait]
pub trait Workload: Send + Sync + Sized + 'static {
    /// Dispatcher serving this workload's routes
    type Dispatcher: Dispatcher<Self>;

    /// The workload's dispatcher
    fn dispatcher(&self) -> &Self::Dispatcher;

    /// Called once before the actor becomes ready
    async fn on_start(&self, _ctx: &Context) -> Result<()> {
        Ok(())
    }

    /// Called once after the actor stopped serving
    async fn on_stop(&self, _ctx: &Context) -> Result<()> {
        Ok(())
    }
}
