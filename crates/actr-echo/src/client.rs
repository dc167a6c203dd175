//! Echo client workload
//!
//! Discovers the echo service on start and forwards echo requests to it.
//! Requests that arrive before start-up finished wait on the readiness gate;
//! without a server the client answers with a fixed degraded reply.

use crate::messages::{echo_service_type, EchoRequest, EchoResponse, EchoRoute};
use actr_core::codec;
use actr_core::error::Result;
use actr_core::{
    ActorId, Context, Dest, ReadinessSignal, Route, RouteHandler, RouteTable, ServiceType,
    Workload,
};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::OnceLock;
use tracing::{error, info, warn};

/// Forwards echo requests to a discovered echo service
pub struct EchoClientWorkload {
    routes: RouteTable<EchoRoute>,
    server_type: ServiceType,
    server_id: OnceLock<ActorId>,
    ready: ReadinessSignal,
}

impl EchoClientWorkload {
    /// Create a client looking for `acme:EchoService`
    pub fn new() -> Result<Self> {
        Self::for_service(echo_service_type()?)
    }

    /// Create a client looking for `server_type`
    pub fn for_service(server_type: ServiceType) -> Result<Self> {
        Ok(Self {
            routes: RouteTable::new()?,
            server_type,
            server_id: OnceLock::new(),
            ready: ReadinessSignal::new(),
        })
    }

    /// Readiness gate, open once discovery finished either way
    pub fn readiness(&self) -> ReadinessSignal {
        self.ready.clone()
    }
}

#[async_trait]
impl RouteHandler<EchoRoute> for EchoClientWorkload {
    async fn handle(&self, route: EchoRoute, payload: Bytes, ctx: &Context) -> Result<Bytes> {
        match route {
            EchoRoute::Echo => {
                // Malformed requests fail the same way with or without a server
                let request: EchoRequest = codec::decode(&payload)?;
                self.ready.wait().await;
                match self.server_id.get() {
                    Some(server) => {
                        ctx.call(&Dest::actor(server.clone()), route.route_key(), payload)
                            .await
                    }
                    None => {
                        warn!(
                            actor_id = %ctx.self_id(),
                            message_len = request.message.len(),
                            "echo service unknown, degraded reply"
                        );
                        codec::encode(&EchoResponse::server_not_available())
                    }
                }
            }
        }
    }
}

#[async_trait]
impl Workload for EchoClientWorkload {
    type Dispatcher = RouteTable<EchoRoute>;

    fn dispatcher(&self) -> &Self::Dispatcher {
        &self.routes
    }

    async fn on_start(&self, ctx: &Context) -> Result<()> {
        match ctx.discover(&self.server_type).await {
            Ok(server) => {
                info!(actor_id = %ctx.self_id(), server = %server, "discovered echo service");
                let _ = self.server_id.set(server);
            }
            Err(e) => {
                // Stay up and serve degraded replies
                error!(
                    actor_id = %ctx.self_id(),
                    service_type = %self.server_type,
                    error = %e,
                    "failed to discover echo service"
                );
            }
        }
        self.ready.set();
        Ok(())
    }
}
