//! Echo service workload

use crate::messages::{EchoRequest, EchoResponse, EchoRoute};
use actr_core::codec;
use actr_core::error::Result;
use actr_core::io::{TimeProvider, WallClockTime};
use actr_core::{Context, RouteHandler, RouteTable, Workload};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, info};

/// Replies to every echo request with `Echo: <message>`
pub struct EchoServerWorkload {
    routes: RouteTable<EchoRoute>,
    time: Arc<dyn TimeProvider>,
}

impl EchoServerWorkload {
    /// Create a server stamping replies with the wall clock
    pub fn new() -> Result<Self> {
        Self::with_time(Arc::new(WallClockTime::new()))
    }

    /// Create a server with an injected clock
    pub fn with_time(time: Arc<dyn TimeProvider>) -> Result<Self> {
        Ok(Self {
            routes: RouteTable::new()?,
            time,
        })
    }

    fn echo(&self, request: EchoRequest) -> EchoResponse {
        EchoResponse {
            reply: format!("Echo: {}", request.message),
            timestamp: self.time.now_secs(),
        }
    }
}

#[async_trait]
impl RouteHandler<EchoRoute> for EchoServerWorkload {
    async fn handle(&self, route: EchoRoute, payload: Bytes, ctx: &Context) -> Result<Bytes> {
        match route {
            EchoRoute::Echo => {
                let request: EchoRequest = codec::decode(&payload)?;
                debug!(actor_id = %ctx.self_id(), message = %request.message, "echo");
                codec::encode(&self.echo(request))
            }
        }
    }
}

#[async_trait]
impl Workload for EchoServerWorkload {
    type Dispatcher = RouteTable<EchoRoute>;

    fn dispatcher(&self) -> &Self::Dispatcher {
        &self.routes
    }

    async fn on_start(&self, ctx: &Context) -> Result<()> {
        info!(actor_id = %ctx.self_id(), "echo service started");
        Ok(())
    }

    async fn on_stop(&self, ctx: &Context) -> Result<()> {
        info!(actor_id = %ctx.self_id(), "echo service stopped");
        Ok(())
    }
}
