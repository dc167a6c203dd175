//! Attached workloads and their inbound loop
//!
//! TigerStyle: One task per actor owns the mailbox; dispatches run
//! concurrently in a bounded drain scope.

use crate::lifecycle::{Lifecycle, LifecycleState};
use crate::mailbox::{mailbox, Envelope, MailboxReceiver};
use crate::reference::ActorRef;
use crate::stats::DispatchStats;
use crate::system::ActorSystem;
use actr_core::error::{Error, Result};
use actr_core::io::TimeProvider;
use actr_core::{ActorId, Context, Dispatcher, ReadinessSignal, Workload};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

// =============================================================================
// Shared actor state
// =============================================================================

/// State shared between an actor's inbound loop and its references
#[derive(Debug)]
pub(crate) struct ActorShared {
    pub(crate) id: ActorId,
    pub(crate) lifecycle: Lifecycle,
    /// Runtime-side readiness, set when `on_start` returns
    pub(crate) ready: ReadinessSignal,
    shutdown_tx: watch::Sender<bool>,
    stats: Mutex<DispatchStats>,
}

impl ActorShared {
    fn new(id: ActorId, time: &dyn TimeProvider) -> Self {
        let (shutdown_tx, _rx) = watch::channel(false);
        Self {
            lifecycle: Lifecycle::new(id.clone()),
            id,
            ready: ReadinessSignal::new(),
            shutdown_tx,
            stats: Mutex::new(DispatchStats::with_time(time)),
        }
    }

    /// Ask the inbound loop to stop; returns true only for the first request
    pub(crate) fn request_shutdown(&self) -> bool {
        !self.shutdown_tx.send_replace(true)
    }

    async fn shutdown_requested(&self) {
        let mut rx = self.shutdown_tx.subscribe();
        let _ = rx.wait_for(|requested| *requested).await;
    }

    pub(crate) fn stats(&self) -> DispatchStats {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn with_stats(&self, f: impl FnOnce(&mut DispatchStats)) {
        f(&mut self.stats.lock().unwrap_or_else(PoisonError::into_inner));
    }

    /// Stop the inbound loop and wait for Stopped, then hand back `err`
    async fn abandon_start(&self, err: Error) -> Error {
        self.request_shutdown();
        self.lifecycle.wait_for(LifecycleState::Stopped).await;
        err
    }
}

/// Run a lifecycle hook, turning a panic into `HookFailed`
async fn run_hook<F>(actor_id: &ActorId, hook: &str, future: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(Error::HookFailed {
            actor_id: actor_id.to_string(),
            hook: hook.into(),
            reason: e.to_string(),
        }),
        Err(_) => Err(Error::HookFailed {
            actor_id: actor_id.to_string(),
            hook: hook.into(),
            reason: "panicked".into(),
        }),
    }
}

// =============================================================================
// Node
// =============================================================================

/// A workload attached to a system, not yet started
///
/// Attaching performs no I/O; the identity is assigned up front.
pub struct Node<W: Workload> {
    workload: Arc<W>,
    shared: Arc<ActorShared>,
    system: ActorSystem,
}

impl<W: Workload> Node<W> {
    pub(crate) fn new(workload: W, id: ActorId, system: ActorSystem) -> Self {
        let shared = Arc::new(ActorShared::new(id, system.time().as_ref()));
        Self {
            workload: Arc::new(workload),
            shared,
            system,
        }
    }

    /// Identity assigned at attach time
    pub fn actor_id(&self) -> &ActorId {
        &self.shared.id
    }

    /// Current lifecycle state
    pub fn state(&self) -> LifecycleState {
        self.shared.lifecycle.state()
    }

    /// Start the actor
    ///
    /// Makes the identity reachable, runs `on_start`, registers for discovery,
    /// and returns once the actor is Running. If `on_start` fails or panics the
    /// actor is stopped (running `on_stop`) and `HookFailed` is returned. Any
    /// later start-up failure also stops the actor before returning.
    #[instrument(skip(self), fields(actor_id = %self.shared.id), level = "info")]
    pub async fn start(self) -> Result<ActorRef> {
        let Node {
            workload,
            shared,
            system,
        } = self;
        let config = system.config().runtime.clone();

        shared.lifecycle.transition(LifecycleState::Starting)?;

        let ctx = Context::new(shared.id.clone(), system.router())
            .with_discovery_timeout_ms(config.discovery_timeout_ms);

        // Reachable before on_start so early calls queue instead of failing
        let (tx, rx) = mailbox(config.mailbox_capacity);
        system.directory().register(shared.id.clone(), tx)?;

        let inbound = InboundLoop {
            workload: workload.clone(),
            ctx: ctx.clone(),
            shared: shared.clone(),
            system: system.clone(),
            drain_timeout: Duration::from_millis(config.drain_timeout_ms),
        };
        tokio::spawn(inbound.run(rx));

        let started = run_hook(&shared.id, "on_start", workload.on_start(&ctx)).await;
        shared.ready.set();

        if let Err(e) = started {
            error!(actor_id = %shared.id, error = %e, "on_start failed");
            return Err(shared.abandon_start(e).await);
        }

        // A shutdown requested during on_start wins over becoming ready
        if shared.lifecycle.transition(LifecycleState::Ready).is_err() {
            return Err(shared.abandon_start(Error::stopping(&shared.id)).await);
        }

        if system.config().system.discovery.visible {
            if let Err(e) = system.router().discovery().register(&shared.id).await {
                error!(actor_id = %shared.id, error = %e, "discovery register failed");
                return Err(shared.abandon_start(e).await);
            }
            // Stopping began before registration; the stop path already unregistered
            if shared.lifecycle.state().is_shutting_down() {
                if let Err(e) = system.router().discovery().unregister(&shared.id).await {
                    warn!(actor_id = %shared.id, error = %e, "discovery unregister failed");
                }
                return Err(shared.abandon_start(Error::stopping(&shared.id)).await);
            }
        }

        if shared.lifecycle.transition(LifecycleState::Running).is_err() {
            return Err(shared.abandon_start(Error::stopping(&shared.id)).await);
        }

        info!(actor_id = %shared.id, "actor running");
        let actor_ref = ActorRef::new(shared, system.router(), system.default_call_timeout());
        system.track(actor_ref.clone());
        Ok(actor_ref)
    }
}

impl<W: Workload> std::fmt::Debug for Node<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("actor_id", &self.shared.id)
            .field("state", &self.shared.lifecycle.state())
            .finish()
    }
}

// =============================================================================
// Inbound loop
// =============================================================================

struct InboundLoop<W: Workload> {
    workload: Arc<W>,
    ctx: Context,
    shared: Arc<ActorShared>,
    system: ActorSystem,
    drain_timeout: Duration,
}

impl<W: Workload> InboundLoop<W> {
    async fn run(self, mut rx: MailboxReceiver) {
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                biased;
                _ = self.shared.shutdown_requested() => break,
                maybe = rx.recv() => match maybe {
                    Some(envelope) => self.spawn_dispatch(&mut in_flight, envelope),
                    None => break,
                },
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    self.log_join(joined);
                }
            }
        }

        self.stop(rx, in_flight).await;
    }

    fn spawn_dispatch(&self, in_flight: &mut JoinSet<()>, envelope: Envelope) {
        let workload = self.workload.clone();
        let ctx = self.ctx.clone();
        let shared = self.shared.clone();
        let time = self.system.time().clone();

        let waited_ms = envelope.wait_time_ms(time.as_ref());
        debug!(
            actor_id = %shared.id,
            route_key = %envelope.route_key,
            waited_ms,
            "dispatch"
        );

        in_flight.spawn(async move {
            let Envelope {
                route_key,
                payload,
                reply_tx,
                ..
            } = envelope;

            let started = Instant::now();
            let result = workload
                .dispatcher()
                .dispatch(&*workload, &route_key, payload, &ctx)
                .await;
            let duration_ms = started.elapsed().as_millis() as u64;

            if let Err(e) = &result {
                warn!(actor_id = %shared.id, route_key = %route_key, error = %e, "dispatch failed");
            }
            shared.with_stats(|stats| stats.record_dispatch(duration_ms, result.is_err(), time.as_ref()));

            // Caller may have given up (timeout); nothing to do then
            let _ = reply_tx.send(result);
        });
    }

    fn log_join(&self, joined: std::result::Result<(), tokio::task::JoinError>) {
        if let Err(e) = joined {
            if e.is_panic() {
                error!(actor_id = %self.shared.id, "dispatch panicked");
            }
        }
    }

    #[instrument(skip_all, fields(actor_id = %self.shared.id), level = "info")]
    async fn stop(self, mut rx: MailboxReceiver, mut in_flight: JoinSet<()>) {
        let id = &self.shared.id;
        if let Err(e) = self.shared.lifecycle.transition(LifecycleState::Stopping) {
            error!(actor_id = %id, error = %e, "unexpected lifecycle state on stop");
        }
        info!(actor_id = %id, in_flight = in_flight.len(), "actor stopping");

        // No new calls: unreachable and undiscoverable
        self.system.directory().unregister(id);
        if let Err(e) = self.system.router().discovery().unregister(id).await {
            warn!(actor_id = %id, error = %e, "discovery unregister failed");
        }

        // Queued but not started: reject
        rx.close();
        while let Ok(envelope) = rx.try_recv() {
            let _ = envelope.reply_tx.send(Err(Error::stopping(id)));
            self.shared.with_stats(|stats| stats.record_rejected());
        }

        // Accepted: let them finish within the drain timeout
        let drained = tokio::time::timeout(self.drain_timeout, async {
            while let Some(joined) = in_flight.join_next().await {
                self.log_join(joined);
            }
        })
        .await;

        if drained.is_err() {
            let remaining = in_flight.len() as u64;
            warn!(
                actor_id = %id,
                remaining,
                drain_timeout_ms = self.drain_timeout.as_millis() as u64,
                "drain timeout, aborting dispatches"
            );
            in_flight.abort_all();
            while in_flight.join_next().await.is_some() {}
            self.shared.with_stats(|stats| stats.record_aborted(remaining));
        }

        if let Err(e) = run_hook(id, "on_stop", self.workload.on_stop(&self.ctx)).await {
            error!(actor_id = %id, error = %e, "on_stop failed");
        }

        if let Err(e) = self.shared.lifecycle.transition(LifecycleState::Stopped) {
            error!(actor_id = %id, error = %e, "unexpected lifecycle state on stop");
        }
        // After Stopped, so a concurrent track() sees the state and drops itself
        self.system.untrack(id);
        info!(actor_id = %id, "actor stopped");
    }
}
