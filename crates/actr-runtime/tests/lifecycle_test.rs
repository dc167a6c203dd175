//! Integration tests for actor lifecycle, routing, and shutdown
//!
//! TigerStyle: Each test drives a real system end to end with bounded waits.

use actr_core::error::{Error, Result};
use actr_core::{
    ActorId, ActrConfig, Context, Dest, Route, RouteHandler, RouteTable, ServiceType, Workload,
};
use actr_runtime::{ActorSystem, Discovery, LifecycleState, LocalDiscovery};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// Test Workload Definition
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CounterRoute {
    Increment,
    Get,
    Sleep,
    Forward,
}

impl Route for CounterRoute {
    const ALL: &'static [Self] = &[Self::Increment, Self::Get, Self::Sleep, Self::Forward];

    fn route_key(&self) -> &'static str {
        match self {
            Self::Increment => "test.CounterService.Increment",
            Self::Get => "test.CounterService.Get",
            Self::Sleep => "test.CounterService.Sleep",
            Self::Forward => "test.CounterService.Forward",
        }
    }
}

#[derive(Debug, Default)]
struct HookCounts {
    started: AtomicU64,
    stopped: AtomicU64,
    finished_sleeps: AtomicU64,
}

/// Misbehaviour injected into a lifecycle hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HookFault {
    None,
    FailStart,
    PanicStart,
    FailStop,
    PanicStop,
}

struct CounterWorkload {
    routes: RouteTable<CounterRoute>,
    count: AtomicU64,
    hooks: Arc<HookCounts>,
    fault: HookFault,
}

impl CounterWorkload {
    fn new(hooks: Arc<HookCounts>) -> Self {
        Self {
            routes: RouteTable::new().unwrap(),
            count: AtomicU64::new(0),
            hooks,
            fault: HookFault::None,
        }
    }

    fn with_fault(hooks: Arc<HookCounts>, fault: HookFault) -> Self {
        Self {
            fault,
            ..Self::new(hooks)
        }
    }
}

#[async_trait]
impl RouteHandler<CounterRoute> for CounterWorkload {
    async fn handle(&self, route: CounterRoute, payload: Bytes, ctx: &Context) -> Result<Bytes> {
        match route {
            CounterRoute::Increment => {
                let count = self.count.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(Bytes::from(count.to_string()))
            }
            CounterRoute::Get => Ok(Bytes::from(self.count.load(Ordering::SeqCst).to_string())),
            CounterRoute::Sleep => {
                let ms: u64 = std::str::from_utf8(&payload)
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0);
                tokio::time::sleep(Duration::from_millis(ms)).await;
                self.hooks.finished_sleeps.fetch_add(1, Ordering::SeqCst);
                Ok(Bytes::from("slept"))
            }
            CounterRoute::Forward => {
                // Address an identity that was never assigned
                let ghost = ActorId::new(
                    ctx.self_id().realm_id(),
                    u64::MAX,
                    ServiceType::new("test", "Ghost").unwrap(),
                );
                ctx.call(&Dest::actor(ghost), "test.Ghost.Boo", payload).await
            }
        }
    }
}

#[async_trait]
impl Workload for CounterWorkload {
    type Dispatcher = RouteTable<CounterRoute>;

    fn dispatcher(&self) -> &Self::Dispatcher {
        &self.routes
    }

    async fn on_start(&self, _ctx: &Context) -> Result<()> {
        self.hooks.started.fetch_add(1, Ordering::SeqCst);
        match self.fault {
            HookFault::FailStart => Err(Error::internal("refusing to start")),
            HookFault::PanicStart => panic!("on_start blew up"),
            _ => Ok(()),
        }
    }

    async fn on_stop(&self, _ctx: &Context) -> Result<()> {
        self.hooks.stopped.fetch_add(1, Ordering::SeqCst);
        match self.fault {
            HookFault::FailStop => Err(Error::internal("refusing to stop")),
            HookFault::PanicStop => panic!("on_stop blew up"),
            _ => Ok(()),
        }
    }
}

/// Discovery whose registry is unreachable
#[derive(Debug, Default)]
struct UnavailableDiscovery {
    inner: LocalDiscovery,
}

#[async_trait]
impl Discovery for UnavailableDiscovery {
    async fn register(&self, _actor_id: &ActorId) -> Result<()> {
        Err(Error::internal("registry down"))
    }

    async fn unregister(&self, actor_id: &ActorId) -> Result<()> {
        self.inner.unregister(actor_id).await
    }

    async fn discover(&self, service_type: &ServiceType) -> Result<ActorId> {
        self.inner.discover(service_type).await
    }

    async fn list(&self, service_type: &ServiceType) -> Result<Vec<ActorId>> {
        self.inner.list(service_type).await
    }
}

fn test_system() -> ActorSystem {
    let mut config = ActrConfig::default();
    config.package.manufacturer = "test".into();
    config.package.service_name = "CounterService".into();
    config.runtime.drain_timeout_ms = 2_000;
    ActorSystem::new(config).unwrap()
}

async fn bounded<F: std::future::Future>(future: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("operation did not complete in time")
}

// =============================================================================
// Start & Dispatch
// =============================================================================

#[tokio::test]
async fn test_start_reaches_running() {
    let hooks = Arc::new(HookCounts::default());
    let system = test_system();
    let node = system.attach(CounterWorkload::new(hooks.clone()));
    assert_eq!(node.state(), LifecycleState::Created);

    let actor = node.start().await.unwrap();
    assert_eq!(actor.state(), LifecycleState::Running);
    assert!(actor.is_ready());
    assert_eq!(hooks.started.load(Ordering::SeqCst), 1);
    assert_eq!(actor.actor_id().service_type().to_string(), "test:CounterService");
    assert_eq!(actor.actor_id().realm_id(), 1001);

    let reply = actor
        .call("test.CounterService.Increment", Bytes::new())
        .await
        .unwrap();
    assert_eq!(reply, Bytes::from("1"));
    assert_eq!(actor.stats().dispatch_count, 1);

    actor.shutdown();
    bounded(actor.wait_for_shutdown()).await;
}

#[tokio::test]
async fn test_attach_assigns_distinct_ids() {
    let hooks = Arc::new(HookCounts::default());
    let system = test_system();
    let a = system.attach(CounterWorkload::new(hooks.clone()));
    let b = system.attach(CounterWorkload::new(hooks.clone()));
    assert_ne!(a.actor_id(), b.actor_id());
    // Attaching performs no work
    assert_eq!(hooks.started.load(Ordering::SeqCst), 0);
    assert_eq!(system.live_count(), 0);
}

#[tokio::test]
async fn test_unknown_route_keeps_serving() {
    let system = test_system();
    let actor = system
        .attach(CounterWorkload::new(Arc::default()))
        .start()
        .await
        .unwrap();

    let result = actor
        .call("test.CounterService.Reset", Bytes::new())
        .await;
    assert!(matches!(
        result,
        Err(Error::UnrecognizedRoute { route_key }) if route_key == "test.CounterService.Reset"
    ));

    // Still serving
    let reply = actor
        .call("test.CounterService.Increment", Bytes::new())
        .await
        .unwrap();
    assert_eq!(reply, Bytes::from("1"));
    assert_eq!(actor.state(), LifecycleState::Running);
    assert_eq!(actor.stats().error_count, 1);

    system.shutdown_all().await;
}

#[tokio::test]
async fn test_malformed_route_key_rejected() {
    let system = test_system();
    let actor = system
        .attach(CounterWorkload::new(Arc::default()))
        .start()
        .await
        .unwrap();

    let result = actor.call("increment", Bytes::new()).await;
    assert!(matches!(result, Err(Error::InvalidRouteKey { .. })));
    assert_eq!(actor.stats().dispatch_count, 0);

    system.shutdown_all().await;
}

#[tokio::test]
async fn test_call_to_never_existing_identity_fails() {
    let system = test_system();
    let actor = system
        .attach(CounterWorkload::new(Arc::default()))
        .start()
        .await
        .unwrap();

    let result = bounded(actor.call("test.CounterService.Forward", Bytes::from("boo"))).await;
    assert!(matches!(result, Err(Error::UnreachableDestination { .. })));

    system.shutdown_all().await;
}

#[tokio::test]
async fn test_concurrent_dispatch() {
    let system = test_system();
    let actor = system
        .attach(CounterWorkload::new(Arc::default()))
        .start()
        .await
        .unwrap();

    let mut calls = Vec::new();
    for _ in 0..10 {
        let actor = actor.clone();
        calls.push(tokio::spawn(async move {
            actor
                .call("test.CounterService.Sleep", Bytes::from("100"))
                .await
        }));
    }

    // Ten 100ms sleeps dispatched concurrently finish well under a second
    let started = std::time::Instant::now();
    for call in calls {
        bounded(call).await.unwrap().unwrap();
    }
    assert!(started.elapsed() < Duration::from_millis(900));

    system.shutdown_all().await;
}

#[tokio::test]
async fn test_call_timeout() {
    let system = test_system();
    let actor = system
        .attach(CounterWorkload::new(Arc::default()))
        .start()
        .await
        .unwrap()
        .with_timeout(Duration::from_millis(50));

    let result = actor
        .call("test.CounterService.Sleep", Bytes::from("1000"))
        .await;
    assert!(matches!(
        result,
        Err(Error::CallTimeout { timeout_ms: 50, .. })
    ));
    assert!(result.unwrap_err().is_retriable());

    system.shutdown_all().await;
}

// =============================================================================
// Shutdown
// =============================================================================

#[tokio::test]
async fn test_shutdown_twice_equals_once() {
    let hooks = Arc::new(HookCounts::default());
    let system = test_system();
    let actor = system
        .attach(CounterWorkload::new(hooks.clone()))
        .start()
        .await
        .unwrap();

    actor.shutdown();
    actor.shutdown();
    bounded(actor.wait_for_shutdown()).await;
    actor.shutdown();

    assert_eq!(actor.state(), LifecycleState::Stopped);
    assert_eq!(hooks.stopped.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_many_waiters_after_stopped() {
    let system = test_system();
    let actor = system
        .attach(CounterWorkload::new(Arc::default()))
        .start()
        .await
        .unwrap();

    actor.shutdown();
    bounded(actor.wait_for_shutdown()).await;

    let mut waiters = Vec::new();
    for _ in 0..16 {
        let actor = actor.clone();
        waiters.push(tokio::spawn(async move { actor.wait_for_shutdown().await }));
    }
    for waiter in waiters {
        tokio::time::timeout(Duration::from_millis(200), waiter)
            .await
            .expect("waiter blocked after Stopped")
            .unwrap();
    }
}

#[tokio::test]
async fn test_waiters_before_shutdown_all_unblock() {
    let system = test_system();
    let actor = system
        .attach(CounterWorkload::new(Arc::default()))
        .start()
        .await
        .unwrap();

    let mut waiters = Vec::new();
    for _ in 0..8 {
        let actor = actor.clone();
        waiters.push(tokio::spawn(async move { actor.wait_for_shutdown().await }));
    }

    tokio::task::yield_now().await;
    actor.shutdown();

    for waiter in waiters {
        bounded(waiter).await.unwrap();
    }
}

#[tokio::test]
async fn test_calls_after_shutdown_are_unreachable() {
    let system = test_system();
    let actor = system
        .attach(CounterWorkload::new(Arc::default()))
        .start()
        .await
        .unwrap();

    actor.shutdown();
    bounded(actor.wait_for_shutdown()).await;

    let result = actor
        .call("test.CounterService.Get", Bytes::new())
        .await;
    assert!(matches!(result, Err(Error::UnreachableDestination { .. })));
    assert_eq!(system.live_count(), 0);
}

#[tokio::test]
async fn test_in_flight_dispatch_drains() {
    let hooks = Arc::new(HookCounts::default());
    let system = test_system();
    let actor = system
        .attach(CounterWorkload::new(hooks.clone()))
        .start()
        .await
        .unwrap();

    let slow = {
        let actor = actor.clone();
        tokio::spawn(async move {
            actor
                .call("test.CounterService.Sleep", Bytes::from("200"))
                .await
        })
    };

    // Let the dispatch start before stopping
    tokio::time::sleep(Duration::from_millis(50)).await;
    actor.shutdown();

    let reply = bounded(slow).await.unwrap().unwrap();
    assert_eq!(reply, Bytes::from("slept"));

    bounded(actor.wait_for_shutdown()).await;
    assert_eq!(hooks.finished_sleeps.load(Ordering::SeqCst), 1);
    assert_eq!(hooks.stopped.load(Ordering::SeqCst), 1);
    assert_eq!(actor.stats().aborted_count, 0);
}

#[tokio::test]
async fn test_overdue_dispatch_aborted_after_drain_timeout() {
    let hooks = Arc::new(HookCounts::default());
    let mut config = ActrConfig::default();
    config.runtime.drain_timeout_ms = 100;
    let system = ActorSystem::new(config).unwrap();
    let actor = system
        .attach(CounterWorkload::new(hooks.clone()))
        .start()
        .await
        .unwrap()
        .without_timeout();

    let slow = {
        let actor = actor.clone();
        tokio::spawn(async move {
            actor
                .call("test.CounterService.Sleep", Bytes::from("60000"))
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    actor.shutdown();

    let result = bounded(slow).await.unwrap();
    assert!(matches!(result, Err(Error::ActorStopping { .. })));

    bounded(actor.wait_for_shutdown()).await;
    assert_eq!(hooks.finished_sleeps.load(Ordering::SeqCst), 0);
    assert_eq!(hooks.stopped.load(Ordering::SeqCst), 1);
    assert_eq!(actor.stats().aborted_count, 1);
}

#[tokio::test]
async fn test_on_start_failure_stops_actor() {
    let hooks = Arc::new(HookCounts::default());
    let system = test_system();
    let node = system.attach(CounterWorkload::with_fault(hooks.clone(), HookFault::FailStart));
    let id = node.actor_id().clone();

    let result = bounded(node.start()).await;
    assert!(matches!(
        result,
        Err(Error::HookFailed { ref hook, .. }) if hook == "on_start"
    ));

    assert_eq!(hooks.started.load(Ordering::SeqCst), 1);
    assert_eq!(hooks.stopped.load(Ordering::SeqCst), 1);
    assert_eq!(system.live_count(), 0);

    // Never discoverable
    let result = system.discover(id.service_type()).await;
    assert!(matches!(result, Err(Error::DiscoveryFailed { .. })));
}

#[tokio::test]
async fn test_on_start_panic_stops_actor() {
    let hooks = Arc::new(HookCounts::default());
    let system = test_system();
    let node = system.attach(CounterWorkload::with_fault(hooks.clone(), HookFault::PanicStart));

    let result = bounded(node.start()).await;
    assert!(matches!(
        result,
        Err(Error::HookFailed { ref hook, .. }) if hook == "on_start"
    ));
    assert_eq!(hooks.stopped.load(Ordering::SeqCst), 1);
    assert_eq!(system.live_count(), 0);
    assert_eq!(system.started_count(), 0);
}

#[tokio::test]
async fn test_on_stop_error_still_reaches_stopped() {
    let hooks = Arc::new(HookCounts::default());
    let system = test_system();
    let actor = system
        .attach(CounterWorkload::with_fault(hooks.clone(), HookFault::FailStop))
        .start()
        .await
        .unwrap();

    actor.shutdown();
    bounded(actor.wait_for_shutdown()).await;

    assert_eq!(actor.state(), LifecycleState::Stopped);
    assert_eq!(hooks.stopped.load(Ordering::SeqCst), 1);
    assert_eq!(system.live_count(), 0);
}

#[tokio::test]
async fn test_on_stop_panic_still_reaches_stopped() {
    let hooks = Arc::new(HookCounts::default());
    let system = test_system();
    let actor = system
        .attach(CounterWorkload::with_fault(hooks.clone(), HookFault::PanicStop))
        .start()
        .await
        .unwrap();

    let waiter = {
        let actor = actor.clone();
        tokio::spawn(async move { actor.wait_for_shutdown().await })
    };

    actor.shutdown();
    bounded(waiter).await.unwrap();
    assert_eq!(actor.state(), LifecycleState::Stopped);
    assert_eq!(hooks.stopped.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_queued_envelopes_rejected_on_stop() {
    let hooks = Arc::new(HookCounts::default());
    let system = test_system();
    let actor = system
        .attach(CounterWorkload::new(hooks.clone()))
        .start()
        .await
        .unwrap()
        .without_timeout();

    // Enqueue without yielding, so the inbound loop has not picked them up
    let mut calls: Vec<_> = (0..3)
        .map(|_| Box::pin(actor.call("test.CounterService.Increment", Bytes::new())))
        .collect();
    for call in calls.iter_mut() {
        assert!(futures::poll!(call.as_mut()).is_pending());
    }

    actor.shutdown();

    for call in calls {
        let result = bounded(call).await;
        assert!(matches!(result, Err(Error::ActorStopping { .. })));
    }

    bounded(actor.wait_for_shutdown()).await;
    let stats = actor.stats();
    assert_eq!(stats.rejected_count, 3);
    assert_eq!(stats.dispatch_count, 0);
    assert_eq!(hooks.stopped.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_discovery_register_failure_stops_actor() {
    let hooks = Arc::new(HookCounts::default());
    let system = test_system().with_discovery(Arc::new(UnavailableDiscovery::default()));

    let result = bounded(system.attach(CounterWorkload::new(hooks.clone())).start()).await;
    assert!(matches!(
        result,
        Err(Error::Internal { ref message }) if message == "registry down"
    ));

    assert_eq!(system.live_count(), 0);
    assert_eq!(system.started_count(), 0);
    assert_eq!(hooks.stopped.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_stopped_actor_released_by_system() {
    let system = test_system();

    let mut actors = Vec::new();
    for _ in 0..3 {
        actors.push(
            system
                .attach(CounterWorkload::new(Arc::default()))
                .start()
                .await
                .unwrap(),
        );
    }
    assert_eq!(system.started_count(), 3);

    actors[0].shutdown();
    bounded(actors[0].wait_for_shutdown()).await;
    assert_eq!(system.started_count(), 2);

    bounded(system.shutdown_all()).await;
    assert_eq!(system.started_count(), 0);
}

// =============================================================================
// Discovery
// =============================================================================

#[tokio::test]
async fn test_visible_actor_discoverable_until_stopping() {
    let system = test_system();
    let actor = system
        .attach(CounterWorkload::new(Arc::default()))
        .start()
        .await
        .unwrap();

    let found = system.discover(system.service_type()).await.unwrap();
    assert_eq!(&found, actor.actor_id());
    assert_eq!(
        system.list(system.service_type()).await.unwrap(),
        vec![actor.actor_id().clone()]
    );

    actor.shutdown();
    bounded(actor.wait_for_shutdown()).await;
    assert!(system.discover(system.service_type()).await.is_err());
}

#[tokio::test]
async fn test_invisible_actor_not_discoverable() {
    let mut config = ActrConfig::default();
    config.system.discovery.visible = false;
    let system = ActorSystem::new(config).unwrap();
    let actor = system
        .attach(CounterWorkload::new(Arc::default()))
        .start()
        .await
        .unwrap();

    assert!(matches!(
        system.discover(system.service_type()).await,
        Err(Error::DiscoveryFailed { .. })
    ));
    // Still callable by identity
    actor
        .call("test.CounterService.Get", Bytes::new())
        .await
        .unwrap();

    system.shutdown_all().await;
}

#[tokio::test]
async fn test_shutdown_all() {
    let hooks = Arc::new(HookCounts::default());
    let system = test_system();

    let mut actors = Vec::new();
    for _ in 0..3 {
        actors.push(
            system
                .attach(CounterWorkload::new(hooks.clone()))
                .start()
                .await
                .unwrap(),
        );
    }
    assert_eq!(system.live_count(), 3);

    bounded(system.shutdown_all()).await;

    assert_eq!(system.live_count(), 0);
    assert_eq!(hooks.stopped.load(Ordering::SeqCst), 3);
    for actor in actors {
        assert_eq!(actor.state(), LifecycleState::Stopped);
    }
}

#[tokio::test]
async fn test_interrupt_wait_returns_on_shutdown_elsewhere() {
    let system = test_system();
    let actor = system
        .attach(CounterWorkload::new(Arc::default()))
        .start()
        .await
        .unwrap();

    let waiter = {
        let actor = actor.clone();
        tokio::spawn(async move { actor.wait_for_interrupt_and_shutdown().await })
    };

    tokio::task::yield_now().await;
    actor.shutdown();

    bounded(waiter).await.unwrap();
    assert_eq!(actor.state(), LifecycleState::Stopped);
}
