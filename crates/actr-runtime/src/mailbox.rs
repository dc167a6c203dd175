//! Actor mailbox
//!
//! TigerStyle: Bounded queues with explicit limits, no silent drops.
//!
//! Each started actor owns one bounded channel. Senders suspend while it is
//! full; nothing is dropped.

use actr_core::constants::MAILBOX_CAPACITY_MAX;
use actr_core::error::Result;
use actr_core::io::{TimeProvider, WallClockTime};
use actr_core::{ActorId, RouteKey};
use bytes::Bytes;
use tokio::sync::{mpsc, oneshot};

/// A request waiting in an actor's mailbox
#[derive(Debug)]
pub struct Envelope {
    /// Route key of the requested method
    pub route_key: RouteKey,
    /// Request payload
    pub payload: Bytes,
    /// Actor that issued the call, if any
    pub caller: Option<ActorId>,
    /// Channel to send the response
    pub reply_tx: oneshot::Sender<Result<Bytes>>,
    /// When the request was enqueued (ms)
    pub enqueued_at_ms: u64,
}

impl Envelope {
    /// Create a new envelope using the wall clock
    pub fn new(
        route_key: RouteKey,
        payload: Bytes,
        caller: Option<ActorId>,
        reply_tx: oneshot::Sender<Result<Bytes>>,
    ) -> Self {
        Self::new_with_time(route_key, payload, caller, reply_tx, &WallClockTime::new())
    }

    /// Create a new envelope with injected time provider
    pub fn new_with_time(
        route_key: RouteKey,
        payload: Bytes,
        caller: Option<ActorId>,
        reply_tx: oneshot::Sender<Result<Bytes>>,
        time: &dyn TimeProvider,
    ) -> Self {
        Self {
            route_key,
            payload,
            caller,
            reply_tx,
            enqueued_at_ms: time.now_ms(),
        }
    }

    /// How long this request has been waiting (ms)
    pub fn wait_time_ms(&self, time: &dyn TimeProvider) -> u64 {
        time.now_ms().saturating_sub(self.enqueued_at_ms)
    }
}

/// Sending half of a mailbox
pub type MailboxSender = mpsc::Sender<Envelope>;

/// Receiving half of a mailbox
pub type MailboxReceiver = mpsc::Receiver<Envelope>;

/// Create a bounded mailbox
pub fn mailbox(capacity: usize) -> (MailboxSender, MailboxReceiver) {
    assert!(capacity > 0, "capacity must be positive");
    assert!(
        capacity <= MAILBOX_CAPACITY_MAX,
        "capacity exceeds MAILBOX_CAPACITY_MAX"
    );
    mpsc::channel(capacity)
}
