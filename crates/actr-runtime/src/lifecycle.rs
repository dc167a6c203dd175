//! Actor lifecycle state machine
//!
//! TigerStyle: Explicit states, validated transitions, monotonic progress.
//!
//! ```text
//! Created -> Starting -> Ready -> Running -> Stopping -> Stopped
//!               |          |                   ^
//!               +----------+-------------------+
//! ```

use actr_core::error::{Error, Result};
use actr_core::ActorId;
use tokio::sync::watch;
use tracing::debug;

/// Lifecycle state of a hosted actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleState {
    /// Attached, not started
    Created,
    /// `on_start` running; mailbox already reachable
    Starting,
    /// Start-up finished, registered for discovery
    Ready,
    /// Steady state
    Running,
    /// No new calls accepted; in-flight dispatches draining
    Stopping,
    /// Terminal
    Stopped,
}

impl LifecycleState {
    /// Whether the actor accepts new calls
    pub fn can_accept(&self) -> bool {
        matches!(
            self,
            LifecycleState::Starting | LifecycleState::Ready | LifecycleState::Running
        )
    }

    /// Whether the actor is stopping or stopped
    pub fn is_shutting_down(&self) -> bool {
        *self >= LifecycleState::Stopping
    }

    /// Check if a transition is valid
    pub fn can_transition_to(&self, next: LifecycleState) -> bool {
        match (self, next) {
            (LifecycleState::Created, LifecycleState::Starting) => true,
            (LifecycleState::Starting, LifecycleState::Ready) => true,
            // on_start failed or shutdown requested during start-up
            (LifecycleState::Starting, LifecycleState::Stopping) => true,
            (LifecycleState::Ready, LifecycleState::Running) => true,
            (LifecycleState::Ready, LifecycleState::Stopping) => true,
            (LifecycleState::Running, LifecycleState::Stopping) => true,
            (LifecycleState::Stopping, LifecycleState::Stopped) => true,
            // Same state is allowed (no change)
            _ if *self == next => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Created => write!(f, "created"),
            LifecycleState::Starting => write!(f, "starting"),
            LifecycleState::Ready => write!(f, "ready"),
            LifecycleState::Running => write!(f, "running"),
            LifecycleState::Stopping => write!(f, "stopping"),
            LifecycleState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Observable lifecycle of one actor
#[derive(Debug)]
pub struct Lifecycle {
    actor_id: ActorId,
    tx: watch::Sender<LifecycleState>,
}

impl Lifecycle {
    /// Create a lifecycle in `Created`
    pub fn new(actor_id: ActorId) -> Self {
        let (tx, _rx) = watch::channel(LifecycleState::Created);
        Self { actor_id, tx }
    }

    /// Current state
    pub fn state(&self) -> LifecycleState {
        *self.tx.borrow()
    }

    /// Move to `next`, failing if the transition is invalid
    ///
    /// Returns true if the state changed.
    pub fn transition(&self, next: LifecycleState) -> Result<bool> {
        let mut rejected_from = None;
        let changed = self.tx.send_if_modified(|state| {
            if !state.can_transition_to(next) {
                rejected_from = Some(*state);
                return false;
            }
            let changed = *state != next;
            *state = next;
            changed
        });

        if let Some(from) = rejected_from {
            return Err(Error::InvalidTransition {
                actor_id: self.actor_id.to_string(),
                from: from.to_string(),
                to: next.to_string(),
            });
        }

        if changed {
            debug!(actor_id = %self.actor_id, state = %next, "lifecycle transition");
        }
        Ok(changed)
    }

    /// Wait until the state reaches at least `target`
    ///
    /// Returns immediately if it already has.
    pub async fn wait_for(&self, target: LifecycleState) -> LifecycleState {
        let mut rx = self.tx.subscribe();
        // The sender lives in self, so the channel cannot close while we wait
        let reached = match rx.wait_for(|state| *state >= target).await {
            Ok(state) => *state,
            Err(_) => self.state(),
        };
        reached
    }
}
