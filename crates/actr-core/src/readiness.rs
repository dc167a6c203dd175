//! Set-once readiness gate
//!
//! TigerStyle: Monotonic state, false -> true exactly once, never resets.

use std::sync::Arc;
use tokio::sync::watch;

/// One-way gate signaling that start-up finished enough to serve traffic
///
/// Cheap to clone; all clones observe the same gate. Waiters that arrive
/// after the gate opened return immediately.
#[derive(Debug, Clone)]
pub struct ReadinessSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl ReadinessSignal {
    /// Create a closed gate
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
        }
    }

    /// Open the gate
    ///
    /// Returns true only for the call that actually opened it.
    pub fn set(&self) -> bool {
        let was_ready = self.tx.send_replace(true);
        debug_assert!(*self.tx.borrow());
        !was_ready
    }

    /// Whether the gate is open
    pub fn is_ready(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the gate is open
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in self, so the channel cannot close while we wait
        let _ = rx.wait_for(|ready| *ready).await;
    }
}

impl Default for ReadinessSignal {
    fn default() -> Self {
        Self::new()
    }
}
