//! Per-actor dispatch statistics

use actr_core::io::TimeProvider;

/// Counters for one actor's inbound traffic
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// When the actor started (ms)
    pub started_at_ms: Option<u64>,
    /// Last time a dispatch finished (ms)
    pub last_activity_at_ms: Option<u64>,
    /// Total dispatches completed
    pub dispatch_count: u64,
    /// Dispatches that returned an error
    pub error_count: u64,
    /// Requests rejected without dispatch (stopping)
    pub rejected_count: u64,
    /// In-flight dispatches aborted after the drain timeout
    pub aborted_count: u64,
    /// Total time spent dispatching (ms)
    pub total_processing_time_ms: u64,
}

impl DispatchStats {
    /// Stats for an actor starting now
    pub fn with_time(time: &dyn TimeProvider) -> Self {
        Self {
            started_at_ms: Some(time.now_ms()),
            ..Default::default()
        }
    }

    /// Record a completed dispatch
    pub fn record_dispatch(&mut self, duration_ms: u64, is_error: bool, time: &dyn TimeProvider) {
        self.last_activity_at_ms = Some(time.now_ms());
        self.dispatch_count = self.dispatch_count.wrapping_add(1);
        self.total_processing_time_ms = self.total_processing_time_ms.saturating_add(duration_ms);
        if is_error {
            self.error_count = self.error_count.wrapping_add(1);
        }
    }

    /// Record a request rejected while stopping
    pub fn record_rejected(&mut self) {
        self.rejected_count = self.rejected_count.wrapping_add(1);
    }

    /// Record dispatches aborted after the drain timeout
    pub fn record_aborted(&mut self, count: u64) {
        self.aborted_count = self.aborted_count.saturating_add(count);
    }

    /// Average dispatch time (ms)
    pub fn average_processing_time_ms(&self) -> u64 {
        if self.dispatch_count == 0 {
            0
        } else {
            self.total_processing_time_ms / self.dispatch_count
        }
    }
}
