//! Scheduler statistics
//!
//! Counters maintained by the tick handler and the dispatcher. All counters
//! wrap; compare snapshots with `wrapping_sub`.

/// Snapshot of scheduler counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SchedulerStats {
    /// Ticks accepted while running
    pub ticks: u32,
    /// Dispatcher passes that found the pending signal set
    pub drains: u32,
    /// Callbacks invoked
    pub invocations: u32,
    /// Activations dropped (skip policy) or coalesced (catch-up policy)
    pub missed: u32,
}

impl SchedulerStats {
    /// All counters zero
    pub const fn new() -> Self {
        Self {
            ticks: 0,
            drains: 0,
            invocations: 0,
            missed: 0,
        }
    }

    pub(crate) fn record_ticks(&mut self, elapsed: u32, missed: u32) {
        self.ticks = self.ticks.wrapping_add(elapsed);
        self.missed = self.missed.wrapping_add(missed);
    }

    pub(crate) fn record_drain(&mut self, invocations: u32) {
        self.drains = self.drains.wrapping_add(1);
        self.invocations = self.invocations.wrapping_add(invocations);
    }

    /// Counter deltas since an earlier snapshot
    pub fn since(&self, earlier: &SchedulerStats) -> SchedulerStats {
        SchedulerStats {
            ticks: self.ticks.wrapping_sub(earlier.ticks),
            drains: self.drains.wrapping_sub(earlier.drains),
            invocations: self.invocations.wrapping_sub(earlier.invocations),
            missed: self.missed.wrapping_sub(earlier.missed),
        }
    }
}
