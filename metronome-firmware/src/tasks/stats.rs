//! Periodic scheduler statistics
//!
//! A second scheduler client next to the LEDs: logs what the scheduler did
//! since the previous report.

use core::cell::Cell;

use critical_section::Mutex;
use defmt::*;
use metronome_core::scheduler::{ScheduleError, SchedulerStats, TaskHandle};

use crate::SCHEDULER;

/// Report interval
pub const STATS_PERIOD_MS: u32 = 10_000;

/// Snapshot taken at the previous report
static LAST: Mutex<Cell<SchedulerStats>> = Mutex::new(Cell::new(SchedulerStats::new()));

/// Scheduler callback: log counter deltas
pub fn stats_task() {
    let now = SCHEDULER.stats();
    let last = critical_section::with(|cs| LAST.borrow(cs).replace(now));
    let delta = now.since(&last);

    info!(
        "sched: {} ticks, {} drains, {} calls, {} missed, {}/{} slots",
        delta.ticks,
        delta.drains,
        delta.invocations,
        delta.missed,
        SCHEDULER.occupied(),
        SCHEDULER.capacity()
    );

    if delta.missed > 0 {
        warn!("{} activations missed in the last {} ms", delta.missed, STATS_PERIOD_MS);
    }
}

/// Register [`stats_task`] with the scheduler
pub fn attach() -> Result<TaskHandle, ScheduleError> {
    SCHEDULER.schedule(stats_task, STATS_PERIOD_MS)
}
