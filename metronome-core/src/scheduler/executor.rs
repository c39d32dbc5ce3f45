//! Scheduler: task table owner, tick handler and dispatcher
//!
//! `Scheduler` is the single owner of all state shared between the tick
//! interrupt and the main loop. It is meant to live in a `static`:
//!
//! ```ignore
//! static SCHEDULER: Scheduler = Scheduler::new(SchedulerConfig::DEFAULT);
//!
//! // tick interrupt
//! SCHEDULER.on_tick();
//!
//! // main loop
//! loop {
//!     SCHEDULER.execute_ready();
//! }
//! ```
//!
//! Access discipline:
//! - The tick handler is the only writer of the tick counter and the only
//!   context that sets `due` flags and the pending signal.
//! - The dispatcher is the only context that clears them, and the only one
//!   that invokes callbacks.
//! - Registration calls rewrite whole slots inside a critical section, so
//!   the tick handler never observes a half-updated slot.

use core::cell::RefCell;

use critical_section::Mutex;
use portable_atomic::{AtomicBool, AtomicU32, Ordering};

use super::stats::SchedulerStats;
use super::table::{ScheduleError, TaskFn, TaskHandle, TaskTable};
use crate::config::{SchedulerConfig, MAX_TASKS};

/// State only touched inside a critical section
struct Shared<const N: usize> {
    table: TaskTable<N>,
    config: SchedulerConfig,
    stats: SchedulerStats,
}

/// Cooperative tick scheduler with `N` task slots
///
/// Callbacks run single-threaded and to completion, in slot order, from
/// [`Scheduler::execute_ready`]. There is no isolation between tasks: a
/// callback that never returns stalls every other task.
///
/// `N` is at most [`MAX_SLOTS`](super::table::MAX_SLOTS); larger tables
/// fail to compile.
pub struct Scheduler<const N: usize = MAX_TASKS> {
    shared: Mutex<RefCell<Shared<N>>>,
    /// Tick counter, wraps at `u32::MAX`
    tick: AtomicU32,
    /// Set when any task became due since the last drain
    pending: AtomicBool,
    /// Tick delivery gate
    running: AtomicBool,
}

impl<const N: usize> Scheduler<N> {
    /// Create a stopped scheduler with every slot free
    pub const fn new(config: SchedulerConfig) -> Self {
        Self {
            shared: Mutex::new(RefCell::new(Shared {
                table: TaskTable::new(),
                config,
                stats: SchedulerStats::new(),
            })),
            tick: AtomicU32::new(0),
            pending: AtomicBool::new(false),
            running: AtomicBool::new(false),
        }
    }

    /// Reset slots, tick counter, pending signal and statistics
    ///
    /// Leaves the scheduler stopped. Handles issued before the reset are
    /// stale afterwards.
    pub fn init(&self) {
        critical_section::with(|cs| {
            let mut shared = self.shared.borrow_ref_mut(cs);
            shared.table.clear();
            shared.stats = SchedulerStats::new();
            self.tick.store(0, Ordering::Relaxed);
            self.pending.store(false, Ordering::Relaxed);
            self.running.store(false, Ordering::Release);
        });
    }

    /// Adopt a new configuration, then [`Scheduler::init`]
    pub fn init_with(&self, config: SchedulerConfig) {
        critical_section::with(|cs| {
            self.shared.borrow_ref_mut(cs).config = config;
        });
        self.init();
    }

    /// Accept tick notifications
    pub fn start(&self) {
        self.running.store(true, Ordering::Release);
    }

    /// Ignore tick notifications; the task table is left as is
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Register `callback` to run every `period_ms`
    ///
    /// Takes the first free slot. The period is rounded up to whole ticks,
    /// with a minimum of one tick. The first activation is one interval
    /// from now.
    ///
    /// Normal context only.
    pub fn schedule(&self, callback: TaskFn, period_ms: u32) -> Result<TaskHandle, ScheduleError> {
        critical_section::with(|cs| {
            let mut shared = self.shared.borrow_ref_mut(cs);
            let interval = shared.config.interval_ticks(period_ms);
            let now = self.tick.load(Ordering::Relaxed);
            shared.table.insert(callback, interval, now)
        })
    }

    /// Change the period of a scheduled task
    ///
    /// The deadline restarts from now and any activation not yet
    /// dispatched is dropped. Fails with `NotFound` if the slot is free or
    /// out of range, and with `Mismatch` if the slot holds a different
    /// callback or was reassigned since `handle` was issued. On failure the
    /// table is unchanged.
    pub fn reschedule(
        &self,
        callback: TaskFn,
        handle: TaskHandle,
        period_ms: u32,
    ) -> Result<TaskHandle, ScheduleError> {
        critical_section::with(|cs| {
            let mut shared = self.shared.borrow_ref_mut(cs);
            let interval = shared.config.interval_ticks(period_ms);
            let now = self.tick.load(Ordering::Relaxed);
            shared.table.retime(callback, handle, interval, now)
        })
    }

    /// Free the slot held by `handle`
    ///
    /// Same validation as [`Scheduler::reschedule`].
    pub fn unschedule(&self, callback: TaskFn, handle: TaskHandle) -> Result<TaskHandle, ScheduleError> {
        critical_section::with(|cs| self.shared.borrow_ref_mut(cs).table.remove(callback, handle))
    }

    /// Free every slot
    pub fn unschedule_all(&self) {
        critical_section::with(|cs| self.shared.borrow_ref_mut(cs).table.clear());
    }

    /// Tick handler: one tick elapsed
    ///
    /// Call from the tick interrupt. Returns true if any task became due.
    pub fn on_tick(&self) -> bool {
        self.on_ticks(1)
    }

    /// Tick handler: `elapsed` ticks elapsed since the previous call
    ///
    /// For tick sources that detect overruns and report them in a single
    /// notification. Deadlines that fall strictly before the new counter
    /// value were never observed and are resolved by the configured
    /// [`MissPolicy`](crate::config::MissPolicy).
    ///
    /// Ignored while the scheduler is stopped.
    pub fn on_ticks(&self, elapsed: u32) -> bool {
        if elapsed == 0 || !self.is_running() {
            return false;
        }

        critical_section::with(|cs| {
            let now = self
                .tick
                .fetch_add(elapsed, Ordering::Relaxed)
                .wrapping_add(elapsed);

            let mut shared = self.shared.borrow_ref_mut(cs);
            let policy = shared.config.miss_policy;
            let sweep = shared.table.sweep(now, elapsed, policy);
            shared.stats.record_ticks(elapsed, sweep.missed);

            if sweep.due > 0 {
                self.pending.store(true, Ordering::Release);
            }
            sweep.due > 0
        })
    }

    /// Dispatcher: run every due callback once, in slot order
    ///
    /// Call repeatedly from the idle loop; this is the only place callbacks
    /// run. Returns the number of callbacks invoked. Cheap when nothing is
    /// pending.
    ///
    /// The pending signal is cleared before the scan, so a tick landing
    /// mid-drain re-arms it and its work is picked up by the next call.
    /// No lock is held while a callback runs, so callbacks may use the
    /// registration API, including unscheduling themselves.
    pub fn execute_ready(&self) -> usize {
        if !self.pending.swap(false, Ordering::AcqRel) {
            return 0;
        }

        let mut invoked = 0;
        for index in 0..N {
            let ready = critical_section::with(|cs| self.shared.borrow_ref(cs).table.ready(index));
            let Some((callback, generation)) = ready else {
                continue;
            };

            callback();
            invoked += 1;

            critical_section::with(|cs| {
                self.shared
                    .borrow_ref_mut(cs)
                    .table
                    .complete(index, generation)
            });
        }

        critical_section::with(|cs| {
            self.shared
                .borrow_ref_mut(cs)
                .stats
                .record_drain(invoked as u32)
        });

        invoked
    }

    /// Current tick counter
    pub fn now(&self) -> u32 {
        self.tick.load(Ordering::Relaxed)
    }

    /// True if a drain is pending
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Number of task slots
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of occupied slots
    pub fn occupied(&self) -> usize {
        critical_section::with(|cs| self.shared.borrow_ref(cs).table.occupied())
    }

    /// True if `handle` still refers to a scheduled task
    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        critical_section::with(|cs| self.shared.borrow_ref(cs).table.get(handle).is_some())
    }

    /// Period of a scheduled task in ticks
    pub fn interval_ticks(&self, handle: TaskHandle) -> Option<u32> {
        critical_section::with(|cs| {
            self.shared
                .borrow_ref(cs)
                .table
                .get(handle)
                .map(|slot| slot.interval_ticks)
        })
    }

    /// Tick at which a scheduled task next becomes due
    pub fn next_deadline(&self, handle: TaskHandle) -> Option<u32> {
        critical_section::with(|cs| {
            self.shared
                .borrow_ref(cs)
                .table
                .get(handle)
                .map(|slot| slot.next_deadline_tick)
        })
    }

    /// Tick period in milliseconds
    pub fn tick_ms(&self) -> u32 {
        self.config().tick_ms
    }

    /// Active configuration
    pub fn config(&self) -> SchedulerConfig {
        critical_section::with(|cs| self.shared.borrow_ref(cs).config)
    }

    /// Ticks a task with this period would be scheduled at
    pub fn period_to_ticks(&self, period_ms: u32) -> u32 {
        self.config().interval_ticks(period_ms)
    }

    /// Snapshot of the statistics counters
    pub fn stats(&self) -> SchedulerStats {
        critical_section::with(|cs| self.shared.borrow_ref(cs).stats)
    }
}

impl<const N: usize> Default for Scheduler<N> {
    fn default() -> Self {
        Self::new(SchedulerConfig::DEFAULT)
    }
}
