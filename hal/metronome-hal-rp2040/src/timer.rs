//! Scheduler tick timer
//!
//! Produces the scheduler's periodic tick from the embassy time driver. The
//! timer is split in two halves:
//!
//! - [`TickTimer`] is awaited by the tick task, which runs on an interrupt
//!   executor and feeds the scheduler from interrupt context.
//! - [`TickControl`] implements [`TickSource`] and is kept by the main loop
//!   to start and stop tick delivery.
//!
//! Deadlines are absolute, so a late wakeup does not shift later ticks. If
//! the tick task is held off for more than one period, the missed ticks are
//! reported together in a single notification instead of a burst.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Timer};
use metronome_hal::TickSource;

/// Start/stop requests from the control half to the timer half
static TICK_ENABLE: Signal<CriticalSectionRawMutex, bool> = Signal::new();

/// Timer half, owned by the tick task
pub struct TickTimer {
    period: Duration,
    enabled: bool,
    /// Next tick instant while enabled
    deadline: Instant,
}

/// Control half, implements [`TickSource`]
pub struct TickControl {
    tick_ms: u32,
}

impl TickTimer {
    /// Create a stopped tick timer and its control half
    ///
    /// Only one pair may exist; both halves share one enable signal.
    pub fn new(tick_ms: u32) -> (TickTimer, TickControl) {
        let tick_ms = tick_ms.max(1);
        TICK_ENABLE.reset();

        let timer = TickTimer {
            period: Duration::from_millis(u64::from(tick_ms)),
            enabled: false,
            deadline: Instant::now(),
        };
        (timer, TickControl { tick_ms })
    }

    /// Wait for the next tick
    ///
    /// Returns the number of tick periods elapsed since the previous one,
    /// at least 1. Blocks while the timer is stopped.
    pub async fn next(&mut self) -> u32 {
        loop {
            if !self.enabled {
                let enable = TICK_ENABLE.wait().await;
                self.set_enabled(enable);
                continue;
            }

            match select(Timer::at(self.deadline), TICK_ENABLE.wait()).await {
                Either::First(()) => {
                    let late = Instant::now().saturating_duration_since(self.deadline);
                    let elapsed = elapsed_ticks(late.as_ticks(), self.period.as_ticks());
                    self.deadline += self.period * elapsed;
                    return elapsed;
                }
                Either::Second(enable) => self.set_enabled(enable),
            }
        }
    }

    fn set_enabled(&mut self, enable: bool) {
        if enable && !self.enabled {
            self.deadline = Instant::now() + self.period;
        }
        self.enabled = enable;
    }
}

impl TickSource for TickControl {
    fn tick_ms(&self) -> u32 {
        self.tick_ms
    }

    fn start(&mut self) {
        TICK_ENABLE.signal(true);
    }

    fn stop(&mut self) {
        TICK_ENABLE.signal(false);
    }
}

/// Periods covered by a wakeup `late` time-driver ticks after its deadline
fn elapsed_ticks(late: u64, period: u64) -> u32 {
    let missed = late / period.max(1);
    u32::try_from(missed.saturating_add(1)).unwrap_or(u32::MAX)
}
