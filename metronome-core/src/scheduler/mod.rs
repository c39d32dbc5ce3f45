//! Tick scheduler
//!
//! Multiplexes periodic callbacks onto a single hardware tick. The tick
//! handler runs in interrupt context and only marks tasks due; callbacks
//! run later, from the main loop, when it calls
//! [`Scheduler::execute_ready`].

pub mod executor;
pub mod stats;
pub mod table;

pub use executor::Scheduler;
pub use stats::SchedulerStats;
pub use table::{ScheduleError, TaskFn, TaskHandle, MAX_SLOTS};
