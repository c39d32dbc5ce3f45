//! Firmware tasks
//!
//! `tick` is an embassy task on the interrupt executor. Everything else is
//! a scheduler callback.

pub mod stats;
pub mod tick;

pub use tick::tick_task;
