//! Board-agnostic core logic for the Metronome firmware
//!
//! This crate contains the timing core, which does not depend on any
//! specific hardware:
//!
//! - Fixed-capacity task table and registration API
//! - Tick handler (interrupt context) and dispatcher (main loop)
//! - Scheduler statistics
//! - Board configuration types and the `board.toml` parser

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod scheduler;
