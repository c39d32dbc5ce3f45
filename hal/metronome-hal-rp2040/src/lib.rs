//! RP2040-specific HAL for Metronome firmware
//!
//! This crate provides RP2040 implementations of the shared
//! `metronome-hal` traits:
//!
//! - GPIO outputs for status LEDs (implements `metronome_hal::OutputPin`)
//! - Scheduler tick timer on the embassy time driver
//!   (control half implements `metronome_hal::TickSource`)

#![no_std]

pub mod gpio;
pub mod timer;

pub use gpio::RpOutput;
pub use timer::{TickControl, TickTimer};

// Re-export shared traits from metronome-hal for convenience
pub use metronome_hal::{OutputPin, TickSource};
