//! Driver implementations
//!
//! Concrete drivers built on the metronome-hal traits and scheduled by
//! metronome-core:
//!
//! - Status LEDs (steady, blinking, test inversion)

#![no_std]
#![deny(unsafe_code)]

pub mod led;
