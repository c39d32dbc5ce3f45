//! Metronome Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the scheduler and its
//! clients depend on. Chip-specific crates (RP2040, ...) implement them so
//! the same application code runs on different boards.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (metronome-firmware)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  metronome-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ metronome-hal-│
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital output (LEDs)
//! - [`timer::TickSource`] - Periodic scheduler tick

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod timer;

// Re-export key traits at crate root for convenience
pub use gpio::OutputPin;
pub use timer::TickSource;
