//! Status LED driver
//!
//! A bank of LEDs serviced by one periodic scheduler task. Blink timing is
//! counted in service calls, so blink periods are multiples of the LED task
//! period.

pub mod bank;
pub mod output;

pub use bank::LedBank;
pub use output::{Led, LedState};
