//! GPIO outputs
//!
//! Push-pull outputs for LEDs. The pin starts at the requested level so an
//! active-low LED can be kept dark from reset.

use embassy_rp::gpio::{Level, Output, Pin};
use embassy_rp::Peri;
use metronome_hal::OutputPin;

/// RP2040 push-pull output
pub struct RpOutput<'d> {
    output: Output<'d>,
}

impl<'d> RpOutput<'d> {
    /// Configure `pin` as an output driven to `high`
    pub fn new(pin: Peri<'d, impl Pin>, high: bool) -> Self {
        Self {
            output: Output::new(pin, Level::from(high)),
        }
    }

    /// Configure `pin` as an output driving an LED that starts dark
    pub fn led(pin: Peri<'d, impl Pin>, inverted: bool) -> Self {
        Self::new(pin, inverted)
    }
}

impl OutputPin for RpOutput<'_> {
    fn set_high(&mut self) {
        self.output.set_high();
    }

    fn set_low(&mut self) {
        self.output.set_low();
    }

    fn toggle(&mut self) {
        self.output.toggle();
    }

    fn is_set_high(&self) -> bool {
        self.output.is_set_high()
    }
}
