//! GPIO pin abstractions
//!
//! Digital output used by the LED driver. Chip HALs implement it on top of
//! their own pin types.

/// Digital output pin
///
/// Implementations handle the register manipulation for the specific chip.
/// Levels here are electrical levels; active-low wiring is handled by the
/// driver using the pin, not by the pin itself.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Toggle the pin state
    fn toggle(&mut self) {
        if self.is_set_high() {
            self.set_low();
        } else {
            self.set_high();
        }
    }

    /// Set the pin to a specific level
    fn set_level(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently driven high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently driven low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Latch {
        high: bool,
        writes: u32,
    }

    impl OutputPin for Latch {
        fn set_high(&mut self) {
            self.high = true;
            self.writes += 1;
        }

        fn set_low(&mut self) {
            self.high = false;
            self.writes += 1;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    #[test]
    fn test_default_toggle() {
        let mut pin = Latch {
            high: false,
            writes: 0,
        };

        pin.toggle();
        assert!(pin.is_set_high());
        pin.toggle();
        assert!(pin.is_set_low());
        assert_eq!(pin.writes, 2);
    }

    #[test]
    fn test_set_level() {
        let mut pin = Latch {
            high: false,
            writes: 0,
        };

        pin.set_level(true);
        assert!(pin.is_set_high());
        pin.set_level(false);
        assert!(!pin.is_set_high());
    }
}
