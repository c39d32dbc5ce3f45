//! Single LED output

use metronome_hal::OutputPin;

/// Logical LED state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedState {
    #[default]
    Off,
    On,
    /// Toggling every `blink_ticks` service calls
    Blink,
}

/// One LED on a GPIO pin
///
/// The pin can be wired active-high (default) or active-low.
pub struct Led<P> {
    pin: P,
    /// If true, LED lit = pin LOW
    inverted: bool,
    state: LedState,
    /// State to restore at the end of a test inversion
    saved_state: LedState,
    /// Service calls between blink toggles
    blink_ticks: u16,
    blink_countdown: u16,
}

impl<P: OutputPin> Led<P> {
    /// Create an LED and switch it off
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut led = Self {
            pin,
            inverted,
            state: LedState::Off,
            saved_state: LedState::Off,
            blink_ticks: 0,
            blink_countdown: 0,
        };
        led.light(false);
        led
    }

    pub fn state(&self) -> LedState {
        self.state
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Change the wiring polarity, keeping the visible state
    pub fn set_inverted(&mut self, inverted: bool) {
        let lit = self.is_lit();
        self.inverted = inverted;
        self.light(lit);
    }

    /// True if the LED is currently emitting light
    pub fn is_lit(&self) -> bool {
        self.pin.is_set_high() != self.inverted
    }

    pub fn blink_ticks(&self) -> u16 {
        self.blink_ticks
    }

    pub fn on(&mut self) {
        self.state = LedState::On;
        self.light(true);
    }

    pub fn off(&mut self) {
        self.state = LedState::Off;
        self.light(false);
    }

    /// Flip a steady LED; ignored while blinking
    pub fn toggle(&mut self) {
        match self.state {
            LedState::Blink => {}
            LedState::On => self.off(),
            LedState::Off => self.on(),
        }
    }

    /// Start blinking, toggling every `blink_ticks` service calls
    ///
    /// Starts lit. Zero is treated as one.
    pub fn blink(&mut self, blink_ticks: u16) {
        self.state = LedState::Blink;
        self.blink_ticks = blink_ticks.max(1);
        self.restart_blink();
    }

    /// Invert the visible state, remembering the current one
    ///
    /// A lit or blinking LED goes dark, a dark one lights up.
    pub fn test_start(&mut self) {
        self.saved_state = self.state;
        match self.state {
            LedState::On | LedState::Blink => self.off(),
            LedState::Off => self.on(),
        }
    }

    /// Restore the state saved by [`Led::test_start`]
    ///
    /// A blinking LED restarts its cycle, lit.
    pub fn test_end(&mut self) {
        self.state = self.saved_state;
        match self.state {
            LedState::On => self.light(true),
            LedState::Off => self.light(false),
            LedState::Blink => self.restart_blink(),
        }
    }

    /// Advance the blink countdown by one service call
    pub fn service(&mut self) {
        if self.state != LedState::Blink {
            return;
        }

        self.blink_countdown = self.blink_countdown.saturating_sub(1);
        if self.blink_countdown == 0 {
            self.blink_countdown = self.blink_ticks;
            self.pin.toggle();
        }
    }

    fn restart_blink(&mut self) {
        self.blink_countdown = self.blink_ticks;
        self.light(true);
    }

    fn light(&mut self, lit: bool) {
        // Normal: lit → high, inverted: lit → low
        self.pin.set_level(lit != self.inverted);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Mock GPIO pin for testing
    pub(crate) struct MockPin {
        pub high: bool,
        pub toggles: u32,
    }

    impl MockPin {
        pub fn new() -> Self {
            Self {
                high: false,
                toggles: 0,
            }
        }
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn toggle(&mut self) {
            self.high = !self.high;
            self.toggles += 1;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    #[test]
    fn test_starts_off() {
        let led = Led::new(MockPin::new(), false);
        assert_eq!(led.state(), LedState::Off);
        assert!(!led.pin.high);

        // Active-low: off means pin high
        let led = Led::new(MockPin::new(), true);
        assert!(!led.is_lit());
        assert!(led.pin.high);
    }

    #[test]
    fn test_on_off_inverted() {
        let mut led = Led::new(MockPin::new(), true);

        led.on();
        assert!(led.is_lit());
        assert!(!led.pin.high);

        led.off();
        assert!(!led.is_lit());
        assert!(led.pin.high);
    }

    #[test]
    fn test_toggle_ignored_while_blinking() {
        let mut led = Led::new(MockPin::new(), false);

        led.toggle();
        assert_eq!(led.state(), LedState::On);
        led.toggle();
        assert_eq!(led.state(), LedState::Off);

        led.blink(2);
        led.toggle();
        assert_eq!(led.state(), LedState::Blink);
        assert!(led.is_lit());
    }

    #[test]
    fn test_blink_cycle() {
        let mut led = Led::new(MockPin::new(), false);
        led.blink(2);
        assert!(led.is_lit());

        led.service();
        assert!(led.is_lit());
        led.service();
        assert!(!led.is_lit());
        led.service();
        assert!(!led.is_lit());
        led.service();
        assert!(led.is_lit());
        assert_eq!(led.pin.toggles, 2);
    }

    #[test]
    fn test_blink_zero_ticks_toggles_every_call() {
        let mut led = Led::new(MockPin::new(), true);
        led.blink(0);
        assert_eq!(led.blink_ticks(), 1);

        led.service();
        assert!(!led.is_lit());
        led.service();
        assert!(led.is_lit());
    }

    #[test]
    fn test_service_ignores_steady_leds() {
        let mut led = Led::new(MockPin::new(), false);
        led.on();
        for _ in 0..10 {
            led.service();
        }
        assert!(led.is_lit());
        assert_eq!(led.pin.toggles, 0);
    }

    #[test]
    fn test_test_mode_inverts_and_restores() {
        let mut led = Led::new(MockPin::new(), false);

        led.test_start();
        assert!(led.is_lit());
        led.test_end();
        assert!(!led.is_lit());
        assert_eq!(led.state(), LedState::Off);

        led.on();
        led.test_start();
        assert!(!led.is_lit());
        led.test_end();
        assert!(led.is_lit());
        assert_eq!(led.state(), LedState::On);
    }

    #[test]
    fn test_test_mode_restarts_blink_lit() {
        let mut led = Led::new(MockPin::new(), false);
        led.blink(3);
        led.service();
        led.service();
        led.service();
        assert!(!led.is_lit());

        led.test_start();
        assert_eq!(led.state(), LedState::Off);
        led.service();
        assert!(!led.is_lit());

        led.test_end();
        assert_eq!(led.state(), LedState::Blink);
        assert!(led.is_lit());
        led.service();
        led.service();
        assert!(led.is_lit());
        led.service();
        assert!(!led.is_lit());
    }

    #[test]
    fn test_set_inverted_keeps_visible_state() {
        let mut led = Led::new(MockPin::new(), false);
        led.on();
        led.set_inverted(true);
        assert!(led.is_lit());
        assert!(!led.pin.high);
    }
}
