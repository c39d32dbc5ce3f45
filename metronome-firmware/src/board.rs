//! Board definition
//!
//! Fixed pin assignments and configuration loading. `board.toml` decides
//! what each LED does; which GPIO it is on is a property of the board.
//!
//! Raspberry Pi Pico:
//! - led1: GPIO25 (onboard LED)
//! - led2: GPIO14
//! - led3: GPIO15

use defmt::*;
use embassy_rp::peripherals::{PIN_14, PIN_15, PIN_25};
use embassy_rp::{Peri, Peripherals};

use metronome_core::config::{parse_board_config, BoardConfig, LedMode};
use metronome_drivers::led::{Led, LedBank};
use metronome_hal_rp2040::RpOutput;

/// Number of LEDs wired on the board
pub const LED_COUNT: usize = 3;

/// Board LED bank type
pub type BoardLeds = LedBank<RpOutput<'static>, LED_COUNT>;

/// LED pins in wiring order
pub struct LedPins {
    pub led1: Peri<'static, PIN_25>,
    pub led2: Peri<'static, PIN_14>,
    pub led3: Peri<'static, PIN_15>,
}

impl LedPins {
    pub fn take(p: Peripherals) -> Self {
        Self {
            led1: p.PIN_25,
            led2: p.PIN_14,
            led3: p.PIN_15,
        }
    }
}

/// Parse the embedded config, falling back to defaults on error
pub fn load_config(source: &str) -> BoardConfig {
    match parse_board_config(source) {
        Ok(config) => {
            info!(
                "Loaded board config: {} LEDs, LED task {} ms",
                config.leds.len(),
                config.led_task_ms
            );
            if config.leds.len() > LED_COUNT {
                warn!(
                    "Board has {} LEDs, ignoring {} extra entries",
                    LED_COUNT,
                    config.leds.len() - LED_COUNT
                );
            }
            config
        }
        Err(e) => {
            error!("Failed to parse board config: {}, using defaults", e);
            default_config()
        }
    }
}

/// Built-in configuration: LED1/LED2/LED3 blinking at 200/500/1000 ms
pub fn default_config() -> BoardConfig {
    let mut config = BoardConfig::default();

    for (name, inverted, blink_ms) in [("led1", false, 200), ("led2", true, 500), ("led3", true, 1000)] {
        let added = config.add_led(name, inverted, LedMode::Blink, blink_ms);
        debug_assert!(added.is_ok());
    }

    config
}

/// Build the LED bank, starting every LED dark on its configured polarity
pub fn led_bank(pins: LedPins, config: &BoardConfig) -> BoardLeds {
    let inverted = |index: usize| config.leds.get(index).is_some_and(|led| led.inverted);

    let leds = [
        Led::new(RpOutput::led(pins.led1, inverted(0)), inverted(0)),
        Led::new(RpOutput::led(pins.led2, inverted(1)), inverted(1)),
        Led::new(RpOutput::led(pins.led3, inverted(2)), inverted(2)),
    ];
    let mut bank = LedBank::new(leds, config.led_task_ms);

    for (index, led) in config.leds.iter().take(LED_COUNT).enumerate() {
        bank.apply(index, led);
        debug!("{}: {} (inverted={})", led.name.as_str(), led.mode, led.inverted);
    }

    bank
}
