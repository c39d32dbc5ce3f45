//! Configuration type definitions

use heapless::{String, Vec};

use super::board::ConfigError;

/// Scheduler tick period in milliseconds (40 Hz tick interrupt)
pub const DEFAULT_TICK_MS: u32 = 25;

/// Maximum number of scheduled tasks
pub const MAX_TASKS: usize = 10;

/// Period of the LED service task in milliseconds
pub const DEFAULT_LED_TASK_MS: u32 = 100;

/// Maximum LEDs per board
pub const MAX_LEDS: usize = 4;

/// Maximum label length
pub const MAX_LABEL_LEN: usize = 16;

/// What to do with activations whose exact tick was never observed
///
/// Only matters when the tick handler is told that more than one tick
/// elapsed at once. With one notification per tick both policies behave
/// identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MissPolicy {
    /// Drop the missed activation and resume on the original phase
    #[default]
    Skip,
    /// Fire once, late, then resume on the original phase
    CatchUp,
}

/// Scheduler configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SchedulerConfig {
    /// Duration of one tick in milliseconds (never zero)
    pub tick_ms: u32,
    /// Missed activation handling
    pub miss_policy: MissPolicy,
}

impl SchedulerConfig {
    /// Board default: 25 ms tick, skip missed activations
    pub const DEFAULT: Self = Self::new(DEFAULT_TICK_MS);

    /// Create a config with the given tick period
    ///
    /// A zero tick period is treated as 1 ms.
    pub const fn new(tick_ms: u32) -> Self {
        Self {
            tick_ms: if tick_ms == 0 { 1 } else { tick_ms },
            miss_policy: MissPolicy::Skip,
        }
    }

    /// Same config with a different miss policy
    pub const fn with_miss_policy(mut self, miss_policy: MissPolicy) -> Self {
        self.miss_policy = miss_policy;
        self
    }

    /// Convert a period to a whole number of ticks
    ///
    /// Periods shorter than one tick are clamped to one tick; longer periods
    /// round up, so a task never fires earlier than requested.
    pub const fn interval_ticks(&self, period_ms: u32) -> u32 {
        let tick_ms = if self.tick_ms == 0 { 1 } else { self.tick_ms };
        let period_ms = if period_ms < tick_ms { tick_ms } else { period_ms };
        period_ms.div_ceil(tick_ms)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// LED state at power-on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedMode {
    #[default]
    Off,
    On,
    Blink,
}

/// Configuration for one LED
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedConfig {
    /// Name from the `[led.<name>]` section
    pub name: String<MAX_LABEL_LEN>,
    /// LED lights when the pin is driven low
    pub inverted: bool,
    /// Power-on state
    pub mode: LedMode,
    /// Blink half-period in milliseconds (used when `mode` is `Blink`)
    pub blink_ms: u16,
}

impl Default for LedConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            inverted: false,
            mode: LedMode::Off,
            blink_ms: 500,
        }
    }
}

/// Complete board configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardConfig {
    /// Scheduler settings
    pub scheduler: SchedulerConfig,
    /// Period of the LED service task
    pub led_task_ms: u32,
    /// LEDs in board wiring order
    pub leds: Vec<LedConfig, MAX_LEDS>,
}

impl BoardConfig {
    /// Create an empty board config with default scheduler settings
    pub fn new() -> Self {
        Self {
            scheduler: SchedulerConfig::DEFAULT,
            led_task_ms: DEFAULT_LED_TASK_MS,
            leds: Vec::new(),
        }
    }

    /// Find an LED config by name
    pub fn find_led(&self, name: &str) -> Option<&LedConfig> {
        self.leds.iter().find(|l| l.name.as_str() == name)
    }

    /// Append an LED in wiring order
    ///
    /// Fails with `InvalidValue` if the name does not fit a label and with
    /// `TooManyItems` if the board is full. The config is unchanged on
    /// failure.
    pub fn add_led(
        &mut self,
        name: &str,
        inverted: bool,
        mode: LedMode,
        blink_ms: u16,
    ) -> Result<(), ConfigError> {
        if self.leds.is_full() {
            return Err(ConfigError::TooManyItems);
        }

        let mut label: String<MAX_LABEL_LEN> = String::new();
        label.push_str(name).map_err(|_| ConfigError::InvalidValue)?;

        self.leds
            .push(LedConfig {
                name: label,
                inverted,
                mode,
                blink_ms,
            })
            .map_err(|_| ConfigError::TooManyItems)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_exact_multiple() {
        let config = SchedulerConfig::new(25);
        assert_eq!(config.interval_ticks(200), 8);
        assert_eq!(config.interval_ticks(25), 1);
    }

    #[test]
    fn test_interval_clamps_to_one_tick() {
        let config = SchedulerConfig::new(25);
        assert_eq!(config.interval_ticks(10), 1);
        assert_eq!(config.interval_ticks(0), 1);
    }

    #[test]
    fn test_interval_rounds_up() {
        let config = SchedulerConfig::new(25);
        assert_eq!(config.interval_ticks(30), 2);
        assert_eq!(config.interval_ticks(49), 2);
        assert_eq!(config.interval_ticks(51), 3);
    }

    #[test]
    fn test_interval_max_period() {
        let config = SchedulerConfig::new(1);
        assert_eq!(config.interval_ticks(u32::MAX), u32::MAX);
    }

    #[test]
    fn test_zero_tick_is_sanitized() {
        let config = SchedulerConfig::new(0);
        assert_eq!(config.tick_ms, 1);
        assert_eq!(config.interval_ticks(5), 5);
    }

    #[test]
    fn test_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.tick_ms, DEFAULT_TICK_MS);
        assert_eq!(config.miss_policy, MissPolicy::Skip);

        let board = BoardConfig::default();
        assert_eq!(board.led_task_ms, DEFAULT_LED_TASK_MS);
        assert!(board.leds.is_empty());
    }

    #[test]
    fn test_add_led() {
        let mut board = BoardConfig::new();
        board.add_led("led1", false, LedMode::Blink, 200).unwrap();
        board.add_led("led2", true, LedMode::On, 500).unwrap();

        let led = board.find_led("led1").unwrap();
        assert_eq!(led.mode, LedMode::Blink);
        assert_eq!(led.blink_ms, 200);
        assert!(board.find_led("led2").unwrap().inverted);
    }

    #[test]
    fn test_add_led_rejects_long_name_and_overflow() {
        let mut board = BoardConfig::new();
        assert_eq!(
            board.add_led("a_very_long_led_name", false, LedMode::Off, 500),
            Err(ConfigError::InvalidValue)
        );
        assert!(board.leds.is_empty());

        for _ in 0..MAX_LEDS {
            board.add_led("led", false, LedMode::Off, 500).unwrap();
        }
        assert_eq!(
            board.add_led("extra", false, LedMode::Off, 500),
            Err(ConfigError::TooManyItems)
        );
        assert_eq!(board.leds.len(), MAX_LEDS);
    }
}
