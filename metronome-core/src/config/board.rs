//! Board configuration parser
//!
//! Minimal parser for the TOML subset used by `board.toml`. It does NOT
//! support the full TOML spec.
//!
//! Supported:
//! - `[scheduler]`, `[leds]` and `[led.<name>]` section headers
//! - `key = value` pairs (string, integer, boolean)
//! - Comments (`# ...`), including trailing comments
//!
//! Example:
//!
//! ```toml
//! [scheduler]
//! tick_ms = 25
//! miss_policy = "skip"
//!
//! [leds]
//! task_ms = 100
//!
//! [led.status]
//! inverted = false
//! mode = "blink"
//! blink_ms = 200
//! ```

use core::fmt;

use heapless::String;

use super::types::{BoardConfig, LedConfig, LedMode, MissPolicy, SchedulerConfig, MAX_LABEL_LEN};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Key not valid in the current section
    UnknownKey,
    /// More LEDs than the board supports
    TooManyItems,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSection => write!(f, "invalid section header"),
            ConfigError::InvalidValue => write!(f, "invalid value"),
            ConfigError::UnknownKey => write!(f, "unknown key"),
            ConfigError::TooManyItems => write!(f, "too many items"),
        }
    }
}

/// Current parsing context
#[derive(Debug)]
enum Section {
    Root,
    Scheduler,
    Leds,
    Led,
}

/// Parse `board.toml` contents into a [`BoardConfig`]
///
/// Missing sections and keys keep their defaults.
pub fn parse_board_config(input: &str) -> Result<BoardConfig, ConfigError> {
    let mut config = BoardConfig::new();
    let mut section = Section::Root;
    let mut current_led: Option<LedConfig> = None;

    for line in input.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            let header = strip_comment(line);
            if !header.ends_with(']') {
                return Err(ConfigError::InvalidSection);
            }

            save_led(&mut config, &mut current_led)?;
            section = parse_section_header(&header[1..header.len() - 1], &mut current_led)?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ConfigError::InvalidValue)?;
        match section {
            Section::Root => return Err(ConfigError::UnknownKey),
            Section::Scheduler => apply_scheduler(&mut config.scheduler, key, value)?,
            Section::Leds => apply_leds(&mut config, key, value)?,
            Section::Led => {
                if let Some(led) = current_led.as_mut() {
                    apply_led(led, key, value)?;
                }
            }
        }
    }

    save_led(&mut config, &mut current_led)?;

    Ok(config)
}

/// Parse a section header like "scheduler" or "led.status"
fn parse_section_header(
    header: &str,
    current_led: &mut Option<LedConfig>,
) -> Result<Section, ConfigError> {
    let header = header.trim();

    match header {
        "scheduler" => return Ok(Section::Scheduler),
        "leds" => return Ok(Section::Leds),
        _ => {}
    }

    let name = header
        .strip_prefix("led.")
        .ok_or(ConfigError::InvalidSection)?
        .trim();
    if name.is_empty() || name.contains('.') {
        return Err(ConfigError::InvalidSection);
    }

    let mut led = LedConfig::default();
    led.name = to_label(name)?;
    *current_led = Some(led);

    Ok(Section::Led)
}

fn save_led(config: &mut BoardConfig, current_led: &mut Option<LedConfig>) -> Result<(), ConfigError> {
    if let Some(led) = current_led.take() {
        if config.find_led(led.name.as_str()).is_some() {
            return Err(ConfigError::InvalidSection);
        }
        config.leds.push(led).map_err(|_| ConfigError::TooManyItems)?;
    }
    Ok(())
}

fn apply_scheduler(config: &mut SchedulerConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "tick_ms" => {
            let tick_ms: u32 = parse_int(value)?;
            if tick_ms == 0 {
                return Err(ConfigError::InvalidValue);
            }
            config.tick_ms = tick_ms;
        }
        "miss_policy" => {
            config.miss_policy = match parse_string(value)? {
                "skip" => MissPolicy::Skip,
                "catch_up" => MissPolicy::CatchUp,
                _ => return Err(ConfigError::InvalidValue),
            };
        }
        _ => return Err(ConfigError::UnknownKey),
    }
    Ok(())
}

fn apply_leds(config: &mut BoardConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "task_ms" => {
            let task_ms: u32 = parse_int(value)?;
            if task_ms == 0 {
                return Err(ConfigError::InvalidValue);
            }
            config.led_task_ms = task_ms;
        }
        _ => return Err(ConfigError::UnknownKey),
    }
    Ok(())
}

fn apply_led(led: &mut LedConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "inverted" => led.inverted = parse_bool(value)?,
        "mode" => {
            led.mode = match parse_string(value)? {
                "off" => LedMode::Off,
                "on" => LedMode::On,
                "blink" => LedMode::Blink,
                _ => return Err(ConfigError::InvalidValue),
            };
        }
        "blink_ms" => {
            let blink_ms: u16 = parse_int(value)?;
            if blink_ms == 0 {
                return Err(ConfigError::InvalidValue);
            }
            led.blink_ms = blink_ms;
        }
        _ => return Err(ConfigError::UnknownKey),
    }
    Ok(())
}

/// Split a `key = value` line, dropping any trailing comment
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = strip_comment(line[eq_pos + 1..].trim());

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Remove a trailing `# comment` that is not inside a string
fn strip_comment(value: &str) -> &str {
    let mut in_string = false;
    for (i, c) in value.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return value[..i].trim(),
            _ => {}
        }
    }
    value.trim()
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> Result<&str, ConfigError> {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        Ok(&value[1..value.len() - 1])
    } else if value.contains('"') {
        Err(ConfigError::InvalidValue)
    } else {
        // Allow unquoted strings for simple values
        Ok(value)
    }
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ConfigError> {
    // TOML allows `1_000`
    let mut digits: String<24> = String::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ConfigError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ConfigError::InvalidValue)
}

fn parse_bool(value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidValue),
    }
}

fn to_label(s: &str) -> Result<String<MAX_LABEL_LEN>, ConfigError> {
    let mut label = String::new();
    label.push_str(s).map_err(|_| ConfigError::InvalidValue)?;
    Ok(label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{DEFAULT_LED_TASK_MS, DEFAULT_TICK_MS, MAX_LEDS};

    const BOARD: &str = r#"
# Arduino Due-style board: three LEDs
[scheduler]
tick_ms = 25          # 40 Hz
miss_policy = "skip"

[leds]
task_ms = 100

[led.led1]
inverted = false
mode = "blink"
blink_ms = 200

[led.led2]
inverted = true
mode = "blink"
blink_ms = 500

[led.led3]
inverted = true
mode = "blink"
blink_ms = 1_000
"#;

    #[test]
    fn test_parse_full_board() {
        let config = parse_board_config(BOARD).unwrap();

        assert_eq!(config.scheduler.tick_ms, 25);
        assert_eq!(config.scheduler.miss_policy, MissPolicy::Skip);
        assert_eq!(config.led_task_ms, 100);
        assert_eq!(config.leds.len(), 3);

        let led1 = config.find_led("led1").unwrap();
        assert!(!led1.inverted);
        assert_eq!(led1.mode, LedMode::Blink);
        assert_eq!(led1.blink_ms, 200);

        let led3 = &config.leds[2];
        assert_eq!(led3.name.as_str(), "led3");
        assert!(led3.inverted);
        assert_eq!(led3.blink_ms, 1000);
    }

    #[test]
    fn test_empty_input_gives_defaults() {
        let config = parse_board_config("# nothing here\n\n").unwrap();
        assert_eq!(config.scheduler.tick_ms, DEFAULT_TICK_MS);
        assert_eq!(config.led_task_ms, DEFAULT_LED_TASK_MS);
        assert!(config.leds.is_empty());
    }

    #[test]
    fn test_catch_up_policy() {
        let config = parse_board_config("[scheduler]\nmiss_policy = \"catch_up\"\n").unwrap();
        assert_eq!(config.scheduler.miss_policy, MissPolicy::CatchUp);
        assert_eq!(config.scheduler.tick_ms, DEFAULT_TICK_MS);
    }

    #[test]
    fn test_led_defaults() {
        let config = parse_board_config("[led.fault]\n").unwrap();
        let led = config.find_led("fault").unwrap();
        assert_eq!(led.mode, LedMode::Off);
        assert!(!led.inverted);
    }

    #[test]
    fn test_invalid_section() {
        assert_eq!(
            parse_board_config("[motor]\n"),
            Err(ConfigError::InvalidSection)
        );
        assert_eq!(
            parse_board_config("[led.]\n"),
            Err(ConfigError::InvalidSection)
        );
        assert_eq!(
            parse_board_config("[scheduler\n"),
            Err(ConfigError::InvalidSection)
        );
    }

    #[test]
    fn test_duplicate_led() {
        assert_eq!(
            parse_board_config("[led.a]\n[led.a]\n"),
            Err(ConfigError::InvalidSection)
        );
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            parse_board_config("[scheduler]\ntick_ms = 0\n"),
            Err(ConfigError::InvalidValue)
        );
        assert_eq!(
            parse_board_config("[scheduler]\ntick_ms = fast\n"),
            Err(ConfigError::InvalidValue)
        );
        assert_eq!(
            parse_board_config("[scheduler]\nmiss_policy = \"later\"\n"),
            Err(ConfigError::InvalidValue)
        );
        assert_eq!(
            parse_board_config("[led.a]\ninverted = yes\n"),
            Err(ConfigError::InvalidValue)
        );
        assert_eq!(
            parse_board_config("[led.a]\nblink_ms = 70000\n"),
            Err(ConfigError::InvalidValue)
        );
    }

    #[test]
    fn test_unknown_keys() {
        assert_eq!(
            parse_board_config("tick_ms = 25\n"),
            Err(ConfigError::UnknownKey)
        );
        assert_eq!(
            parse_board_config("[leds]\ncolor = \"red\"\n"),
            Err(ConfigError::UnknownKey)
        );
    }

    #[test]
    fn test_too_many_leds() {
        let mut input: String<256> = String::new();
        for i in 0..=MAX_LEDS {
            let _ = core::fmt::Write::write_fmt(&mut input, format_args!("[led.l{}]\n", i));
        }
        assert_eq!(
            parse_board_config(&input),
            Err(ConfigError::TooManyItems)
        );
    }

    #[test]
    fn test_comment_inside_string_is_kept() {
        assert_eq!(strip_comment("\"a#b\" # trailing"), "\"a#b\"");
        assert_eq!(strip_comment("42"), "42");
    }
}
