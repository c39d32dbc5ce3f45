//! Build script for metronome-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates board.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// LED pins wired on the board (must match src/board.rs)
const BOARD_LEDS: usize = 3;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate board.toml at compile time
///
/// The firmware falls back to built-in defaults if the embedded config
/// fails to parse; catching mistakes here keeps that path for corrupted
/// builds only.
fn validate_config() {
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");

    if !config_path.exists() {
        fail(
            "board.toml not found",
            &["The firmware embeds board.toml from the metronome-firmware directory.".into()],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read board.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in board.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();
    validate_root(&config, &mut errors);
    validate_scheduler(&config, &mut errors);
    validate_leds(&config, &mut errors);

    if !errors.is_empty() {
        fail("Invalid board configuration", &errors);
    }

    println!("cargo:warning=board.toml validated successfully");
}

/// Abort the build with a boxed error listing
fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        format_error_lines(lines)
    );
}

/// Format error message lines with box drawing
fn format_error_lines(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| {
            let truncated = if line.chars().count() > 62 {
                let end = line.char_indices().nth(59).map_or(line.len(), |(i, _)| i);
                format!("{}...", &line[..end])
            } else {
                line.to_string()
            };
            format!("║  • {:<62} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn validate_root(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };

    for key in root.keys() {
        if !["scheduler", "leds", "led"].contains(&key.as_str()) {
            errors.push(format!("unknown section [{}]", key));
        }
    }
}

fn validate_scheduler(config: &toml::Value, errors: &mut Vec<String>) {
    let scheduler = match config.get("scheduler") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[scheduler] must be a table".into());
            return;
        }
        None => return,
    };

    for (key, value) in scheduler {
        match key.as_str() {
            "tick_ms" => check_positive("[scheduler] tick_ms", value, u32::MAX as i64, errors),
            "miss_policy" => match value.as_str() {
                Some("skip") | Some("catch_up") => {}
                _ => errors.push("[scheduler] miss_policy must be 'skip' or 'catch_up'".into()),
            },
            _ => errors.push(format!("[scheduler] unknown key '{}'", key)),
        }
    }
}

fn validate_leds(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(leds) = config.get("leds") {
        match leds.as_table() {
            Some(t) => {
                for (key, value) in t {
                    match key.as_str() {
                        "task_ms" => check_positive("[leds] task_ms", value, u32::MAX as i64, errors),
                        _ => errors.push(format!("[leds] unknown key '{}'", key)),
                    }
                }
            }
            None => errors.push("[leds] must be a table".into()),
        }
    }

    let leds = match config.get("led") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[led.*] entries must be tables".into());
            return;
        }
        None => return,
    };

    if leds.len() > BOARD_LEDS {
        errors.push(format!(
            "{} [led.*] sections, board has {} LEDs",
            leds.len(),
            BOARD_LEDS
        ));
    }

    for (name, led) in leds {
        let led = match led.as_table() {
            Some(t) => t,
            None => {
                errors.push(format!("[led.{}] must be a table", name));
                continue;
            }
        };

        if name.len() > 16 {
            errors.push(format!("[led.{}] name longer than 16 characters", name));
        }

        for (key, value) in led {
            match key.as_str() {
                "inverted" => {
                    if !value.is_bool() {
                        errors.push(format!("[led.{}] inverted must be true or false", name));
                    }
                }
                "mode" => match value.as_str() {
                    Some("off") | Some("on") | Some("blink") => {}
                    _ => errors.push(format!("[led.{}] mode must be 'off', 'on' or 'blink'", name)),
                },
                "blink_ms" => {
                    check_positive(&format!("[led.{}] blink_ms", name), value, u16::MAX as i64, errors)
                }
                _ => errors.push(format!("[led.{}] unknown key '{}'", name, key)),
            }
        }
    }
}

fn check_positive(what: &str, value: &toml::Value, max: i64, errors: &mut Vec<String>) {
    match value.as_integer() {
        Some(n) if n >= 1 && n <= max => {}
        _ => errors.push(format!("{} must be an integer in 1..={}", what, max)),
    }
}
