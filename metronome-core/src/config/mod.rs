//! Configuration types
//!
//! Board configuration is compiled into the firmware as `board.toml` and
//! parsed at boot into the types below.

pub mod board;
pub mod types;

pub use board::{parse_board_config, ConfigError};
pub use types::*;
