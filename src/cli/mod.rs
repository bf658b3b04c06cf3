//! CLI module for PomoTime.
//!
//! This module provides the console front-end:
//! - `commands`: Command-line options using clap derive
//! - `console`: Interactive line commands read from stdin
//! - `display`: Output formatting and display logic

pub mod commands;
pub mod console;
pub mod display;

pub use commands::{Cli, Commands, TimerArgs};
pub use console::{spawn_line_reader, ConsoleCommand};
pub use display::Display;
