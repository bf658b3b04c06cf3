//! Command-line options for PomoTime.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tokio::time::Duration;

use crate::engine::TimerError;
use crate::types::{Phase, TimerConfig};

// ============================================================================
// CLI Structure
// ============================================================================

/// PomoTime - a work/break interval timer
#[derive(Parser, Debug)]
#[command(
    name = "pomotime",
    version,
    about = "A single-screen work/break interval timer",
    long_about = "Counts down a work phase, then a break, then work again.\n\
                  Type commands on stdin to control the timer (type 'help' to list them).\n\
                  A looping sound plays while a work phase is running.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Timer options
    #[command(flatten)]
    pub timer: TimerArgs,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Timer Arguments
// ============================================================================

/// Options for the interactive timer
#[derive(Args, Debug, Clone)]
pub struct TimerArgs {
    /// Work duration in minutes (fractions allowed, e.g. 0.5)
    #[arg(short, long, default_value = "25", value_parser = parse_minutes)]
    pub work: f64,

    /// Break duration in minutes (fractions allowed)
    #[arg(
        short = 'b',
        long = "break",
        default_value = "5",
        value_parser = parse_minutes
    )]
    pub break_time: f64,

    /// Audio file to loop during work phases (defaults to a built-in beep)
    #[arg(short, long, value_name = "PATH")]
    pub sound: Option<PathBuf>,

    /// Disable the work-phase sound
    #[arg(long, conflicts_with = "sound")]
    pub no_sound: bool,

    /// Tick period in milliseconds
    #[arg(
        long,
        default_value = "1000",
        hide = true,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub tick_millis: u64,
}

impl Default for TimerArgs {
    fn default() -> Self {
        Self {
            work: 25.0,
            break_time: 5.0,
            sound: None,
            no_sound: false,
            tick_millis: 1000,
        }
    }
}

impl TimerArgs {
    /// Builds the timer configuration from the minute values.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::InvalidDuration` if a value cannot be used.
    pub fn to_config(&self) -> Result<TimerConfig, TimerError> {
        Ok(TimerConfig {
            work_seconds: TimerConfig::seconds_from_minutes(Phase::Work, self.work)?,
            break_seconds: TimerConfig::seconds_from_minutes(Phase::Break, self.break_time)?,
        })
    }

    /// Returns the tick period.
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Parses a positive, finite number of minutes.
pub fn parse_minutes(s: &str) -> Result<f64, String> {
    let minutes: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a number of minutes"))?;

    if !minutes.is_finite() || minutes <= 0.0 {
        return Err(format!("'{s}' must be a positive number of minutes"));
    }
    Ok(minutes)
}

// ============================================================================
// Tests
// ============================================================================
