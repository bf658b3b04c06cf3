//! Display utilities for the PomoTime console.
//!
//! This module provides formatted output for:
//! - The live timer line (phase title, clock, button label)
//! - Status reports, as text or JSON
//! - Phase alerts and error messages

use std::io::{self, Write};

use crate::engine::Notice;
use crate::types::{Phase, TimerSnapshot};

use super::console::HELP_TEXT;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for console output.
pub struct Display;

impl Display {
    /// Returns the title shown for a phase.
    pub fn phase_title(phase: Phase) -> &'static str {
        match phase {
            Phase::Work => "Work Time",
            Phase::Break => "Break Time",
        }
    }

    /// Formats seconds as `M:SS`.
    ///
    /// Minutes are not capped, so 7200 seconds renders as `120:00`.
    pub fn format_clock(total_seconds: u32) -> String {
        let (minutes, seconds) = Self::format_time(total_seconds);
        format!("{}:{:02}", minutes, seconds)
    }

    /// Returns the label of the Start/Pause button.
    pub fn button_label(is_running: bool) -> &'static str {
        if is_running {
            "Pause"
        } else {
            "Start"
        }
    }

    /// Renders the one-line timer view.
    pub fn render(snapshot: &TimerSnapshot) -> String {
        format!(
            "{}  {}  [{}]",
            Self::phase_title(snapshot.phase),
            Self::format_clock(snapshot.remaining_seconds),
            Self::button_label(snapshot.is_running)
        )
    }

    /// Whether the change between two snapshots is more than a tick.
    pub fn is_transition(prev: &TimerSnapshot, next: &TimerSnapshot) -> bool {
        prev.phase != next.phase
            || prev.is_running != next.is_running
            || prev.work_seconds != next.work_seconds
            || prev.break_seconds != next.break_seconds
            || next.remaining_seconds > prev.remaining_seconds
    }

    /// Redraws the timer line in place.
    pub fn show_live(snapshot: &TimerSnapshot) {
        let mut stdout = io::stdout().lock();
        let _ = write!(stdout, "\r\x1b[2K{}", Self::render(snapshot));
        let _ = stdout.flush();
    }

    /// Prints the timer line on its own line.
    pub fn show_snapshot(snapshot: &TimerSnapshot) {
        println!("{}", Self::render(snapshot));
    }

    /// Shows the current timer status.
    pub fn show_status(snapshot: &TimerSnapshot, json: bool) {
        if json {
            match serde_json::to_string(snapshot) {
                Ok(line) => println!("{}", line),
                Err(e) => Self::show_error(&e.to_string()),
            }
            return;
        }

        println!("{}", Self::format_status(snapshot));
    }

    /// Shows a phase alert or an audio warning.
    pub fn show_notice(notice: &Notice) {
        println!("\n* {}", notice.message());
    }

    /// Shows the startup banner.
    pub fn show_welcome(snapshot: &TimerSnapshot) {
        println!("PomoTime");
        println!("─────────────────────────────");
        println!(
            "Work {} / Break {}. Press Enter to start or pause, 'help' for commands.",
            Self::format_clock(snapshot.work_seconds),
            Self::format_clock(snapshot.break_seconds)
        );
    }

    /// Shows the console command list.
    pub fn show_help() {
        println!("{}", HELP_TEXT);
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("error: {}", message);
    }

    fn format_status(snapshot: &TimerSnapshot) -> String {
        let state = if snapshot.is_running {
            "running"
        } else {
            "paused"
        };

        [
            format!("Phase: {}", Self::phase_title(snapshot.phase)),
            format!("Remaining: {}", Self::format_clock(snapshot.remaining_seconds)),
            format!("State: {}", state),
            format!("Work duration: {}", Self::format_clock(snapshot.work_seconds)),
            format!("Break duration: {}", Self::format_clock(snapshot.break_seconds)),
        ]
        .join("\n")
    }

    /// Formats remaining seconds as (minutes, seconds).
    fn format_time(total_seconds: u32) -> (u32, u32) {
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;
        (minutes, seconds)
    }
}

// ============================================================================
// Tests
// ============================================================================
