//! Core data types for the interval timer.
//!
//! This module defines the data structures used for:
//! - The work/break phase
//! - Timer configuration with validation
//! - The countdown state and its pure transitions
//! - Read-only snapshots for the presentation layer

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::TimerError;

/// Default work duration in seconds (25 minutes).
pub const DEFAULT_WORK_SECONDS: u32 = 25 * 60;

/// Default break duration in seconds (5 minutes).
pub const DEFAULT_BREAK_SECONDS: u32 = 5 * 60;

// ============================================================================
// Phase
// ============================================================================

/// The phase the countdown belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Focused work
    #[default]
    Work,
    /// Rest between work sessions
    Break,
}

impl Phase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Work => "work",
            Phase::Break => "break",
        }
    }

    /// Returns the phase entered after this one completes.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Phase::Work => Phase::Break,
            Phase::Break => Phase::Work,
        }
    }

    /// Returns true for the break phase.
    pub fn is_break(&self) -> bool {
        matches!(self, Phase::Break)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TimerConfig
// ============================================================================

/// Configured phase lengths, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Work duration in seconds (> 0)
    pub work_seconds: u32,
    /// Break duration in seconds (> 0)
    pub break_seconds: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_seconds: DEFAULT_WORK_SECONDS,
            break_seconds: DEFAULT_BREAK_SECONDS,
        }
    }
}

impl TimerConfig {
    /// Returns the configuration with the specified work duration.
    pub fn with_work_seconds(mut self, seconds: u32) -> Self {
        self.work_seconds = seconds;
        self
    }

    /// Returns the configuration with the specified break duration.
    pub fn with_break_seconds(mut self, seconds: u32) -> Self {
        self.break_seconds = seconds;
        self
    }

    /// Returns the configured duration for `phase`.
    pub fn duration_of(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Work => self.work_seconds,
            Phase::Break => self.break_seconds,
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::InvalidDuration` naming the first zero duration.
    pub fn validate(&self) -> Result<(), TimerError> {
        validate_seconds(Phase::Work, self.work_seconds)?;
        validate_seconds(Phase::Break, self.break_seconds)?;
        Ok(())
    }

    /// Converts a user-facing minute value into whole seconds.
    ///
    /// Fractional minutes are rounded up to the next whole second, so any
    /// positive input yields at least one second.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::InvalidDuration` for non-finite, zero, negative
    /// or out-of-range values.
    ///
    /// # Example
    ///
    /// ```
    /// use pomotime::types::{Phase, TimerConfig};
    ///
    /// assert_eq!(TimerConfig::seconds_from_minutes(Phase::Work, 25.0).unwrap(), 1500);
    /// assert_eq!(TimerConfig::seconds_from_minutes(Phase::Work, 0.001).unwrap(), 1);
    /// assert!(TimerConfig::seconds_from_minutes(Phase::Break, -5.0).is_err());
    /// ```
    pub fn seconds_from_minutes(phase: Phase, minutes: f64) -> Result<u32, TimerError> {
        let invalid = || TimerError::InvalidDuration {
            phase,
            value: format!("{minutes} min"),
        };

        if !minutes.is_finite() || minutes <= 0.0 {
            return Err(invalid());
        }

        let seconds = (minutes * 60.0).ceil();
        if seconds > f64::from(u32::MAX) {
            return Err(invalid());
        }

        // ceil of a positive value is at least 1
        Ok(seconds as u32)
    }
}

/// Rejects zero-length durations.
pub(crate) fn validate_seconds(phase: Phase, seconds: u32) -> Result<(), TimerError> {
    if seconds == 0 {
        return Err(TimerError::InvalidDuration {
            phase,
            value: format!("{seconds}s"),
        });
    }
    Ok(())
}

// ============================================================================
// TimerState
// ============================================================================

/// The countdown state driven by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    /// Seconds left in the current phase
    pub remaining_seconds: u32,
    /// Whether the countdown is actively ticking
    pub is_running: bool,
    /// Current phase
    pub phase: Phase,
}

impl TimerState {
    /// Creates an idle work-phase state counting down from the work duration.
    pub fn new(config: &TimerConfig) -> Self {
        Self {
            remaining_seconds: config.work_seconds,
            is_running: false,
            phase: Phase::Work,
        }
    }

    /// Returns true if the current phase is a break.
    pub fn is_break_phase(&self) -> bool {
        self.phase.is_break()
    }

    /// Decrements the countdown by one second.
    ///
    /// Returns true if the countdown has reached zero, including when it was
    /// already zero on entry.
    pub fn tick(&mut self) -> bool {
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        self.remaining_seconds == 0
    }

    /// Stops the countdown and enters the next phase at its full duration.
    ///
    /// Returns the phase that just completed.
    pub fn roll_over(&mut self, config: &TimerConfig) -> Phase {
        let completed = self.phase;
        self.is_running = false;
        self.phase = completed.next();
        self.remaining_seconds = config.duration_of(self.phase);
        completed
    }

    /// Returns to an idle work phase at the full work duration.
    pub fn reset(&mut self, config: &TimerConfig) {
        self.is_running = false;
        self.phase = Phase::Work;
        self.remaining_seconds = config.work_seconds;
    }
}

// ============================================================================
// TimerSnapshot
// ============================================================================

/// Everything the presentation layer needs to render the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    /// Current phase
    pub phase: Phase,
    /// Seconds left in the current phase
    pub remaining_seconds: u32,
    /// Whether the countdown is ticking
    pub is_running: bool,
    /// Configured work duration
    pub work_seconds: u32,
    /// Configured break duration
    pub break_seconds: u32,
}

impl TimerSnapshot {
    /// Builds a snapshot from the state and configuration.
    pub fn capture(state: &TimerState, config: &TimerConfig) -> Self {
        Self {
            phase: state.phase,
            remaining_seconds: state.remaining_seconds,
            is_running: state.is_running,
            work_seconds: config.work_seconds,
            break_seconds: config.break_seconds,
        }
    }
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        let config = TimerConfig::default();
        Self::capture(&TimerState::new(&config), &config)
    }
}

// ============================================================================
// Tests
// ============================================================================
