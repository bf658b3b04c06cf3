//! Timer engine for the work/break cycle.
//!
//! This module provides the core timer functionality:
//! - State transitions (idle/running × work/break)
//! - Countdown driven by an owned [`TickSource`]
//! - Phase rollover when the countdown reaches zero
//! - Event firing for the audio cue and user-facing alerts
//!
//! The engine never talks to audio or UI directly. Everything downstream
//! subscribes to the [`TimerEvent`] channel.

use tokio::sync::mpsc;
use tracing::debug;

use crate::types::{validate_seconds, Phase, TimerConfig, TimerSnapshot, TimerState};

use super::error::TimerError;
use super::ticker::{TickSignal, TickSource};

// ============================================================================
// TimerEvent
// ============================================================================

/// Timer events for the audio cue and the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Countdown started or resumed
    Started {
        /// Phase being counted down
        phase: Phase,
        /// Remaining seconds at start
        remaining_seconds: u32,
    },
    /// Countdown paused
    Paused {
        /// Phase that was paused
        phase: Phase,
        /// Remaining seconds at pause
        remaining_seconds: u32,
    },
    /// Timer returned to an idle work phase
    Reset {
        /// Full work duration
        remaining_seconds: u32,
    },
    /// A phase duration was reconfigured
    DurationChanged {
        /// Phase whose duration changed
        phase: Phase,
        /// New duration in seconds
        seconds: u32,
        /// True if the running countdown was stopped by the change
        interrupted: bool,
    },
    /// One second elapsed
    Tick {
        /// Current phase
        phase: Phase,
        /// Remaining seconds
        remaining_seconds: u32,
    },
    /// The countdown reached zero and the phase rolled over
    PhaseCompleted {
        /// Phase that just finished
        completed: Phase,
        /// Phase now waiting to be started
        next: Phase,
        /// Full duration of the next phase
        remaining_seconds: u32,
    },
    /// The engine was torn down
    Shutdown,
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Timer engine that owns the countdown state and its tick source.
pub struct TimerEngine {
    /// Current countdown state
    state: TimerState,
    /// Configured phase durations
    config: TimerConfig,
    /// Periodic trigger, active exactly while the countdown runs
    ticker: Box<dyn TickSource>,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<TimerEvent>,
}

impl TimerEngine {
    /// Creates an idle engine in the work phase.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::InvalidDuration` if either duration is zero.
    pub fn new(
        config: TimerConfig,
        ticker: Box<dyn TickSource>,
        event_tx: mpsc::UnboundedSender<TimerEvent>,
    ) -> Result<Self, TimerError> {
        config.validate()?;

        Ok(Self {
            state: TimerState::new(&config),
            config,
            ticker,
            event_tx,
        })
    }

    /// Starts or resumes the countdown.
    ///
    /// Returns false without side effects if the countdown is already running
    /// or there is no time left to count.
    pub fn start(&mut self) -> bool {
        if self.state.is_running {
            debug!("Start ignored: already running");
            return false;
        }
        if self.state.remaining_seconds == 0 {
            debug!("Start ignored: no time remaining");
            return false;
        }

        self.state.is_running = true;
        self.ticker.activate();

        debug!(
            "Started {} phase with {}s remaining",
            self.state.phase, self.state.remaining_seconds
        );
        self.emit(TimerEvent::Started {
            phase: self.state.phase,
            remaining_seconds: self.state.remaining_seconds,
        });
        true
    }

    /// Pauses the countdown, keeping the remaining time.
    ///
    /// Returns false if the countdown was not running.
    pub fn pause(&mut self) -> bool {
        self.ticker.deactivate();

        if !self.state.is_running {
            return false;
        }
        self.state.is_running = false;

        debug!(
            "Paused {} phase with {}s remaining",
            self.state.phase, self.state.remaining_seconds
        );
        self.emit(TimerEvent::Paused {
            phase: self.state.phase,
            remaining_seconds: self.state.remaining_seconds,
        });
        true
    }

    /// Stops the countdown and returns to an idle work phase.
    pub fn reset(&mut self) {
        self.ticker.deactivate();
        self.state.reset(&self.config);

        debug!("Reset to work phase ({}s)", self.state.remaining_seconds);
        self.emit(TimerEvent::Reset {
            remaining_seconds: self.state.remaining_seconds,
        });
    }

    /// Changes the work duration.
    ///
    /// During the work phase the countdown restarts from the new value and
    /// stops; during a break only the stored duration changes.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::InvalidDuration` for zero; the state is unchanged.
    pub fn set_work_duration(&mut self, seconds: u32) -> Result<(), TimerError> {
        self.set_duration(Phase::Work, seconds)
    }

    /// Changes the break duration.
    ///
    /// During a break the countdown restarts from the new value and stops;
    /// during the work phase only the stored duration changes.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::InvalidDuration` for zero; the state is unchanged.
    pub fn set_break_duration(&mut self, seconds: u32) -> Result<(), TimerError> {
        self.set_duration(Phase::Break, seconds)
    }

    fn set_duration(&mut self, phase: Phase, seconds: u32) -> Result<(), TimerError> {
        validate_seconds(phase, seconds)?;

        match phase {
            Phase::Work => self.config.work_seconds = seconds,
            Phase::Break => self.config.break_seconds = seconds,
        }

        let mut interrupted = false;
        if self.state.phase == phase {
            interrupted = self.state.is_running;
            self.ticker.deactivate();
            self.state.is_running = false;
            self.state.remaining_seconds = seconds;
        }

        debug!(
            "{} duration set to {}s (interrupted: {})",
            phase, seconds, interrupted
        );
        self.emit(TimerEvent::DurationChanged {
            phase,
            seconds,
            interrupted,
        });
        Ok(())
    }

    /// Advances the countdown by one second.
    ///
    /// Ignored while not running. Returns true if this tick completed the
    /// phase and rolled over.
    pub fn tick(&mut self) -> bool {
        if !self.state.is_running {
            return false;
        }

        let completed = self.state.tick();

        self.emit(TimerEvent::Tick {
            phase: self.state.phase,
            remaining_seconds: self.state.remaining_seconds,
        });

        if completed {
            self.roll_over();
        }
        completed
    }

    /// Advances the countdown if `signal` comes from the active tick source.
    ///
    /// Signals left over from a cancelled activation are dropped.
    pub fn handle_tick_signal(&mut self, signal: TickSignal) -> bool {
        if !self.ticker.accepts(signal) {
            debug!("Dropped stale tick (generation {})", signal.generation);
            return false;
        }
        self.tick()
    }

    /// Stops the countdown and flips to the next phase without restarting.
    fn roll_over(&mut self) {
        self.ticker.deactivate();
        let completed = self.state.roll_over(&self.config);

        debug!(
            "{} phase complete, next: {} ({}s)",
            completed, self.state.phase, self.state.remaining_seconds
        );
        self.emit(TimerEvent::PhaseCompleted {
            completed,
            next: self.state.phase,
            remaining_seconds: self.state.remaining_seconds,
        });
    }

    /// Tears the engine down: cancels the tick source and stops the countdown.
    pub fn shutdown(&mut self) {
        self.ticker.deactivate();
        self.state.is_running = false;
        self.emit(TimerEvent::Shutdown);
    }

    /// Returns a reference to the current timer state.
    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// Returns the configured durations.
    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// Returns true while the tick source is firing.
    pub fn is_ticking(&self) -> bool {
        self.ticker.is_active()
    }

    /// Captures the state for rendering.
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot::capture(&self.state, &self.config)
    }

    /// Returns a mutable reference to the timer state (for testing).
    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut TimerState {
        &mut self.state
    }

    fn emit(&self, event: TimerEvent) {
        // No subscribers left means nobody renders or plays audio anymore
        if self.event_tx.send(event).is_err() {
            debug!("Event dropped, no subscriber: {:?}", event);
        }
    }
}

impl Drop for TimerEngine {
    fn drop(&mut self) {
        self.ticker.deactivate();
    }
}

// ============================================================================
// Tests
// ============================================================================
