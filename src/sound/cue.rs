//! Couples timer events to the looping audio cue.
//!
//! The cue plays while a work phase is counting down. Every transition that
//! leaves that state releases it.

use tracing::debug;

use crate::engine::TimerEvent;
use crate::types::Phase;

use super::error::SoundError;
use super::source::SoundSource;
use super::AudioCue;

/// Observer that starts and stops an [`AudioCue`] in response to timer events.
///
/// The controller is the sole owner of the cue, so at most one playback
/// handle exists at a time.
pub struct CueController<A: AudioCue> {
    cue: A,
    source: SoundSource,
}

impl<A: AudioCue> CueController<A> {
    /// Creates a controller that plays `source` through `cue`.
    pub fn new(cue: A, source: SoundSource) -> Self {
        Self { cue, source }
    }

    /// Applies a timer event to the cue.
    ///
    /// # Errors
    ///
    /// Returns the cue's error; the caller decides how to report it.
    pub fn handle_event(&mut self, event: &TimerEvent) -> Result<(), SoundError> {
        match event {
            TimerEvent::Started {
                phase: Phase::Work, ..
            } => self.acquire(),
            TimerEvent::Started {
                phase: Phase::Break,
                ..
            }
            | TimerEvent::Paused { .. }
            | TimerEvent::Reset { .. }
            | TimerEvent::PhaseCompleted { .. }
            | TimerEvent::Shutdown
            | TimerEvent::DurationChanged {
                interrupted: true, ..
            } => self.release(),
            TimerEvent::DurationChanged {
                interrupted: false,
                ..
            }
            | TimerEvent::Tick { .. } => Ok(()),
        }
    }

    /// Starts the cue unless it is already playing.
    fn acquire(&mut self) -> Result<(), SoundError> {
        if self.cue.is_playing() {
            debug!("Cue already acquired");
            return Ok(());
        }

        if let Err(e) = self.cue.play_looped(&self.source) {
            // Drop anything half-acquired before reporting
            let _ = self.cue.stop();
            return Err(e);
        }
        Ok(())
    }

    /// Stops and releases the cue. Safe to call when nothing is playing.
    ///
    /// # Errors
    ///
    /// Returns the cue's error if stopping failed.
    pub fn release(&mut self) -> Result<(), SoundError> {
        self.cue.stop()
    }

    /// Returns the controlled cue.
    pub fn cue(&self) -> &A {
        &self.cue
    }

    /// Returns the configured source.
    pub fn source(&self) -> &SoundSource {
        &self.source
    }
}

impl<A: AudioCue> Drop for CueController<A> {
    fn drop(&mut self) {
        let _ = self.cue.stop();
    }
}
