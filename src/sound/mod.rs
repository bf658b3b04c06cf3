//! Audio cue system for the interval timer.
//!
//! This module provides the looping cue that accompanies a work phase:
//!
//! - The [`AudioCue`] capability (play a looping cue, stop it)
//! - A rodio-backed implementation plus silent and mock stand-ins
//! - Cue sources: audio files or a built-in tone
//! - [`CueController`], which drives the cue from timer events
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  TimerEvent  ┌────────────────┐     ┌──────────────────┐
//! │ TimerEngine  │─────────────▶│ CueController  │────▶│    AudioCue      │
//! └──────────────┘              └────────────────┘     │ (rodio / null)   │
//!                                                      └──────────────────┘
//! ```
//!
//! Audio failures never stop the countdown; they are returned to the caller
//! to be logged and shown.

mod cue;
mod error;
mod player;
mod source;
mod tone;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub use cue::CueController;
pub use error::SoundError;
pub use player::{try_create_cue, RodioAudioCue};
pub use source::SoundSource;
pub use tone::ToneSettings;

/// The looping-cue playback capability.
///
/// Implementations hold at most one playback handle at a time.
pub trait AudioCue {
    /// Acquires a playback handle and starts looping `source`.
    ///
    /// Does nothing if a handle is already held.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be opened or played.
    fn play_looped(&mut self, source: &SoundSource) -> Result<(), SoundError>;

    /// Stops playback and releases the handle.
    ///
    /// Must succeed as a no-op when nothing is playing.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend failed to stop.
    fn stop(&mut self) -> Result<(), SoundError>;

    /// Returns true while a playback handle is held.
    fn is_playing(&self) -> bool;

    /// Returns true if sound can actually be produced.
    fn is_available(&self) -> bool {
        true
    }
}

impl<A: AudioCue + ?Sized> AudioCue for Box<A> {
    fn play_looped(&mut self, source: &SoundSource) -> Result<(), SoundError> {
        (**self).play_looped(source)
    }

    fn stop(&mut self) -> Result<(), SoundError> {
        (**self).stop()
    }

    fn is_playing(&self) -> bool {
        (**self).is_playing()
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

/// Cue that tracks the handle but produces no sound.
///
/// Used with `--no-sound` or when no output device exists.
#[derive(Debug, Default)]
pub struct NullAudioCue {
    playing: bool,
}

impl AudioCue for NullAudioCue {
    fn play_looped(&mut self, _source: &SoundSource) -> Result<(), SoundError> {
        self.playing = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SoundError> {
        self.playing = false;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Mock cue for testing.
///
/// Clones share their state, so a test can keep one clone for inspection
/// while the controller owns another.
#[derive(Debug, Clone, Default)]
pub struct MockAudioCue {
    play_calls: Arc<Mutex<Vec<SoundSource>>>,
    stop_calls: Arc<AtomicUsize>,
    playing: Arc<AtomicBool>,
    should_fail: Arc<AtomicBool>,
}

impl MockAudioCue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.play_calls.lock().unwrap().len()
    }

    #[must_use]
    pub fn get_play_calls(&self) -> Vec<SoundSource> {
        self.play_calls.lock().unwrap().clone()
    }

    /// Number of `stop` calls that released an active handle.
    #[must_use]
    pub fn stop_count(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub fn clear_calls(&self) {
        self.play_calls.lock().unwrap().clear();
        self.stop_calls.store(0, Ordering::SeqCst);
    }
}

impl AudioCue for MockAudioCue {
    fn play_looped(&mut self, source: &SoundSource) -> Result<(), SoundError> {
        if self.should_fail.load(Ordering::SeqCst) {
            // Simulates a backend that grabbed the device before failing
            self.playing.store(true, Ordering::SeqCst);
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        if self.playing.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.play_calls.lock().unwrap().push(source.clone());
        self.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SoundError> {
        if self.playing.swap(false, Ordering::SeqCst) {
            self.stop_calls.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}
