//! Built-in cue synthesized from a sine wave.
//!
//! Used whenever no sound file is configured, so the cue works without any
//! assets on disk.

use std::time::Duration;

use rodio::source::{SineWave, Source};

/// A short beep repeated once per period, like a metronome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSettings {
    /// Pitch of the beep
    pub frequency_hz: f32,
    /// Length of each beep
    pub beep: Duration,
    /// Time from one beep to the next
    pub period: Duration,
    /// Amplitude factor, 0.0..=1.0
    pub volume: f32,
}

impl Default for ToneSettings {
    fn default() -> Self {
        Self {
            frequency_hz: 660.0,
            beep: Duration::from_millis(120),
            period: Duration::from_millis(1000),
            volume: 0.2,
        }
    }
}

impl ToneSettings {
    /// Silence between the end of one beep and the start of the next.
    #[must_use]
    pub fn gap(&self) -> Duration {
        self.period.saturating_sub(self.beep)
    }

    /// Builds the endlessly repeating source.
    pub fn build(&self) -> impl Source<Item = f32> + Send + 'static {
        SineWave::new(self.frequency_hz)
            .take_duration(self.beep)
            .amplify(self.volume.clamp(0.0, 1.0))
            .delay(self.gap())
            .repeat_infinite()
    }
}
