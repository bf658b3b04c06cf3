//! Audio cue implementation using rodio.
//!
//! `RodioAudioCue` holds at most one `Sink` at a time. Acquiring creates the
//! sink and starts the looped source; releasing stops and drops it.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tracing::{debug, warn};

use super::error::SoundError;
use super::source::SoundSource;
use super::{AudioCue, NullAudioCue};

/// A looping cue player backed by the default audio output device.
///
/// The output stream is not `Send` on every platform, so the cue must stay
/// on the thread that created it.
pub struct RodioAudioCue {
    /// The audio output stream (must be kept alive for playback).
    _stream: OutputStream,
    /// Handle to the output stream for creating sinks.
    stream_handle: OutputStreamHandle,
    /// The active playback, if any.
    sink: Option<Sink>,
}

impl RodioAudioCue {
    /// Opens the default output device.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output device
    /// is available.
    pub fn new() -> Result<Self, SoundError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))?;

        debug!("Audio output stream initialized");

        Ok(Self {
            _stream: stream,
            stream_handle,
            sink: None,
        })
    }

    fn open_decoder(path: &Path) -> Result<Decoder<BufReader<File>>, SoundError> {
        let file = File::open(path)
            .map_err(|e| SoundError::FileNotFound(format!("{}: {}", path.display(), e)))?;

        Decoder::new(BufReader::new(file)).map_err(|e| SoundError::DecodeError(e.to_string()))
    }

    fn new_sink(&self) -> Result<Sink, SoundError> {
        Sink::try_new(&self.stream_handle).map_err(|e| SoundError::StreamError(e.to_string()))
    }
}

impl AudioCue for RodioAudioCue {
    fn play_looped(&mut self, source: &SoundSource) -> Result<(), SoundError> {
        if self.sink.is_some() {
            debug!("Cue already playing, skipping");
            return Ok(());
        }

        // Decode before creating the sink so a bad file leaves nothing behind
        let sink = match source {
            SoundSource::File { path, .. } => {
                let decoder = Self::open_decoder(path)?;
                let sink = self.new_sink()?;
                sink.append(decoder.repeat_infinite());
                sink
            }
            SoundSource::Tone(settings) => {
                let sink = self.new_sink()?;
                sink.append(settings.build());
                sink
            }
        };
        sink.play();

        debug!("Looping cue '{}' started", source.name());
        self.sink = Some(sink);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SoundError> {
        if let Some(sink) = self.sink.take() {
            sink.stop();
            debug!("Looping cue stopped and released");
        }
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.sink.is_some()
    }
}

impl Drop for RodioAudioCue {
    fn drop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }
}

impl std::fmt::Debug for RodioAudioCue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioAudioCue")
            .field("playing", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

/// Creates the cue player, falling back to silence when audio is unavailable.
///
/// If `disabled` is true no device is opened at all.
#[must_use]
pub fn try_create_cue(disabled: bool) -> Box<dyn AudioCue> {
    if disabled {
        debug!("Sound disabled, using silent cue");
        return Box::new(NullAudioCue::default());
    }

    match RodioAudioCue::new() {
        Ok(cue) => Box::new(cue),
        Err(e) => {
            warn!("Audio not available, sound disabled: {}", e);
            Box::new(NullAudioCue::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Note: these tests skip themselves in environments without audio
    // hardware (e.g., CI containers).

    #[test]
    fn test_stop_without_playback_is_noop() {
        let mut cue = match RodioAudioCue::new() {
            Ok(c) => c,
            Err(_) => return,
        };

        assert!(!cue.is_playing());
        assert!(cue.stop().is_ok());
        assert!(cue.stop().is_ok());
    }

    #[test]
    fn test_tone_play_and_release() {
        let mut cue = match RodioAudioCue::new() {
            Ok(c) => c,
            Err(_) => return,
        };

        cue.play_looped(&SoundSource::default()).unwrap();
        assert!(cue.is_playing());

        // Second acquisition keeps the same sink
        cue.play_looped(&SoundSource::default()).unwrap();
        assert!(cue.is_playing());

        cue.stop().unwrap();
        assert!(!cue.is_playing());
    }

    #[test]
    fn test_missing_file_leaves_nothing_playing() {
        let mut cue = match RodioAudioCue::new() {
            Ok(c) => c,
            Err(_) => return,
        };

        let source = SoundSource::file("missing", "/nonexistent/path/cue.wav");
        let result = cue.play_looped(&source);

        assert!(matches!(result, Err(SoundError::FileNotFound(_))));
        assert!(!cue.is_playing());
    }

    #[test]
    fn test_try_create_cue_disabled() {
        let cue = try_create_cue(true);
        assert!(!cue.is_available());
        assert!(!cue.is_playing());
    }
}
