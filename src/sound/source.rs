//! Sound source management.
//!
//! A cue is either an audio file on disk or the built-in tone.

use std::path::{Path, PathBuf};

use super::error::SoundError;
use super::tone::ToneSettings;

/// Supported audio file extensions.
const SUPPORTED_EXTENSIONS: &[&str] = &["wav", "mp3", "flac", "ogg", "m4a", "aiff"];

/// Represents the source of the looping cue.
#[derive(Debug, Clone, PartialEq)]
pub enum SoundSource {
    /// An audio file decoded by rodio.
    File {
        /// Display name (the file stem).
        name: String,
        /// The full path to the sound file.
        path: PathBuf,
    },
    /// The built-in synthesized beep.
    Tone(ToneSettings),
}

impl Default for SoundSource {
    fn default() -> Self {
        Self::Tone(ToneSettings::default())
    }
}

impl SoundSource {
    /// Creates a file source without touching the filesystem.
    #[must_use]
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::File {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Creates a file source after checking the file exists and has a
    /// supported extension.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::FileNotFound` or `SoundError::UnsupportedFormat`.
    pub fn file_validated(path: impl Into<PathBuf>) -> Result<Self, SoundError> {
        let path = path.into();
        validate_sound_file(&path)?;

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::File { name, path })
    }

    /// Creates a tone source.
    #[must_use]
    pub fn tone(settings: ToneSettings) -> Self {
        Self::Tone(settings)
    }

    /// Returns the name of the sound source.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::File { name, .. } => name,
            Self::Tone(_) => "tone",
        }
    }

    /// Returns true if this is a file source.
    #[must_use]
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File { .. })
    }

    /// Returns true if this is the built-in tone.
    #[must_use]
    pub fn is_tone(&self) -> bool {
        matches!(self, Self::Tone(_))
    }

    /// Returns the file path if this is a file source.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File { path, .. } => Some(path),
            Self::Tone(_) => None,
        }
    }
}

fn validate_sound_file(path: &Path) -> Result<(), SoundError> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(SoundError::UnsupportedFormat(path.display().to_string()));
    }

    if !path.is_file() {
        return Err(SoundError::FileNotFound(path.display().to_string()));
    }

    Ok(())
}
