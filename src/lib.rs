//! PomoTime Library
//!
//! This library provides the core functionality for the PomoTime interval
//! timer. It includes:
//! - Timer engine: the work/break state machine, tick source and runtime
//! - Looping audio cue tied to the work phase
//! - Console presentation: argument parsing, commands and display
//! - Type definitions for configuration and state

pub mod cli;
pub mod engine;
pub mod sound;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{Phase, TimerConfig, TimerSnapshot, TimerState};

// Re-export engine types
pub use engine::{
    IntervalTicker, MockTickSource, Notice, TickSignal, TickSource, TimerCommand, TimerEngine,
    TimerError, TimerEvent, TimerHandle, TimerRuntime,
};

// Re-export sound types
pub use sound::{
    try_create_cue, AudioCue, CueController, MockAudioCue, NullAudioCue, RodioAudioCue,
    SoundError, SoundSource, ToneSettings,
};
