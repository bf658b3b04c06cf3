//! Timer engine error types.
//!
//! Only configuration changes can fail inside the engine. Audio problems are
//! reported through [`crate::sound::SoundError`] and never reach the countdown.

use thiserror::Error;

use crate::types::Phase;

/// Errors returned by timer operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// A duration was zero, negative or otherwise unusable.
    #[error("invalid {phase} duration '{value}': must be a positive length")]
    InvalidDuration {
        /// Phase the duration was meant for
        phase: Phase,
        /// The rejected input as the user gave it
        value: String,
    },

    /// The runtime that owns the engine has stopped.
    #[error("timer runtime is no longer running")]
    RuntimeClosed,
}

impl TimerError {
    /// Returns true if this error is an invalid-configuration rejection.
    #[must_use]
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, Self::InvalidDuration { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_duration_display() {
        let err = TimerError::InvalidDuration {
            phase: Phase::Work,
            value: "-5".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("work"));
        assert!(message.contains("-5"));
        assert!(err.is_invalid_configuration());
    }

    #[test]
    fn test_runtime_closed_display() {
        let err = TimerError::RuntimeClosed;
        assert_eq!(err.to_string(), "timer runtime is no longer running");
        assert!(!err.is_invalid_configuration());
    }
}
