//! Engine module for the interval timer.
//!
//! This module contains the core timer functionality:
//! - `timer`: State machine with phase transitions and countdown logic
//! - `ticker`: Periodic tick sources the engine switches on and off
//! - `runtime`: Async driver that serialises commands and ticks
//! - `error`: Engine error types

pub mod error;
pub mod runtime;
pub mod ticker;
pub mod timer;

pub use error::TimerError;
pub use runtime::{Notice, TimerCommand, TimerHandle, TimerRuntime};
pub use ticker::{IntervalTicker, MockTickSource, TickSignal, TickSource, DEFAULT_TICK_PERIOD};
pub use timer::{TimerEngine, TimerEvent};
