//! Single-context driver for the timer engine.
//!
//! `TimerRuntime` owns the engine, the cue controller and every receiving end
//! of the plumbing. Commands from the presentation layer and tick signals are
//! applied one at a time inside [`TimerRuntime::run`], so the state never
//! needs a lock.
//!
//! ```text
//! TimerHandle ──commands──▶ ┌──────────────┐ ──snapshots (watch)──▶ UI
//! IntervalTicker ──ticks──▶ │ TimerRuntime │ ──notices (mpsc)────▶ UI
//!                           └──────┬───────┘
//!                                  │ TimerEvent
//!                                  ▼
//!                           CueController
//! ```

use std::ops::ControlFlow;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Duration;
use tracing::{debug, info, warn};

use crate::sound::{AudioCue, CueController};
use crate::types::{Phase, TimerConfig, TimerSnapshot};

use super::error::TimerError;
use super::ticker::{IntervalTicker, TickSignal};
use super::timer::{TimerEngine, TimerEvent};

// ============================================================================
// TimerCommand / Notice
// ============================================================================

/// Requests from the presentation layer.
#[derive(Debug)]
pub enum TimerCommand {
    /// Start or resume the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Start if idle, pause if running (the single Start/Pause button)
    Toggle,
    /// Return to an idle work phase
    Reset,
    /// Change the work duration
    SetWorkDuration {
        /// New duration in seconds
        seconds: u32,
        /// Outcome of the change
        reply: oneshot::Sender<Result<(), TimerError>>,
    },
    /// Change the break duration
    SetBreakDuration {
        /// New duration in seconds
        seconds: u32,
        /// Outcome of the change
        reply: oneshot::Sender<Result<(), TimerError>>,
    },
    /// Report the state once every earlier command has been applied
    Query {
        /// Receives the current snapshot
        reply: oneshot::Sender<TimerSnapshot>,
    },
    /// Stop the runtime
    Shutdown,
}

/// User-facing alerts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A phase ran out
    PhaseComplete {
        /// Phase that finished
        completed: Phase,
        /// Phase waiting to be started
        next: Phase,
    },
    /// The cue could not be played or stopped; the countdown is unaffected
    AudioUnavailable {
        /// Description of the failure
        message: String,
    },
}

impl Notice {
    /// Returns the alert text shown to the user.
    pub fn message(&self) -> String {
        match self {
            Notice::PhaseComplete {
                completed: Phase::Work,
                ..
            } => "Time to take a break.".to_string(),
            Notice::PhaseComplete {
                completed: Phase::Break,
                ..
            } => "Break is over. Time to get back to work.".to_string(),
            Notice::AudioUnavailable { message } => {
                format!("Sound unavailable, timer continues: {message}")
            }
        }
    }
}

// ============================================================================
// TimerHandle
// ============================================================================

/// Cloneable control surface for a running [`TimerRuntime`].
#[derive(Debug, Clone)]
pub struct TimerHandle {
    commands: mpsc::UnboundedSender<TimerCommand>,
    snapshots: watch::Receiver<TimerSnapshot>,
}

impl TimerHandle {
    /// Starts or resumes the countdown.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::RuntimeClosed` if the runtime has stopped.
    pub fn start(&self) -> Result<(), TimerError> {
        self.send(TimerCommand::Start)
    }

    /// Pauses the countdown.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::RuntimeClosed` if the runtime has stopped.
    pub fn pause(&self) -> Result<(), TimerError> {
        self.send(TimerCommand::Pause)
    }

    /// Starts when idle, pauses when running.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::RuntimeClosed` if the runtime has stopped.
    pub fn toggle(&self) -> Result<(), TimerError> {
        self.send(TimerCommand::Toggle)
    }

    /// Returns to an idle work phase.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::RuntimeClosed` if the runtime has stopped.
    pub fn reset(&self) -> Result<(), TimerError> {
        self.send(TimerCommand::Reset)
    }

    /// Asks the runtime to stop.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::RuntimeClosed` if it already has.
    pub fn shutdown(&self) -> Result<(), TimerError> {
        self.send(TimerCommand::Shutdown)
    }

    /// Changes the work duration and waits for the outcome.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::InvalidDuration` for zero, or
    /// `TimerError::RuntimeClosed` if the runtime has stopped.
    pub async fn set_work_duration(&self, seconds: u32) -> Result<(), TimerError> {
        let (reply, outcome) = oneshot::channel();
        self.send(TimerCommand::SetWorkDuration { seconds, reply })?;
        outcome.await.map_err(|_| TimerError::RuntimeClosed)?
    }

    /// Changes the break duration and waits for the outcome.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::InvalidDuration` for zero, or
    /// `TimerError::RuntimeClosed` if the runtime has stopped.
    pub async fn set_break_duration(&self, seconds: u32) -> Result<(), TimerError> {
        let (reply, outcome) = oneshot::channel();
        self.send(TimerCommand::SetBreakDuration { seconds, reply })?;
        outcome.await.map_err(|_| TimerError::RuntimeClosed)?
    }

    /// Returns the state after every command sent before this call.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::RuntimeClosed` if the runtime has stopped.
    pub async fn query(&self) -> Result<TimerSnapshot, TimerError> {
        let (reply, outcome) = oneshot::channel();
        self.send(TimerCommand::Query { reply })?;
        outcome.await.map_err(|_| TimerError::RuntimeClosed)
    }

    /// Returns the latest published state.
    pub fn snapshot(&self) -> TimerSnapshot {
        *self.snapshots.borrow()
    }

    /// Returns a receiver notified whenever the state changes.
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshots.clone()
    }

    fn send(&self, command: TimerCommand) -> Result<(), TimerError> {
        self.commands
            .send(command)
            .map_err(|_| TimerError::RuntimeClosed)
    }
}

// ============================================================================
// TimerRuntime
// ============================================================================

/// Owns the engine and serialises every mutation onto one task.
pub struct TimerRuntime<A: AudioCue> {
    engine: TimerEngine,
    cue: CueController<A>,
    events: mpsc::UnboundedReceiver<TimerEvent>,
    ticks: mpsc::UnboundedReceiver<TickSignal>,
    commands: mpsc::UnboundedReceiver<TimerCommand>,
    snapshot_tx: watch::Sender<TimerSnapshot>,
    notice_tx: mpsc::UnboundedSender<Notice>,
}

impl<A: AudioCue> TimerRuntime<A> {
    /// Wires up a runtime ticking every `tick_period`.
    ///
    /// Returns the runtime, a handle to control it and the notice stream.
    ///
    /// # Errors
    ///
    /// Returns `TimerError::InvalidDuration` if `config` has a zero duration.
    pub fn new(
        config: TimerConfig,
        tick_period: Duration,
        cue: CueController<A>,
    ) -> Result<(Self, TimerHandle, mpsc::UnboundedReceiver<Notice>), TimerError> {
        let (ticker, ticks) = IntervalTicker::new(tick_period);
        let (event_tx, events) = mpsc::unbounded_channel();
        let engine = TimerEngine::new(config, Box::new(ticker), event_tx)?;

        let (command_tx, commands) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshots) = watch::channel(engine.snapshot());
        let (notice_tx, notices) = mpsc::unbounded_channel();

        let runtime = Self {
            engine,
            cue,
            events,
            ticks,
            commands,
            snapshot_tx,
            notice_tx,
        };
        let handle = TimerHandle {
            commands: command_tx,
            snapshots,
        };

        Ok((runtime, handle, notices))
    }

    /// Processes commands and ticks until shut down or every handle is dropped.
    ///
    /// The tick source and the cue are released before returning.
    pub async fn run(mut self) {
        info!(
            "Timer runtime started (work {}s, break {}s)",
            self.engine.config().work_seconds,
            self.engine.config().break_seconds
        );

        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        debug!("All timer handles dropped");
                        break;
                    };
                    if self.apply(command).is_break() {
                        break;
                    }
                }
                Some(signal) = self.ticks.recv() => {
                    self.engine.handle_tick_signal(signal);
                }
            }

            self.dispatch_events();
            self.publish();
        }

        self.engine.shutdown();
        self.dispatch_events();
        self.publish();

        info!("Timer runtime stopped");
    }

    fn apply(&mut self, command: TimerCommand) -> ControlFlow<()> {
        debug!("Applying command: {:?}", command);

        match command {
            TimerCommand::Start => {
                self.engine.start();
            }
            TimerCommand::Pause => {
                self.engine.pause();
            }
            TimerCommand::Toggle => {
                if self.engine.state().is_running {
                    self.engine.pause();
                } else {
                    self.engine.start();
                }
            }
            TimerCommand::Reset => self.engine.reset(),
            TimerCommand::SetWorkDuration { seconds, reply } => {
                let _ = reply.send(self.engine.set_work_duration(seconds));
            }
            TimerCommand::SetBreakDuration { seconds, reply } => {
                let _ = reply.send(self.engine.set_break_duration(seconds));
            }
            TimerCommand::Query { reply } => {
                let _ = reply.send(self.engine.snapshot());
            }
            TimerCommand::Shutdown => return ControlFlow::Break(()),
        }

        ControlFlow::Continue(())
    }

    /// Feeds pending engine events to the cue and the notice stream.
    fn dispatch_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            if let Err(e) = self.cue.handle_event(&event) {
                warn!("Audio cue failed: {} ({})", e, e.suggestion());
                self.notify(Notice::AudioUnavailable {
                    message: e.to_string(),
                });
            }

            if let TimerEvent::PhaseCompleted {
                completed, next, ..
            } = event
            {
                self.notify(Notice::PhaseComplete { completed, next });
            }
        }
    }

    fn publish(&self) {
        let snapshot = self.engine.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    fn notify(&self, notice: Notice) {
        if self.notice_tx.send(notice).is_err() {
            debug!("Notice dropped, no listener");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::{MockAudioCue, SoundSource};

    fn create_runtime() -> (
        TimerRuntime<MockAudioCue>,
        TimerHandle,
        mpsc::UnboundedReceiver<Notice>,
        MockAudioCue,
    ) {
        let cue = MockAudioCue::new();
        let controller = CueController::new(cue.clone(), SoundSource::default());
        let (runtime, handle, notices) =
            TimerRuntime::new(TimerConfig::default(), Duration::from_secs(1), controller)
                .unwrap();
        (runtime, handle, notices, cue)
    }

    mod notice_tests {
        use super::*;

        #[test]
        fn test_work_complete_message() {
            let notice = Notice::PhaseComplete {
                completed: Phase::Work,
                next: Phase::Break,
            };
            assert_eq!(notice.message(), "Time to take a break.");
        }

        #[test]
        fn test_break_complete_message() {
            let notice = Notice::PhaseComplete {
                completed: Phase::Break,
                next: Phase::Work,
            };
            assert!(notice.message().contains("back to work"));
        }

        #[test]
        fn test_audio_unavailable_message() {
            let notice = Notice::AudioUnavailable {
                message: "no device".to_string(),
            };
            assert!(notice.message().contains("no device"));
            assert!(notice.message().contains("timer continues"));
        }
    }

    mod apply_tests {
        use super::*;

        #[tokio::test]
        async fn test_toggle_starts_then_pauses() {
            let (mut runtime, _handle, _notices, cue) = create_runtime();

            let _ = runtime.apply(TimerCommand::Toggle);
            runtime.dispatch_events();
            assert!(runtime.engine.state().is_running);
            assert!(cue.is_playing());

            let _ = runtime.apply(TimerCommand::Toggle);
            runtime.dispatch_events();
            assert!(!runtime.engine.state().is_running);
            assert!(!cue.is_playing());
        }

        #[tokio::test]
        async fn test_set_duration_replies() {
            let (mut runtime, _handle, _notices, _cue) = create_runtime();

            let (reply, mut outcome) = oneshot::channel();
            let _ = runtime.apply(TimerCommand::SetWorkDuration { seconds: 0, reply });
            assert!(outcome.try_recv().unwrap().is_err());

            let (reply, mut outcome) = oneshot::channel();
            let _ = runtime.apply(TimerCommand::SetBreakDuration { seconds: 90, reply });
            assert!(outcome.try_recv().unwrap().is_ok());
            assert_eq!(runtime.engine.config().break_seconds, 90);
        }

        #[tokio::test]
        async fn test_query_sees_earlier_commands() {
            let (mut runtime, _handle, _notices, _cue) = create_runtime();

            let _ = runtime.apply(TimerCommand::Start);
            let (reply, mut outcome) = oneshot::channel();
            let _ = runtime.apply(TimerCommand::Query { reply });

            let snapshot = outcome.try_recv().unwrap();
            assert!(snapshot.is_running);
            assert_eq!(snapshot.remaining_seconds, 1500);
        }

        #[tokio::test]
        async fn test_shutdown_breaks_loop() {
            let (mut runtime, _handle, _notices, _cue) = create_runtime();
            assert!(runtime.apply(TimerCommand::Shutdown).is_break());
        }

        #[tokio::test]
        async fn test_publish_updates_handle_snapshot() {
            let (mut runtime, handle, _notices, _cue) = create_runtime();

            let (reply, _outcome) = oneshot::channel();
            let _ = runtime.apply(TimerCommand::SetWorkDuration { seconds: 600, reply });
            runtime.publish();

            let snapshot = handle.snapshot();
            assert_eq!(snapshot.remaining_seconds, 600);
            assert_eq!(snapshot.work_seconds, 600);
        }

        #[tokio::test]
        async fn test_audio_failure_becomes_notice() {
            let (mut runtime, _handle, mut notices, cue) = create_runtime();
            cue.set_should_fail(true);

            let _ = runtime.apply(TimerCommand::Start);
            runtime.dispatch_events();

            assert!(runtime.engine.state().is_running);
            assert!(matches!(
                notices.try_recv().unwrap(),
                Notice::AudioUnavailable { .. }
            ));
        }
    }
}
