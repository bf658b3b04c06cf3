//! Tick sources for the timer engine.
//!
//! A tick source fires once per period while active. The engine owns exactly
//! one source and switches it on and off together with its running flag.
//!
//! Every activation starts a new *generation*. Signals carry the generation
//! that produced them, so a signal still queued from a cancelled source can
//! be recognised and dropped.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::debug;

/// Default tick period (one second).
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// Shortest period an [`IntervalTicker`] accepts.
const MIN_TICK_PERIOD: Duration = Duration::from_millis(1);

// ============================================================================
// TickSignal / TickSource
// ============================================================================

/// One tick, stamped with the generation of the source that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSignal {
    /// Activation generation of the emitting source
    pub generation: u64,
}

/// A periodic trigger that can be switched on and off.
pub trait TickSource: Send {
    /// Starts firing. Any previous activation is cancelled first.
    fn activate(&mut self);

    /// Stops firing. Does nothing if already inactive.
    fn deactivate(&mut self);

    /// Returns true while the source is firing.
    fn is_active(&self) -> bool;

    /// Returns the generation of the latest activation.
    fn generation(&self) -> u64;

    /// Returns true if `signal` comes from the current, still active generation.
    fn accepts(&self, signal: TickSignal) -> bool {
        self.is_active() && signal.generation == self.generation()
    }
}

// ============================================================================
// IntervalTicker
// ============================================================================

/// Tick source backed by a spawned `tokio::time::interval` task.
///
/// Must be activated from within a tokio runtime.
pub struct IntervalTicker {
    period: Duration,
    tick_tx: mpsc::UnboundedSender<TickSignal>,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl IntervalTicker {
    /// Creates an inactive ticker and the receiver its signals arrive on.
    pub fn new(period: Duration) -> (Self, mpsc::UnboundedReceiver<TickSignal>) {
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let ticker = Self {
            period: period.max(MIN_TICK_PERIOD),
            tick_tx,
            generation: 0,
            task: None,
        };
        (ticker, tick_rx)
    }

    /// Returns the tick period.
    pub fn period(&self) -> Duration {
        self.period
    }

    fn cancel_task(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }
}

impl TickSource for IntervalTicker {
    fn activate(&mut self) {
        if self.cancel_task() {
            debug!("Cancelled stale tick task (generation {})", self.generation);
        }

        self.generation += 1;
        let generation = self.generation;
        let period = self.period;
        let tick_tx = self.tick_tx.clone();

        self.task = Some(tokio::spawn(async move {
            // First tick lands one full period after activation
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if tick_tx.send(TickSignal { generation }).is_err() {
                    break;
                }
            }
        }));

        debug!("Tick source activated (generation {})", generation);
    }

    fn deactivate(&mut self) {
        if self.cancel_task() {
            debug!("Tick source deactivated (generation {})", self.generation);
        }
    }

    fn is_active(&self) -> bool {
        self.task.is_some()
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for IntervalTicker {
    fn drop(&mut self) {
        self.cancel_task();
    }
}

impl std::fmt::Debug for IntervalTicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntervalTicker")
            .field("period", &self.period)
            .field("generation", &self.generation)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// MockTickSource
// ============================================================================

/// Tick source that never fires on its own; for driving the engine by hand.
///
/// Clones share their counters, so a test can keep one clone and hand the
/// other to the engine.
#[derive(Debug, Clone, Default)]
pub struct MockTickSource {
    active: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
    activations: Arc<AtomicUsize>,
    deactivations: Arc<AtomicUsize>,
}

impl MockTickSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `activate` calls so far.
    #[must_use]
    pub fn activation_count(&self) -> usize {
        self.activations.load(Ordering::SeqCst)
    }

    /// Number of `deactivate` calls that actually stopped an active source.
    #[must_use]
    pub fn deactivation_count(&self) -> usize {
        self.deactivations.load(Ordering::SeqCst)
    }

    /// A signal from the current generation.
    #[must_use]
    pub fn current_signal(&self) -> TickSignal {
        TickSignal {
            generation: self.generation(),
        }
    }
}

impl TickSource for MockTickSource {
    fn activate(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.activations.fetch_add(1, Ordering::SeqCst);
        self.active.store(true, Ordering::SeqCst);
    }

    fn deactivate(&mut self) {
        if self.active.swap(false, Ordering::SeqCst) {
            self.deactivations.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Tests
// ============================================================================
