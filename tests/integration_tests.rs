//! Integration tests for the timer runtime.
//!
//! These tests drive a real `TimerRuntime` through its `TimerHandle`, with a
//! fast tick period and a mock audio cue:
//! - Work phase running out into an idle break
//! - Cue lifetime following the running work phase
//! - Pause, reset and duration changes
//! - Shutdown and handle drop

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Duration};

use pomotime::sound::AudioCue;
use pomotime::{
    CueController, MockAudioCue, Notice, Phase, SoundSource, TimerConfig, TimerError, TimerHandle,
    TimerRuntime, TimerSnapshot,
};

// ============================================================================
// Test Helpers
// ============================================================================

const FAST_TICK: Duration = Duration::from_millis(5);
const WAIT_LIMIT: Duration = Duration::from_secs(5);

struct Harness {
    handle: TimerHandle,
    notices: mpsc::UnboundedReceiver<Notice>,
    cue: MockAudioCue,
    task: JoinHandle<()>,
}

/// Spawns a runtime with the given durations in seconds.
fn spawn_runtime(work_seconds: u32, break_seconds: u32, tick: Duration) -> Harness {
    let cue = MockAudioCue::new();
    let controller = CueController::new(cue.clone(), SoundSource::default());
    let config = TimerConfig::default()
        .with_work_seconds(work_seconds)
        .with_break_seconds(break_seconds);

    let (runtime, handle, notices) = TimerRuntime::new(config, tick, controller).unwrap();
    let task = tokio::spawn(runtime.run());

    Harness {
        handle,
        notices,
        cue,
        task,
    }
}

/// Waits until the published snapshot satisfies `predicate`.
async fn wait_for_snapshot(
    handle: &TimerHandle,
    predicate: impl FnMut(&TimerSnapshot) -> bool,
) -> TimerSnapshot {
    let mut snapshots = handle.subscribe();
    let snapshot = timeout(WAIT_LIMIT, snapshots.wait_for(predicate))
        .await
        .expect("timed out waiting for snapshot")
        .expect("runtime stopped");
    *snapshot
}

async fn next_notice(notices: &mut mpsc::UnboundedReceiver<Notice>) -> Notice {
    timeout(WAIT_LIMIT, notices.recv())
        .await
        .expect("timed out waiting for notice")
        .expect("notice channel closed")
}

// ============================================================================
// Phase Rollover
// ============================================================================

mod rollover {
    use super::*;

    #[tokio::test]
    async fn work_phase_rolls_into_idle_break() {
        let mut harness = spawn_runtime(3, 2, FAST_TICK);

        harness.handle.start().unwrap();
        let snapshot = wait_for_snapshot(&harness.handle, |s| s.phase == Phase::Break).await;

        assert_eq!(snapshot.remaining_seconds, 2);
        assert!(!snapshot.is_running);
        assert_eq!(
            next_notice(&mut harness.notices).await,
            Notice::PhaseComplete {
                completed: Phase::Work,
                next: Phase::Break,
            }
        );
    }

    #[tokio::test]
    async fn break_phase_rolls_back_to_work() {
        let mut harness = spawn_runtime(1, 1, FAST_TICK);

        harness.handle.start().unwrap();
        wait_for_snapshot(&harness.handle, |s| s.phase == Phase::Break).await;
        let _ = next_notice(&mut harness.notices).await;

        harness.handle.start().unwrap();
        let snapshot = wait_for_snapshot(&harness.handle, |s| {
            s.phase == Phase::Work && !s.is_running
        })
        .await;

        assert_eq!(snapshot.remaining_seconds, 1);
        let notice = next_notice(&mut harness.notices).await;
        assert_eq!(notice.message(), "Break is over. Time to get back to work.");
    }

    #[tokio::test]
    async fn countdown_stays_stopped_after_rollover() {
        let harness = spawn_runtime(1, 60, FAST_TICK);

        harness.handle.start().unwrap();
        wait_for_snapshot(&harness.handle, |s| s.phase == Phase::Break).await;

        sleep(FAST_TICK * 20).await;
        let snapshot = harness.handle.snapshot();
        assert_eq!(snapshot.phase, Phase::Break);
        assert_eq!(snapshot.remaining_seconds, 60);
        assert!(!snapshot.is_running);
    }
}

// ============================================================================
// Audio Cue
// ============================================================================

mod audio_cue {
    use super::*;

    #[tokio::test]
    async fn cue_plays_once_while_work_runs() {
        let harness = spawn_runtime(600, 60, FAST_TICK);

        harness.handle.start().unwrap();
        wait_for_snapshot(&harness.handle, |s| s.remaining_seconds <= 595).await;

        assert_eq!(harness.cue.play_count(), 1);
        assert!(harness.cue.is_playing());
    }

    #[tokio::test]
    async fn cue_stops_when_work_completes() {
        let harness = spawn_runtime(2, 60, FAST_TICK);

        harness.handle.start().unwrap();
        wait_for_snapshot(&harness.handle, |s| s.phase == Phase::Break).await;

        assert!(!harness.cue.is_playing());
        assert!(harness.cue.stop_count() >= 1);
    }

    #[tokio::test]
    async fn cue_silent_during_break() {
        let harness = spawn_runtime(1, 600, FAST_TICK);

        harness.handle.start().unwrap();
        wait_for_snapshot(&harness.handle, |s| s.phase == Phase::Break).await;
        harness.handle.start().unwrap();
        wait_for_snapshot(&harness.handle, |s| s.is_running && s.remaining_seconds < 600).await;

        assert_eq!(harness.cue.play_count(), 1);
        assert!(!harness.cue.is_playing());
    }

    #[tokio::test]
    async fn audio_failure_does_not_stop_countdown() {
        let mut harness = spawn_runtime(600, 60, FAST_TICK);
        harness.cue.set_should_fail(true);

        harness.handle.start().unwrap();
        let notice = next_notice(&mut harness.notices).await;
        assert!(matches!(notice, Notice::AudioUnavailable { .. }));

        let snapshot = wait_for_snapshot(&harness.handle, |s| s.remaining_seconds <= 598).await;
        assert!(snapshot.is_running);
    }
}

// ============================================================================
// Controls
// ============================================================================

mod controls {
    use super::*;

    #[tokio::test]
    async fn pause_preserves_remaining_time() {
        let harness = spawn_runtime(600, 60, FAST_TICK);

        harness.handle.start().unwrap();
        wait_for_snapshot(&harness.handle, |s| s.remaining_seconds <= 597).await;
        harness.handle.pause().unwrap();
        let paused = wait_for_snapshot(&harness.handle, |s| !s.is_running).await;

        sleep(FAST_TICK * 20).await;
        assert_eq!(harness.handle.snapshot().remaining_seconds, paused.remaining_seconds);
        assert!(!harness.cue.is_playing());

        harness.handle.start().unwrap();
        let resumed = wait_for_snapshot(&harness.handle, |s| {
            s.remaining_seconds < paused.remaining_seconds
        })
        .await;
        assert!(resumed.is_running);
        assert_eq!(resumed.phase, Phase::Work);
    }

    #[tokio::test]
    async fn toggle_flips_running_state() {
        let harness = spawn_runtime(600, 60, Duration::from_secs(60));

        harness.handle.toggle().unwrap();
        wait_for_snapshot(&harness.handle, |s| s.is_running).await;

        harness.handle.toggle().unwrap();
        let snapshot = wait_for_snapshot(&harness.handle, |s| !s.is_running).await;
        assert_eq!(snapshot.remaining_seconds, 600);
    }

    #[tokio::test]
    async fn reset_returns_to_idle_work() {
        let harness = spawn_runtime(1, 60, FAST_TICK);

        harness.handle.start().unwrap();
        wait_for_snapshot(&harness.handle, |s| s.phase == Phase::Break).await;
        harness.handle.start().unwrap();
        wait_for_snapshot(&harness.handle, |s| s.is_running).await;

        harness.handle.reset().unwrap();
        let snapshot = wait_for_snapshot(&harness.handle, |s| s.phase == Phase::Work).await;

        assert!(!snapshot.is_running);
        assert_eq!(snapshot.remaining_seconds, 1);
    }

    #[tokio::test]
    async fn set_work_duration_resets_running_work() {
        let harness = spawn_runtime(600, 60, FAST_TICK);

        harness.handle.start().unwrap();
        wait_for_snapshot(&harness.handle, |s| s.remaining_seconds <= 598).await;

        harness.handle.set_work_duration(120).await.unwrap();
        let snapshot = harness.handle.snapshot();

        assert_eq!(snapshot.work_seconds, 120);
        assert_eq!(snapshot.remaining_seconds, 120);
        assert!(!snapshot.is_running);
        assert!(!harness.cue.is_playing());
    }

    #[tokio::test]
    async fn set_break_duration_during_work_keeps_running() {
        let harness = spawn_runtime(600, 60, FAST_TICK);

        harness.handle.start().unwrap();
        wait_for_snapshot(&harness.handle, |s| s.is_running).await;

        harness.handle.set_break_duration(90).await.unwrap();
        let snapshot = harness.handle.snapshot();

        assert_eq!(snapshot.break_seconds, 90);
        assert_eq!(snapshot.phase, Phase::Work);
        assert!(snapshot.is_running);
        assert!(harness.cue.is_playing());
    }

    #[tokio::test]
    async fn zero_duration_rejected() {
        let harness = spawn_runtime(600, 60, FAST_TICK);
        let before = harness.handle.snapshot();

        let err = harness.handle.set_work_duration(0).await.unwrap_err();
        assert!(err.is_invalid_configuration());
        let err = harness.handle.set_break_duration(0).await.unwrap_err();
        assert!(err.is_invalid_configuration());

        assert_eq!(harness.handle.snapshot(), before);
    }
}

// ============================================================================
// Shutdown
// ============================================================================

mod shutdown {
    use super::*;

    #[tokio::test]
    async fn shutdown_releases_cue_and_stops_runtime() {
        let harness = spawn_runtime(600, 60, FAST_TICK);

        harness.handle.start().unwrap();
        wait_for_snapshot(&harness.handle, |s| s.is_running).await;
        assert!(harness.cue.is_playing());

        harness.handle.shutdown().unwrap();
        timeout(WAIT_LIMIT, harness.task).await.unwrap().unwrap();

        assert!(!harness.cue.is_playing());
        assert_eq!(harness.handle.start(), Err(TimerError::RuntimeClosed));
    }

    #[tokio::test]
    async fn dropping_every_handle_stops_runtime() {
        let Harness { handle, task, cue, .. } = spawn_runtime(600, 60, FAST_TICK);

        handle.start().unwrap();
        wait_for_snapshot(&handle, |s| s.is_running).await;
        drop(handle);

        timeout(WAIT_LIMIT, task).await.unwrap().unwrap();
        assert!(!cue.is_playing());
    }

    #[tokio::test]
    async fn closed_runtime_rejects_duration_change() {
        let harness = spawn_runtime(600, 60, FAST_TICK);

        harness.handle.shutdown().unwrap();
        timeout(WAIT_LIMIT, harness.task).await.unwrap().unwrap();

        assert_eq!(
            harness.handle.set_work_duration(60).await,
            Err(TimerError::RuntimeClosed)
        );
    }
}
