//! Scenario tests for the sleep-timer core.
//!
//! These drive the state machine through multi-step user flows over the mock
//! capabilities, simulating elapsed time with the mock clock:
//! - Arm, extend, expire and auto-restart
//! - Stop events racing each other
//! - Cancellation clearing restart eligibility

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use snooze::{
    AnalyticsEvent, MockAlarmScheduler, MockClock, PlayerSleepState, RecordingTracker,
    RestartReason, ScheduleOutcome, SleepTimer, StopReason,
};

// ============================================================================
// Test Helpers
// ============================================================================

type TestTimer = SleepTimer<Arc<MockAlarmScheduler>, Arc<RecordingTracker>, Arc<MockClock>>;

const T0: Duration = Duration::from_secs(1_700_000_000);

fn create_timer() -> (
    TestTimer,
    Arc<MockAlarmScheduler>,
    Arc<RecordingTracker>,
    Arc<MockClock>,
) {
    let alarm = Arc::new(MockAlarmScheduler::new());
    let analytics = Arc::new(RecordingTracker::new());
    let clock = Arc::new(MockClock::starting_at(T0));
    let timer = SleepTimer::new(
        Arc::clone(&alarm),
        Arc::clone(&analytics),
        Arc::clone(&clock),
    );
    (timer, alarm, analytics, clock)
}

// ============================================================================
// Countdown Lifecycle
// ============================================================================

/// スリープタイマーの基本ライフサイクル
///
/// 開始 → 延長 → 満了 → 自動再開 の一連の流れを検証する。
#[test]
fn test_full_countdown_lifecycle_with_auto_restart() {
    let (mut timer, alarm, analytics, clock) = create_timer();

    // Arm a 30-minute countdown
    assert_eq!(
        timer.sleep_after(Duration::from_secs(30 * 60)),
        ScheduleOutcome::Scheduled
    );
    assert!(timer.is_running());

    // Fall asleep slowly: extend twice
    clock.advance(Duration::from_secs(10 * 60));
    assert_eq!(timer.add_extra_time(5), ScheduleOutcome::Scheduled);
    assert_eq!(timer.add_extra_time(5), ScheduleOutcome::Scheduled);
    assert_eq!(timer.remaining_seconds(), Some(30 * 60));

    // The countdown expires while the listener sleeps
    clock.advance(Duration::from_secs(30 * 60 + 1));
    assert_eq!(timer.remaining_seconds(), None);
    assert!(!timer.is_running());

    // Playback resumes two minutes later: the same duration is re-armed
    clock.advance(Duration::from_secs(119));
    let restarted = timer.restart_if_applies(true, Uuid::new_v4(), &PlayerSleepState::default());

    assert_eq!(
        restarted,
        Some(RestartReason::AfterTime(Duration::from_secs(30 * 60)))
    );
    assert!(timer.is_running());
    assert_eq!(timer.remaining_seconds(), Some(30 * 60));

    // Every schedule call re-registered the alarm
    assert_eq!(alarm.schedule_count(), 4);
    assert_eq!(alarm.cancel_count(), 4);

    // Exactly one restart event was emitted
    let restart_events: Vec<_> = analytics
        .events()
        .into_iter()
        .filter(|(event, _)| *event == AnalyticsEvent::PlayerSleepTimerRestarted)
        .collect();
    assert_eq!(restart_events.len(), 1);
}

/// 満了から5分以上経過した場合は再開しない
#[test]
fn test_no_restart_after_grace_period() {
    let (mut timer, _alarm, analytics, clock) = create_timer();

    let _ = timer.sleep_after(Duration::from_secs(600));
    clock.advance(Duration::from_secs(600 + 5 * 60));

    let restarted = timer.restart_if_applies(true, Uuid::new_v4(), &PlayerSleepState::default());

    assert_eq!(restarted, None);
    assert!(!timer.is_running());
    assert_eq!(analytics.event_count(), 0);
}

// ============================================================================
// Stop Events
// ============================================================================

/// 停止理由は常に最後のイベントだけが有効
#[test]
fn test_stop_reasons_are_mutually_exclusive() {
    let (mut timer, _alarm, _analytics, clock) = create_timer();
    let first = Uuid::new_v4();

    let _ = timer.sleep_after(Duration::from_secs(600));
    timer.set_end_of_episode(first);
    timer.set_end_of_chapter();
    clock.advance(Duration::from_secs(30));

    // Only the chapter branch can match now
    let restarted = timer.restart_if_applies(true, Uuid::new_v4(), &PlayerSleepState::default());
    assert_eq!(restarted, Some(RestartReason::EndOfChapter));

    // The episode marker is gone: switching back to it requires a new event
    assert_eq!(timer.stop_reason(), &StopReason::EndOfChapter);
}

/// エピソード終了 → 別エピソード再生で再開、同一エピソードでは再開しない
#[test]
fn test_episode_end_restart_depends_on_episode_identity() {
    let (mut timer, _alarm, _analytics, clock) = create_timer();
    let ended = Uuid::new_v4();

    timer.set_end_of_episode(ended);
    clock.advance(Duration::from_secs(60));

    // Same episode continuing: no restart
    assert_eq!(
        timer.restart_if_applies(true, ended, &PlayerSleepState::default()),
        None
    );

    // A different episode within the window: restart
    assert_eq!(
        timer.restart_if_applies(true, Uuid::new_v4(), &PlayerSleepState::default()),
        Some(RestartReason::EndOfEpisode)
    );
}

// ============================================================================
// Cancellation
// ============================================================================

/// キャンセル後は新しい停止イベントまで再開しない
#[test]
fn test_cancel_clears_restart_eligibility_until_new_stop() {
    let (mut timer, alarm, _analytics, clock) = create_timer();

    let _ = timer.sleep_after(Duration::from_secs(600));
    timer.cancel();

    assert!(!timer.is_running());
    assert!(!alarm.is_armed());
    assert_eq!(
        timer.restart_if_applies(true, Uuid::new_v4(), &PlayerSleepState::default()),
        None
    );

    // A fresh stop event re-arms eligibility
    timer.set_end_of_chapter();
    clock.advance(Duration::from_secs(10));
    assert_eq!(
        timer.restart_if_applies(true, Uuid::new_v4(), &PlayerSleepState::default()),
        Some(RestartReason::EndOfChapter)
    );
}

// ============================================================================
// Scheduling Failures
// ============================================================================

/// アラーム登録失敗は呼び出し側へ伝播しない
#[test]
fn test_scheduling_failure_is_contained() {
    let (mut timer, alarm, _analytics, _clock) = create_timer();
    alarm.set_should_fail(true);

    assert_eq!(
        timer.sleep_after(Duration::from_secs(600)),
        ScheduleOutcome::SchedulingFailed
    );
    assert!(!timer.is_running());
    assert_eq!(timer.remaining_seconds(), None);

    // Recovery: once the platform cooperates, arming works again
    alarm.set_should_fail(false);
    assert_eq!(
        timer.sleep_after(Duration::from_secs(600)),
        ScheduleOutcome::Scheduled
    );
    assert!(timer.is_running());
}
