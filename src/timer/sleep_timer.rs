//! Sleep timer state machine.
//!
//! A per-session countdown controller for playback. It schedules a one-shot
//! wake-up at a future instant via the alarm capability, remembers why and
//! when the timer last stopped, and decides whether to re-arm itself after
//! playback events within a bounded window.
//!
//! All operations are expected to run on one control thread; the alarm fires
//! asynchronously through whatever channel the scheduler implementation
//! uses, outside this type.

use std::time::Duration;

use serde_json::json;
use uuid::Uuid;

use crate::alarm::AlarmScheduler;
use crate::analytics::{AnalyticsEvent, AnalyticsTracker, EventProperties};
use crate::clock::Clock;
use crate::types::{PlayerSleepState, RestartReason, ScheduleOutcome, StopReason};

/// A stop must be at most this old for an auto-restart to be considered.
const MIN_TIME_TO_RESTART: Duration = Duration::from_secs(5 * 60);

const TIME_KEY: &str = "time";
const NUMBER_OF_EPISODES_KEY: &str = "number_of_episodes";
const NUMBER_OF_CHAPTERS_KEY: &str = "number_of_chapters";
const END_OF_EPISODE_VALUE: &str = "end_of_episode";
const END_OF_CHAPTER_VALUE: &str = "end_of_chapter";

// ============================================================================
// SleepTimer
// ============================================================================

/// Countdown & restart state machine.
///
/// The wake time is only set while a wake-up is actually registered with the
/// alarm capability; every schedule call cancels the previous registration
/// first, so at most one wake-up is pending at any time.
pub struct SleepTimer<A, T, C> {
    alarm: A,
    analytics: T,
    clock: C,
    /// Instant the pending countdown fires (epoch-based), if one is armed.
    wake_at: Option<Duration>,
    /// Most recent stop reason; one reason at a time.
    stop_reason: StopReason,
    /// Instant the timer most recently stopped, regardless of reason.
    /// Anchors the auto-restart window.
    last_finished_at: Option<Duration>,
}

impl<A, T, C> SleepTimer<A, T, C>
where
    A: AlarmScheduler,
    T: AnalyticsTracker,
    C: Clock,
{
    /// Creates an idle timer over the given capabilities.
    pub fn new(alarm: A, analytics: T, clock: C) -> Self {
        Self {
            alarm,
            analytics,
            clock,
            wake_at: None,
            stop_reason: StopReason::None,
            last_finished_at: None,
        }
    }

    /// Arms a countdown that fires `duration` from now.
    ///
    /// On success the duration is recorded for later auto-restart and any
    /// episode-end/chapter-end stop marker is replaced. On failure the timer
    /// is left with no active countdown and nothing else changes.
    #[must_use]
    pub fn sleep_after(&mut self, duration: Duration) -> ScheduleOutcome {
        let wake_at = self.clock.now() + duration;
        let outcome = self.schedule(wake_at);
        if outcome.is_scheduled() {
            self.stop_reason = StopReason::AfterTime { duration };
        }
        outcome
    }

    /// Pushes the pending wake-up `minutes` further out.
    ///
    /// Does nothing when no countdown is armed or the scheduled instant has
    /// already passed. The recorded duration is left untouched.
    #[must_use]
    pub fn add_extra_time(&mut self, minutes: u64) -> ScheduleOutcome {
        let Some(wake_at) = self.wake_at else {
            return ScheduleOutcome::NotRunning;
        };
        if self.clock.now() > wake_at {
            return ScheduleOutcome::NotRunning;
        }

        tracing::info!(minutes, "added extra time");
        self.schedule(wake_at + Duration::from_secs(minutes * 60))
    }

    /// Re-arms the countdown with the last recorded duration, if one is
    /// currently running. Returns the duration that was re-armed.
    pub fn restart_timer_if_running(&mut self) -> Option<Duration> {
        if !self.is_running() {
            return None;
        }
        let duration = match &self.stop_reason {
            StopReason::AfterTime { duration } => *duration,
            _ => return None,
        };
        let _ = self.sleep_after(duration);
        Some(duration)
    }

    /// The auto-restart decision.
    ///
    /// Evaluated only when a stop is on record and at most five minutes old.
    /// The branches are tried in strict priority order -- chapter end, then
    /// episode end, then plain duration -- and only the first match acts.
    /// Chapter-granularity state is the most specific signal, so it wins
    /// when a chapter boundary coincides with an episode boundary.
    ///
    /// Returns which branch restarted, so the caller can re-arm the matching
    /// player-side sleep mode. The duration branch re-arms the countdown
    /// here; a scheduling failure on that path is absorbed and reported as
    /// no restart.
    pub fn restart_if_applies(
        &mut self,
        auto_restart_enabled: bool,
        current_episode: Uuid,
        player_state: &PlayerSleepState,
    ) -> Option<RestartReason> {
        if !auto_restart_enabled {
            return None;
        }
        let finished_at = self.last_finished_at?;
        let elapsed = self.clock.now().saturating_sub(finished_at);

        if self.should_restart_end_of_chapter(elapsed, player_state.is_end_of_chapter_running) {
            self.analytics.track(
                AnalyticsEvent::PlayerSleepTimerRestarted,
                EventProperties::from([
                    (TIME_KEY, json!(END_OF_CHAPTER_VALUE)),
                    (NUMBER_OF_CHAPTERS_KEY, json!(player_state.chapter_count)),
                ]),
            );
            return Some(RestartReason::EndOfChapter);
        }

        if self.should_restart_end_of_episode(
            elapsed,
            &current_episode,
            player_state.is_end_of_episode_running,
        ) {
            self.analytics.track(
                AnalyticsEvent::PlayerSleepTimerRestarted,
                EventProperties::from([
                    (TIME_KEY, json!(END_OF_EPISODE_VALUE)),
                    (NUMBER_OF_EPISODES_KEY, json!(player_state.episode_count)),
                ]),
            );
            return Some(RestartReason::EndOfEpisode);
        }

        if self.should_restart_after_time(elapsed, player_state.is_sleep_after_time_running) {
            if let StopReason::AfterTime { duration } = self.stop_reason.clone() {
                self.analytics.track(
                    AnalyticsEvent::PlayerSleepTimerRestarted,
                    EventProperties::from([(TIME_KEY, json!(duration.as_secs()))]),
                );
                tracing::info!(
                    minutes = duration.as_secs() / 60,
                    "sleep timer was restarted"
                );
                if self.sleep_after(duration).is_scheduled() {
                    return Some(RestartReason::AfterTime(duration));
                }
            }
        }

        None
    }

    /// Records that playback stopped at the natural end of `episode`.
    pub fn set_end_of_episode(&mut self, episode: Uuid) {
        tracing::info!(%episode, "episode was marked as end of episode");
        self.stop_reason = StopReason::EndOfEpisode { episode };
        self.last_finished_at = Some(self.clock.now());
    }

    /// Records that playback stopped at the end of a chapter.
    pub fn set_end_of_chapter(&mut self) {
        tracing::info!("end of chapter was reached");
        self.stop_reason = StopReason::EndOfChapter;
        self.last_finished_at = Some(self.clock.now());
    }

    /// Cancels the pending wake-up and resets every field. Idempotent.
    ///
    /// After this, the restart decision stays a no-op until a new stop event
    /// is recorded.
    pub fn cancel(&mut self) {
        tracing::info!("cleaning up the sleep timer");
        self.alarm.cancel();
        self.wake_at = None;
        self.stop_reason = StopReason::None;
        self.last_finished_at = None;
    }

    /// True iff a wake-up is armed and still in the future.
    pub fn is_running(&self) -> bool {
        self.wake_at
            .is_some_and(|wake_at| self.clock.now() < wake_at)
    }

    /// Whole seconds left on the countdown.
    ///
    /// A wake time that has already passed is treated as expiry: the wake
    /// field is cleared and `None` is returned.
    pub fn remaining_seconds(&mut self) -> Option<u64> {
        let wake_at = self.wake_at?;
        let now = self.clock.now();
        if now > wake_at {
            tracing::info!("cancelled because time is up");
            self.wake_at = None;
            return None;
        }
        Some((wake_at - now).as_secs())
    }

    /// The most recent stop reason on record.
    pub fn stop_reason(&self) -> &StopReason {
        &self.stop_reason
    }

    fn schedule(&mut self, wake_at: Duration) -> ScheduleOutcome {
        self.alarm.cancel();
        match self.alarm.schedule_once(wake_at) {
            Ok(()) => {
                self.wake_at = Some(wake_at);
                // The anticipated finish doubles as the restart anchor once
                // the countdown expires.
                self.last_finished_at = Some(wake_at);
                ScheduleOutcome::Scheduled
            }
            Err(e) => {
                tracing::error!(error = %e, "unable to start sleep timer");
                self.wake_at = None;
                ScheduleOutcome::SchedulingFailed
            }
        }
    }

    fn should_restart_after_time(&self, elapsed: Duration, is_running: bool) -> bool {
        elapsed < MIN_TIME_TO_RESTART
            && matches!(self.stop_reason, StopReason::AfterTime { .. })
            && !is_running
    }

    fn should_restart_end_of_episode(
        &self,
        elapsed: Duration,
        current_episode: &Uuid,
        is_running: bool,
    ) -> bool {
        elapsed < MIN_TIME_TO_RESTART
            && matches!(&self.stop_reason, StopReason::EndOfEpisode { episode } if episode != current_episode)
            && !is_running
    }

    fn should_restart_end_of_chapter(&self, elapsed: Duration, is_running: bool) -> bool {
        elapsed < MIN_TIME_TO_RESTART
            && !is_running
            && matches!(self.stop_reason, StopReason::EndOfChapter)
    }
}

// ============================================================================
// Tests
// ============================================================================
