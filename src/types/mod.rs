//! Core data types for the sleep timer.
//!
//! This module defines the data structures used for:
//! - Stop-reason tracking and restart decisions
//! - Scheduling outcomes
//! - Player-reported sleep mode flags
//! - IPC request/response serialization

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// StopReason
// ============================================================================

/// Why the sleep timer most recently stopped (or is about to stop).
///
/// At most one reason is on record at a time; setting a new reason replaces
/// the previous one, which is what keeps the restart bookkeeping for the
/// three sleep modes mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StopReason {
    /// No stop on record.
    #[default]
    None,
    /// A fixed-duration countdown was armed; the duration is reused when the
    /// timer auto-restarts.
    AfterTime {
        /// Duration most recently requested for the countdown
        duration: Duration,
    },
    /// Playback reached the natural end of an episode.
    EndOfEpisode {
        /// Episode whose end stopped the timer
        episode: Uuid,
    },
    /// Playback reached the end of a chapter.
    EndOfChapter,
}

impl StopReason {
    /// Returns the string representation of the reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::None => "none",
            StopReason::AfterTime { .. } => "after_time",
            StopReason::EndOfEpisode { .. } => "end_of_episode",
            StopReason::EndOfChapter => "end_of_chapter",
        }
    }

    /// Returns true if no stop is on record.
    pub fn is_none(&self) -> bool {
        matches!(self, StopReason::None)
    }
}

// ============================================================================
// RestartReason
// ============================================================================

/// Which restart branch the auto-restart decision took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartReason {
    /// The previous fixed-duration countdown was re-armed with this duration.
    AfterTime(Duration),
    /// The player should re-arm its end-of-episode sleep mode.
    EndOfEpisode,
    /// The player should re-arm its end-of-chapter sleep mode.
    EndOfChapter,
}

impl RestartReason {
    /// Returns the string representation of the restart branch.
    pub fn as_str(&self) -> &'static str {
        match self {
            RestartReason::AfterTime(_) => "after_time",
            RestartReason::EndOfEpisode => "end_of_episode",
            RestartReason::EndOfChapter => "end_of_chapter",
        }
    }
}

// ============================================================================
// ScheduleOutcome
// ============================================================================

/// Synchronous result of a scheduling operation.
///
/// Scheduling failures are absorbed by the timer (logged, state untouched);
/// the caller only ever observes this value, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// A wake-up was registered with the alarm capability.
    Scheduled,
    /// The alarm capability refused the registration; no timer is active.
    SchedulingFailed,
    /// There was nothing to schedule (no active countdown).
    NotRunning,
}

impl ScheduleOutcome {
    /// Returns true if a wake-up was registered.
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        matches!(self, ScheduleOutcome::Scheduled)
    }
}

// ============================================================================
// PlayerSleepState
// ============================================================================

/// The player's report of which sleep modes it is currently running.
///
/// The restart decision consults these flags so it never re-arms a mode the
/// player already has active. The counts are carried through to analytics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerSleepState {
    /// A fixed-duration countdown is currently running.
    pub is_sleep_after_time_running: bool,
    /// An end-of-episode sleep mode is currently running.
    pub is_end_of_episode_running: bool,
    /// An end-of-chapter sleep mode is currently running.
    pub is_end_of_chapter_running: bool,
    /// Number of episodes configured for the episode sleep mode.
    pub episode_count: u32,
    /// Number of chapters configured for the chapter sleep mode.
    pub chapter_count: u32,
}

// ============================================================================
// IPC Types
// ============================================================================

/// IPC request from client to daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum IpcRequest {
    /// Arm a fixed-duration countdown
    Sleep {
        /// Countdown length in minutes
        minutes: u64,
    },
    /// Push the pending wake-up further out
    Extend {
        /// Minutes to add to the scheduled wake time
        minutes: u64,
    },
    /// Cancel the timer and clear restart eligibility
    Cancel,
    /// Query the current countdown
    Status,
    /// The player stopped at the natural end of this episode
    EpisodeEnded {
        /// Episode that just ended
        episode: Uuid,
    },
    /// The player stopped at the end of a chapter
    ChapterEnded,
    /// Playback (re)started; evaluate the auto-restart decision
    PlaybackStarted {
        /// Episode now playing
        episode: Uuid,
        /// Player-reported sleep mode flags
        #[serde(default)]
        state: PlayerSleepState,
    },
}

/// Response data for IPC responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseData {
    /// Current state ("running" or "idle")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Whole seconds left on the countdown
    #[serde(rename = "remainingSeconds", skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<u64>,
    /// Restart branch taken by a playback_started request, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restarted: Option<String>,
}

impl ResponseData {
    /// Creates response data for an active countdown.
    pub fn running(remaining_seconds: u64) -> Self {
        Self {
            state: Some("running".to_string()),
            remaining_seconds: Some(remaining_seconds),
            restarted: None,
        }
    }

    /// Creates response data for an idle timer.
    pub fn idle() -> Self {
        Self {
            state: Some("idle".to_string()),
            remaining_seconds: None,
            restarted: None,
        }
    }
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcResponse {
    /// Response status ("success" or "error")
    pub status: String,
    /// Human-readable message
    pub message: String,
    /// Optional response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl IpcResponse {
    /// Creates a success response.
    pub fn success(message: impl Into<String>, data: Option<ResponseData>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data,
        }
    }

    /// Creates an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
