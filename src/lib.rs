//! Sleep Timer Library
//!
//! This library provides the core functionality for the snooze sleep-timer
//! daemon. It includes:
//! - Countdown & restart state machine for playback sleep timers
//! - Alarm capability for one-shot wake-ups (tokio-backed and mock)
//! - Analytics event sink for the sleep-timer feature
//! - Injected wall-clock capability for deterministic tests
//! - IPC server/client for daemon-CLI communication
//! - CLI command parsing and display utilities

pub mod alarm;
pub mod analytics;
pub mod cli;
pub mod clock;
pub mod daemon;
pub mod timer;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    IpcRequest, IpcResponse, PlayerSleepState, ResponseData, RestartReason, ScheduleOutcome,
    StopReason,
};

// Re-export the timer core
pub use timer::SleepTimer;

// Re-export capability types
pub use alarm::{AlarmError, AlarmScheduler, MockAlarmScheduler, TokioAlarmScheduler, WakeEvent};
pub use analytics::{
    AnalyticsEvent, AnalyticsTracker, EventProperties, RecordingTracker, TracingTracker,
};
pub use clock::{Clock, MockClock, SystemClock};

// Re-export daemon types
pub use daemon::{DaemonConfig, DaemonTimer};
