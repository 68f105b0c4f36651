//! Analytics event sink.
//!
//! Fire-and-forget event recording for the sleep-timer feature. The timer
//! core and the daemon both report through the [`AnalyticsTracker`] trait;
//! the transport behind it (batching, upload) lives in the host application
//! and is out of scope here.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

// ============================================================================
// AnalyticsEvent
// ============================================================================

/// Trackable events, named by their wire key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalyticsEvent {
    /* Sleep timer */
    PlayerSleepTimerEnabled,
    PlayerSleepTimerExtended,
    PlayerSleepTimerCancelled,
    PlayerSleepTimerRestarted,
}

impl AnalyticsEvent {
    /// Returns the wire key for this event.
    pub fn key(&self) -> &'static str {
        match self {
            AnalyticsEvent::PlayerSleepTimerEnabled => "player_sleep_timer_enabled",
            AnalyticsEvent::PlayerSleepTimerExtended => "player_sleep_timer_extended",
            AnalyticsEvent::PlayerSleepTimerCancelled => "player_sleep_timer_cancelled",
            AnalyticsEvent::PlayerSleepTimerRestarted => "player_sleep_timer_restarted",
        }
    }
}

/// Property bag attached to an event.
pub type EventProperties = HashMap<&'static str, Value>;

// ============================================================================
// AnalyticsTracker
// ============================================================================

/// Records a named event with key/value properties. Fire-and-forget.
pub trait AnalyticsTracker {
    fn track(&self, event: AnalyticsEvent, properties: EventProperties);
}

impl<T: AnalyticsTracker + ?Sized> AnalyticsTracker for Arc<T> {
    fn track(&self, event: AnalyticsEvent, properties: EventProperties) {
        (**self).track(event, properties)
    }
}

/// Tracker that writes events to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTracker;

impl AnalyticsTracker for TracingTracker {
    fn track(&self, event: AnalyticsEvent, properties: EventProperties) {
        tracing::debug!(event = event.key(), ?properties, "analytics event");
    }
}

/// Tracker that records events in memory for tests.
#[derive(Debug, Default)]
pub struct RecordingTracker {
    events: Mutex<Vec<(AnalyticsEvent, EventProperties)>>,
}

impl RecordingTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every recorded event, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<(AnalyticsEvent, EventProperties)> {
        self.events.lock().unwrap().clone()
    }

    /// Number of recorded events.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Returns the most recently recorded event, if any.
    #[must_use]
    pub fn last_event(&self) -> Option<(AnalyticsEvent, EventProperties)> {
        self.events.lock().unwrap().last().cloned()
    }

    /// Drops everything recorded so far.
    pub fn clear_recorded(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl AnalyticsTracker for RecordingTracker {
    fn track(&self, event: AnalyticsEvent, properties: EventProperties) {
        self.events.lock().unwrap().push((event, properties));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_keys() {
        assert_eq!(
            AnalyticsEvent::PlayerSleepTimerEnabled.key(),
            "player_sleep_timer_enabled"
        );
        assert_eq!(
            AnalyticsEvent::PlayerSleepTimerExtended.key(),
            "player_sleep_timer_extended"
        );
        assert_eq!(
            AnalyticsEvent::PlayerSleepTimerCancelled.key(),
            "player_sleep_timer_cancelled"
        );
        assert_eq!(
            AnalyticsEvent::PlayerSleepTimerRestarted.key(),
            "player_sleep_timer_restarted"
        );
    }

    #[test]
    fn test_recording_tracker_records_in_order() {
        let tracker = RecordingTracker::new();

        tracker.track(AnalyticsEvent::PlayerSleepTimerEnabled, HashMap::new());
        tracker.track(
            AnalyticsEvent::PlayerSleepTimerRestarted,
            HashMap::from([("time", json!(600))]),
        );

        let events = tracker.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, AnalyticsEvent::PlayerSleepTimerEnabled);
        assert_eq!(events[1].0, AnalyticsEvent::PlayerSleepTimerRestarted);
        assert_eq!(events[1].1.get("time"), Some(&json!(600)));
    }

    #[test]
    fn test_recording_tracker_last_event() {
        let tracker = RecordingTracker::new();
        assert!(tracker.last_event().is_none());

        tracker.track(AnalyticsEvent::PlayerSleepTimerCancelled, HashMap::new());

        let (event, _) = tracker.last_event().unwrap();
        assert_eq!(event, AnalyticsEvent::PlayerSleepTimerCancelled);
    }

    #[test]
    fn test_recording_tracker_clear() {
        let tracker = RecordingTracker::new();
        tracker.track(AnalyticsEvent::PlayerSleepTimerEnabled, HashMap::new());
        tracker.clear_recorded();
        assert_eq!(tracker.event_count(), 0);
    }

    #[test]
    fn test_tracking_through_arc() {
        let tracker = Arc::new(RecordingTracker::new());
        let shared: Arc<RecordingTracker> = Arc::clone(&tracker);

        AnalyticsTracker::track(
            &shared,
            AnalyticsEvent::PlayerSleepTimerExtended,
            HashMap::new(),
        );

        assert_eq!(tracker.event_count(), 1);
    }

    #[test]
    fn test_tracing_tracker_does_not_panic() {
        let tracker = TracingTracker;
        tracker.track(
            AnalyticsEvent::PlayerSleepTimerRestarted,
            HashMap::from([("time", json!("end_of_chapter"))]),
        );
    }
}
