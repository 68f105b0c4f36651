//! One-shot alarm capability.
//!
//! The sleep timer does not own a countdown loop; it registers a single
//! wake-up at an absolute instant with an [`AlarmScheduler`] and reacts when
//! the wake-up fires. This module provides:
//!
//! - The `AlarmScheduler` trait (schedule/cancel a one-shot wake-up)
//! - `TokioAlarmScheduler`: a task-backed implementation delivering
//!   [`WakeEvent`]s over a channel
//! - `MockAlarmScheduler`: a recording implementation for tests
//!
//! On platforms with a real alarm service the host is expected to supply its
//! own implementation with allow-while-idle semantics; the tokio one only
//! fires while the process is running.

pub mod error;

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub use self::error::AlarmError;

/// Delivered when a scheduled wake-up fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeEvent {
    /// The instant the wake-up was scheduled for (epoch-based)
    pub wake_at: Duration,
}

/// One-shot wake-up registration.
///
/// Implementations keep at most one wake-up pending: registering a new one
/// replaces any previous registration.
pub trait AlarmScheduler {
    /// Registers a wake-up at the given instant (duration since the Unix
    /// epoch). An instant in the past fires immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the registration could not be made.
    fn schedule_once(&self, wake_at: Duration) -> Result<(), AlarmError>;

    /// Removes any pending registration. Idempotent.
    fn cancel(&self);
}

impl<A: AlarmScheduler + ?Sized> AlarmScheduler for Arc<A> {
    fn schedule_once(&self, wake_at: Duration) -> Result<(), AlarmError> {
        (**self).schedule_once(wake_at)
    }

    fn cancel(&self) {
        (**self).cancel()
    }
}

// ============================================================================
// TokioAlarmScheduler
// ============================================================================

/// Alarm scheduler backed by a spawned tokio task.
///
/// `schedule_once` spawns a task that sleeps until the target instant and
/// then sends a [`WakeEvent`] to the daemon. Re-scheduling aborts the
/// previous task, so at most one wake-up is ever pending.
pub struct TokioAlarmScheduler {
    wake_tx: mpsc::UnboundedSender<WakeEvent>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl TokioAlarmScheduler {
    /// Creates a scheduler delivering wake events to the given channel.
    pub fn new(wake_tx: mpsc::UnboundedSender<WakeEvent>) -> Self {
        Self {
            wake_tx,
            pending: Mutex::new(None),
        }
    }

    fn replace_pending(&self, handle: Option<JoinHandle<()>>) {
        let mut pending = self.pending.lock().unwrap();
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = handle;
    }
}

impl AlarmScheduler for TokioAlarmScheduler {
    fn schedule_once(&self, wake_at: Duration) -> Result<(), AlarmError> {
        if self.wake_tx.is_closed() {
            return Err(AlarmError::WakeChannelClosed);
        }

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let delay = wake_at.saturating_sub(now);

        let tx = self.wake_tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(WakeEvent { wake_at });
        });

        self.replace_pending(Some(handle));
        Ok(())
    }

    fn cancel(&self) {
        self.replace_pending(None);
    }
}

impl Drop for TokioAlarmScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ============================================================================
// MockAlarmScheduler
// ============================================================================

/// Recording alarm scheduler for tests.
#[derive(Debug, Default)]
pub struct MockAlarmScheduler {
    armed: Mutex<Option<Duration>>,
    scheduled: Mutex<Vec<Duration>>,
    cancel_count: AtomicU32,
    should_fail: AtomicBool,
}

impl MockAlarmScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `schedule_once` fail.
    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Returns the currently armed wake instant, if any.
    #[must_use]
    pub fn armed_at(&self) -> Option<Duration> {
        *self.armed.lock().unwrap()
    }

    /// Returns true if a wake-up is currently registered.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed_at().is_some()
    }

    /// Returns every instant ever passed to `schedule_once` (successful
    /// registrations only), oldest first.
    #[must_use]
    pub fn scheduled_history(&self) -> Vec<Duration> {
        self.scheduled.lock().unwrap().clone()
    }

    /// Number of successful `schedule_once` calls.
    #[must_use]
    pub fn schedule_count(&self) -> usize {
        self.scheduled.lock().unwrap().len()
    }

    /// Number of `cancel` calls.
    #[must_use]
    pub fn cancel_count(&self) -> u32 {
        self.cancel_count.load(Ordering::SeqCst)
    }
}

impl AlarmScheduler for MockAlarmScheduler {
    fn schedule_once(&self, wake_at: Duration) -> Result<(), AlarmError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(AlarmError::Rejected("mock failure".to_string()));
        }
        *self.armed.lock().unwrap() = Some(wake_at);
        self.scheduled.lock().unwrap().push(wake_at);
        Ok(())
    }

    fn cancel(&self) {
        *self.armed.lock().unwrap() = None;
        self.cancel_count.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Tests
// ============================================================================
