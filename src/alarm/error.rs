//! Alarm capability error types.

use thiserror::Error;

/// Errors that can occur when registering a wake-up.
///
/// Scheduling failures are non-fatal: the timer absorbs them and leaves its
/// state untouched, so these errors never reach a caller of the timer API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlarmError {
    /// The daemon-side wake receiver is gone; nothing can be delivered.
    #[error("wake channel closed")]
    WakeChannelClosed,

    /// The platform refused the registration (permission or power policy).
    #[error("alarm registration rejected: {0}")]
    Rejected(String),
}

impl AlarmError {
    /// Returns true if the platform refused the registration.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}
