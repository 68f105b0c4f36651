//! Daemon module for the sleep timer.
//!
//! This module contains the background service:
//! - `ipc`: Unix-socket server and request dispatch
//! - The daemon loop reacting to client requests and alarm wake-ups

pub mod ipc;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};

use crate::alarm::{TokioAlarmScheduler, WakeEvent};
use crate::analytics::TracingTracker;
use crate::clock::SystemClock;
use crate::timer::SleepTimer;

pub use ipc::{IpcServer, RequestHandler};

/// Socket location relative to the home directory.
const DEFAULT_SOCKET_FILE: &str = ".snooze/snooze.sock";

/// The timer as the daemon runs it.
pub type DaemonTimer = SleepTimer<TokioAlarmScheduler, TracingTracker, SystemClock>;

// ============================================================================
// DaemonConfig
// ============================================================================

/// Daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DaemonConfig {
    /// Unix socket the daemon listens on.
    pub socket_path: PathBuf,

    /// Whether the timer may auto-restart after playback events.
    #[serde(default)]
    pub auto_restart: bool,

    /// Shell command executed when the countdown fires
    /// (e.g. `playerctl pause`).
    #[serde(default)]
    pub on_sleep: Option<String>,
}

impl DaemonConfig {
    /// Creates a configuration with the default socket path.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        Ok(Self {
            socket_path: default_socket_path()?,
            auto_restart: false,
            on_sleep: None,
        })
    }

    /// Replaces the socket path.
    #[must_use]
    pub fn with_socket_path(mut self, socket_path: PathBuf) -> Self {
        self.socket_path = socket_path;
        self
    }
}

/// Returns the default socket path under the home directory.
fn default_socket_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("ホームディレクトリを特定できません")?;
    Ok(home.join(DEFAULT_SOCKET_FILE))
}

// ============================================================================
// Daemon loop
// ============================================================================

/// Runs the sleep-timer daemon until ctrl-c.
///
/// # Errors
///
/// Returns an error if the IPC socket cannot be bound.
pub async fn run(config: DaemonConfig) -> Result<()> {
    let (wake_tx, mut wake_rx) = mpsc::unbounded_channel::<WakeEvent>();
    let alarm = TokioAlarmScheduler::new(wake_tx);
    let timer: Arc<Mutex<DaemonTimer>> =
        Arc::new(Mutex::new(SleepTimer::new(alarm, TracingTracker, SystemClock)));

    let server = IpcServer::new(&config.socket_path)?;
    let handler = Arc::new(RequestHandler::new(
        Arc::clone(&timer),
        TracingTracker,
        config.auto_restart,
    ));

    info!(socket = %config.socket_path.display(), "sleep timer daemon started");

    loop {
        tokio::select! {
            conn = server.accept() => {
                match conn {
                    Ok(mut stream) => {
                        let handler = Arc::clone(&handler);
                        tokio::spawn(async move {
                            match IpcServer::receive_request(&mut stream).await {
                                Ok(request) => {
                                    let response = handler.handle(request).await;
                                    if let Err(e) =
                                        IpcServer::send_response(&mut stream, &response).await
                                    {
                                        warn!("failed to send response: {e}");
                                    }
                                }
                                Err(e) => warn!("failed to read request: {e}"),
                            }
                        });
                    }
                    Err(e) => warn!("failed to accept connection: {e}"),
                }
            }
            wake = wake_rx.recv() => {
                match wake {
                    Some(event) => handle_wake(&timer, &config, event).await,
                    // The sender lives inside the timer's alarm scheduler,
                    // so this only happens during teardown.
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}

/// Reacts to the countdown firing.
async fn handle_wake(
    timer: &Arc<Mutex<DaemonTimer>>,
    config: &DaemonConfig,
    event: WakeEvent,
) {
    info!(wake_at_secs = event.wake_at.as_secs(), "sleep timer fired");

    // Observe the expiry so status queries report idle from here on
    let _ = timer.lock().await.remaining_seconds();

    if let Some(command) = &config.on_sleep {
        run_sleep_command(command).await;
    }
}

/// Runs the configured on-sleep shell command.
async fn run_sleep_command(command: &str) {
    let command_line = command.to_string();
    let result = tokio::task::spawn_blocking(move || {
        std::process::Command::new("sh")
            .arg("-c")
            .arg(&command_line)
            .status()
    })
    .await;

    match result {
        Ok(Ok(status)) if status.success() => info!("on-sleep command finished"),
        Ok(Ok(status)) => warn!(%status, "on-sleep command exited with failure"),
        Ok(Err(e)) => warn!("failed to run on-sleep command: {e}"),
        Err(e) => warn!("on-sleep command task failed: {e}"),
    }
}

// ============================================================================
// Tests
// ============================================================================
