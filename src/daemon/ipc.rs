//! IPC server for the sleep-timer daemon.
//!
//! This module provides Unix Domain Socket IPC functionality:
//! - Server that listens on a Unix socket
//! - Request/response handling for timer commands
//! - Dispatch into the shared [`SleepTimer`]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;
use tokio::time::timeout;

use crate::alarm::AlarmScheduler;
use crate::analytics::{AnalyticsEvent, AnalyticsTracker, EventProperties};
use crate::clock::Clock;
use crate::timer::SleepTimer;
use crate::types::{IpcRequest, IpcResponse, ResponseData, ScheduleOutcome};

// ============================================================================
// Constants
// ============================================================================

/// Maximum request size in bytes (4KB)
const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    /// Unix socket listener
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a new IPC server bound to the specified socket path.
    ///
    /// If the socket file already exists, it will be removed before binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound.
    pub fn new(socket_path: &Path) -> Result<Self> {
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove existing socket: {socket_path:?}"))?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {parent:?}"))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {socket_path:?}"))?;

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be accepted.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok(stream)
    }

    /// Receives and deserializes an IPC request from the stream.
    ///
    /// Applies a read timeout to prevent blocking indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or deserialization fails.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest> {
        let mut buffer = vec![0u8; MAX_REQUEST_SIZE];

        let read_result = timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            stream.read(&mut buffer),
        )
        .await;

        let n = match read_result {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string()).into()),
            Err(_) => return Err(IpcError::Timeout.into()),
        };

        if n == 0 {
            anyhow::bail!("Connection closed by client");
        }

        let request: IpcRequest = serde_json::from_slice(&buffer[..n])
            .context("Failed to deserialize IPC request")?;

        Ok(request)
    }

    /// Serializes and sends an IPC response to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        let body = serde_json::to_vec(response).context("Failed to serialize IPC response")?;

        stream
            .write_all(&body)
            .await
            .context("Failed to write response")?;
        stream.flush().await.context("Failed to flush response")?;

        Ok(())
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        // Clean up socket file on drop
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Handles IPC requests by dispatching to the shared sleep timer.
pub struct RequestHandler<A, T, C> {
    timer: Arc<Mutex<SleepTimer<A, T, C>>>,
    /// Daemon-level event sink for the commands themselves
    analytics: T,
    /// The user's auto-restart setting, consulted on playback_started
    auto_restart: bool,
}

impl<A, T, C> RequestHandler<A, T, C>
where
    A: AlarmScheduler,
    T: AnalyticsTracker,
    C: Clock,
{
    /// Creates a new request handler over the given timer.
    pub fn new(timer: Arc<Mutex<SleepTimer<A, T, C>>>, analytics: T, auto_restart: bool) -> Self {
        Self {
            timer,
            analytics,
            auto_restart,
        }
    }

    /// Handles an IPC request and returns the appropriate response.
    pub async fn handle(&self, request: IpcRequest) -> IpcResponse {
        match request {
            IpcRequest::Sleep { minutes } => self.handle_sleep(minutes).await,
            IpcRequest::Extend { minutes } => self.handle_extend(minutes).await,
            IpcRequest::Cancel => self.handle_cancel().await,
            IpcRequest::Status => self.handle_status().await,
            IpcRequest::EpisodeEnded { episode } => self.handle_episode_ended(episode).await,
            IpcRequest::ChapterEnded => self.handle_chapter_ended().await,
            IpcRequest::PlaybackStarted { episode, state } => {
                self.handle_playback_started(episode, state).await
            }
        }
    }

    /// Handles the sleep command.
    async fn handle_sleep(&self, minutes: u64) -> IpcResponse {
        let duration = Duration::from_secs(minutes * 60);
        let mut timer = self.timer.lock().await;

        match timer.sleep_after(duration) {
            ScheduleOutcome::Scheduled => {
                self.analytics.track(
                    AnalyticsEvent::PlayerSleepTimerEnabled,
                    EventProperties::from([("time", json!(duration.as_secs()))]),
                );
                let remaining = timer.remaining_seconds().unwrap_or(0);
                IpcResponse::success(
                    "スリープタイマーを開始しました",
                    Some(ResponseData::running(remaining)),
                )
            }
            _ => IpcResponse::error("スリープタイマーを設定できませんでした"),
        }
    }

    /// Handles the extend command.
    async fn handle_extend(&self, minutes: u64) -> IpcResponse {
        let mut timer = self.timer.lock().await;

        match timer.add_extra_time(minutes) {
            ScheduleOutcome::Scheduled => {
                self.analytics.track(
                    AnalyticsEvent::PlayerSleepTimerExtended,
                    EventProperties::from([("time", json!(minutes * 60))]),
                );
                let remaining = timer.remaining_seconds().unwrap_or(0);
                IpcResponse::success(
                    "スリープタイマーを延長しました",
                    Some(ResponseData::running(remaining)),
                )
            }
            ScheduleOutcome::NotRunning => IpcResponse::error("タイマーは動作していません"),
            ScheduleOutcome::SchedulingFailed => {
                IpcResponse::error("スリープタイマーを設定できませんでした")
            }
        }
    }

    /// Handles the cancel command.
    async fn handle_cancel(&self) -> IpcResponse {
        let mut timer = self.timer.lock().await;
        timer.cancel();
        self.analytics.track(
            AnalyticsEvent::PlayerSleepTimerCancelled,
            EventProperties::new(),
        );
        IpcResponse::success(
            "スリープタイマーをキャンセルしました",
            Some(ResponseData::idle()),
        )
    }

    /// Handles the status query.
    async fn handle_status(&self) -> IpcResponse {
        let mut timer = self.timer.lock().await;
        let data = match timer.remaining_seconds() {
            Some(remaining) => ResponseData::running(remaining),
            None => ResponseData::idle(),
        };
        IpcResponse::success("ステータスを取得しました", Some(data))
    }

    /// Handles an end-of-episode report from the player.
    async fn handle_episode_ended(&self, episode: uuid::Uuid) -> IpcResponse {
        let mut timer = self.timer.lock().await;
        timer.set_end_of_episode(episode);
        IpcResponse::success("エピソードの終了を記録しました", None)
    }

    /// Handles an end-of-chapter report from the player.
    async fn handle_chapter_ended(&self) -> IpcResponse {
        let mut timer = self.timer.lock().await;
        timer.set_end_of_chapter();
        IpcResponse::success("チャプターの終了を記録しました", None)
    }

    /// Handles a playback-started report: runs the auto-restart decision and
    /// tells the player which sleep mode, if any, to re-arm.
    async fn handle_playback_started(
        &self,
        episode: uuid::Uuid,
        state: crate::types::PlayerSleepState,
    ) -> IpcResponse {
        let mut timer = self.timer.lock().await;

        match timer.restart_if_applies(self.auto_restart, episode, &state) {
            Some(reason) => {
                let data = ResponseData {
                    state: Some(if timer.is_running() { "running" } else { "idle" }.to_string()),
                    remaining_seconds: timer.remaining_seconds(),
                    restarted: Some(reason.as_str().to_string()),
                };
                IpcResponse::success("スリープタイマーを再開しました", Some(data))
            }
            None => {
                let data = match timer.remaining_seconds() {
                    Some(remaining) => ResponseData::running(remaining),
                    None => ResponseData::idle(),
                };
                IpcResponse::success("再開条件はありませんでした", Some(data))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
