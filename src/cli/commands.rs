//! Command definitions for the sleep timer CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

use crate::types::PlayerSleepState;

// ============================================================================
// CLI Structure
// ============================================================================

/// Sleep timer CLI for podcast playback
#[derive(Parser, Debug)]
#[command(
    name = "snooze",
    version,
    about = "ポッドキャスト再生用スリープタイマーCLI",
    long_about = "再生を止めるスリープタイマーをターミナルから操作します。\n\
                  再生イベントに応じたタイマーの自動再開にも対応しています。",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Daemon socket path (defaults to ~/.snooze/snooze.sock)
    #[arg(long, global = true)]
    pub socket: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Arm a countdown that stops playback when it fires
    Start(StartArgs),

    /// Push the pending wake-up further out
    Extend(ExtendArgs),

    /// Cancel the timer and clear restart eligibility
    Cancel,

    /// Show the current countdown
    Status,

    /// Report that an episode finished naturally
    EpisodeEnd {
        /// Episode that just ended
        episode: Uuid,
    },

    /// Report that a chapter boundary was reached
    ChapterEnd,

    /// Report that playback started and evaluate auto-restart
    Playing(PlayingArgs),

    /// Run as daemon (background service)
    Daemon(DaemonArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Command Arguments
// ============================================================================

/// Arguments for the start command
#[derive(Args, Debug, Clone)]
pub struct StartArgs {
    /// Countdown length in minutes (1-480)
    #[arg(
        short,
        long,
        default_value = "15",
        value_parser = clap::value_parser!(u64).range(1..=480)
    )]
    pub minutes: u64,
}

impl Default for StartArgs {
    fn default() -> Self {
        Self { minutes: 15 }
    }
}

/// Arguments for the extend command
#[derive(Args, Debug, Clone)]
pub struct ExtendArgs {
    /// Minutes to add to the scheduled wake time (1-120)
    #[arg(
        short,
        long,
        default_value = "5",
        value_parser = clap::value_parser!(u64).range(1..=120)
    )]
    pub minutes: u64,
}

impl Default for ExtendArgs {
    fn default() -> Self {
        Self { minutes: 5 }
    }
}

/// Arguments for the playing command
#[derive(Args, Debug, Clone)]
pub struct PlayingArgs {
    /// Episode now playing
    #[arg(short, long)]
    pub episode: Uuid,

    /// A fixed-duration countdown is already running in the player
    #[arg(long)]
    pub timer_running: bool,

    /// An end-of-episode sleep mode is already running in the player
    #[arg(long)]
    pub episode_end_running: bool,

    /// An end-of-chapter sleep mode is already running in the player
    #[arg(long)]
    pub chapter_end_running: bool,

    /// Number of episodes configured for the episode sleep mode
    #[arg(long, default_value = "0")]
    pub episodes: u32,

    /// Number of chapters configured for the chapter sleep mode
    #[arg(long, default_value = "0")]
    pub chapters: u32,
}

impl PlayingArgs {
    /// Converts the arguments into the wire-level player state.
    pub fn to_player_state(&self) -> PlayerSleepState {
        PlayerSleepState {
            is_sleep_after_time_running: self.timer_running,
            is_end_of_episode_running: self.episode_end_running,
            is_end_of_chapter_running: self.chapter_end_running,
            episode_count: self.episodes,
            chapter_count: self.chapters,
        }
    }
}

/// Arguments for the daemon command
#[derive(Args, Debug, Clone, Default)]
pub struct DaemonArgs {
    /// Allow the timer to auto-restart after playback events
    #[arg(long)]
    pub auto_restart: bool,

    /// Shell command executed when the countdown fires
    #[arg(long)]
    pub on_sleep: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================
