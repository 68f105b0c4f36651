//! Snooze - a sleep timer for podcast playback
//!
//! The daemon arms one-shot wake-ups that stop playback, and can
//! automatically re-arm itself when playback resumes shortly after a stop:
//! - Fixed-duration countdowns with extension
//! - End-of-episode / end-of-chapter stop tracking
//! - Auto-restart within a five-minute window

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser};

use snooze::cli::{Cli, Commands, Display, IpcClient};
use snooze::daemon::{self, DaemonConfig};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse();

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    // Set verbose logging if requested
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    let socket = cli.socket.clone();

    match cli.command {
        Some(Commands::Start(args)) => {
            let response = client(socket)?.start(args.minutes).await?;
            Display::show_start_success(&response);
        }
        Some(Commands::Extend(args)) => {
            let response = client(socket)?.extend(args.minutes).await?;
            Display::show_extend_success(&response);
        }
        Some(Commands::Cancel) => {
            let response = client(socket)?.cancel().await?;
            Display::show_cancel_success(&response);
        }
        Some(Commands::Status) => {
            let response = client(socket)?.status().await?;
            Display::show_status(&response);
        }
        Some(Commands::EpisodeEnd { episode }) => {
            let response = client(socket)?.episode_end(episode).await?;
            Display::show_event_recorded(&response);
        }
        Some(Commands::ChapterEnd) => {
            let response = client(socket)?.chapter_end().await?;
            Display::show_event_recorded(&response);
        }
        Some(Commands::Playing(args)) => {
            let response = client(socket)?
                .playing(args.episode, args.to_player_state())
                .await?;
            Display::show_playing_result(&response);
        }
        Some(Commands::Daemon(args)) => {
            let mut config = DaemonConfig::new()?;
            if let Some(path) = socket {
                config = config.with_socket_path(path);
            }
            config.auto_restart = args.auto_restart;
            config.on_sleep = args.on_sleep;
            daemon::run(config).await?;
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Builds an IPC client honoring the global socket override.
fn client(socket: Option<PathBuf>) -> Result<IpcClient> {
    Ok(match socket {
        Some(path) => IpcClient::with_socket_path(path),
        None => IpcClient::new()?,
    })
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["snooze"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::parse_from(["snooze", "status"]);
        assert!(matches!(cli.command, Some(Commands::Status)));
    }

    #[test]
    fn test_cli_parse_start_with_minutes() {
        let cli = Cli::parse_from(["snooze", "start", "--minutes", "30"]);
        match cli.command {
            Some(Commands::Start(args)) => assert_eq!(args.minutes, 30),
            _ => panic!("Expected Start command"),
        }
    }

    #[test]
    fn test_cli_parse_verbose() {
        let cli = Cli::parse_from(["snooze", "--verbose", "status"]);
        assert!(cli.verbose);
    }

    #[test]
    fn test_client_honors_socket_override() {
        let client = client(Some(PathBuf::from("/tmp/test.sock"))).unwrap();
        assert_eq!(client.socket_path(), &PathBuf::from("/tmp/test.sock"));
    }
}
