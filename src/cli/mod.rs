//! CLI module for the sleep timer.
//!
//! This module contains:
//! - `commands`: clap command definitions
//! - `client`: IPC client for talking to the daemon
//! - `display`: formatted terminal output

pub mod client;
pub mod commands;
pub mod display;

pub use client::IpcClient;
pub use commands::{Cli, Commands, DaemonArgs, ExtendArgs, PlayingArgs, StartArgs};
pub use display::Display;
