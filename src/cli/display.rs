//! Display utilities for the sleep timer CLI.
//!
//! This module provides formatted output for:
//! - Success messages
//! - Error messages
//! - Status display

use crate::types::IpcResponse;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows a success message for arming the timer.
    pub fn show_start_success(response: &IpcResponse) {
        println!("* スリープタイマーを開始しました");
        Self::show_remaining(response);
    }

    /// Shows a success message for extending the timer.
    pub fn show_extend_success(response: &IpcResponse) {
        println!("+ スリープタイマーを延長しました");
        Self::show_remaining(response);
    }

    /// Shows a success message for cancelling the timer.
    pub fn show_cancel_success(_response: &IpcResponse) {
        println!("[] スリープタイマーをキャンセルしました");
    }

    /// Shows a confirmation for a reported playback event.
    pub fn show_event_recorded(response: &IpcResponse) {
        println!("* {}", response.message);
    }

    /// Shows the current timer status.
    pub fn show_status(response: &IpcResponse) {
        println!("スリープタイマー ステータス");
        println!("─────────────────────────────");

        if let Some(data) = &response.data {
            let state = data.state.as_deref().unwrap_or("unknown");
            let state_display = match state {
                "running" => "動作中",
                "idle" => "停止中",
                _ => state,
            };
            println!("状態: {}", state_display);

            if let Some(remaining) = data.remaining_seconds {
                let (minutes, seconds) = Self::format_time(remaining);
                println!("残り時間: {}:{:02}", minutes, seconds);
            }
        } else {
            println!("タイマーは起動していません");
        }
    }

    /// Shows the outcome of the auto-restart decision.
    pub fn show_playing_result(response: &IpcResponse) {
        let restarted = response
            .data
            .as_ref()
            .and_then(|data| data.restarted.as_deref());

        match restarted {
            Some("after_time") => {
                println!("> スリープタイマーを再開しました");
                Self::show_remaining(response);
            }
            Some("end_of_episode") => {
                println!("> エピソード終了スリープを再開してください");
            }
            Some("end_of_chapter") => {
                println!("> チャプター終了スリープを再開してください");
            }
            _ => println!("* 再開条件はありませんでした"),
        }
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("エラー: {}", message);
    }

    fn show_remaining(response: &IpcResponse) {
        if let Some(data) = &response.data {
            if let Some(remaining) = data.remaining_seconds {
                let (minutes, seconds) = Self::format_time(remaining);
                println!("  残り時間: {}:{:02}", minutes, seconds);
            }
        }
    }

    /// Formats remaining seconds as (minutes, seconds).
    fn format_time(total_seconds: u64) -> (u64, u64) {
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;
        (minutes, seconds)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseData;

    // ------------------------------------------------------------------------
    // Format Time Tests
    // ------------------------------------------------------------------------

    mod format_time_tests {
        use super::*;

        #[test]
        fn test_format_time_zero() {
            assert_eq!(Display::format_time(0), (0, 0));
        }

        #[test]
        fn test_format_time_seconds_only() {
            assert_eq!(Display::format_time(45), (0, 45));
        }

        #[test]
        fn test_format_time_exact_minutes() {
            assert_eq!(Display::format_time(600), (10, 0));
        }

        #[test]
        fn test_format_time_mixed() {
            assert_eq!(Display::format_time(725), (12, 5));
        }
    }

    // ------------------------------------------------------------------------
    // Output Smoke Tests
    // ------------------------------------------------------------------------

    mod output_tests {
        use super::*;

        #[test]
        fn test_show_functions_do_not_panic() {
            let running = IpcResponse::success("OK", Some(ResponseData::running(90)));
            let idle = IpcResponse::success("OK", Some(ResponseData::idle()));
            let bare = IpcResponse::success("OK", None);

            Display::show_start_success(&running);
            Display::show_extend_success(&running);
            Display::show_cancel_success(&idle);
            Display::show_event_recorded(&bare);
            Display::show_status(&running);
            Display::show_status(&idle);
            Display::show_status(&bare);
            Display::show_error("boom");
        }

        #[test]
        fn test_show_playing_result_variants() {
            for restarted in ["after_time", "end_of_episode", "end_of_chapter"] {
                let data = ResponseData {
                    state: Some("running".to_string()),
                    remaining_seconds: Some(600),
                    restarted: Some(restarted.to_string()),
                };
                Display::show_playing_result(&IpcResponse::success("OK", Some(data)));
            }

            let none = IpcResponse::success("OK", Some(ResponseData::idle()));
            Display::show_playing_result(&none);
        }
    }
}
