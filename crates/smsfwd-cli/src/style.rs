//! Visual styling utilities for the CLI.
//!
//! Spinners go to stderr so they never mix with command output, and every
//! color helper takes `no_color` so plain output stays pipe-friendly.

use std::io::{self, IsTerminal};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use smsfwd_core::SignalLevel;

/// Standard spinner tick characters (Braille dots animation)
const SPINNER_TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Standard spinner tick interval
const SPINNER_TICK_MS: u64 = 80;

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(SPINNER_TICK_CHARS)
}

/// Spinner shown while a controller request is pending.
///
/// Returns `None` when stderr is not a terminal or `quiet` is set.
pub fn request_spinner(message: &str, quiet: bool) -> Option<ProgressBar> {
    if quiet || !io::stderr().is_terminal() {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(spinner_style());
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    Some(pb)
}

/// Color a piece of text by signal level.
pub fn color_by_signal(text: &str, level: SignalLevel, no_color: bool) -> String {
    if no_color {
        return text.to_string();
    }
    match level {
        SignalLevel::Excellent | SignalLevel::Good => format!("{}", text.green()),
        SignalLevel::Fair => format!("{}", text.yellow()),
        SignalLevel::Poor => format!("{}", text.bright_red()),
        SignalLevel::VeryPoor => format!("{}", text.red().bold()),
        SignalLevel::NotAvailable => format!("{}", text.dimmed()),
    }
}

/// Five-cell bar for a 0-100 percentage, e.g. `[###..]`.
pub fn signal_bar(percentage: u8) -> String {
    let filled = (usize::from(percentage.min(100)) + 10) / 20;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(5 - filled))
}

/// Bold label for key/value output.
pub fn label(text: &str, no_color: bool) -> String {
    if no_color {
        text.to_string()
    } else {
        format!("{}", text.bold())
    }
}

/// Dimmed secondary text.
pub fn muted(text: &str, no_color: bool) -> String {
    if no_color {
        text.to_string()
    } else {
        format!("{}", text.dimmed())
    }
}
