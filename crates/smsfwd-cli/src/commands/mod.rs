//! Command implementations for the CLI.

mod config;
mod control;
mod dashboard;
mod stats;
mod status;

pub use config::{cmd_config, init_config};
pub use control::{cmd_flymode, cmd_reboot, cmd_send};
pub use dashboard::{DashboardArgs, cmd_dashboard};
pub use stats::cmd_stats;
pub use status::cmd_status;

use anyhow::Result;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::format::FormatOptions;

/// Result of a control action, as printed by `send`, `flymode` and `reboot`.
#[derive(Debug, Serialize)]
struct ActionOutcome<'a> {
    action: &'a str,
    ok: bool,
    message: &'a str,
}

fn render_action(
    action: &str,
    message: &str,
    format: OutputFormat,
    opts: &FormatOptions,
) -> Result<String> {
    match format {
        OutputFormat::Json => opts.as_json(&ActionOutcome {
            action,
            ok: true,
            message,
        }),
        OutputFormat::Text => Ok(format!("{}\n", message)),
    }
}
