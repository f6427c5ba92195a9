//! Stats command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use smsfwd_core::StatsClient;

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_stats_text};
use crate::util::{with_spinner, write_output};

pub async fn cmd_stats(
    client: &impl StatsClient,
    format: OutputFormat,
    output: Option<&PathBuf>,
    opts: &FormatOptions,
    quiet: bool,
) -> Result<()> {
    let stats = with_spinner("Reading message stats...", quiet, client.get_stats())
        .await
        .context("Failed to read message stats")?;

    let content = match format {
        OutputFormat::Json => opts.as_json(&stats)?,
        OutputFormat::Text => format_stats_text(&stats, opts),
    };

    write_output(output, &content)
}
