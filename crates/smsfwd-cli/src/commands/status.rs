//! Status command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use smsfwd_core::DeviceClient;

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_status_json, format_status_text};
use crate::util::{with_spinner, write_output};

pub async fn cmd_status(
    client: &impl DeviceClient,
    format: OutputFormat,
    output: Option<&PathBuf>,
    opts: &FormatOptions,
    quiet: bool,
) -> Result<()> {
    let status = with_spinner("Reading device status...", quiet, client.get_status())
        .await
        .context("Failed to read device status")?;

    let content = match format {
        OutputFormat::Json => format_status_json(&status, opts)?,
        OutputFormat::Text => format_status_text(&status, opts),
    };

    write_output(output, &content)
}
