//! Utility functions for CLI operations.

use std::future::Future;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use smsfwd_core::ControllerClient;

use crate::cli::ControllerArgs;
use crate::config::{ControllerConfig, MAX_TIMEOUT_SECS, MIN_TIMEOUT_SECS};
use crate::style;

/// Controller URL and timeout after applying flags over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerTarget {
    pub url: String,
    pub timeout: Duration,
}

/// Resolve the controller to talk to: flags (and `SMSFWD_URL`) win over config.
pub fn resolve_controller(args: &ControllerArgs, config: &ControllerConfig) -> Result<ControllerTarget> {
    let url = args
        .url
        .as_deref()
        .or(config.url.as_deref())
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| {
            anyhow!(
                "No controller URL. Use --url <URL>, set SMSFWD_URL, \
                 or run 'smsfwd config init --url <URL>'."
            )
        })?;

    let timeout_secs = args.timeout.unwrap_or(config.timeout_secs);
    if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&timeout_secs) {
        return Err(anyhow!(
            "Timeout must be between {} and {} seconds, got {}",
            MIN_TIMEOUT_SECS,
            MAX_TIMEOUT_SECS,
            timeout_secs
        ));
    }

    Ok(ControllerTarget {
        url: url.to_string(),
        timeout: Duration::from_secs(timeout_secs),
    })
}

/// Build an HTTP client for the resolved controller.
pub fn connect(target: &ControllerTarget) -> Result<ControllerClient> {
    ControllerClient::with_timeout(&target.url, target.timeout)
        .with_context(|| format!("Invalid controller URL '{}'", target.url))
}

/// Await `request` behind a spinner on stderr.
pub async fn with_spinner<T, F>(message: &str, quiet: bool, request: F) -> T
where
    F: Future<Output = T>,
{
    let spinner = style::request_spinner(message, quiet);
    let result = request.await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    result
}

/// Write output to file or stdout.
pub fn write_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}
