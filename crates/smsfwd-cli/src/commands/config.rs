//! Config command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::cli::{ConfigAction, OutputFormat};
use crate::config::{Config, ControllerConfig};
use crate::format::FormatOptions;
use crate::util::write_output;

pub fn cmd_config(
    action: ConfigAction,
    config: &Config,
    format: OutputFormat,
    output: Option<&PathBuf>,
    opts: &FormatOptions,
) -> Result<()> {
    match action {
        ConfigAction::Path => write_output(output, &format!("{}\n", Config::path().display())),
        ConfigAction::Show => {
            let content = match format {
                OutputFormat::Json => opts.as_json(config)?,
                OutputFormat::Text => config.to_toml()?,
            };
            write_output(output, &content)
        }
        ConfigAction::Init { url, force } => {
            let path = Config::path();
            init_config(&path, url, force)?;
            eprintln!("Wrote {}", path.display());
            Ok(())
        }
    }
}

/// Write a fresh config file at `path`.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn init_config(path: &Path, url: Option<String>, force: bool) -> Result<Config> {
    if path.exists() && !force {
        bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    let config = Config {
        controller: ControllerConfig {
            url,
            ..ControllerConfig::default()
        },
        ..Config::default()
    };
    config.validate().context("Refusing to write an invalid config")?;
    config.save(path)?;
    Ok(config)
}
