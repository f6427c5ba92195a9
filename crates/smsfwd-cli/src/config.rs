//! Configuration file management.
//!
//! The CLI reads `<config_dir>/smsfwd/config.toml`:
//!
//! ```toml
//! format = "text"
//! no_color = false
//!
//! [controller]
//! url = "http://192.168.1.10:8080"
//! timeout_secs = 10
//! ```
//!
//! Flags and environment variables override the file. Refresh cadences are
//! fixed and cannot be configured here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cli::OutputFormat;

/// Minimum request timeout in seconds.
pub const MIN_TIMEOUT_SECS: u64 = 1;
/// Maximum request timeout in seconds (5 minutes).
pub const MAX_TIMEOUT_SECS: u64 = 300;

fn default_timeout_secs() -> u64 {
    smsfwd_core::DEFAULT_TIMEOUT.as_secs()
}

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default output format ("text" or "json")
    pub format: Option<String>,

    /// Disable colored output
    pub no_color: bool,

    /// Controller connection settings
    pub controller: ControllerConfig,
}

/// Controller connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Base URL of the controller.
    pub url: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ControllerConfig {
    /// Validate controller configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if let Some(url) = &self.url {
            let url = url.trim();
            if url.is_empty() {
                errors.push(ValidationError {
                    field: "controller.url".to_string(),
                    message: "url cannot be empty (omit it instead)".to_string(),
                });
            } else if !url.starts_with("http://") && !url.starts_with("https://") {
                errors.push(ValidationError {
                    field: "controller.url".to_string(),
                    message: format!("invalid url '{}': must start with http:// or https://", url),
                });
            }
        }

        if self.timeout_secs < MIN_TIMEOUT_SECS {
            errors.push(ValidationError {
                field: "controller.timeout_secs".to_string(),
                message: format!(
                    "timeout {} is too short (minimum {} second)",
                    self.timeout_secs, MIN_TIMEOUT_SECS
                ),
            });
        } else if self.timeout_secs > MAX_TIMEOUT_SECS {
            errors.push(ValidationError {
                field: "controller.timeout_secs".to_string(),
                message: format!(
                    "timeout {} is too long (maximum {} seconds)",
                    self.timeout_secs, MAX_TIMEOUT_SECS
                ),
            });
        }

        errors
    }
}

impl Config {
    /// Default configuration file path.
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("smsfwd")
            .join("config.toml")
    }

    /// Load configuration from the default path, or defaults if it is missing.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Self::path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Load and validate configuration from a file.
    pub fn load_validated<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = self.to_toml()?;

        // Create parent directories if needed
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate the configuration and return all errors found.
    ///
    /// ```
    /// use smsfwd_cli::config::Config;
    ///
    /// Config::default().validate().expect("default config is valid");
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = self.controller.validate();

        if let Some(format) = &self.format
            && OutputFormat::from_config(format).is_none()
        {
            errors.push(ValidationError {
                field: "format".to_string(),
                message: format!("unknown format '{}': expected 'text' or 'json'", format),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field path (e.g., `controller.url`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}
