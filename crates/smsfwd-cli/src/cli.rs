//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    /// Parse the `format` value stored in the config file.
    pub fn from_config(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Flight mode target state
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        matches!(self, Toggle::On)
    }
}

/// Reusable controller connection arguments
#[derive(Debug, Clone, Default, Args)]
pub struct ControllerArgs {
    /// Controller base URL (e.g. http://192.168.1.10:8080), or use SMSFWD_URL env var
    #[arg(short, long, env = "SMSFWD_URL", global = true)]
    pub url: Option<String>,

    /// Request timeout in seconds (overrides config)
    #[arg(short = 'T', long, global = true)]
    pub timeout: Option<u64>,
}

#[derive(Parser)]
#[command(name = "smsfwd")]
#[command(author, version, about = "CLI for the UART SMS forwarder", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format (overrides config)
    #[arg(short, long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Output as JSON (shorthand for --format json)
    #[arg(long, global = true)]
    pub json: bool,

    /// Output compact JSON (no pretty-printing)
    #[arg(long, global = true)]
    pub compact: bool,

    /// Disable colored output (also set by NO_COLOR unless it is 0, false, no or off)
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub controller: ControllerArgs,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Effective output format: flags first, then config, then text.
    pub fn resolve_format(&self, config_format: Option<&str>) -> OutputFormat {
        if self.json {
            return OutputFormat::Json;
        }
        self.format
            .or_else(|| config_format.and_then(OutputFormat::from_config))
            .unwrap_or_default()
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show modem registration and signal quality
    Status,

    /// Show stored message counters
    Stats,

    /// Send an SMS through the modem
    Send {
        /// Destination phone number
        #[arg(short, long)]
        to: String,

        /// Message text
        #[arg(short, long)]
        content: String,
    },

    /// Turn flight mode on or off
    Flymode {
        #[arg(value_enum)]
        state: Toggle,
    },

    /// Reboot the modem's microcontroller
    Reboot {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Live dashboard: stats every 30 s, device status every 10 s
    Dashboard {
        /// Print a single snapshot once both sources have reported, then exit
        #[arg(long)]
        once: bool,
    },

    /// Manage CLI configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ConfigAction {
    /// Print the configuration file path
    Path,

    /// Show current configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Controller URL to store
        #[arg(long)]
        url: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
