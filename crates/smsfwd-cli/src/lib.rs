//! Command-line interface for the UART SMS forwarder.
//!
//! The `smsfwd` binary talks to the forwarder's controller over HTTP. It can
//! run a live dashboard or issue one-shot commands.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `status` | Modem registration and signal quality |
//! | `stats` | Stored message counters |
//! | `send` | Send an SMS through the modem |
//! | `flymode` | Turn flight mode on or off |
//! | `reboot` | Reboot the modem's microcontroller |
//! | `dashboard` | Live view: stats every 30 s, status every 10 s |
//! | `config` | Manage CLI configuration |
//! | `completions` | Generate shell completions |
//!
//! # Configuration
//!
//! Settings live in `~/.config/smsfwd/config.toml` (or platform equivalent):
//! the controller URL and request timeout, the default output format and
//! `no_color`.
//!
//! # Environment Variables
//!
//! - `SMSFWD_URL`: Controller URL (overridden by `--url`)
//! - `NO_COLOR`: Disable colored output when set
//! - `RUST_LOG`: Log filter when neither `--quiet` nor `--verbose` is given
//!
//! # Examples
//!
//! ```bash
//! smsfwd config init --url http://192.168.1.10:8080
//! smsfwd dashboard
//! smsfwd send --to 10086 --content "balance"
//! smsfwd --json status
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod format;
pub mod style;
pub mod util;

// Re-export core dependencies for convenience
pub use smsfwd_core;
