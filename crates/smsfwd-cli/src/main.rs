use std::io;
use std::sync::Arc;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use smsfwd_cli::cli::{Cli, Commands};
use smsfwd_cli::commands::{
    DashboardArgs, cmd_config, cmd_dashboard, cmd_flymode, cmd_reboot, cmd_send, cmd_stats,
    cmd_status,
};
use smsfwd_cli::config::Config;
use smsfwd_cli::format::FormatOptions;
use smsfwd_cli::util::{connect, resolve_controller};

// Both polling loops share one thread; nothing here needs more.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    // Handle completions command early (before tracing init)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "smsfwd", &mut io::stdout());
        return Ok(());
    }

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // Logs go to stderr so command output on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = Config::load_default().unwrap_or_else(|e| {
        warn!("{}; using defaults", e);
        Config::default()
    });
    if let Err(e) = config.validate() {
        warn!("{}", e);
    }

    let format = cli.resolve_format(config.format.as_deref());
    let opts = FormatOptions::new(cli.no_color || config.no_color, cli.compact);
    let output = cli.output.as_ref();
    let quiet = cli.quiet;

    if let Commands::Config { action } = cli.command {
        return cmd_config(action, &config, format, output, &opts);
    }

    let target = resolve_controller(&cli.controller, &config.controller)?;
    let client = connect(&target)?;

    match cli.command {
        Commands::Status => cmd_status(&client, format, output, &opts, quiet).await?,
        Commands::Stats => cmd_stats(&client, format, output, &opts, quiet).await?,
        Commands::Send { to, content } => {
            cmd_send(&client, to, content, format, output, &opts, quiet).await?
        }
        Commands::Flymode { state } => {
            cmd_flymode(&client, state, format, output, &opts, quiet).await?
        }
        Commands::Reboot { yes } => cmd_reboot(&client, yes, format, output, &opts, quiet).await?,
        Commands::Dashboard { once } => {
            let args = DashboardArgs {
                controller: &target.url,
                once,
                first_report_timeout: target.timeout * 2,
                format,
                output,
                opts: &opts,
                quiet,
            };
            cmd_dashboard(Arc::new(client), args).await?
        }
        Commands::Config { .. } | Commands::Completions { .. } => {
            // Already handled above
            unreachable!()
        }
    }

    Ok(())
}
