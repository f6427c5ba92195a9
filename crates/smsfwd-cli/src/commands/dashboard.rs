//! Dashboard command implementation.
//!
//! Runs one polling session for as long as the command lives and re-renders
//! whenever the view state changes. Typing `r` and Enter asks for an
//! immediate status refresh; Ctrl+C stops the session.

use std::future::Future;
use std::io::{self, BufRead, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use smsfwd_core::{
    DashboardViewModel, DeviceClient, LoopStats, PollKind, PollingScheduler, StatsClient,
    ViewState,
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::cli::OutputFormat;
use crate::format::{DashboardJson, FormatOptions, format_dashboard_text};
use crate::util::write_output;

/// How often diagnostics are rechecked between view updates.
const DIAGNOSTICS_REFRESH: Duration = Duration::from_secs(1);

/// ANSI clear screen and home cursor.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Arguments for the dashboard command.
pub struct DashboardArgs<'a> {
    pub controller: &'a str,
    pub once: bool,
    /// Upper bound on waiting for the first report with `--once`.
    pub first_report_timeout: Duration,
    pub format: OutputFormat,
    pub output: Option<&'a PathBuf>,
    pub opts: &'a FormatOptions,
    pub quiet: bool,
}

pub async fn cmd_dashboard<C>(client: Arc<C>, args: DashboardArgs<'_>) -> Result<()>
where
    C: DeviceClient + StatsClient + 'static,
{
    let keys = (!args.once && io::stdin().is_terminal())
        .then(|| spawn_line_reader(io::BufReader::new(io::stdin())));
    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    run_dashboard(client, args, keys, shutdown).await
}

/// Forward lines from a blocking reader over a channel.
///
/// The reader gets its own thread: a pending read on tokio's blocking pool
/// would hold up runtime shutdown until the next line arrives.
fn spawn_line_reader<R>(reader: R) -> mpsc::Receiver<String>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(8);
    thread::spawn(move || {
        for line in reader.lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

async fn run_dashboard<C, F>(
    client: Arc<C>,
    args: DashboardArgs<'_>,
    keys: Option<mpsc::Receiver<String>>,
    shutdown: F,
) -> Result<()>
where
    C: DeviceClient + StatsClient + 'static,
    F: Future<Output = ()>,
{
    let view_model = Arc::new(DashboardViewModel::new());
    let scheduler = PollingScheduler::new(client.clone(), client, view_model.clone());
    let mut updates = view_model.subscribe();
    scheduler.start();

    let result = if args.once {
        run_once(&scheduler, &mut updates, &args).await
    } else {
        run_live(&scheduler, &mut updates, &args, keys, shutdown).await
    };

    scheduler.shutdown().await;
    result
}

async fn run_once(
    scheduler: &PollingScheduler,
    updates: &mut watch::Receiver<ViewState>,
    args: &DashboardArgs<'_>,
) -> Result<()> {
    let deadline = tokio::time::sleep(args.first_report_timeout);
    tokio::pin!(deadline);

    while !first_report_complete(scheduler).await {
        tokio::select! {
            _ = &mut deadline => {
                warn!("Controller did not answer both requests in time; showing partial data");
                break;
            }
            _ = updates.changed() => {}
            _ = tokio::time::sleep(Duration::from_millis(100)) => {}
        }
    }

    let state = updates.borrow_and_update().clone();
    let content = render(scheduler, &state, args, args.opts).await?;
    write_output(args.output, &content)
}

async fn run_live(
    scheduler: &PollingScheduler,
    updates: &mut watch::Receiver<ViewState>,
    args: &DashboardArgs<'_>,
    mut keys: Option<mpsc::Receiver<String>>,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    let clear = args.format == OutputFormat::Text
        && args.output.is_none()
        && io::stdout().is_terminal();
    // one JSON document per line when streaming
    let opts = match args.format {
        OutputFormat::Json => FormatOptions {
            compact: true,
            ..*args.opts
        },
        OutputFormat::Text => *args.opts,
    };

    tokio::pin!(shutdown);
    let mut keys_open = keys.is_some();
    let mut diagnostics = tokio::time::interval(DIAGNOSTICS_REFRESH);
    let mut last_failures = failure_counts(scheduler).await;

    if !args.quiet {
        eprintln!(
            "Polling {} | r+Enter: refresh status | Ctrl+C: stop",
            args.controller
        );
    }

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                if !args.quiet {
                    eprintln!("\nShutting down...");
                }
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = diagnostics.tick() => {
                let failures = failure_counts(scheduler).await;
                if failures == last_failures {
                    continue;
                }
                last_failures = failures;
            }
            line = next_key(&mut keys), if keys_open => {
                match line {
                    Some(line) if line.trim().eq_ignore_ascii_case("r") => {
                        debug!("Status refresh requested from keyboard");
                        scheduler.refresh_status_now();
                    }
                    Some(_) => {}
                    None => keys_open = false,
                }
                continue;
            }
        }

        let state = updates.borrow_and_update().clone();
        let mut content = render(scheduler, &state, args, &opts).await?;
        if clear {
            content.insert_str(0, CLEAR_SCREEN);
        }
        write_output(args.output, &content)?;
    }

    Ok(())
}

async fn next_key(keys: &mut Option<mpsc::Receiver<String>>) -> Option<String> {
    match keys {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn first_report_complete(scheduler: &PollingScheduler) -> bool {
    let attempted = |s: &LoopStats| s.success_count + s.failure_count > 0;
    attempted(&scheduler.loop_stats(PollKind::Stats).await)
        && attempted(&scheduler.loop_stats(PollKind::Status).await)
}

async fn failure_counts(scheduler: &PollingScheduler) -> (u64, u64) {
    (
        scheduler.loop_stats(PollKind::Stats).await.failure_count,
        scheduler.loop_stats(PollKind::Status).await.failure_count,
    )
}

async fn render(
    scheduler: &PollingScheduler,
    state: &ViewState,
    args: &DashboardArgs<'_>,
    opts: &FormatOptions,
) -> Result<String> {
    let stats_loop = scheduler.loop_stats(PollKind::Stats).await;
    let status_loop = scheduler.loop_stats(PollKind::Status).await;

    match args.format {
        OutputFormat::Json => opts.as_json(&DashboardJson {
            controller: args.controller,
            state,
            signal: state.signal_quality(),
            stats_loop: &stats_loop,
            status_loop: &status_loop,
        }),
        OutputFormat::Text => Ok(format_dashboard_text(
            args.controller,
            state,
            &stats_loop,
            &status_loop,
            opts,
        )),
    }
}
