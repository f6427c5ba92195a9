//! Dual-cadence polling of the controller.
//!
//! A [`PollingScheduler`] session runs two independent Tokio tasks:
//!
//! - the **stats loop** calls [`StatsClient::get_stats`] immediately and then
//!   every [`STATS_REFRESH_INTERVAL`];
//! - the **status loop** calls [`DeviceClient::get_status`] immediately and
//!   then every [`STATUS_REFRESH_INTERVAL`].
//!
//! Each tick issues one call, waits for it, and applies at most one update to
//! the [`DashboardViewModel`]. Ticks of one loop never overlap; if a call
//! outlives the interval the missed ticks are skipped rather than replayed.
//! Failures are logged and retried at the next natural tick. There is no
//! backoff and nothing is propagated to the caller.
//!
//! Stopping a session cancels both timers. A call already in flight is allowed
//! to finish but its result is dropped.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use smsfwd_core::{DashboardViewModel, MockController, PollingScheduler};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let controller = Arc::new(MockController::new());
//! let view_model = Arc::new(DashboardViewModel::new());
//! let scheduler = PollingScheduler::new(controller.clone(), controller, view_model.clone());
//!
//! scheduler.start();
//! let mut updates = view_model.subscribe();
//! updates.changed().await.unwrap();
//! scheduler.stop();
//! # }
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::{Notify, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::Error;
use crate::traits::{DeviceClient, StatsClient};
use crate::view_model::{DashboardViewModel, SessionId};

/// Cadence of the message statistics loop.
pub const STATS_REFRESH_INTERVAL: Duration = Duration::from_millis(30_000);

/// Cadence of the device status loop.
pub const STATUS_REFRESH_INTERVAL: Duration = Duration::from_millis(10_000);

/// Consecutive failures logged at `warn` before a loop goes quiet.
const LOUD_FAILURES: u32 = 3;

/// Identifies one of the two polling loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollKind {
    Stats,
    Status,
}

impl PollKind {
    /// Refresh cadence of this loop.
    pub fn interval(self) -> Duration {
        match self {
            PollKind::Stats => STATS_REFRESH_INTERVAL,
            PollKind::Status => STATUS_REFRESH_INTERVAL,
        }
    }
}

impl fmt::Display for PollKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollKind::Stats => f.write_str("stats"),
            PollKind::Status => f.write_str("status"),
        }
    }
}

/// Diagnostics for one polling loop.
///
/// These counters cover the scheduler's whole lifetime, across sessions.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoopStats {
    /// Poll interval in milliseconds.
    pub interval_ms: u64,
    /// Time of last successful fetch.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_success_at: Option<OffsetDateTime>,
    /// Time of last failed fetch.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_error_at: Option<OffsetDateTime>,
    /// Last error message.
    pub last_error: Option<String>,
    /// Total successful fetches.
    pub success_count: u64,
    /// Total failed fetches.
    pub failure_count: u64,
    /// Failures since the last success.
    pub consecutive_failures: u32,
    /// Results that arrived after their session ended and were dropped.
    pub discarded_count: u64,
}

/// Records outcomes for one loop and throttles failure logging.
#[derive(Debug)]
struct LoopMonitor {
    kind: PollKind,
    stats: RwLock<LoopStats>,
}

impl LoopMonitor {
    fn new(kind: PollKind) -> Self {
        Self {
            kind,
            stats: RwLock::new(LoopStats {
                interval_ms: kind.interval().as_millis() as u64,
                ..LoopStats::default()
            }),
        }
    }

    async fn record_success(&self) {
        let mut stats = self.stats.write().await;
        if stats.consecutive_failures > LOUD_FAILURES {
            info!(
                "{} refresh recovered after {} failures",
                self.kind, stats.consecutive_failures
            );
        }
        stats.success_count += 1;
        stats.consecutive_failures = 0;
        stats.last_success_at = Some(OffsetDateTime::now_utc());
    }

    async fn record_failure(&self, err: &Error) {
        let mut stats = self.stats.write().await;
        stats.failure_count += 1;
        stats.consecutive_failures += 1;
        stats.last_error_at = Some(OffsetDateTime::now_utc());
        stats.last_error = Some(err.to_string());

        let attempt = stats.consecutive_failures;
        if attempt <= LOUD_FAILURES {
            warn!("Failed to refresh {}: {} (attempt {})", self.kind, err, attempt);
        } else if attempt == LOUD_FAILURES + 1 {
            error!(
                "Failed to refresh {} after {} attempts, will continue trying silently",
                self.kind, attempt
            );
        } else {
            debug!("Failed to refresh {}: {} (attempt {})", self.kind, err, attempt);
        }
    }

    async fn record_discarded(&self) {
        self.stats.write().await.discarded_count += 1;
        debug!("Dropped {} result from a stopped session", self.kind);
    }

    async fn snapshot(&self) -> LoopStats {
        self.stats.read().await.clone()
    }
}

/// Handle to one running pair of polling loops.
///
/// Dropping the handle stops the session.
pub struct PollingSession {
    id: SessionId,
    cancel: CancellationToken,
    view_model: Arc<DashboardViewModel>,
    nudge: Arc<Notify>,
    tasks: Vec<JoinHandle<()>>,
}

impl fmt::Debug for PollingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollingSession")
            .field("id", &self.id)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl PollingSession {
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Stop both loops and fence off their pending results.
    ///
    /// Once this returns, the view model no longer changes on behalf of this
    /// session. Idempotent.
    pub fn stop(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.view_model.close_session(self.id);
        self.cancel.cancel();
        info!(session = self.id.get(), "Polling stopped");
    }

    /// Stop and wait for both loop tasks to exit.
    pub async fn shutdown(mut self) {
        self.stop();
        for task in std::mem::take(&mut self.tasks) {
            if let Err(e) = task.await {
                warn!("Polling task ended abnormally: {}", e);
            }
        }
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }
}

impl Drop for PollingSession {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Drives the stats and status loops for a [`DashboardViewModel`].
pub struct PollingScheduler {
    device: Arc<dyn DeviceClient>,
    stats: Arc<dyn StatsClient>,
    view_model: Arc<DashboardViewModel>,
    session: Mutex<Option<PollingSession>>,
    stats_monitor: Arc<LoopMonitor>,
    status_monitor: Arc<LoopMonitor>,
}

impl fmt::Debug for PollingScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollingScheduler")
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl PollingScheduler {
    pub fn new(
        device: Arc<dyn DeviceClient>,
        stats: Arc<dyn StatsClient>,
        view_model: Arc<DashboardViewModel>,
    ) -> Self {
        Self {
            device,
            stats,
            view_model,
            session: Mutex::new(None),
            stats_monitor: Arc::new(LoopMonitor::new(PollKind::Stats)),
            status_monitor: Arc::new(LoopMonitor::new(PollKind::Status)),
        }
    }

    /// The view model this scheduler writes to.
    pub fn view_model(&self) -> &Arc<DashboardViewModel> {
        &self.view_model
    }

    fn current(&self) -> std::sync::MutexGuard<'_, Option<PollingSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new session, stopping the previous one first.
    ///
    /// Both loops tick immediately. Must be called from within a Tokio
    /// runtime.
    pub fn start(&self) -> SessionId {
        let mut current = self.current();
        if let Some(previous) = current.take() {
            previous.stop();
        }

        let id = self.view_model.open_session();
        let cancel = CancellationToken::new();
        let nudge = Arc::new(Notify::new());

        info!(
            session = id.get(),
            stats_interval_ms = STATS_REFRESH_INTERVAL.as_millis() as u64,
            status_interval_ms = STATUS_REFRESH_INTERVAL.as_millis() as u64,
            "Polling started"
        );

        let stats_task = tokio::spawn(run_stats_loop(
            Arc::clone(&self.stats),
            Arc::clone(&self.view_model),
            id,
            cancel.clone(),
            Arc::clone(&self.stats_monitor),
        ));
        let status_task = tokio::spawn(run_status_loop(
            Arc::clone(&self.device),
            Arc::clone(&self.view_model),
            id,
            cancel.clone(),
            Arc::clone(&nudge),
            Arc::clone(&self.status_monitor),
        ));

        *current = Some(PollingSession {
            id,
            cancel,
            view_model: Arc::clone(&self.view_model),
            nudge,
            tasks: vec![stats_task, status_task],
        });
        id
    }

    /// Stop the current session, if any. Does not wait for in-flight calls.
    pub fn stop(&self) {
        if let Some(session) = self.current().take() {
            session.stop();
        }
    }

    /// Stop the current session and wait for its tasks to exit.
    pub async fn shutdown(&self) {
        let session = self.current().take();
        if let Some(session) = session {
            session.shutdown().await;
        }
    }

    pub fn is_running(&self) -> bool {
        self.current().as_ref().is_some_and(PollingSession::is_running)
    }

    /// Id of the running session.
    pub fn session_id(&self) -> Option<SessionId> {
        self.current().as_ref().map(PollingSession::id)
    }

    /// Ask the status loop for one extra tick now.
    ///
    /// The regular schedule is unaffected. If a status call is in flight the
    /// extra tick runs right after it. Returns `false` when nothing is running.
    pub fn refresh_status_now(&self) -> bool {
        match self.current().as_ref() {
            Some(session) if session.is_running() => {
                session.nudge.notify_one();
                true
            }
            _ => false,
        }
    }

    /// Diagnostics for one loop.
    pub async fn loop_stats(&self, kind: PollKind) -> LoopStats {
        match kind {
            PollKind::Stats => self.stats_monitor.snapshot().await,
            PollKind::Status => self.status_monitor.snapshot().await,
        }
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_stats_loop(
    client: Arc<dyn StatsClient>,
    view_model: Arc<DashboardViewModel>,
    session: SessionId,
    cancel: CancellationToken,
    monitor: Arc<LoopMonitor>,
) {
    let mut timer = interval(STATS_REFRESH_INTERVAL);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = timer.tick() => {}
        }

        let result = client.get_stats().await;
        if cancel.is_cancelled() {
            monitor.record_discarded().await;
            break;
        }

        match result {
            Ok(stats) => {
                debug!("Refreshed stats: {}", stats);
                let applied = view_model.apply_stats(session, stats);
                monitor.record_success().await;
                if !applied {
                    monitor.record_discarded().await;
                }
            }
            Err(e) => {
                // loading ends on the first attempt either way
                view_model.mark_stats_attempted(session);
                monitor.record_failure(&e).await;
            }
        }
    }
}

async fn run_status_loop(
    client: Arc<dyn DeviceClient>,
    view_model: Arc<DashboardViewModel>,
    session: SessionId,
    cancel: CancellationToken,
    nudge: Arc<Notify>,
    monitor: Arc<LoopMonitor>,
) {
    let mut timer = interval(STATUS_REFRESH_INTERVAL);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = timer.tick() => {}
            _ = nudge.notified() => debug!("Out-of-band status refresh"),
        }

        let result = client.get_status().await;
        if cancel.is_cancelled() {
            monitor.record_discarded().await;
            break;
        }

        match result {
            Ok(status) => {
                debug!(rsrp = ?status.rsrp(), "Refreshed device status");
                let applied = view_model.apply_device_status(session, status);
                monitor.record_success().await;
                if !applied {
                    monitor.record_discarded().await;
                }
            }
            Err(e) => monitor.record_failure(&e).await,
        }
    }
}
