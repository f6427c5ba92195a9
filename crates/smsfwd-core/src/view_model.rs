//! Dashboard view state shared between the polling loops and the display.
//!
//! [`DashboardViewModel`] owns one [`ViewState`] behind a `watch` channel.
//! Only the polling scheduler writes to it; presentation code reads
//! [`DashboardViewModel::snapshot`] or waits on [`DashboardViewModel::subscribe`].
//!
//! # Sessions
//!
//! Every write carries the [`SessionId`] it was issued under. Closing a
//! session rejects all later writes tagged with it, so a call that was still
//! in flight when polling stopped can never change what is displayed.
//!
//! ```
//! use smsfwd_core::DashboardViewModel;
//! use smsfwd_types::Stats;
//!
//! let vm = DashboardViewModel::new();
//! assert!(vm.stats_loading());
//!
//! let session = vm.open_session();
//! vm.apply_stats(session, Stats { total_count: 42, today_count: 5 });
//! assert_eq!(vm.snapshot().total_count(), 42);
//!
//! vm.close_session(session);
//! assert!(!vm.apply_stats(session, Stats::default()));
//! assert_eq!(vm.snapshot().total_count(), 42);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::watch;

use smsfwd_types::{DeviceStatus, Stats};

use crate::signal::{SignalQuality, evaluate};

/// Shown in place of the subscriber number when none is known.
pub const NUMBER_FALLBACK: &str = "4G LTE";

/// The combined snapshot consumed by the presentation surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    /// Latest message counters, `None` until the first successful fetch.
    pub stats: Option<Stats>,
    /// Latest device status, `None` until the first successful fetch.
    pub device_status: Option<DeviceStatus>,
    /// `true` until the first stats fetch resolves, success or failure.
    pub stats_loading: bool,
    /// When `stats` was last replaced.
    #[serde(with = "time::serde::rfc3339::option")]
    pub stats_updated_at: Option<OffsetDateTime>,
    /// When `device_status` was last replaced.
    #[serde(with = "time::serde::rfc3339::option")]
    pub status_updated_at: Option<OffsetDateTime>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            stats: None,
            device_status: None,
            stats_loading: true,
            stats_updated_at: None,
            status_updated_at: None,
        }
    }
}

impl ViewState {
    /// Raw RSRP from the latest device status.
    pub fn rsrp(&self) -> Option<f64> {
        self.device_status.as_ref().and_then(DeviceStatus::rsrp)
    }

    /// Signal quality recomputed from the latest device status.
    pub fn signal_quality(&self) -> SignalQuality {
        evaluate(self.rsrp())
    }

    /// RSRP as display text, e.g. `-95 dBm` or `N/A`.
    pub fn rsrp_display(&self) -> String {
        match self.rsrp() {
            Some(rsrp) if !rsrp.is_nan() => format!("{rsrp} dBm"),
            _ => "N/A".to_string(),
        }
    }

    /// One-line signal description, e.g. `Fair • RSRP: -95 dBm`.
    pub fn signal_summary(&self) -> String {
        format!(
            "{} • RSRP: {}",
            self.signal_quality().level.label(),
            self.rsrp_display()
        )
    }

    /// Registered operator, or `-` when unknown.
    pub fn operator_display(&self) -> &str {
        self.device_status
            .as_ref()
            .and_then(DeviceStatus::operator)
            .unwrap_or("-")
    }

    /// `Number: <n>` when the SIM number is known, otherwise the network type.
    pub fn number_display(&self) -> String {
        match self.device_status.as_ref().and_then(DeviceStatus::number) {
            Some(number) if !number.is_empty() => format!("Number: {number}"),
            _ => NUMBER_FALLBACK.to_string(),
        }
    }

    /// `Script version: <v>` when the device reported one.
    pub fn version_display(&self) -> Option<String> {
        self.device_status
            .as_ref()
            .and_then(|s| s.version.as_deref())
            .filter(|v| !v.is_empty())
            .map(|v| format!("Script version: {v}"))
    }

    pub fn total_count(&self) -> u64 {
        self.stats.map(|s| s.total_count).unwrap_or(0)
    }

    pub fn today_count(&self) -> u64 {
        self.stats.map(|s| s.today_count).unwrap_or(0)
    }
}

/// Generation tag for one polling session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    /// Numeric value, for logging.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Owner of the dashboard [`ViewState`].
#[derive(Debug)]
pub struct DashboardViewModel {
    state: watch::Sender<ViewState>,
    next_session: AtomicU64,
    /// Generation allowed to write, 0 when none is.
    active_session: AtomicU64,
}

impl Default for DashboardViewModel {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardViewModel {
    /// Create a view model in its initial state: nothing fetched, loading.
    pub fn new() -> Self {
        let (state, _) = watch::channel(ViewState::default());
        Self {
            state,
            next_session: AtomicU64::new(1),
            active_session: AtomicU64::new(0),
        }
    }

    /// Start accepting writes for a new session, closing any previous one.
    pub fn open_session(&self) -> SessionId {
        let id = self.next_session.fetch_add(1, Ordering::SeqCst);
        self.set_active(id);
        SessionId(id)
    }

    /// Reject all further writes tagged with `session`.
    ///
    /// Returns once no write from `session` can still be in progress. Closing
    /// a session that is no longer active is a no-op.
    pub fn close_session(&self, session: SessionId) {
        let active = &self.active_session;
        // Taking the watch lock orders this after any write already applying.
        self.state.send_if_modified(|_| {
            let _ = active.compare_exchange(session.0, 0, Ordering::SeqCst, Ordering::SeqCst);
            false
        });
    }

    /// Whether `session` is still allowed to write.
    pub fn is_active(&self, session: SessionId) -> bool {
        self.active_session.load(Ordering::SeqCst) == session.0
    }

    fn set_active(&self, id: u64) {
        let active = &self.active_session;
        self.state.send_if_modified(|_| {
            active.store(id, Ordering::SeqCst);
            false
        });
    }

    /// Apply `update` if `session` is active. Returns whether state changed.
    fn write(&self, session: SessionId, update: impl FnOnce(&mut ViewState) -> bool) -> bool {
        let active = &self.active_session;
        self.state.send_if_modified(|state| {
            if active.load(Ordering::SeqCst) != session.0 {
                return false;
            }
            update(state)
        })
    }

    /// Replace the stats slice after a successful fetch and end loading.
    pub fn apply_stats(&self, session: SessionId, stats: Stats) -> bool {
        self.write(session, |state| {
            state.stats = Some(stats);
            state.stats_loading = false;
            state.stats_updated_at = Some(OffsetDateTime::now_utc());
            true
        })
    }

    /// End loading after a failed stats fetch, keeping the previous stats.
    pub fn mark_stats_attempted(&self, session: SessionId) -> bool {
        self.write(session, |state| {
            let was_loading = state.stats_loading;
            state.stats_loading = false;
            was_loading
        })
    }

    /// Replace the device status slice after a successful fetch.
    pub fn apply_device_status(&self, session: SessionId, status: DeviceStatus) -> bool {
        self.write(session, |state| {
            state.device_status = Some(status);
            state.status_updated_at = Some(OffsetDateTime::now_utc());
            true
        })
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Receiver notified after every applied write.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn stats(&self) -> Option<Stats> {
        self.state.borrow().stats
    }

    pub fn device_status(&self) -> Option<DeviceStatus> {
        self.state.borrow().device_status.clone()
    }

    pub fn stats_loading(&self) -> bool {
        self.state.borrow().stats_loading
    }

    /// Signal quality for the current device status.
    pub fn signal_quality(&self) -> SignalQuality {
        self.state.borrow().signal_quality()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::SignalLevel;
    use smsfwd_types::MobileInfo;

    fn status_with(rsrp: Option<f64>, number: Option<&str>) -> DeviceStatus {
        DeviceStatus {
            mobile: Some(MobileInfo {
                rsrp,
                operator: Some("CHINA MOBILE".to_string()),
                number: number.map(String::from),
            }),
            version: Some("1.4.2".to_string()),
        }
    }

    #[test]
    fn test_initial_state() {
        let vm = DashboardViewModel::new();
        let state = vm.snapshot();
        assert!(state.stats_loading);
        assert!(state.stats.is_none());
        assert!(state.device_status.is_none());
        assert_eq!(state.total_count(), 0);
        assert_eq!(state.today_count(), 0);
        assert_eq!(state.signal_quality(), SignalQuality::NOT_AVAILABLE);
    }

    #[test]
    fn test_apply_stats_ends_loading() {
        let vm = DashboardViewModel::new();
        let session = vm.open_session();
        assert!(vm.apply_stats(
            session,
            Stats {
                total_count: 42,
                today_count: 5
            }
        ));

        let state = vm.snapshot();
        assert!(!state.stats_loading);
        assert_eq!(state.total_count(), 42);
        assert_eq!(state.today_count(), 5);
        assert!(state.stats_updated_at.is_some());
    }

    #[test]
    fn test_failed_stats_keeps_previous_value() {
        let vm = DashboardViewModel::new();
        let session = vm.open_session();
        assert!(vm.mark_stats_attempted(session));
        assert!(!vm.stats_loading());
        assert!(vm.stats().is_none());

        vm.apply_stats(
            session,
            Stats {
                total_count: 3,
                today_count: 1,
            },
        );
        // already false, nothing to notify
        assert!(!vm.mark_stats_attempted(session));
        assert_eq!(vm.stats().map(|s| s.total_count), Some(3));
        assert!(!vm.stats_loading());
    }

    #[test]
    fn test_device_status_replaced_not_merged() {
        let vm = DashboardViewModel::new();
        let session = vm.open_session();
        vm.apply_device_status(session, status_with(Some(-95.0), Some("10086")));
        vm.apply_device_status(session, DeviceStatus::default());

        let state = vm.snapshot();
        assert_eq!(state.device_status, Some(DeviceStatus::default()));
        assert_eq!(state.signal_quality().level, SignalLevel::NotAvailable);
    }

    #[test]
    fn test_closed_session_is_fenced() {
        let vm = DashboardViewModel::new();
        let first = vm.open_session();
        vm.close_session(first);

        assert!(!vm.is_active(first));
        assert!(!vm.apply_device_status(first, status_with(Some(-80.0), None)));
        assert!(!vm.mark_stats_attempted(first));
        assert!(vm.stats_loading());
        assert!(vm.device_status().is_none());
    }

    #[test]
    fn test_new_session_supersedes_old() {
        let vm = DashboardViewModel::new();
        let first = vm.open_session();
        let second = vm.open_session();
        assert_ne!(first, second);

        assert!(!vm.apply_stats(first, Stats::default()));
        assert!(vm.apply_stats(second, Stats::default()));

        // closing a stale session must not close the current one
        vm.close_session(first);
        assert!(vm.is_active(second));
    }

    #[test]
    fn test_signal_display() {
        let state = ViewState {
            device_status: Some(status_with(Some(-95.0), None)),
            ..ViewState::default()
        };
        let quality = state.signal_quality();
        assert_eq!(quality.percentage, 47);
        assert_eq!(quality.level, SignalLevel::Fair);
        assert_eq!(state.rsrp_display(), "-95 dBm");
        assert_eq!(state.signal_summary(), "Fair • RSRP: -95 dBm");
    }

    #[test]
    fn test_signal_display_without_rsrp() {
        let state = ViewState::default();
        assert_eq!(state.rsrp_display(), "N/A");
        assert_eq!(state.signal_summary(), "N/A • RSRP: N/A");
    }

    #[test]
    fn test_operator_and_number_display() {
        let state = ViewState {
            device_status: Some(status_with(None, Some("13800138000"))),
            ..ViewState::default()
        };
        assert_eq!(state.operator_display(), "CHINA MOBILE");
        assert_eq!(state.number_display(), "Number: 13800138000");
        assert_eq!(state.version_display().as_deref(), Some("Script version: 1.4.2"));

        let bare = ViewState::default();
        assert_eq!(bare.operator_display(), "-");
        assert_eq!(bare.number_display(), NUMBER_FALLBACK);
        assert!(bare.version_display().is_none());
    }

    #[test]
    fn test_zero_rsrp_is_a_real_value() {
        let state = ViewState {
            device_status: Some(status_with(Some(0.0), None)),
            ..ViewState::default()
        };
        assert_eq!(state.signal_quality().percentage, 100);
        assert_eq!(state.signal_quality().level, SignalLevel::Excellent);
        assert_eq!(state.rsrp_display(), "0 dBm");
    }

    #[tokio::test]
    async fn test_subscribe_sees_applied_writes_only() {
        let vm = DashboardViewModel::new();
        let mut rx = vm.subscribe();
        let session = vm.open_session();
        assert!(!rx.has_changed().unwrap());

        vm.apply_stats(
            session,
            Stats {
                total_count: 1,
                today_count: 1,
            },
        );
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().total_count(), 1);

        vm.close_session(session);
        vm.apply_stats(session, Stats::default());
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_view_state_serializes() {
        let json = serde_json::to_value(ViewState::default()).unwrap();
        assert_eq!(json["stats_loading"], true);
        assert!(json["stats"].is_null());
        assert!(json["stats_updated_at"].is_null());
    }
}
