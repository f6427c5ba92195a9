//! Mock controller implementation for testing.
//!
//! This module provides a mock controller that can be used for unit testing
//! without a modem or a running controller.
//!
//! The [`MockController`] implements both [`DeviceClient`] and
//! [`StatsClient`], so it can stand in for [`crate::ControllerClient`]
//! anywhere the polling core expects a client.
//!
//! # Features
//!
//! - **Failure injection**: Make status, stats or control calls fail
//! - **Latency simulation**: Delay responses to exercise in-flight behavior
//! - **Call accounting**: Count polled calls and record control actions

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use smsfwd_types::{DeviceStatus, MobileInfo, SendSmsRequest, Stats};

use crate::error::{Error, Result};
use crate::traits::{DeviceClient, StatsClient};

/// A mock modem controller for testing.
///
/// # Example
///
/// ```
/// use smsfwd_core::{DeviceClient, MockController};
///
/// #[tokio::main]
/// async fn main() {
///     let controller = MockController::new();
///     controller.set_rsrp(Some(-95.0)).await;
///
///     let status = controller.get_status().await.unwrap();
///     assert_eq!(status.rsrp(), Some(-95.0));
///     assert_eq!(controller.status_calls(), 1);
/// }
/// ```
pub struct MockController {
    status: RwLock<DeviceStatus>,
    stats: RwLock<Stats>,
    fail_status: AtomicBool,
    fail_stats: AtomicBool,
    fail_controls: AtomicBool,
    fail_message: RwLock<String>,
    /// Simulated status latency in milliseconds (0 = no delay).
    status_latency_ms: AtomicU64,
    /// Simulated stats latency in milliseconds (0 = no delay).
    stats_latency_ms: AtomicU64,
    status_calls: AtomicU32,
    stats_calls: AtomicU32,
    sent: RwLock<Vec<SendSmsRequest>>,
    flymode: RwLock<Option<bool>>,
    reboots: AtomicU32,
}

impl std::fmt::Debug for MockController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockController")
            .field("status_calls", &self.status_calls.load(Ordering::Relaxed))
            .field("stats_calls", &self.stats_calls.load(Ordering::Relaxed))
            .field("fail_status", &self.fail_status.load(Ordering::Relaxed))
            .field("fail_stats", &self.fail_stats.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for MockController {
    fn default() -> Self {
        Self::new()
    }
}

impl MockController {
    /// Create a mock with a registered modem and empty counters.
    pub fn new() -> Self {
        Self {
            status: RwLock::new(Self::default_status()),
            stats: RwLock::new(Stats::default()),
            fail_status: AtomicBool::new(false),
            fail_stats: AtomicBool::new(false),
            fail_controls: AtomicBool::new(false),
            fail_message: RwLock::new("Mock failure".to_string()),
            status_latency_ms: AtomicU64::new(0),
            stats_latency_ms: AtomicU64::new(0),
            status_calls: AtomicU32::new(0),
            stats_calls: AtomicU32::new(0),
            sent: RwLock::new(Vec::new()),
            flymode: RwLock::new(None),
            reboots: AtomicU32::new(0),
        }
    }

    fn default_status() -> DeviceStatus {
        DeviceStatus {
            mobile: Some(MobileInfo {
                rsrp: Some(-85.0),
                operator: Some("MOCK TELECOM".to_string()),
                number: None,
            }),
            version: Some("mock-1.0".to_string()),
        }
    }

    /// Replace the status returned by `get_status`.
    pub async fn set_status(&self, status: DeviceStatus) {
        *self.status.write().await = status;
    }

    /// Change only the reported RSRP, creating the mobile block if needed.
    pub async fn set_rsrp(&self, rsrp: Option<f64>) {
        let mut status = self.status.write().await;
        status.mobile.get_or_insert_with(MobileInfo::default).rsrp = rsrp;
    }

    /// Replace the counters returned by `get_stats`.
    pub async fn set_stats(&self, stats: Stats) {
        *self.stats.write().await = stats;
    }

    /// Make `get_status` fail.
    pub fn set_status_failing(&self, fail: bool) {
        self.fail_status.store(fail, Ordering::SeqCst);
    }

    /// Make `get_stats` fail.
    pub fn set_stats_failing(&self, fail: bool) {
        self.fail_stats.store(fail, Ordering::SeqCst);
    }

    /// Make `send_sms`, `set_flymode` and `reboot_mcu` fail.
    pub fn set_controls_failing(&self, fail: bool) {
        self.fail_controls.store(fail, Ordering::SeqCst);
    }

    /// Set the message carried by injected failures.
    pub async fn set_fail_message(&self, message: impl Into<String>) {
        *self.fail_message.write().await = message.into();
    }

    /// Delay every `get_status` response.
    pub fn set_status_latency(&self, latency: Duration) {
        self.status_latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Delay every `get_stats` response.
    pub fn set_stats_latency(&self, latency: Duration) {
        self.stats_latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Number of `get_status` calls issued so far.
    pub fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }

    /// Number of `get_stats` calls issued so far.
    pub fn stats_calls(&self) -> u32 {
        self.stats_calls.load(Ordering::SeqCst)
    }

    /// Messages accepted by `send_sms`.
    pub async fn sent_messages(&self) -> Vec<SendSmsRequest> {
        self.sent.read().await.clone()
    }

    /// Last flight mode requested, if any.
    pub async fn flymode(&self) -> Option<bool> {
        *self.flymode.read().await
    }

    /// Number of accepted reboots.
    pub fn reboot_count(&self) -> u32 {
        self.reboots.load(Ordering::SeqCst)
    }

    async fn injected_failure(&self) -> Error {
        Error::api(500, self.fail_message.read().await.clone())
    }

    async fn simulate_latency(latency_ms: &AtomicU64) {
        let latency = latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
    }

    async fn check_controls(&self) -> Result<()> {
        if self.fail_controls.load(Ordering::SeqCst) {
            return Err(self.injected_failure().await);
        }
        Ok(())
    }
}

#[async_trait]
impl DeviceClient for MockController {
    async fn send_sms(&self, request: &SendSmsRequest) -> Result<()> {
        request.validate()?;
        self.check_controls().await?;
        self.sent.write().await.push(request.clone());
        Ok(())
    }

    async fn get_status(&self) -> Result<DeviceStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        Self::simulate_latency(&self.status_latency_ms).await;

        if self.fail_status.load(Ordering::SeqCst) {
            return Err(self.injected_failure().await);
        }
        Ok(self.status.read().await.clone())
    }

    async fn set_flymode(&self, enabled: bool) -> Result<()> {
        self.check_controls().await?;
        *self.flymode.write().await = Some(enabled);
        Ok(())
    }

    async fn reboot_mcu(&self) -> Result<()> {
        self.check_controls().await?;
        self.reboots.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl StatsClient for MockController {
    async fn get_stats(&self) -> Result<Stats> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        Self::simulate_latency(&self.stats_latency_ms).await;

        if self.fail_stats.load(Ordering::SeqCst) {
            return Err(self.injected_failure().await);
        }
        Ok(*self.stats.read().await)
    }
}

/// Builder for creating mock controllers with custom settings.
#[derive(Debug, Default)]
pub struct MockControllerBuilder {
    status: Option<DeviceStatus>,
    stats: Option<Stats>,
    status_latency: Duration,
    stats_latency: Duration,
    fail_status: bool,
    fail_stats: bool,
}

impl MockControllerBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial device status.
    pub fn status(mut self, status: DeviceStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the initial message counters.
    pub fn stats(mut self, total_count: u64, today_count: u64) -> Self {
        self.stats = Some(Stats {
            total_count,
            today_count,
        });
        self
    }

    /// Set the simulated `get_status` latency.
    pub fn status_latency(mut self, latency: Duration) -> Self {
        self.status_latency = latency;
        self
    }

    /// Set the simulated `get_stats` latency.
    pub fn stats_latency(mut self, latency: Duration) -> Self {
        self.stats_latency = latency;
        self
    }

    /// Start with `get_status` failing.
    pub fn failing_status(mut self) -> Self {
        self.fail_status = true;
        self
    }

    /// Start with `get_stats` failing.
    pub fn failing_stats(mut self) -> Self {
        self.fail_stats = true;
        self
    }

    /// Build the mock controller.
    pub fn build(self) -> MockController {
        let mut controller = MockController::new();
        if let Some(status) = self.status {
            controller.status = RwLock::new(status);
        }
        if let Some(stats) = self.stats {
            controller.stats = RwLock::new(stats);
        }
        controller.set_status_latency(self.status_latency);
        controller.set_stats_latency(self.stats_latency);
        controller.set_status_failing(self.fail_status);
        controller.set_stats_failing(self.fail_stats);
        controller
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_default_status() {
        let mock = MockController::new();
        let status = mock.get_status().await.unwrap();
        assert_eq!(status.rsrp(), Some(-85.0));
        assert_eq!(status.operator(), Some("MOCK TELECOM"));
        assert_eq!(mock.status_calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_failure_injection() {
        let mock = MockController::new();
        mock.set_stats_failing(true);
        mock.set_fail_message("db locked").await;

        let err = mock.get_stats().await.unwrap_err();
        assert!(err.to_string().contains("db locked"));
        assert_eq!(mock.stats_calls(), 1);

        mock.set_stats_failing(false);
        assert!(mock.get_stats().await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_set_rsrp_creates_mobile() {
        let mock = MockControllerBuilder::new()
            .status(DeviceStatus::default())
            .build();
        mock.set_rsrp(Some(-101.0)).await;
        let status = mock.get_status().await.unwrap();
        assert_eq!(status.rsrp(), Some(-101.0));
    }

    #[tokio::test]
    async fn test_mock_controls_recorded() {
        let mock = MockController::new();
        mock.send_sms(&SendSmsRequest::new("10086", "hi")).await.unwrap();
        mock.set_flymode(true).await.unwrap();
        mock.reboot_mcu().await.unwrap();

        assert_eq!(mock.sent_messages().await.len(), 1);
        assert_eq!(mock.flymode().await, Some(true));
        assert_eq!(mock.reboot_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_controls_failing() {
        let mock = MockController::new();
        mock.set_controls_failing(true);
        assert!(mock.reboot_mcu().await.is_err());
        assert!(mock.set_flymode(false).await.is_err());
        assert_eq!(mock.reboot_count(), 0);
        assert_eq!(mock.flymode().await, None);
    }

    #[tokio::test]
    async fn test_mock_send_sms_validates() {
        let mock = MockController::new();
        let result = mock.send_sms(&SendSmsRequest::new("10086", "")).await;
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(mock.sent_messages().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_latency() {
        let mock = MockControllerBuilder::new()
            .stats(7, 2)
            .stats_latency(Duration::from_secs(3))
            .build();

        let start = tokio::time::Instant::now();
        let stats = mock.get_stats().await.unwrap();
        assert_eq!(stats.total_count, 7);
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_builder_failing_flags() {
        let mock = MockControllerBuilder::new()
            .failing_status()
            .failing_stats()
            .build();
        assert!(mock.get_status().await.is_err());
        assert!(mock.get_stats().await.is_err());
    }

    #[tokio::test]
    async fn test_builder_replaces_default_readings() {
        let mock = MockControllerBuilder::new()
            .status(DeviceStatus {
                mobile: None,
                version: Some("2.0".to_string()),
            })
            .stats(42, 5)
            .build();

        let status = mock.get_status().await.unwrap();
        assert!(status.mobile.is_none());
        assert_eq!(status.version.as_deref(), Some("2.0"));

        let stats = mock.get_stats().await.unwrap();
        assert_eq!(stats.total_count, 42);
        assert_eq!(stats.today_count, 5);
    }
}
