//! Trait abstractions for the modem controller's remote operations.
//!
//! The polling core only depends on these traits, so it runs unchanged
//! against the HTTP [`crate::ControllerClient`] and against
//! [`crate::MockController`] in tests.

use async_trait::async_trait;

use smsfwd_types::{DeviceStatus, SendSmsRequest, Stats};

use crate::error::Result;

/// Operations on the modem behind the serial controller.
///
/// Only [`DeviceClient::get_status`] is polled. The other operations run on
/// explicit operator action.
///
/// # Example
///
/// ```ignore
/// use smsfwd_core::{DeviceClient, Result};
///
/// async fn print_operator<C: DeviceClient>(client: &C) -> Result<()> {
///     let status = client.get_status().await?;
///     println!("Operator: {:?}", status.operator());
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait DeviceClient: Send + Sync {
    /// Queue an outgoing SMS on the modem.
    async fn send_sms(&self, request: &SendSmsRequest) -> Result<()>;

    /// Read the current device status, including cellular registration.
    async fn get_status(&self) -> Result<DeviceStatus>;

    /// Enter (`true`) or leave (`false`) flight mode.
    async fn set_flymode(&self, enabled: bool) -> Result<()>;

    /// Reboot the modem's microcontroller.
    async fn reboot_mcu(&self) -> Result<()>;
}

/// Read access to stored message statistics.
#[async_trait]
pub trait StatsClient: Send + Sync {
    /// Fetch aggregate message counters.
    async fn get_stats(&self) -> Result<Stats>;
}
