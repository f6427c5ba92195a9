//! HTTP client for the modem controller REST API.
//!
//! [`ControllerClient`] implements both [`DeviceClient`] and [`StatsClient`]
//! on top of `reqwest`. Timeouts are enforced here, at the transport; the
//! polling core never times out a call itself.
//!
//! # Example
//!
//! ```no_run
//! use smsfwd_core::{ControllerClient, DeviceClient, StatsClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ControllerClient::new("http://192.168.1.10:8080")?;
//!
//! let status = client.get_status().await?;
//! println!("RSRP: {:?}", status.rsrp());
//!
//! let stats = client.get_stats().await?;
//! println!("{} messages today", stats.today_count);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use smsfwd_types::{DeviceStatus, FlymodeRequest, SendSmsRequest, Stats};

use crate::error::{Error, Result};
use crate::traits::{DeviceClient, StatsClient};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const SMS_PATH: &str = "/api/serial/sms";
const STATUS_PATH: &str = "/api/serial/status";
const FLYMODE_PATH: &str = "/api/serial/flymode";
const REBOOT_PATH: &str = "/api/serial/reboot";
const STATS_PATH: &str = "/api/messages/stats";

/// HTTP client for the controller API.
#[derive(Debug, Clone)]
pub struct ControllerClient {
    client: Client,
    base_url: String,
}

impl ControllerClient {
    /// Create a new client with the default timeout.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the controller (e.g., "http://localhost:8080")
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a new client with a custom request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::Request)?;

        Ok(Self { client, base_url })
    }

    /// Create a client with a custom reqwest Client.
    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        Ok(Self { client, base_url })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ======================================================================
    // Internal HTTP helpers
    // ======================================================================

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::NotReachable {
                url: url.clone(),
                source: e,
            })?;

        decode_json(response).await
    }

    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<()> {
        let url = self.url(path);
        debug!(%url, "POST");
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::NotReachable {
                url: url.clone(),
                source: e,
            })?;

        expect_success(response).await
    }

    async fn post_empty(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        debug!(%url, "POST");
        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| Error::NotReachable {
                url: url.clone(),
                source: e,
            })?;

        expect_success(response).await
    }
}

#[async_trait]
impl DeviceClient for ControllerClient {
    async fn send_sms(&self, request: &SendSmsRequest) -> Result<()> {
        request.validate()?;
        self.post_json(SMS_PATH, request).await
    }

    async fn get_status(&self) -> Result<DeviceStatus> {
        self.get(STATUS_PATH).await
    }

    async fn set_flymode(&self, enabled: bool) -> Result<()> {
        self.post_json(FLYMODE_PATH, &FlymodeRequest { enabled })
            .await
    }

    async fn reboot_mcu(&self) -> Result<()> {
        self.post_empty(REBOOT_PATH).await
    }
}

#[async_trait]
impl StatsClient for ControllerClient {
    async fn get_stats(&self) -> Result<Stats> {
        self.get(STATS_PATH).await
    }
}

fn normalize_base_url(base_url: &str) -> Result<String> {
    // Normalize URL (remove trailing slash)
    let base_url = base_url.trim().trim_end_matches('/').to_string();

    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(Error::InvalidUrl(format!(
            "URL must start with http:// or https://, got: {}",
            base_url
        )));
    }

    Ok(base_url)
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = check_status(response).await?;
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

async fn expect_success(response: Response) -> Result<()> {
    // acks carry no payload we care about
    check_status(response).await.map(|_| ())
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or_else(|| status.to_string());

    Err(Error::api(status.as_u16(), message))
}
