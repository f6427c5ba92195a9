//! Core types exchanged with the modem controller.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};

/// Snapshot of the remote device as reported by `GET /api/serial/status`.
///
/// Every field is optional. A missing `mobile` block means the modem has no
/// cellular registration yet (or the status was never fetched); consumers
/// must treat it as a normal state, not a failure.
///
/// Unknown fields sent by the controller are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceStatus {
    /// Cellular registration details.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub mobile: Option<MobileInfo>,
    /// Version of the script running on the modem.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub version: Option<String>,
}

impl DeviceStatus {
    /// Raw RSRP in dBm, if the modem reported one.
    #[must_use]
    pub fn rsrp(&self) -> Option<f64> {
        self.mobile.as_ref().and_then(|m| m.rsrp)
    }

    /// Registered network operator name, if any.
    #[must_use]
    pub fn operator(&self) -> Option<&str> {
        self.mobile.as_ref().and_then(|m| m.operator.as_deref())
    }

    /// Subscriber number of the inserted SIM, if known.
    #[must_use]
    pub fn number(&self) -> Option<&str> {
        self.mobile.as_ref().and_then(|m| m.number.as_deref())
    }
}

/// Cellular registration block of a [`DeviceStatus`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MobileInfo {
    /// Reference Signal Received Power in dBm (typically -140 to -44).
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub rsrp: Option<f64>,
    /// Network operator name.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub operator: Option<String>,
    /// Subscriber number.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub number: Option<String>,
}

/// Aggregate message counters from `GET /api/messages/stats`.
///
/// `today_count <= total_count` is expected but not enforced here; the
/// controller is the source of truth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Stats {
    /// Total number of stored messages.
    pub total_count: u64,
    /// Messages recorded today.
    pub today_count: u64,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} total, {} today", self.total_count, self.today_count)
    }
}

/// Body of `POST /api/serial/sms`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SendSmsRequest {
    /// Destination phone number.
    pub to: String,
    /// Message text.
    pub content: String,
}

impl SendSmsRequest {
    /// Build a request without validating it.
    pub fn new(to: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            content: content.into(),
        }
    }

    /// Check that both destination and content are present.
    ///
    /// The controller rejects empty values with a 400, so callers can fail
    /// early without a round trip.
    ///
    /// ```
    /// use smsfwd_types::{SendSmsRequest, ValidationError};
    ///
    /// assert!(SendSmsRequest::new("13800138000", "hello").validate().is_ok());
    /// assert_eq!(
    ///     SendSmsRequest::new("  ", "hello").validate(),
    ///     Err(ValidationError::EmptyField("to"))
    /// );
    /// ```
    pub fn validate(&self) -> ValidationResult<()> {
        if self.to.trim().is_empty() {
            return Err(ValidationError::EmptyField("to"));
        }
        if self.content.trim().is_empty() {
            return Err(ValidationError::EmptyField("content"));
        }
        Ok(())
    }
}

/// Body of `POST /api/serial/flymode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlymodeRequest {
    /// `true` enters flight mode, `false` leaves it.
    pub enabled: bool,
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn test_device_status_full() {
        let json = r#"{
            "mobile": {"rsrp": -95, "operator": "CHINA MOBILE", "number": "13800138000"},
            "version": "1.4.2"
        }"#;
        let status: DeviceStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.rsrp(), Some(-95.0));
        assert_eq!(status.operator(), Some("CHINA MOBILE"));
        assert_eq!(status.number(), Some("13800138000"));
        assert_eq!(status.version.as_deref(), Some("1.4.2"));
    }

    #[test]
    fn test_device_status_without_mobile() {
        let status: DeviceStatus = serde_json::from_str(r#"{"version": "1.0"}"#).unwrap();
        assert!(status.mobile.is_none());
        assert_eq!(status.rsrp(), None);
        assert_eq!(status.operator(), None);
        assert_eq!(status.number(), None);
    }

    #[test]
    fn test_device_status_null_fields() {
        let json = r#"{"mobile": {"rsrp": null, "operator": null}, "version": null}"#;
        let status: DeviceStatus = serde_json::from_str(json).unwrap();
        assert!(status.mobile.is_some());
        assert_eq!(status.rsrp(), None);
        assert!(status.version.is_none());
    }

    #[test]
    fn test_device_status_ignores_unknown_fields() {
        let json = r#"{"mobile": {"rsrp": -101.5, "rssi": -70, "imsi": "4600"}, "uptime": 12}"#;
        let status: DeviceStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.rsrp(), Some(-101.5));
    }

    #[test]
    fn test_device_status_empty_object() {
        let status: DeviceStatus = serde_json::from_str("{}").unwrap();
        assert_eq!(status, DeviceStatus::default());
    }

    #[test]
    fn test_device_status_serialization_skips_absent() {
        let json = serde_json::to_string(&DeviceStatus::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_stats_camel_case() {
        let stats: Stats = serde_json::from_str(r#"{"totalCount": 42, "todayCount": 5}"#).unwrap();
        assert_eq!(stats.total_count, 42);
        assert_eq!(stats.today_count, 5);

        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"totalCount\":42"));
        assert!(json.contains("\"todayCount\":5"));
    }

    #[test]
    fn test_stats_rejects_negative_counts() {
        let result = serde_json::from_str::<Stats>(r#"{"totalCount": -1, "todayCount": 0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_stats_display() {
        let stats = Stats {
            total_count: 10,
            today_count: 3,
        };
        assert_eq!(stats.to_string(), "10 total, 3 today");
    }

    #[test]
    fn test_send_sms_request_body() {
        let req = SendSmsRequest::new("13800138000", "test");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["to"], "13800138000");
        assert_eq!(json["content"], "test");
    }

    #[test]
    fn test_send_sms_request_validation() {
        assert_eq!(
            SendSmsRequest::new("", "hi").validate(),
            Err(ValidationError::EmptyField("to"))
        );
        assert_eq!(
            SendSmsRequest::new("10086", "\n\t").validate(),
            Err(ValidationError::EmptyField("content"))
        );
        assert!(SendSmsRequest::new("10086", "hi").validate().is_ok());
    }

    #[test]
    fn test_flymode_request_body() {
        let json = serde_json::to_string(&FlymodeRequest { enabled: true }).unwrap();
        assert_eq!(json, r#"{"enabled":true}"#);
    }
}
