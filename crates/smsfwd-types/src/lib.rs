//! Platform-agnostic types for the UART SMS forwarder controller.
//!
//! This crate holds the data model shared by the HTTP client, the polling
//! core and the command-line front end:
//!
//! - [`DeviceStatus`] and [`MobileInfo`]: modem telemetry snapshot
//! - [`Stats`]: aggregate message counters
//! - [`SendSmsRequest`] and [`FlymodeRequest`]: control request bodies
//!
//! # Example
//!
//! ```
//! use smsfwd_types::{DeviceStatus, MobileInfo};
//!
//! let status = DeviceStatus {
//!     mobile: Some(MobileInfo {
//!         rsrp: Some(-95.0),
//!         ..Default::default()
//!     }),
//!     version: None,
//! };
//! assert_eq!(status.rsrp(), Some(-95.0));
//! assert_eq!(status.operator(), None);
//! ```

pub mod error;
pub mod types;

pub use error::{ValidationError, ValidationResult};
pub use types::{DeviceStatus, FlymodeRequest, MobileInfo, SendSmsRequest, Stats};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::EmptyField("to");
        assert_eq!(err.to_string(), "field 'to' must not be empty");
    }

    #[test]
    fn test_default_status_has_no_registration() {
        let status = DeviceStatus::default();
        assert!(status.mobile.is_none());
        assert!(status.rsrp().is_none());
    }

    #[test]
    fn test_mobile_without_rsrp() {
        let status = DeviceStatus {
            mobile: Some(MobileInfo {
                rsrp: None,
                operator: Some("CMCC".to_string()),
                number: None,
            }),
            version: Some("2.0".to_string()),
        };
        assert_eq!(status.rsrp(), None);
        assert_eq!(status.operator(), Some("CMCC"));
    }
}
