//! Error types for smsfwd-core.
//!
//! Every remote call made by [`crate::ControllerClient`] returns this
//! [`Error`]. The polling loops never propagate it: a failed tick is logged
//! and retried at the next scheduled tick.
//!
//! # Error Classification
//!
//! | Error Type | Meaning | Polling behavior |
//! |------------|---------|------------------|
//! | [`Error::NotReachable`] | Connection refused, DNS, timeout | Retried next tick |
//! | [`Error::Request`] | Transport failure after the request was sent | Retried next tick |
//! | [`Error::Api`] | Controller answered with a non-2xx status | Retried next tick |
//! | [`Error::Decode`] | Body was not the expected JSON | Retried next tick |
//! | [`Error::Validation`] | Request rejected locally, nothing was sent | Not polled |
//! | [`Error::InvalidUrl`] | Bad base URL at construction | Fix configuration |

use thiserror::Error;

/// Errors that can occur when talking to the modem controller.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The controller is not reachable.
    #[error("Controller not reachable at {url}: {source}")]
    NotReachable {
        /// The URL that was requested.
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP request failed after it was sent.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Invalid base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The controller returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the `error` field of the body, or the status line.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A request failed local validation and was not sent.
    #[error("Invalid request: {0}")]
    Validation(#[from] smsfwd_types::ValidationError),
}

impl Error {
    /// Create an API error from a status code and message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Whether the failure happened below the HTTP layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::NotReachable { .. } | Self::Request(_))
    }
}

/// Result type alias using smsfwd-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;
