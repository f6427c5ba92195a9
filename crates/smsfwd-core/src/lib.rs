//! Core library for the UART SMS forwarder dashboard.
//!
//! This crate talks to the modem controller over HTTP, keeps a live snapshot
//! of the modem and the message store up to date, and turns raw radio
//! measurements into something an operator can read.
//!
//! # Features
//!
//! - **Controller client**: Send SMS, read status, toggle flight mode, reboot
//! - **Dual-cadence polling**: Stats every 30 s, device status every 10 s
//! - **Signal quality**: RSRP mapped to a 0-100 score and a category
//! - **View state**: One snapshot with change notification and session fencing
//! - **Testing**: [`MockController`] with failure injection and latency
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use smsfwd_core::{ControllerClient, DashboardViewModel, PollingScheduler};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(ControllerClient::new("http://192.168.1.10:8080")?);
//!     let view_model = Arc::new(DashboardViewModel::new());
//!     let scheduler = PollingScheduler::new(client.clone(), client, view_model.clone());
//!
//!     scheduler.start();
//!     let mut updates = view_model.subscribe();
//!     while updates.changed().await.is_ok() {
//!         let state = updates.borrow_and_update().clone();
//!         println!("{} | {} messages today", state.signal_summary(), state.today_count());
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod mock;
pub mod scheduler;
pub mod signal;
pub mod traits;
pub mod view_model;

pub use client::{ControllerClient, DEFAULT_TIMEOUT};
pub use error::{Error, Result};
pub use mock::{MockController, MockControllerBuilder};
pub use scheduler::{
    LoopStats, PollKind, PollingScheduler, PollingSession, STATS_REFRESH_INTERVAL,
    STATUS_REFRESH_INTERVAL,
};
pub use signal::{SignalLevel, SignalQuality, evaluate, rsrp_percentage};
pub use traits::{DeviceClient, StatsClient};
pub use view_model::{DashboardViewModel, SessionId, ViewState};

// Re-export the wire types so downstream crates need only one dependency.
pub use smsfwd_types::{
    DeviceStatus, FlymodeRequest, MobileInfo, SendSmsRequest, Stats, ValidationError,
};
