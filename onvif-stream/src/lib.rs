//! # onvif-stream
//!
//! Keeps one ONVIF camera session alive and turns what it reports into a
//! stream of lifecycle and event signals.
//!
//! A [`ConnectionSupervisor`] owns one [`DeviceSession`] per device. It
//! connects with a fixed backoff, probes liveness on a fixed interval, flips
//! between `Connected` and `Degraded` as probes fail and recover, and
//! normalizes the device's notifications into `(event_type, state)` pairs.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use onvif_stream::{ConnectionSupervisor, DeviceSignal, OnvifSession, OnvifSessionConfig, SupervisorConfig};
//!
//! let session = OnvifSession::new(OnvifSessionConfig::new("192.168.1.20"));
//! let (handle, mut signals) = ConnectionSupervisor::spawn("porch", Arc::new(session), SupervisorConfig::default());
//!
//! while let Some(signal) = signals.recv().await {
//!     match signal {
//!         DeviceSignal::Connected(info) => println!("online: {}", info.model),
//!         DeviceSignal::Event(event) => println!("{} = {}", event.event_type, event.state),
//!         _ => {}
//!     }
//! }
//! handle.shutdown().await;
//! ```

mod config;
mod error;
mod normalizer;
mod onvif;
mod session;
mod supervisor;
mod types;

pub use config::{OnvifSessionConfig, SupervisorConfig};
pub use error::{Result, SessionError};
pub use normalizer::normalize;
pub use onvif::OnvifSession;
pub use session::DeviceSession;
pub use supervisor::{ConnectionSupervisor, SupervisorHandle};
pub use types::{ConnectionState, DeviceInfo, DeviceSignal, RawEvent};

pub use state_store::NormalizedEvent;
