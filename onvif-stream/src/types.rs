//! Core types for device supervision.

use std::sync::Arc;

use serde_json::Value;
use state_store::NormalizedEvent;

use crate::error::SessionError;

/// Static identity of a device, fetched once per supervisor
pub type DeviceInfo = onvif_api::DeviceInformation;

/// A notification exactly as the session delivered it
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    /// Topic path, e.g. `tns1:RuleEngine/CellMotionDetector/Motion`
    pub topic: Option<String>,

    /// The whole notification message tree
    pub payload: Value,
}

impl RawEvent {
    pub fn new(topic: Option<String>, payload: Value) -> Self {
        Self { topic, payload }
    }
}

impl From<onvif_api::Notification> for RawEvent {
    fn from(notification: onvif_api::Notification) -> Self {
        Self {
            topic: notification.topic,
            payload: notification.payload,
        }
    }
}

/// Connection state of one supervised device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Not connected; waiting to (re)try
    Disconnected,
    /// A connect attempt is in flight
    Connecting,
    /// Connected and answering probes
    Connected,
    /// Was connected, latest probe failed
    Degraded,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Degraded => "degraded",
        };
        f.write_str(name)
    }
}

/// Signals emitted by a supervisor, in the order things happened
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceSignal {
    /// Connected, or recovered from `Degraded`; always carries the cached info
    Connected(Arc<DeviceInfo>),
    /// A liveness probe failed while connected
    Disconnected,
    /// A connect attempt failed; another follows after the backoff
    ConnectError(SessionError),
    /// A notification that normalized successfully
    Event(NormalizedEvent),
}
