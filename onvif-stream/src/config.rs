//! Configuration types for supervisors and ONVIF sessions

use std::time::Duration;

use onvif_api::{Credentials, DEFAULT_DEVICE_PATH};

/// Timing of the connect/monitor lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Fixed wait between failed connect attempts
    /// Default: 10 seconds
    pub reconnect_delay: Duration,

    /// Interval between liveness probes once connected; the first probe runs
    /// one interval after connecting
    /// Default: 10 seconds
    pub probe_interval: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            reconnect_delay: Duration::from_secs(10),
            probe_interval: Duration::from_secs(10),
        }
    }
}

impl SupervisorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_probe_interval(mut self, interval: Duration) -> Self {
        self.probe_interval = interval;
        self
    }
}

/// Connection parameters for one ONVIF device
#[derive(Debug, Clone)]
pub struct OnvifSessionConfig {
    pub hostname: String,

    /// Default: 80
    pub port: u16,

    /// Path of the device management service
    /// Default: `/onvif/device_service`
    pub path: String,

    /// Signs authenticated requests when present
    pub credentials: Option<Credentials>,

    /// Read timeout for a single request; must exceed `pull_timeout`
    /// Default: 10 seconds
    pub request_timeout: Duration,

    /// How long a PullMessages request may wait on the device
    /// Default: 5 seconds
    pub pull_timeout: Duration,

    /// Default: 10
    pub message_limit: u32,

    /// Requested pull point lifetime; renewed at half of it
    /// Default: 60 seconds
    pub subscription_lifetime: Duration,

    /// Wait before recreating a pull point after a failure
    /// Default: 10 seconds
    pub resubscribe_delay: Duration,
}

impl OnvifSessionConfig {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            port: 80,
            path: DEFAULT_DEVICE_PATH.to_string(),
            credentials: None,
            request_timeout: Duration::from_secs(10),
            pull_timeout: Duration::from_secs(5),
            message_limit: 10,
            subscription_lifetime: Duration::from_secs(60),
            resubscribe_delay: Duration::from_secs(10),
        }
    }

    /// Device service address for this configuration
    pub fn device_url(&self) -> String {
        onvif_api::device_url(&self.hostname, self.port, &self.path)
    }
}
