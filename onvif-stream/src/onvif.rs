//! `DeviceSession` over ONVIF SOAP
//!
//! SOAP calls are blocking, so each one runs on the blocking thread pool.
//! Events are delivered through a pull point subscription serviced by its
//! own task.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::Instant;

use onvif_api::operations::{
    CapabilityCategory, CreatePullPointSubscriptionOperation, CreatePullPointSubscriptionRequest,
    GetCapabilitiesOperation, GetCapabilitiesRequest, GetDeviceInformationOperation,
    GetSystemDateAndTimeOperation, PullMessagesOperation, PullMessagesRequest, RenewOperation,
    RenewRequest, UnsubscribeOperation,
};
use onvif_api::{ApiError, OnvifClient, OnvifOperation};

use crate::config::OnvifSessionConfig;
use crate::error::{Result, SessionError};
use crate::session::DeviceSession;
use crate::types::{DeviceInfo, RawEvent};

/// Notifications buffered between the pull task and the supervisor
const EVENT_BUFFER: usize = 64;

/// ONVIF camera session
pub struct OnvifSession {
    config: OnvifSessionConfig,
    client: Arc<OnvifClient>,
    device_url: String,
    events_xaddr: Mutex<Option<String>>,
}

impl OnvifSession {
    pub fn new(config: OnvifSessionConfig) -> Self {
        let client = OnvifClient::with_timeout(config.request_timeout, config.credentials.clone());
        let device_url = config.device_url();
        Self {
            config,
            client: Arc::new(client),
            device_url,
            events_xaddr: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &OnvifSessionConfig {
        &self.config
    }

    /// Event service address learned on the last successful connect
    pub fn events_xaddr(&self) -> Option<String> {
        match self.events_xaddr.lock() {
            Ok(xaddr) => xaddr.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_events_xaddr(&self, xaddr: Option<String>) {
        match self.events_xaddr.lock() {
            Ok(mut current) => *current = xaddr,
            Err(poisoned) => *poisoned.into_inner() = xaddr,
        }
    }
}

#[async_trait]
impl DeviceSession for OnvifSession {
    async fn connect(&self) -> Result<()> {
        let clock = execute::<GetSystemDateAndTimeOperation>(&self.client, &self.device_url, ())
            .await
            .map_err(SessionError::connect)?;
        match clock.utc {
            Some(device_utc) => {
                self.client.sync_clock(device_utc);
                tracing::debug!(
                    "{} answered handshake, clock offset {} ms",
                    self.device_url,
                    self.client.time_shift().num_milliseconds()
                );
            }
            None => tracing::debug!("{} answered handshake without a UTC clock", self.device_url),
        }

        let capabilities = execute::<GetCapabilitiesOperation>(
            &self.client,
            &self.device_url,
            GetCapabilitiesRequest {
                category: CapabilityCategory::Events,
            },
        )
        .await
        .map_err(SessionError::connect)?;

        if !capabilities.pull_point_support {
            tracing::debug!("{} does not advertise pull point support", self.device_url);
        }
        self.set_events_xaddr(capabilities.events_xaddr);
        Ok(())
    }

    async fn device_info(&self) -> Result<DeviceInfo> {
        execute::<GetDeviceInformationOperation>(&self.client, &self.device_url, ())
            .await
            .map_err(SessionError::request)
    }

    async fn probe(&self) -> Result<()> {
        execute::<GetSystemDateAndTimeOperation>(&self.client, &self.device_url, ())
            .await
            .map(|_| ())
            .map_err(SessionError::request)
    }

    async fn subscribe_events(&self) -> mpsc::Receiver<RawEvent> {
        let (events, receiver) = mpsc::channel(EVENT_BUFFER);
        let puller = PullPoint {
            client: Arc::clone(&self.client),
            events_xaddr: self.events_xaddr(),
            config: self.config.clone(),
            events,
        };
        tokio::spawn(puller.run());
        receiver
    }
}

/// Runs an operation on the blocking pool
async fn execute<Op>(
    client: &Arc<OnvifClient>,
    url: &str,
    request: Op::Request,
) -> std::result::Result<Op::Response, ApiError>
where
    Op: OnvifOperation + 'static,
    Op::Request: Send + 'static,
    Op::Response: Send + 'static,
{
    let client = Arc::clone(client);
    let url = url.to_string();
    tokio::task::spawn_blocking(move || client.execute::<Op>(&url, &request))
        .await
        .map_err(|e| ApiError::NetworkError(format!("request task failed: {}", e)))?
}

/// Pull point subscription loop feeding one event channel
struct PullPoint {
    client: Arc<OnvifClient>,
    events_xaddr: Option<String>,
    config: OnvifSessionConfig,
    events: mpsc::Sender<RawEvent>,
}

impl PullPoint {
    async fn run(self) {
        let Some(events_xaddr) = self.events_xaddr.clone() else {
            tracing::warn!(
                "Not subscribing to events from {}: {}",
                self.config.hostname,
                ApiError::MissingService("Events")
            );
            return;
        };

        loop {
            match self.subscribe(&events_xaddr).await {
                Ok(address) => match self.pull(&address).await {
                    Ok(()) => {
                        self.unsubscribe(&address).await;
                        return;
                    }
                    Err(error) => {
                        tracing::warn!("Pull point on {} failed, resubscribing: {}", self.config.hostname, error);
                    }
                },
                Err(error) => {
                    tracing::warn!("Could not create pull point on {}: {}", self.config.hostname, error);
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.resubscribe_delay) => {}
                _ = self.events.closed() => return,
            }
        }
    }

    async fn subscribe(&self, events_xaddr: &str) -> Result<String> {
        let subscription = execute::<CreatePullPointSubscriptionOperation>(
            &self.client,
            events_xaddr,
            CreatePullPointSubscriptionRequest {
                initial_termination_time: self.config.subscription_lifetime,
            },
        )
        .await
        .map_err(SessionError::subscription)?;

        tracing::debug!("Created pull point {} on {}", subscription.address, self.config.hostname);
        Ok(subscription.address)
    }

    /// Pull until the receiver goes away (`Ok`) or the subscription breaks
    async fn pull(&self, address: &str) -> Result<()> {
        let lifetime = self.config.subscription_lifetime;
        let mut renew_at = Instant::now() + lifetime / 2;

        while !self.events.is_closed() {
            if Instant::now() >= renew_at {
                execute::<RenewOperation>(
                    &self.client,
                    address,
                    RenewRequest {
                        termination_time: lifetime,
                    },
                )
                .await
                .map_err(SessionError::subscription)?;
                tracing::trace!("Renewed pull point on {}", self.config.hostname);
                renew_at = Instant::now() + lifetime / 2;
            }

            let response = execute::<PullMessagesOperation>(
                &self.client,
                address,
                PullMessagesRequest {
                    timeout: self.config.pull_timeout,
                    message_limit: self.config.message_limit,
                },
            )
            .await
            .map_err(SessionError::subscription)?;

            for notification in response.messages {
                if self.events.send(RawEvent::from(notification)).await.is_err() {
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    async fn unsubscribe(&self, address: &str) {
        if let Err(error) = execute::<UnsubscribeOperation>(&self.client, address, ()).await {
            tracing::debug!("Unsubscribe from {} failed: {}", self.config.hostname, error);
        }
    }
}
