//! Mapping of device signals onto bus topics

use std::sync::Arc;

use onvif_stream::{DeviceInfo, DeviceSignal, NormalizedEvent};
use state_store::{PublishDeduplicator, PublishRecord};
use tokio::sync::mpsc;

use crate::bus::MessageBus;
use crate::topics::DeviceTopics;

const ONLINE: &str = "online";
const OFFLINE: &str = "offline";

/// Publishes one device's signals
///
/// A bridge handles signals one at a time, so a device's publishes go out in
/// the order the supervisor emitted them. Publish failures are logged and
/// never stop the bridge.
pub struct Bridge {
    device: String,
    topics: DeviceTopics,
    dedup: PublishDeduplicator,
    bus: Arc<dyn MessageBus>,
}

impl Bridge {
    pub fn new(
        base_topic: &str,
        device: impl Into<String>,
        dedup: PublishDeduplicator,
        bus: Arc<dyn MessageBus>,
    ) -> Self {
        let device = device.into();
        Self {
            topics: DeviceTopics::new(base_topic, &device),
            device,
            dedup,
            bus,
        }
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn topics(&self) -> &DeviceTopics {
        &self.topics
    }

    /// Handle signals until the supervisor stops
    pub async fn run(self, mut signals: mpsc::UnboundedReceiver<DeviceSignal>) {
        while let Some(signal) = signals.recv().await {
            self.handle(signal).await;
        }
        tracing::debug!("Bridge for {} stopped", self.device);
    }

    pub async fn handle(&self, signal: DeviceSignal) {
        match signal {
            DeviceSignal::Connected(info) => self.on_connected(&info).await,
            DeviceSignal::Disconnected => {
                tracing::info!("Camera '{}' disconnected", self.device);
                self.publish(self.topics.status(), OFFLINE.to_string(), true).await;
            }
            DeviceSignal::ConnectError(error) => {
                tracing::warn!("Camera '{}' failed to connect: {}", self.device, error);
            }
            DeviceSignal::Event(event) => self.on_event(event).await,
        }
    }

    async fn on_connected(&self, info: &DeviceInfo) {
        tracing::info!("Camera '{}' connected", self.device);
        self.publish(self.topics.status(), ONLINE.to_string(), true).await;
        match serde_json::to_string(info) {
            Ok(json) => self.publish(self.topics.info(), json, false).await,
            Err(e) => tracing::warn!("Failed to encode info for '{}': {}", self.device, e),
        }
    }

    async fn on_event(&self, event: NormalizedEvent) {
        tracing::debug!(
            "Camera '{}' event {} = {}",
            self.device,
            event.event_type,
            event.state
        );
        let Some(record) = self.dedup.offer(&self.device, event) else {
            return;
        };
        self.publish_record(&record).await;
    }

    async fn publish_record(&self, record: &PublishRecord) {
        match serde_json::to_string(record) {
            Ok(json) => self.publish(self.topics.event(), json, false).await,
            Err(e) => tracing::warn!("Failed to encode event for '{}': {}", self.device, e),
        }
        match serde_json::to_string(&record.state) {
            Ok(json) => {
                self.publish(self.topics.event_type(&record.event_type), json, false)
                    .await
            }
            Err(e) => tracing::warn!("Failed to encode state for '{}': {}", self.device, e),
        }
    }

    async fn publish(&self, topic: String, payload: String, retain: bool) {
        tracing::trace!("Publishing {} to {}", payload, topic);
        if let Err(e) = self.bus.publish(&topic, payload, retain).await {
            tracing::warn!("{}", e);
        }
    }
}
