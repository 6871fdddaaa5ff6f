//! Publish side of the message bus

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, LastWill, MqttOptions, Outgoing, Packet, QoS};
use tokio::task::JoinHandle;

use crate::config::MqttConfig;
use crate::topics;

/// Wait between event loop polls after a connection error
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Requests buffered between publishers and the event loop
const REQUEST_CAPACITY: usize = 64;

const ONLINE: &str = "online";
const OFFLINE: &str = "offline";

/// Bus errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BusError {
    #[error("Failed to connect to broker: {0}")]
    Connect(String),

    #[error("Failed to publish to {topic}: {reason}")]
    Publish { topic: String, reason: String },
}

/// Where bridge output goes
#[async_trait]
pub trait MessageBus: Send + Sync {
    async fn publish(&self, topic: &str, payload: String, retain: bool) -> Result<(), BusError>;
}

/// MQTT broker connection
///
/// The broker publishes `offline` on the bridge status topic if this client
/// disappears without disconnecting.
pub struct MqttBus {
    client: AsyncClient,
    status_topic: String,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl MqttBus {
    /// Connect and wait for the broker to accept the session
    pub async fn connect(config: &MqttConfig) -> Result<Self, BusError> {
        let status_topic = topics::bridge_status(&config.base_topic);
        let (client, mut eventloop) =
            AsyncClient::new(mqtt_options(config, &status_topic), REQUEST_CAPACITY);

        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    if ack.code != ConnectReturnCode::Success {
                        return Err(BusError::Connect(format!("{:?}", ack.code)));
                    }
                    break;
                }
                Ok(_) => continue,
                Err(e) => return Err(BusError::Connect(e.to_string())),
            }
        }
        tracing::info!("Connected to MQTT broker {}:{}", config.host, config.port);

        let poller = tokio::spawn(poll(eventloop, client.clone(), status_topic.clone()));

        Ok(Self {
            client,
            status_topic,
            poller: Mutex::new(Some(poller)),
        })
    }

    /// Publish `offline` and disconnect cleanly
    pub async fn disconnect(&self) {
        if let Err(e) = self.publish(&self.status_topic, OFFLINE.to_string(), true).await {
            tracing::warn!("{}", e);
        }
        if let Err(e) = self.client.disconnect().await {
            tracing::warn!("Failed to disconnect from broker: {}", e);
        }

        let poller = match self.poller.lock() {
            Ok(mut poller) => poller.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(poller) = poller {
            if tokio::time::timeout(Duration::from_secs(2), poller).await.is_err() {
                tracing::debug!("MQTT event loop did not stop in time");
            }
        }
    }
}

#[async_trait]
impl MessageBus for MqttBus {
    async fn publish(&self, topic: &str, payload: String, retain: bool) -> Result<(), BusError> {
        self.client
            .publish(topic, QoS::AtMostOnce, retain, payload)
            .await
            .map_err(|e| BusError::Publish {
                topic: topic.to_string(),
                reason: e.to_string(),
            })
    }
}

impl Drop for MqttBus {
    fn drop(&mut self) {
        if let Ok(mut poller) = self.poller.lock() {
            if let Some(poller) = poller.take() {
                poller.abort();
            }
        }
    }
}

/// Drive the event loop until the client disconnects
///
/// rumqttc reconnects on the poll after an error. Each reconnect re-announces
/// the bridge, since the broker published the last will when the old session
/// dropped.
async fn poll(mut eventloop: EventLoop, client: AsyncClient, status_topic: String) {
    loop {
        match eventloop.poll().await {
            Ok(event) => match reaction(&event) {
                Reaction::Announce => {
                    tracing::info!("Reconnected to MQTT broker");
                    if let Err(e) = client.try_publish(&status_topic, QoS::AtMostOnce, true, ONLINE) {
                        tracing::warn!("Failed to re-announce bridge status: {}", e);
                    }
                }
                Reaction::Stop => {
                    tracing::debug!("MQTT client disconnected");
                    return;
                }
                Reaction::Continue => {}
            },
            Err(e) => {
                tracing::warn!("MQTT connection error: {}", e);
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}

/// What the poll loop does after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reaction {
    /// Session (re)established; publish `online` over the last will
    Announce,
    /// Our own disconnect went out
    Stop,
    Continue,
}

fn reaction(event: &Event) -> Reaction {
    match event {
        Event::Incoming(Packet::ConnAck(ack)) if ack.code == ConnectReturnCode::Success => Reaction::Announce,
        Event::Outgoing(Outgoing::Disconnect) => Reaction::Stop,
        _ => Reaction::Continue,
    }
}

/// Broker options, with the last will set to a retained `offline` on `status_topic`
fn mqtt_options(config: &MqttConfig, status_topic: &str) -> MqttOptions {
    let client_id = config.client_id.clone().unwrap_or_else(random_client_id);

    let mut options = MqttOptions::new(client_id, &config.host, config.port);
    options.set_keep_alive(config.keep_alive());
    if let Some(username) = &config.username {
        options.set_credentials(username, config.password.clone().unwrap_or_default());
    }
    options.set_last_will(LastWill::new(status_topic, OFFLINE, QoS::AtMostOnce, true));
    options
}

fn random_client_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("onvif2mqtt-{}", suffix.to_lowercase())
}
