//! Test doubles for the bus and device sessions.

#![allow(dead_code)]

use async_trait::async_trait;
use onvif2mqtt::{BusError, MessageBus};
use onvif_stream::{DeviceInfo, DeviceSession, RawEvent, SessionError};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// One recorded publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub topic: String,
    pub payload: String,
    pub retain: bool,
}

/// Bus that records every publish, optionally failing them.
#[derive(Default)]
pub struct RecordingBus {
    published: Mutex<Vec<Published>>,
    failing: AtomicBool,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn published(&self) -> Vec<Published> {
        self.published.lock().unwrap().clone()
    }

    pub fn on_topic(&self, topic: &str) -> Vec<Published> {
        self.published()
            .into_iter()
            .filter(|p| p.topic == topic)
            .collect()
    }

    pub fn clear(&self) {
        self.published.lock().unwrap().clear();
    }
}

#[async_trait]
impl MessageBus for RecordingBus {
    async fn publish(&self, topic: &str, payload: String, retain: bool) -> Result<(), BusError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(BusError::Publish {
                topic: topic.to_string(),
                reason: "broker unavailable".to_string(),
            });
        }
        self.published.lock().unwrap().push(Published {
            topic: topic.to_string(),
            payload,
            retain,
        });
        Ok(())
    }
}

/// Session whose probe outcome can be flipped and whose events are pushed
/// by the test.
#[derive(Default)]
pub struct ScriptedSession {
    probe_failing: AtomicBool,
    info_count: AtomicU32,
    events: Mutex<Option<mpsc::Sender<RawEvent>>>,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_probe_failing(&self, failing: bool) {
        self.probe_failing.store(failing, Ordering::SeqCst);
    }

    pub fn info_count(&self) -> u32 {
        self.info_count.load(Ordering::SeqCst)
    }

    pub async fn push_event(&self, event: RawEvent) {
        let sender = loop {
            if let Some(sender) = self.events.lock().unwrap().clone() {
                break sender;
            }
            tokio::task::yield_now().await;
        };
        sender.send(event).await.unwrap();
    }

    pub fn info() -> DeviceInfo {
        DeviceInfo {
            manufacturer: "Acme".to_string(),
            model: "Cam 3000".to_string(),
            firmware_version: "1.2.3".to_string(),
            serial_number: "SN-0001".to_string(),
            hardware_id: "HW-1".to_string(),
        }
    }
}

#[async_trait]
impl DeviceSession for ScriptedSession {
    async fn connect(&self) -> Result<(), SessionError> {
        Ok(())
    }

    async fn device_info(&self) -> Result<DeviceInfo, SessionError> {
        self.info_count.fetch_add(1, Ordering::SeqCst);
        Ok(Self::info())
    }

    async fn probe(&self) -> Result<(), SessionError> {
        if self.probe_failing.load(Ordering::SeqCst) {
            return Err(SessionError::Request("timed out".to_string()));
        }
        Ok(())
    }

    async fn subscribe_events(&self) -> mpsc::Receiver<RawEvent> {
        let (sender, receiver) = mpsc::channel(16);
        *self.events.lock().unwrap() = Some(sender);
        receiver
    }
}
