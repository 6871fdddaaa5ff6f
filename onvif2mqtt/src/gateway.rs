//! Wiring of supervisors and bridges for every configured camera

use std::sync::Arc;

use onvif_stream::{ConnectionSupervisor, DeviceSession, OnvifSession, SupervisorConfig, SupervisorHandle};
use state_store::PublishDeduplicator;
use tokio::task::JoinHandle;

use crate::bridge::Bridge;
use crate::bus::MessageBus;
use crate::config::Config;
use crate::topics;

/// Running bridge for a set of cameras
pub struct Gateway {
    supervisors: Vec<SupervisorHandle>,
    bridges: Vec<JoinHandle<()>>,
}

impl Gateway {
    /// Announce the bridge and start supervising every configured camera
    pub async fn start(config: &Config, bus: Arc<dyn MessageBus>) -> Self {
        let supervisor = SupervisorConfig::from(&config.supervisor);
        let sessions = config
            .cameras
            .iter()
            .map(|camera| {
                let session: Arc<dyn DeviceSession> =
                    Arc::new(OnvifSession::new(camera.session_config(&config.supervisor)));
                (camera.name.clone(), session)
            })
            .collect();

        Self::start_with_sessions(&config.mqtt.base_topic, sessions, supervisor, bus).await
    }

    /// Start with explicit sessions
    pub async fn start_with_sessions(
        base_topic: &str,
        sessions: Vec<(String, Arc<dyn DeviceSession>)>,
        supervisor: SupervisorConfig,
        bus: Arc<dyn MessageBus>,
    ) -> Self {
        let status = topics::bridge_status(base_topic);
        if let Err(e) = bus.publish(&status, "online".to_string(), true).await {
            tracing::warn!("{}", e);
        }

        let dedup = PublishDeduplicator::new();
        let mut supervisors = Vec::with_capacity(sessions.len());
        let mut bridges = Vec::with_capacity(sessions.len());

        for (name, session) in sessions {
            let (handle, signals) = ConnectionSupervisor::spawn(name.clone(), session, supervisor.clone());
            let bridge = Bridge::new(base_topic, name, dedup.clone(), Arc::clone(&bus));
            bridges.push(tokio::spawn(bridge.run(signals)));
            supervisors.push(handle);
        }

        tracing::info!("Bridging {} camera(s)", supervisors.len());
        Self { supervisors, bridges }
    }

    pub fn supervisors(&self) -> &[SupervisorHandle] {
        &self.supervisors
    }

    /// Stop every supervisor, then wait for the bridges to drain
    pub async fn shutdown(self) {
        for supervisor in self.supervisors {
            supervisor.shutdown().await;
        }
        for bridge in self.bridges {
            if let Err(e) = bridge.await {
                tracing::warn!("Bridge task ended abnormally: {}", e);
            }
        }
    }
}
