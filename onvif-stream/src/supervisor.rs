//! Per-device connect/monitor lifecycle
//!
//! One task per device:
//!
//! ```text
//! Disconnected ──► Connecting ──ok──► Connected ◄──probe ok── Degraded
//!      ▲               │                  │                      ▲
//!      └── backoff ◄───┘ err              └──── probe failed ────┘
//! ```
//!
//! Once connected the task never reconnects; a device whose probes keep
//! failing stays `Degraded` until one succeeds.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::SupervisorConfig;
use crate::error::Result;
use crate::normalizer::normalize;
use crate::session::DeviceSession;
use crate::types::{ConnectionState, DeviceInfo, DeviceSignal, RawEvent};

/// Floor for the probe interval; a zero period would stall the monitor
const MIN_PROBE_INTERVAL: Duration = Duration::from_millis(100);

/// Starts supervisor tasks
pub struct ConnectionSupervisor;

impl ConnectionSupervisor {
    /// Spawn the supervisor task for one device
    ///
    /// Must be called within a tokio runtime. Signals arrive on the returned
    /// receiver in the order they happened; the receiver ends once the task
    /// has stopped.
    pub fn spawn(
        device: impl Into<String>,
        session: Arc<dyn DeviceSession>,
        config: SupervisorConfig,
    ) -> (SupervisorHandle, mpsc::UnboundedReceiver<DeviceSignal>) {
        let device = device.into();
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = SupervisorTask {
            device: device.clone(),
            session,
            config,
            signals: signal_tx,
            state: state_tx,
            shutdown: shutdown_rx,
            info: None,
            events_attached: false,
        };

        let handle = SupervisorHandle {
            device,
            state: state_rx,
            shutdown: shutdown_tx,
            task: Some(tokio::spawn(task.run())),
        };

        (handle, signal_rx)
    }
}

/// Owner's handle on a running supervisor
///
/// Dropping the handle aborts the task; prefer [`SupervisorHandle::shutdown`]
/// to wait for it.
#[derive(Debug)]
pub struct SupervisorHandle {
    device: String,
    state: watch::Receiver<ConnectionState>,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl SupervisorHandle {
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Receiver observing state transitions
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Stop the task and wait for it to finish
    ///
    /// Cancels a pending backoff or probe. No signal is emitted after this
    /// returns.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("Supervisor task for {} ended abnormally: {}", self.device, e);
            }
        }
        tracing::debug!("Supervisor for {} stopped", self.device);
    }
}

impl Drop for SupervisorHandle {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// What woke the monitor loop
enum Wake {
    Stop,
    Probe,
    Event(Option<RawEvent>),
}

struct SupervisorTask {
    device: String,
    session: Arc<dyn DeviceSession>,
    config: SupervisorConfig,
    signals: mpsc::UnboundedSender<DeviceSignal>,
    state: watch::Sender<ConnectionState>,
    shutdown: watch::Receiver<bool>,
    info: Option<Arc<DeviceInfo>>,
    events_attached: bool,
}

impl SupervisorTask {
    async fn run(mut self) {
        tracing::info!("Supervising {}", self.device);
        if let Some(info) = self.connect().await {
            self.monitor(info).await;
        }
        tracing::debug!("Supervisor task for {} exiting", self.device);
    }

    /// Retry connecting until it works or shutdown is requested
    async fn connect(&mut self) -> Option<Arc<DeviceInfo>> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            self.set_state(ConnectionState::Connecting);

            let result = tokio::select! {
                biased;
                _ = stopped(&mut self.shutdown) => return None,
                result = establish(self.session.as_ref(), self.info.clone()) => result,
            };

            match result {
                Ok(info) => {
                    self.info = Some(Arc::clone(&info));
                    return Some(info);
                }
                Err(error) => {
                    tracing::debug!(
                        "Connect attempt {} to {} failed, retrying in {:?}: {}",
                        attempt,
                        self.device,
                        self.config.reconnect_delay,
                        error
                    );
                    self.set_state(ConnectionState::Disconnected);
                    self.emit(DeviceSignal::ConnectError(error));

                    tokio::select! {
                        biased;
                        _ = stopped(&mut self.shutdown) => return None,
                        _ = tokio::time::sleep(self.config.reconnect_delay) => {}
                    }
                }
            }
        }
    }

    /// Probe liveness and forward events until shutdown
    async fn monitor(&mut self, info: Arc<DeviceInfo>) {
        self.set_state(ConnectionState::Connected);
        self.emit(DeviceSignal::Connected(Arc::clone(&info)));
        tracing::info!("{} connected ({} {})", self.device, info.manufacturer, info.model);

        let mut events = if self.events_attached {
            None
        } else {
            self.events_attached = true;
            Some(self.session.subscribe_events().await)
        };

        let interval = self.config.probe_interval.max(MIN_PROBE_INTERVAL);
        let mut probe = tokio::time::interval_at(Instant::now() + interval, interval);
        probe.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let wake = tokio::select! {
                biased;
                _ = stopped(&mut self.shutdown) => Wake::Stop,
                _ = probe.tick() => Wake::Probe,
                event = next_event(&mut events) => Wake::Event(event),
            };

            match wake {
                Wake::Stop => return,
                Wake::Probe => {
                    let result = tokio::select! {
                        biased;
                        _ = stopped(&mut self.shutdown) => return,
                        result = self.session.probe() => result,
                    };
                    self.on_probe(result, &info);
                }
                Wake::Event(Some(raw)) => self.on_event(raw),
                Wake::Event(None) => {
                    tracing::info!("Event stream for {} ended", self.device);
                    events = None;
                }
            }
        }
    }

    fn on_probe(&mut self, result: Result<()>, info: &Arc<DeviceInfo>) {
        let state = *self.state.borrow();
        match (result, state) {
            (Err(error), ConnectionState::Connected) => {
                tracing::warn!("{} stopped answering: {}", self.device, error);
                self.set_state(ConnectionState::Degraded);
                self.emit(DeviceSignal::Disconnected);
            }
            (Ok(()), ConnectionState::Degraded) => {
                tracing::info!("{} answering again", self.device);
                self.set_state(ConnectionState::Connected);
                self.emit(DeviceSignal::Connected(Arc::clone(info)));
            }
            (Err(error), _) => {
                tracing::debug!("{} still not answering: {}", self.device, error);
            }
            (Ok(()), _) => {}
        }
    }

    fn on_event(&self, raw: RawEvent) {
        match normalize(&raw) {
            Some(event) => self.emit(DeviceSignal::Event(event)),
            None => tracing::trace!("Dropping malformed event from {}: {:?}", self.device, raw.topic),
        }
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.send_replace(state);
    }

    fn emit(&self, signal: DeviceSignal) {
        if *self.shutdown.borrow() {
            return;
        }
        // The bridge may already be gone; the supervisor keeps running until shut down
        let _ = self.signals.send(signal);
    }
}

/// Connect and fetch info unless already cached
async fn establish(session: &dyn DeviceSession, cached: Option<Arc<DeviceInfo>>) -> Result<Arc<DeviceInfo>> {
    session.connect().await?;
    match cached {
        Some(info) => Ok(info),
        None => Ok(Arc::new(session.device_info().await?)),
    }
}

/// Resolves once shutdown is requested or the handle is gone
async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

async fn next_event(events: &mut Option<mpsc::Receiver<RawEvent>>) -> Option<RawEvent> {
    match events {
        Some(receiver) => receiver.recv().await,
        None => std::future::pending().await,
    }
}
