//! The device session capability the supervisor drives

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::types::{DeviceInfo, RawEvent};

/// One device's protocol session
///
/// Implementations must be cheap to call repeatedly: the supervisor calls
/// `connect` until it succeeds and `probe` on every liveness tick.
#[async_trait]
pub trait DeviceSession: Send + Sync + 'static {
    /// Establish the session; called until it succeeds
    async fn connect(&self) -> Result<()>;

    /// Fetch the device's static identity
    async fn device_info(&self) -> Result<DeviceInfo>;

    /// Cheap round-trip proving the device still answers
    async fn probe(&self) -> Result<()>;

    /// Start delivering notifications in device order
    ///
    /// Called at most once per session, after the first successful connect.
    /// The stream ends when the receiver yields `None`.
    async fn subscribe_events(&self) -> mpsc::Receiver<RawEvent>;
}
