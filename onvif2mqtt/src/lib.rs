//! Bridge ONVIF cameras to MQTT
//!
//! Each configured camera gets a connection supervisor and a bridge. The
//! bridge publishes under `<base>/camera/<name>/`:
//!
//! | Topic | Payload | Retained |
//! |---|---|---|
//! | `status` | `online` / `offline` | yes |
//! | `info` | device identity JSON | no |
//! | `event` | `{source, type, state, timestamp}` | no |
//! | `event/<type>` | state JSON | no |
//!
//! `<base>/status` reports the bridge itself and is the MQTT last will.

pub mod bridge;
pub mod bus;
pub mod config;
pub mod gateway;
pub mod logging;
pub mod topics;

pub use bridge::Bridge;
pub use bus::{BusError, MessageBus, MqttBus};
pub use config::{CameraConfig, Config, ConfigError, MqttConfig};
pub use gateway::Gateway;
