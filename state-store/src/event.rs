//! Event values flowing into and out of the deduplicator

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// A device notification reduced to its canonical `(event_type, state)` pair
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEvent {
    /// Last segment of the notification topic, never empty
    pub event_type: String,

    /// Reported state value, compared structurally
    pub state: Value,
}

impl NormalizedEvent {
    pub fn new(event_type: impl Into<String>, state: Value) -> Self {
        Self {
            event_type: event_type.into(),
            state,
        }
    }
}

/// A state change accepted for publishing
///
/// Serializes to the `{source, type, state, timestamp}` shape published on a
/// device's `event` topic, with the timestamp as an RFC 3339 UTC string with
/// millisecond precision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishRecord {
    /// Configured name of the device that reported the change
    #[serde(rename = "source")]
    pub device: String,

    #[serde(rename = "type")]
    pub event_type: String,

    pub state: Value,

    #[serde(serialize_with = "serialize_millis")]
    pub timestamp: DateTime<Utc>,
}

impl PublishRecord {
    /// Create a record stamped with the current time
    pub fn new(device: impl Into<String>, event: NormalizedEvent) -> Self {
        Self::with_timestamp(device, event, Utc::now())
    }

    /// Create a record with a specific timestamp
    pub fn with_timestamp(device: impl Into<String>, event: NormalizedEvent, timestamp: DateTime<Utc>) -> Self {
        Self {
            device: device.into(),
            event_type: event.event_type,
            state: event.state,
            timestamp,
        }
    }
}

fn serialize_millis<S: Serializer>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
}
