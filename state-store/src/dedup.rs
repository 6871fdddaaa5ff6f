//! Suppression of unchanged event states

use serde_json::Value;

use crate::event::{NormalizedEvent, PublishRecord};
use crate::store::StateStore;

/// Remembers the last published state per `(device, event type)`
///
/// A state is accepted the first time it is seen for a pair and each time it
/// differs from the previous accepted state. Clones share one table.
#[derive(Debug, Clone, Default)]
pub struct PublishDeduplicator {
    states: StateStore<String>,
}

impl PublishDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer an event; returns a record stamped with the current time if the
    /// state changed, `None` if it repeats the last accepted state
    pub fn offer(&self, device: &str, event: NormalizedEvent) -> Option<PublishRecord> {
        if !self.accept(device, &event.event_type, &event.state) {
            return None;
        }
        Some(PublishRecord::new(device, event))
    }

    fn accept(&self, device: &str, event_type: &str, state: &Value) -> bool {
        self.states.set(&device.to_string(), event_type, state.clone())
    }

    /// The underlying last-state table
    pub fn store(&self) -> &StateStore<String> {
        &self.states
    }
}
