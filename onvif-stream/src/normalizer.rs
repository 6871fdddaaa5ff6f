//! Reduction of raw notifications to `(event_type, state)` pairs

use state_store::NormalizedEvent;

use crate::types::RawEvent;

/// Path from the notification root to the reported value
const STATE_PATH: [&str; 6] = ["message", "message", "data", "simpleItem", "$", "Value"];

/// Normalize a raw notification, or `None` if it is malformed
///
/// The event type is the topic's last `/`-separated segment (the whole topic
/// when it has none). The state is the value at
/// `message.message.data.simpleItem.$.Value`.
pub fn normalize(event: &RawEvent) -> Option<NormalizedEvent> {
    let topic = event.topic.as_deref()?;
    let event_type = topic.rsplit('/').next().unwrap_or(topic);
    if event_type.is_empty() {
        return None;
    }

    let state = STATE_PATH
        .iter()
        .try_fold(&event.payload, |node, key| node.get(*key))?;

    Some(NormalizedEvent::new(event_type, state.clone()))
}
