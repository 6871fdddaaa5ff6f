//! Topic names under the configured base

/// Join topic segments with `/`, ignoring empty segments and stray slashes
pub fn join(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|s| s.trim_matches('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Bridge-wide availability topic, carrying the last will
pub fn bridge_status(base: &str) -> String {
    join(&[base, "status"])
}

/// Topics owned by one camera, under `<base>/camera/<name>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTopics {
    prefix: String,
}

impl DeviceTopics {
    pub fn new(base: &str, device: &str) -> Self {
        Self {
            prefix: join(&[base, "camera", device]),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Retained `online`/`offline`
    pub fn status(&self) -> String {
        join(&[&self.prefix, "status"])
    }

    /// Device identity JSON
    pub fn info(&self) -> String {
        join(&[&self.prefix, "info"])
    }

    /// Every accepted event as `{source, type, state, timestamp}`
    pub fn event(&self) -> String {
        join(&[&self.prefix, "event"])
    }

    /// Bare state of one event type
    pub fn event_type(&self, event_type: &str) -> String {
        join(&[&self.prefix, "event", event_type])
    }
}
