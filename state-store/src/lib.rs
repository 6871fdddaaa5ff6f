//! Last-published state tracking for device events
//!
//! A small state library with change detection: values are only reported as
//! changed when they differ structurally from what was stored before.
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use state_store::{NormalizedEvent, PublishDeduplicator};
//!
//! let dedup = PublishDeduplicator::new();
//!
//! let motion = NormalizedEvent::new("Motion", json!(true));
//! assert!(dedup.offer("porch", motion.clone()).is_some());
//!
//! // Same state again is suppressed
//! assert!(dedup.offer("porch", motion).is_none());
//! ```
//!
//! # Architecture
//!
//! ```text
//! PublishDeduplicator
//!     │
//!     └── StateStore<String>           (device name)
//!             │
//!             └── entities: HashMap<Id, PropertyBag>
//!                     │
//!                     └── PropertyBag: HashMap<event type, serde_json::Value>
//! ```

pub mod dedup;
pub mod event;
pub mod store;

pub use dedup::PublishDeduplicator;
pub use event::{NormalizedEvent, PublishRecord};
pub use store::{PropertyBag, StateStore};
