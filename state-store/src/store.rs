//! Keyed value storage with change detection
//!
//! - `PropertyBag`: one entity's values, keyed by name
//! - `StateStore<Id>`: collection of entities with their property bags

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

use serde_json::Value;

// ============================================================================
// PropertyBag - named values for a single entity
// ============================================================================

/// Storage for one entity's values
///
/// Change detection compares `serde_json::Value`s structurally, so two
/// separately built `{"x": 1}` objects are the same value.
///
/// ```rust
/// use serde_json::json;
/// use state_store::PropertyBag;
///
/// let mut bag = PropertyBag::new();
/// assert!(bag.set("Motion", json!(true)));
/// assert!(!bag.set("Motion", json!(true)));
/// assert!(bag.set("Motion", json!(false)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag {
    values: HashMap<String, Value>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Set a value, returning whether it changed
    ///
    /// Returns `true` if the key was unset or held a different value.
    pub fn set(&mut self, key: &str, value: Value) -> bool {
        if self.values.get(key) == Some(&value) {
            return false;
        }
        self.values.insert(key.to_string(), value);
        true
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ============================================================================
// StateStore<Id> - shared table of entities
// ============================================================================

/// Shared state table with change detection
///
/// Generic over the entity ID type. Clones share the same underlying table.
/// Entries are never evicted; the table grows with the set of entities and
/// keys it is fed.
pub struct StateStore<Id>
where
    Id: Clone + Eq + Hash + Send + Sync + 'static,
{
    entities: Arc<RwLock<HashMap<Id, PropertyBag>>>,
}

impl<Id> StateStore<Id>
where
    Id: Clone + Eq + Hash + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            entities: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get a value for an entity
    ///
    /// Returns `None` if the entity doesn't exist or the key isn't set.
    pub fn get(&self, entity_id: &Id, key: &str) -> Option<Value> {
        let entities = self.entities.read().ok()?;
        entities.get(entity_id)?.get(key).cloned()
    }

    /// Set a value for an entity, returning whether it changed
    ///
    /// Comparison and update happen under one write lock, so concurrent
    /// callers never both observe the same change.
    pub fn set(&self, entity_id: &Id, key: &str, value: Value) -> bool {
        let mut entities = match self.entities.write() {
            Ok(e) => e,
            Err(poisoned) => poisoned.into_inner(),
        };
        entities
            .entry(entity_id.clone())
            .or_insert_with(PropertyBag::new)
            .set(key, value)
    }

    /// Get the number of entities in the store
    pub fn entity_count(&self) -> usize {
        self.entities.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.entity_count() == 0
    }

    /// Snapshot of one entity's values
    pub fn entity(&self, entity_id: &Id) -> Option<PropertyBag> {
        self.entities.read().ok()?.get(entity_id).cloned()
    }
}

impl<Id> Default for StateStore<Id>
where
    Id: Clone + Eq + Hash + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Id> Clone for StateStore<Id>
where
    Id: Clone + Eq + Hash + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            entities: Arc::clone(&self.entities),
        }
    }
}

impl<Id> std::fmt::Debug for StateStore<Id>
where
    Id: Clone + Eq + Hash + Send + Sync + std::fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("entity_count", &self.entity_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_property_bag_basic() {
        let mut bag = PropertyBag::new();

        assert!(bag.is_empty());
        assert!(bag.get("Motion").is_none());

        assert!(bag.set("Motion", json!(true)));
        assert_eq!(bag.get("Motion"), Some(&json!(true)));

        assert!(!bag.set("Motion", json!(true)));

        assert!(bag.set("Motion", json!(false)));
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn test_property_bag_structural_equality() {
        let mut bag = PropertyBag::new();

        assert!(bag.set("Region", json!({"x": 1, "y": [1, 2]})));
        // A separately built but equal value is not a change
        assert!(!bag.set("Region", json!({"y": [1, 2], "x": 1})));
        assert!(bag.set("Region", json!({"x": 1, "y": [2, 1]})));
    }

    #[test]
    fn test_state_store_basic() {
        let store = StateStore::<String>::new();
        let porch = "porch".to_string();

        assert!(store.is_empty());
        assert!(store.set(&porch, "Motion", json!(true)));
        assert!(!store.set(&porch, "Motion", json!(true)));
        assert_eq!(store.get(&porch, "Motion"), Some(json!(true)));
        assert_eq!(store.get(&porch, "Tamper"), None);
        assert_eq!(store.get(&"garage".to_string(), "Motion"), None);
    }

    #[test]
    fn test_entities_are_independent() {
        let store = StateStore::<String>::new();

        assert!(store.set(&"porch".to_string(), "Motion", json!(true)));
        assert!(store.set(&"garage".to_string(), "Motion", json!(true)));

        assert_eq!(store.entity_count(), 2);
        assert_eq!(store.entity(&"porch".to_string()).map(|b| b.len()), Some(1));
    }

    #[test]
    fn test_store_clone_shares_state() {
        let store1 = StateStore::<String>::new();
        let store2 = store1.clone();

        store1.set(&"porch".to_string(), "Motion", json!(true));

        assert_eq!(store2.get(&"porch".to_string(), "Motion"), Some(json!(true)));
        assert!(!store2.set(&"porch".to_string(), "Motion", json!(true)));
    }

    #[test]
    fn test_concurrent_setters_see_one_change() {
        let store = StateStore::<String>::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.set(&"porch".to_string(), "Motion", json!(true)))
            })
            .collect();

        let changes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|changed| *changed)
            .count();
        assert_eq!(changes, 1);
    }
}
