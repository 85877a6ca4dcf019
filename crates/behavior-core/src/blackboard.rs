//! Shared key/value store for the nodes of one tree.
//!
//! The [`Blackboard`] holds dynamically-typed values under string keys. Every
//! node of a tree sees the same blackboard during a tick; it is how leaves
//! pass data to each other. No key has special meaning to the engine.
//!
//! Each operation is atomic on its own. There is no grouping across several
//! operations, so concurrent writers (e.g. children of a `Parallel`) see
//! last-write-wins behavior.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

/// A type-erased blackboard value.
pub type Value = Arc<dyn Any + Send + Sync>;

/// Keyed store of dynamically-typed values shared by every node in a tree.
#[derive(Default)]
pub struct Blackboard {
    entries: RwLock<HashMap<String, Value>>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a clone of the value stored under `key`.
    ///
    /// Returns `None` when the key is missing or holds a value of another
    /// type. Readers that expect a particular type should fall back to a
    /// default; see [`get_or`](Self::get_or).
    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: Any + Clone,
    {
        self.entries.read().get(key)?.downcast_ref::<T>().cloned()
    }

    /// Returns the value under `key`, or `default` when it is missing or of
    /// another type.
    pub fn get_or<T>(&self, key: &str, default: T) -> T
    where
        T: Any + Clone,
    {
        self.get(key).unwrap_or(default)
    }

    /// Returns the type-erased value under `key`.
    pub fn get_value(&self, key: &str) -> Option<Value> {
        self.entries.read().get(key).cloned()
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set<T>(&self, key: impl Into<String>, value: T)
    where
        T: Any + Send + Sync,
    {
        self.set_value(key, Arc::new(value));
    }

    /// Stores an already type-erased value under `key`.
    pub fn set_value(&self, key: impl Into<String>, value: Value) {
        self.entries.write().insert(key.into(), value);
    }

    /// Updates the value under `key` in place.
    ///
    /// `update` receives the current value (if present and of type `T`) and
    /// returns the value to store. The read and the write happen under one
    /// lock, so concurrent updaters do not lose increments.
    pub fn update<T, F>(&self, key: &str, update: F) -> T
    where
        T: Any + Clone + Send + Sync,
        F: FnOnce(Option<T>) -> T,
    {
        let mut entries = self.entries.write();
        let current = entries
            .get(key)
            .and_then(|value| value.downcast_ref::<T>())
            .cloned();
        let next = update(current);
        entries.insert(key.to_owned(), Arc::new(next.clone()));
        next
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Removes `key`, returning the value it held.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.entries.write().remove(key)
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns the stored keys in unspecified order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}

impl fmt::Debug for Blackboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = self.keys();
        keys.sort();
        f.debug_struct("Blackboard").field("keys", &keys).finish()
    }
}
